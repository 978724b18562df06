use pomsort_core::mocks::{ManualClock, RecordingServo, ScriptedAnalog, ScriptedBumper, SpyMotor};
use pomsort_core::{GuardCfg, ManeuverStatus, Rig};
use rstest::rstest;

fn rig_with_line(
    left: ScriptedAnalog,
    right: ScriptedAnalog,
    guard: GuardCfg,
) -> (Rig, SpyMotor, SpyMotor) {
    let left_motor = SpyMotor::new();
    let right_motor = SpyMotor::new();
    let rig = Rig::builder()
        .with_bumpers(ScriptedBumper::constant(false), ScriptedBumper::constant(false))
        .with_line_sensors(left, right)
        .with_distance_sensor(ScriptedAnalog::constant(0))
        .with_motors(left_motor.clone(), right_motor.clone())
        .with_servo(RecordingServo::new())
        .with_guard(guard)
        .with_clock(Box::new(ManualClock::new()))
        .build()
        .expect("rig build");
    (rig, left_motor, right_motor)
}

#[rstest]
fn drives_until_both_sensors_cross_together() {
    // First sample: only the right sensor is over the tape -> keep driving.
    // Second sample: both over -> stop immediately.
    let (mut rig, left, right) = rig_with_line(
        ScriptedAnalog::new([100, 3000]),
        ScriptedAnalog::new([3000, 3000]),
        GuardCfg::default(),
    );

    let status = rig.drive_until_line().expect("drive_until_line");
    assert_eq!(status, ManeuverStatus::Complete);
    assert_eq!(left.drive_commands(), vec![50]);
    assert_eq!(right.drive_commands(), vec![50]);
    assert_eq!(left.stops(), 1);
    assert_eq!(right.stops(), 1);
}

#[rstest]
fn one_crossed_sensor_never_terminates() {
    // Only one sensor over the tape, forever: the AND never holds, so only
    // the guard budget ends the maneuver.
    let (mut rig, left, _right) = rig_with_line(
        ScriptedAnalog::constant(3000),
        ScriptedAnalog::constant(100),
        GuardCfg {
            max_polls: Some(10),
            ..GuardCfg::default()
        },
    );

    let status = rig.drive_until_line().expect("drive_until_line");
    assert_eq!(status, ManeuverStatus::TimedOut);
    assert_eq!(left.drive_commands().len(), 10);
}

#[rstest]
fn line_follow_waits_while_straddling_without_driving() {
    // Straddling (one above, one below), then both on the light surface.
    let (mut rig, left, right) = rig_with_line(
        ScriptedAnalog::new([3000, 3000, 100]),
        ScriptedAnalog::constant(100),
        GuardCfg::default(),
    );

    let status = rig.line_follow().expect("line_follow");
    assert_eq!(status, ManeuverStatus::Complete);
    // A pure wait gate: no motor commands at all, not even a stop.
    assert!(left.drive_commands().is_empty());
    assert!(right.drive_commands().is_empty());
    assert_eq!(left.stops(), 0);
    assert_eq!(right.stops(), 0);
}

#[rstest]
fn line_follow_returns_when_both_sensors_cross() {
    // Both over the tape is also "not straddling": the XOR fails on equal
    // sides regardless of which side of the threshold they share.
    let (mut rig, _left, _right) = rig_with_line(
        ScriptedAnalog::constant(3000),
        ScriptedAnalog::constant(3000),
        GuardCfg::default(),
    );

    let status = rig.line_follow().expect("line_follow");
    assert_eq!(status, ManeuverStatus::Complete);
}
