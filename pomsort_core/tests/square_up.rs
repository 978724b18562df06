use pomsort_core::mocks::{ManualClock, RecordingServo, ScriptedAnalog, ScriptedBumper, SpyMotor};
use pomsort_core::{GuardCfg, ManeuverStatus, Rig};
use rstest::rstest;

fn rig_with_bumps(left: ScriptedBumper, right: ScriptedBumper, guard: GuardCfg) -> (Rig, SpyMotor, SpyMotor) {
    let left_motor = SpyMotor::new();
    let right_motor = SpyMotor::new();
    let rig = Rig::builder()
        .with_bumpers(left, right)
        .with_line_sensors(ScriptedAnalog::constant(0), ScriptedAnalog::constant(0))
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
fn unpressed_bumps_keep_commanding_reverse() {
    // Neither bump ever presses: the maneuver keeps reversing at calibrated
    // speed until the opt-in guard gives up.
    let (mut rig, left, right) = rig_with_bumps(
        ScriptedBumper::constant(false),
        ScriptedBumper::constant(false),
        GuardCfg {
            max_polls: Some(5),
            ..GuardCfg::default()
        },
    );

    let status = rig.square_up(1).expect("square_up");
    assert_eq!(status, ManeuverStatus::TimedOut);
    assert_eq!(left.drive_commands(), vec![-50; 5]);
    assert_eq!(right.drive_commands(), vec![-50; 5]);
    // Motors were stopped on the way out.
    assert_eq!(left.speed(), 0);
    assert_eq!(right.speed(), 0);
}

#[rstest]
fn already_pressed_bumps_return_without_driving() {
    let (mut rig, left, right) = rig_with_bumps(
        ScriptedBumper::constant(true),
        ScriptedBumper::constant(true),
        GuardCfg::default(),
    );

    let status = rig.square_up(1).expect("square_up");
    assert_eq!(status, ManeuverStatus::Complete);
    assert!(left.drive_commands().is_empty());
    assert!(right.drive_commands().is_empty());
}

#[rstest]
fn repeats_exactly_n_times() {
    // Each repetition: one unpressed poll (drive), then pressed (stop).
    let (mut rig, left, _right) = rig_with_bumps(
        ScriptedBumper::new([false, true, false, true]),
        ScriptedBumper::constant(true),
        GuardCfg::default(),
    );

    let status = rig.square_up(2).expect("square_up");
    assert_eq!(status, ManeuverStatus::Complete);
    assert_eq!(left.drive_commands(), vec![-50, -50]);
    // One stop per repetition.
    assert_eq!(left.stops(), 2);
}

#[rstest]
fn zero_repetitions_is_a_noop() {
    let (mut rig, left, right) = rig_with_bumps(
        ScriptedBumper::constant(false),
        ScriptedBumper::constant(false),
        GuardCfg::default(),
    );

    let status = rig.square_up(0).expect("square_up");
    assert_eq!(status, ManeuverStatus::Complete);
    assert!(left.drive_commands().is_empty());
    assert_eq!(right.stops(), 0);
}

#[rstest]
fn stop_all_is_idempotent() {
    let (mut rig, left, right) = rig_with_bumps(
        ScriptedBumper::constant(false),
        ScriptedBumper::constant(false),
        GuardCfg::default(),
    );

    rig.stop_all().expect("first stop");
    rig.stop_all().expect("second stop");
    assert_eq!(left.speed(), 0);
    assert_eq!(right.speed(), 0);
    assert!(left.drive_commands().is_empty());
    assert!(right.drive_commands().is_empty());
}
