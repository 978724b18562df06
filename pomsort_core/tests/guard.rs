use std::time::Duration;

use pomsort_core::mocks::{ManualClock, RecordingServo, ScriptedAnalog, ScriptedBumper, SpyMotor};
use pomsort_core::{GuardCfg, ManeuverStatus, Rig};
use rstest::rstest;

fn guarded_rig(guard: GuardCfg, clock: ManualClock, left: SpyMotor) -> Rig {
    Rig::builder()
        .with_bumpers(ScriptedBumper::constant(false), ScriptedBumper::constant(false))
        .with_line_sensors(ScriptedAnalog::constant(0), ScriptedAnalog::constant(0))
        .with_distance_sensor(ScriptedAnalog::constant(2750))
        .with_motors(left, SpyMotor::new())
        .with_servo(RecordingServo::new())
        .with_guard(guard)
        .with_clock(Box::new(clock))
        .build()
        .expect("rig build")
}

#[rstest]
fn wall_clock_deadline_expires_a_stuck_maneuver() {
    // Every now() call advances simulated time 10ms, so a 50ms deadline
    // expires on the fifth poll of a loop that would otherwise never end.
    let clock = ManualClock::with_tick_on_now(Duration::from_millis(10));
    let left = SpyMotor::new();
    let mut rig = guarded_rig(
        GuardCfg {
            max_maneuver_ms: Some(50),
            max_polls: None,
        },
        clock,
        left.clone(),
    );

    let status = rig.square_up(1).expect("square_up");
    assert_eq!(status, ManeuverStatus::TimedOut);
    assert_eq!(left.drive_commands(), vec![-50, -50, -50, -50]);
    assert_eq!(left.stops(), 1);
}

#[rstest]
fn poll_budget_caps_iterations_independently_of_time() {
    let left = SpyMotor::new();
    let mut rig = guarded_rig(
        GuardCfg {
            max_maneuver_ms: None,
            max_polls: Some(7),
        },
        ManualClock::new(),
        left.clone(),
    );

    let status = rig.hold_distance().expect("hold_distance");
    assert_eq!(status, ManeuverStatus::TimedOut);
    assert_eq!(left.drive_commands().len(), 7);
}

#[rstest]
fn unbounded_guard_never_interferes() {
    // With both budgets unset the loop runs until its own condition holds.
    let left = SpyMotor::new();
    let clock = ManualClock::with_tick_on_now(Duration::from_millis(1000));
    let mut rig = Rig::builder()
        .with_bumpers(
            ScriptedBumper::new([false, false, false, false, false, true]),
            ScriptedBumper::constant(true),
        )
        .with_line_sensors(ScriptedAnalog::constant(0), ScriptedAnalog::constant(0))
        .with_distance_sensor(ScriptedAnalog::constant(2750))
        .with_motors(left.clone(), SpyMotor::new())
        .with_servo(RecordingServo::new())
        .with_guard(GuardCfg::default())
        .with_clock(Box::new(clock))
        .build()
        .expect("rig build");

    let status = rig.square_up(1).expect("square_up");
    assert_eq!(status, ManeuverStatus::Complete);
    assert_eq!(left.drive_commands().len(), 5);
}
