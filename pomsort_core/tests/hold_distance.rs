use std::time::Duration;

use pomsort_core::mocks::{ManualClock, RecordingServo, ScriptedAnalog, ScriptedBumper, SpyMotor};
use pomsort_core::{GuardCfg, ManeuverStatus, Rig};
use pomsort_traits::Side;
use rstest::rstest;

struct Parts {
    rig: Rig,
    left: SpyMotor,
    right: SpyMotor,
    clock: ManualClock,
}

fn rig_with_distance(
    bumps: ScriptedBumper,
    distance: ScriptedAnalog,
    guard: GuardCfg,
) -> Parts {
    let left = SpyMotor::new();
    let right = SpyMotor::new();
    let clock = ManualClock::new();
    let rig = Rig::builder()
        .with_bumpers(bumps, ScriptedBumper::constant(true))
        .with_line_sensors(ScriptedAnalog::constant(0), ScriptedAnalog::constant(0))
        .with_distance_sensor(distance)
        .with_motors(left.clone(), right.clone())
        .with_servo(RecordingServo::new())
        .with_guard(guard)
        .with_clock(Box::new(clock.clone()))
        .build()
        .expect("rig build");
    Parts {
        rig,
        left,
        right,
        clock,
    }
}

#[rstest]
fn walks_through_all_three_zones_then_clears_forward() {
    // Distance samples 2600 (too far), 2750 (band), 2950 (too close), then
    // both bumps press: zone commands A, B, C, then the forward clearance
    // nudge.
    let mut p = rig_with_distance(
        ScriptedBumper::new([false, false, false, true]),
        ScriptedAnalog::new([2600, 2750, 2950]),
        GuardCfg::default(),
    );

    let status = p.rig.hold_distance().expect("hold_distance");
    assert_eq!(status, ManeuverStatus::Complete);

    // Zone A biases the left side in, zone C biases the right side out.
    assert_eq!(p.left.drive_commands(), vec![-40, -50, -50, 50]);
    assert_eq!(p.right.drive_commands(), vec![-50, -50, -30, 50]);

    // Clearance nudge slept for the calibrated duration, then stopped.
    assert_eq!(p.clock.slept(), vec![Duration::from_millis(300)]);
    assert_eq!(p.left.stops(), 1);
    assert_eq!(p.left.speed(), 0);
}

#[rstest]
fn immediate_contact_skips_the_controller() {
    let mut p = rig_with_distance(
        ScriptedBumper::constant(true),
        ScriptedAnalog::constant(2750),
        GuardCfg::default(),
    );

    let status = p.rig.hold_distance().expect("hold_distance");
    assert_eq!(status, ManeuverStatus::Complete);
    // Only the clearance nudge was commanded.
    assert_eq!(p.left.drive_commands(), vec![50]);
    assert_eq!(p.right.drive_commands(), vec![50]);
}

#[rstest]
fn zone_selection_has_no_hysteresis() {
    // Oscillating readings across the focal point select A and B strictly
    // per sample.
    let mut p = rig_with_distance(
        ScriptedBumper::new([false, false, false, false, true]),
        ScriptedAnalog::new([2699, 2700, 2699, 2700]),
        GuardCfg::default(),
    );

    let status = p.rig.hold_distance().expect("hold_distance");
    assert_eq!(status, ManeuverStatus::Complete);
    assert_eq!(p.left.drive_commands(), vec![-40, -50, -40, -50, 50]);
}

#[rstest]
fn turn_drives_only_the_opposite_motor() {
    let mut p = rig_with_distance(
        ScriptedBumper::constant(false),
        ScriptedAnalog::constant(0),
        GuardCfg::default(),
    );

    let status = p
        .rig
        .turn(Side::Right, Duration::from_millis(1850))
        .expect("turn");
    assert_eq!(status, ManeuverStatus::Complete);
    assert_eq!(p.left.drive_commands(), vec![50]);
    assert!(p.right.drive_commands().is_empty());
    assert_eq!(p.clock.slept(), vec![Duration::from_millis(1850)]);
    assert_eq!(p.left.stops(), 1);
    assert_eq!(p.right.stops(), 1);
}
