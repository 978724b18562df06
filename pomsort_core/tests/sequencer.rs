use pomsort_core::mocks::{ManualClock, RecordingServo, ScriptedAnalog, ScriptedBumper, SpyMotor};
use pomsort_core::{
    AbortReason, DriveSpeeds, GuardCfg, Maneuver, ManeuverStatus, Plan, Rig, RunOutcome,
    Sequencer, TimeoutPolicy,
};
use pomsort_traits::Side;
use rstest::rstest;

fn sequencer_rig(bumps_pressed: bool, line_reading: i32, guard: GuardCfg, halted: bool) -> Rig {
    Rig::builder()
        .with_bumpers(
            ScriptedBumper::constant(bumps_pressed),
            ScriptedBumper::constant(bumps_pressed),
        )
        .with_line_sensors(
            ScriptedAnalog::constant(line_reading),
            ScriptedAnalog::constant(line_reading),
        )
        .with_distance_sensor(ScriptedAnalog::constant(2750))
        .with_motors(SpyMotor::new(), SpyMotor::new())
        .with_servo(RecordingServo::new())
        .with_guard(guard)
        .with_halt_check(move || halted)
        .with_clock(Box::new(ManualClock::new()))
        .build()
        .expect("rig build")
}

#[rstest]
fn runs_every_step_in_order() {
    // Bumps already pressed and both line sensors on the tape, so every
    // step terminates immediately.
    let mut rig = sequencer_rig(true, 3000, GuardCfg::default(), false);
    let plan = Plan::new()
        .push("square", Maneuver::SquareUp { times: 1 })
        .push(
            "pivot",
            Maneuver::Turn {
                direction: Side::Right,
                duration_ms: 100,
            },
        )
        .push("to-line", Maneuver::DriveUntilLine);

    let report = Sequencer::new(plan).run(&mut rig).expect("run");
    assert_eq!(report.outcome, RunOutcome::Completed);
    let names: Vec<_> = report.steps.iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["square", "pivot", "to-line"]);
    assert!(
        report
            .steps
            .iter()
            .all(|s| s.status == ManeuverStatus::Complete && s.attempts == 1)
    );
}

#[rstest]
fn timed_out_step_aborts_the_run_by_default() {
    let mut rig = sequencer_rig(
        false,
        0,
        GuardCfg {
            max_maneuver_ms: None,
            max_polls: Some(3),
        },
        false,
    );
    let plan = Plan::new()
        .push("square", Maneuver::SquareUp { times: 1 })
        .push("never-entered", Maneuver::HoldDistance);

    let report = Sequencer::new(plan).run(&mut rig).expect("run");
    assert_eq!(report.outcome, RunOutcome::Aborted(AbortReason::Deadline));
    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.steps[0].status, ManeuverStatus::TimedOut);
    assert_eq!(report.steps[0].attempts, 1);
}

#[rstest]
fn retry_policy_reenters_before_aborting() {
    let mut rig = sequencer_rig(
        false,
        0,
        GuardCfg {
            max_maneuver_ms: None,
            max_polls: Some(2),
        },
        false,
    );
    let plan = Plan::new().push("square", Maneuver::SquareUp { times: 1 });

    let report = Sequencer::new(plan)
        .with_timeout_policy(TimeoutPolicy::Retry { max: 2 })
        .run(&mut rig)
        .expect("run");
    assert_eq!(report.outcome, RunOutcome::Aborted(AbortReason::MaxRetries));
    assert_eq!(report.steps[0].attempts, 3);
}

#[rstest]
fn halt_aborts_without_retry() {
    let mut rig = sequencer_rig(true, 3000, GuardCfg::default(), true);
    let plan = Plan::new().push("square", Maneuver::SquareUp { times: 1 });

    let report = Sequencer::new(plan)
        .with_timeout_policy(TimeoutPolicy::Retry { max: 5 })
        .run(&mut rig)
        .expect("run");
    assert_eq!(report.outcome, RunOutcome::Aborted(AbortReason::Halted));
    assert_eq!(report.steps[0].status, ManeuverStatus::Halted);
    assert_eq!(report.steps[0].attempts, 1);
}

#[rstest]
fn standard_run_ends_with_dispense() {
    let plan = Plan::standard_run(&DriveSpeeds::default());
    let names: Vec<_> = plan.steps().iter().map(|s| s.name).collect();
    assert_eq!(
        names,
        vec![
            "turn-left",
            "hold-distance",
            "turn-right",
            "drive-until-line",
            "turn-left-to-line",
            "dispense",
        ]
    );
    assert_eq!(plan.steps()[5].maneuver, Maneuver::Dispense);
}
