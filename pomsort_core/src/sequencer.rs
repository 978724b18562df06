//! Table-driven run plans and the sequencer that executes them.
//!
//! A plan is data: an ordered list of named maneuver steps. The standard
//! plan reproduces one recorded competition run, but partial plans are
//! plain values, so single steps can be exercised in isolation. Steps run
//! strictly in order; there is no branching beyond the timeout policy.

use std::time::Duration;

use pomsort_traits::{AnalogInput, DigitalInput, DriveMotor, Side, SortServo};

use crate::config::DriveSpeeds;
use crate::error::{AbortReason, Result};
use crate::maneuver::{ManeuverStatus, Maneuvers};

/// One maneuver, as plan data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Maneuver {
    Turn { direction: Side, duration_ms: u64 },
    SquareUp { times: u32 },
    LineFollow,
    DriveUntilLine,
    HoldDistance,
    /// Terminal in an unguarded run: it never completes on its own.
    Dispense,
}

#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub name: &'static str,
    pub maneuver: Maneuver,
}

#[derive(Debug, Clone, Default)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, name: &'static str, maneuver: Maneuver) -> Self {
        self.steps.push(Step { name, maneuver });
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The recorded run: pivot to face the wall, back into the distance
    /// band until contact, pivot toward the line, drive onto it, pivot to
    /// face the poms, then dispense until stopped.
    pub fn standard_run(drive: &DriveSpeeds) -> Self {
        Plan::new()
            .push(
                "turn-left",
                Maneuver::Turn {
                    direction: Side::Left,
                    duration_ms: drive.turn_ms,
                },
            )
            .push("hold-distance", Maneuver::HoldDistance)
            .push(
                "turn-right",
                Maneuver::Turn {
                    direction: Side::Right,
                    duration_ms: drive.turn_ms,
                },
            )
            .push("drive-until-line", Maneuver::DriveUntilLine)
            .push(
                "turn-left-to-line",
                Maneuver::Turn {
                    direction: Side::Left,
                    duration_ms: drive.turn_ms,
                },
            )
            .push("dispense", Maneuver::Dispense)
    }
}

/// How the sequencer reacts to a `TimedOut` maneuver outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Stop the run (default).
    Abort,
    /// Re-enter the maneuver up to `max` additional times, then abort.
    Retry { max: u32 },
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        TimeoutPolicy::Abort
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StepOutcome {
    pub name: &'static str,
    pub status: ManeuverStatus,
    pub attempts: u32,
}

/// What the whole run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Aborted(AbortReason),
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub steps: Vec<StepOutcome>,
    pub outcome: RunOutcome,
}

/// Executes a [`Plan`] against a maneuver core, one step at a time.
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    plan: Plan,
    policy: TimeoutPolicy,
}

impl Sequencer {
    pub fn new(plan: Plan) -> Self {
        Self {
            plan,
            policy: TimeoutPolicy::default(),
        }
    }

    pub fn with_timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Run every step in order. Hardware errors propagate immediately; a
    /// timed-out step is retried per policy or aborts the run; a halt
    /// aborts the run. The report lists every step that was entered.
    pub fn run<B, L, D, M, V>(&self, rig: &mut Maneuvers<B, L, D, M, V>) -> Result<RunReport>
    where
        B: DigitalInput,
        L: AnalogInput,
        D: AnalogInput,
        M: DriveMotor,
        V: SortServo,
    {
        let mut steps = Vec::with_capacity(self.plan.steps.len());
        for step in &self.plan.steps {
            let mut attempts = 0u32;
            let status = loop {
                attempts += 1;
                tracing::info!(step = step.name, attempts, "starting maneuver");
                let status = execute(rig, step.maneuver)?;
                match status {
                    ManeuverStatus::Complete | ManeuverStatus::Halted => break status,
                    ManeuverStatus::TimedOut => match self.policy {
                        TimeoutPolicy::Retry { max } if attempts <= max => {
                            tracing::warn!(step = step.name, attempts, "maneuver timed out; retrying");
                            continue;
                        }
                        _ => break status,
                    },
                }
            };
            steps.push(StepOutcome {
                name: step.name,
                status,
                attempts,
            });
            match status {
                ManeuverStatus::Complete => {}
                ManeuverStatus::Halted => {
                    tracing::warn!(step = step.name, "run halted by operator");
                    return Ok(RunReport {
                        steps,
                        outcome: RunOutcome::Aborted(AbortReason::Halted),
                    });
                }
                ManeuverStatus::TimedOut => {
                    let reason = match self.policy {
                        TimeoutPolicy::Abort => AbortReason::Deadline,
                        TimeoutPolicy::Retry { .. } => AbortReason::MaxRetries,
                    };
                    tracing::warn!(step = step.name, %reason, "run aborted");
                    return Ok(RunReport {
                        steps,
                        outcome: RunOutcome::Aborted(reason),
                    });
                }
            }
        }
        Ok(RunReport {
            steps,
            outcome: RunOutcome::Completed,
        })
    }
}

fn execute<B, L, D, M, V>(
    rig: &mut Maneuvers<B, L, D, M, V>,
    maneuver: Maneuver,
) -> Result<ManeuverStatus>
where
    B: DigitalInput,
    L: AnalogInput,
    D: AnalogInput,
    M: DriveMotor,
    V: SortServo,
{
    match maneuver {
        Maneuver::Turn {
            direction,
            duration_ms,
        } => rig.turn(direction, Duration::from_millis(duration_ms)),
        Maneuver::SquareUp { times } => rig.square_up(times),
        Maneuver::LineFollow => rig.line_follow(),
        Maneuver::DriveUntilLine => rig.drive_until_line(),
        Maneuver::HoldDistance => rig.hold_distance(),
        Maneuver::Dispense => rig.dispense(),
    }
}
