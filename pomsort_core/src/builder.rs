//! Assembly of a boxed [`Rig`] from individual devices and the calibration
//! table. All required parts are validated on `build()` with typed
//! [`BuildError`]s, so a missing device or a collapsed distance band fails
//! loudly before any motor is commanded.

use std::sync::Arc;

use pomsort_traits::clock::{Clock, MonotonicClock};
use pomsort_traits::{AnalogInput, DigitalInput, DriveMotor, SortServo};

use crate::config::{DriveSpeeds, GuardCfg, ServoPositions, Thresholds, TickGates};
use crate::error::{BuildError, Result};
use crate::maneuver::Maneuvers;

/// Dynamic (boxed) maneuver core; the common assembly used by the CLI.
pub type Rig = Maneuvers<
    Box<dyn DigitalInput>,
    Box<dyn AnalogInput>,
    Box<dyn AnalogInput>,
    Box<dyn DriveMotor>,
    Box<dyn SortServo>,
>;

#[derive(Default)]
pub struct RigBuilder {
    left_bump: Option<Box<dyn DigitalInput>>,
    right_bump: Option<Box<dyn DigitalInput>>,
    line_left: Option<Box<dyn AnalogInput>>,
    line_right: Option<Box<dyn AnalogInput>>,
    distance: Option<Box<dyn AnalogInput>>,
    left_motor: Option<Box<dyn DriveMotor>>,
    right_motor: Option<Box<dyn DriveMotor>>,
    servo: Option<Box<dyn SortServo>>,
    thresholds: Option<Thresholds>,
    servo_positions: Option<ServoPositions>,
    drive: Option<DriveSpeeds>,
    gates: Option<TickGates>,
    guard: Option<GuardCfg>,
    halt_check: Option<Box<dyn Fn() -> bool>>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
}

impl Rig {
    pub fn builder() -> RigBuilder {
        RigBuilder::default()
    }
}

impl RigBuilder {
    pub fn with_bumpers(
        mut self,
        left: impl DigitalInput + 'static,
        right: impl DigitalInput + 'static,
    ) -> Self {
        self.left_bump = Some(Box::new(left));
        self.right_bump = Some(Box::new(right));
        self
    }

    pub fn with_line_sensors(
        mut self,
        left: impl AnalogInput + 'static,
        right: impl AnalogInput + 'static,
    ) -> Self {
        self.line_left = Some(Box::new(left));
        self.line_right = Some(Box::new(right));
        self
    }

    pub fn with_distance_sensor(mut self, distance: impl AnalogInput + 'static) -> Self {
        self.distance = Some(Box::new(distance));
        self
    }

    pub fn with_motors(
        mut self,
        left: impl DriveMotor + 'static,
        right: impl DriveMotor + 'static,
    ) -> Self {
        self.left_motor = Some(Box::new(left));
        self.right_motor = Some(Box::new(right));
        self
    }

    pub fn with_servo(mut self, servo: impl SortServo + 'static) -> Self {
        self.servo = Some(Box::new(servo));
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn with_servo_positions(mut self, positions: ServoPositions) -> Self {
        self.servo_positions = Some(positions);
        self
    }

    pub fn with_drive(mut self, drive: DriveSpeeds) -> Self {
        self.drive = Some(drive);
        self
    }

    pub fn with_tick_gates(mut self, gates: TickGates) -> Self {
        self.gates = Some(gates);
        self
    }

    pub fn with_guard(mut self, guard: GuardCfg) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Polled once per loop iteration; a true return stops the motors and
    /// ends the current maneuver with a `Halted` outcome.
    pub fn with_halt_check<F>(mut self, f: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.halt_check = Some(Box::new(f));
        self
    }

    /// Provide a custom clock; defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate and assemble the rig.
    pub fn build(self) -> Result<Rig> {
        let missing = |what| eyre::Report::new(BuildError::MissingDevice(what));

        let left_bump = self.left_bump.ok_or_else(|| missing("left bump"))?;
        let right_bump = self.right_bump.ok_or_else(|| missing("right bump"))?;
        let line_left = self.line_left.ok_or_else(|| missing("left line sensor"))?;
        let line_right = self.line_right.ok_or_else(|| missing("right line sensor"))?;
        let distance = self.distance.ok_or_else(|| missing("distance sensor"))?;
        let left_motor = self.left_motor.ok_or_else(|| missing("left motor"))?;
        let right_motor = self.right_motor.ok_or_else(|| missing("right motor"))?;
        let servo = self.servo.ok_or_else(|| missing("sort servo"))?;

        let thresholds = self.thresholds.unwrap_or_default();
        let servo_positions = self.servo_positions.unwrap_or_default();
        let drive = self.drive.unwrap_or_default();
        let gates = self.gates.unwrap_or_default();
        let guard = self.guard.unwrap_or_default();
        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };

        if thresholds.too_close <= thresholds.focal_point {
            return Err(eyre::Report::new(BuildError::InvalidConfig(format!(
                "too_close ({}) must be strictly greater than focal_point ({})",
                thresholds.too_close, thresholds.focal_point
            ))));
        }
        for (name, speed) in [
            ("left_speed", drive.left_speed),
            ("right_speed", drive.right_speed),
            ("shift_in_speed", drive.shift_in_speed),
            ("shift_out_speed", drive.shift_out_speed),
        ] {
            if !(1..=100).contains(&speed) {
                return Err(eyre::Report::new(BuildError::InvalidConfig(format!(
                    "{name} must be in 1..=100, got {speed}"
                ))));
            }
        }
        if gates.past_poms <= 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(format!(
                "past_poms must be > 0, got {}",
                gates.past_poms
            ))));
        }

        Ok(Maneuvers {
            left_bump,
            right_bump,
            line_left,
            line_right,
            distance,
            left_motor,
            right_motor,
            servo,
            thresholds,
            servo_positions,
            drive,
            gates,
            guard,
            clock,
            halt_check: self.halt_check,
        })
    }
}
