//! Blocking maneuver primitives over the HAL traits.
//!
//! Each primitive polls its sensors in a tight loop, drives the motors until
//! its termination condition holds, then stops. Loops are unbounded by
//! default; an opt-in [`GuardCfg`] budget turns non-termination into a
//! [`ManeuverStatus::TimedOut`] outcome, and an optional halt callback
//! (wired to Ctrl-C by the CLI) yields [`ManeuverStatus::Halted`]. Sampling
//! and acting are strictly sequential within one primitive; readings are
//! never cached across iterations.

use std::time::{Duration, Instant};

use eyre::WrapErr;
use pomsort_traits::{AnalogInput, Clock, DigitalInput, DriveMotor, Side, SortServo};

use crate::config::{DriveSpeeds, GuardCfg, ServoPositions, Thresholds, TickGates};
use crate::error::{Result, map_hw_error};
use crate::sense::{BumpState, Zone, on_line_horizontal, straddling_line};

/// Outcome of one maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManeuverStatus {
    /// Termination condition reached; motors stopped.
    Complete,
    /// Guard budget exhausted before the condition held; motors stopped.
    TimedOut,
    /// Halt callback fired; motors stopped.
    Halted,
}

/// Which calibrated position the sort servo is driven to next. Toggled
/// exactly once per completed dispense cycle, never reset mid-loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortSide {
    Right,
    Left,
}

impl SortSide {
    #[inline]
    pub fn toggled(self) -> SortSide {
        match self {
            SortSide::Right => SortSide::Left,
            SortSide::Left => SortSide::Right,
        }
    }
}

/// Per-maneuver guard window: wall-clock deadline and poll budget.
struct GuardWindow {
    epoch: Instant,
    deadline_ms: Option<u64>,
    polls_left: Option<u64>,
}

impl GuardWindow {
    fn open(cfg: GuardCfg, clock: &dyn Clock) -> Self {
        Self {
            epoch: clock.now(),
            deadline_ms: cfg.max_maneuver_ms,
            polls_left: cfg.max_polls,
        }
    }

    /// Consume one poll; true once either budget is exhausted.
    fn expired(&mut self, clock: &dyn Clock) -> bool {
        if let Some(left) = self.polls_left.as_mut() {
            if *left == 0 {
                return true;
            }
            *left -= 1;
        }
        if let Some(ms) = self.deadline_ms
            && clock.ms_since(self.epoch) >= ms
        {
            return true;
        }
        false
    }
}

/// The maneuver core: sensors, motors and the calibration table, generic
/// over the HAL traits so tests drive it with scripted devices.
pub struct Maneuvers<B, L, D, M, V>
where
    B: DigitalInput,
    L: AnalogInput,
    D: AnalogInput,
    M: DriveMotor,
    V: SortServo,
{
    pub(crate) left_bump: B,
    pub(crate) right_bump: B,
    pub(crate) line_left: L,
    pub(crate) line_right: L,
    pub(crate) distance: D,
    pub(crate) left_motor: M,
    pub(crate) right_motor: M,
    pub(crate) servo: V,
    pub(crate) thresholds: Thresholds,
    pub(crate) servo_positions: ServoPositions,
    pub(crate) drive: DriveSpeeds,
    pub(crate) gates: TickGates,
    pub(crate) guard: GuardCfg,
    pub(crate) clock: std::sync::Arc<dyn Clock + Send + Sync>,
    pub(crate) halt_check: Option<Box<dyn Fn() -> bool>>,
}

impl<B, L, D, M, V> core::fmt::Debug for Maneuvers<B, L, D, M, V>
where
    B: DigitalInput,
    L: AnalogInput,
    D: AnalogInput,
    M: DriveMotor,
    V: SortServo,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Maneuvers")
            .field("thresholds", &self.thresholds)
            .field("drive", &self.drive)
            .field("gates", &self.gates)
            .finish()
    }
}

impl<B, L, D, M, V> Maneuvers<B, L, D, M, V>
where
    B: DigitalInput,
    L: AnalogInput,
    D: AnalogInput,
    M: DriveMotor,
    V: SortServo,
{
    /// One-time actuator enable; call once at process start before the run.
    pub fn enable_actuators(&mut self) -> Result<()> {
        self.servo
            .enable()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("servo enable")
    }

    /// Command zero speed on both motors. Idempotent.
    pub fn stop_all(&mut self) -> Result<()> {
        self.left_motor
            .stop()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("left motor stop")?;
        self.right_motor
            .stop()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("right motor stop")
    }

    /// Repeat `times` times: reverse both motors until both bump switches
    /// are pressed, then stop. Re-aligns the chassis against a fixed wall by
    /// mechanical backstop. Already-pressed bumps mean zero drive commands.
    pub fn square_up(&mut self, times: u32) -> Result<ManeuverStatus> {
        for rep in 1..=times {
            tracing::debug!(rep, times, "square-up: reversing until both bumps press");
            let mut window = GuardWindow::open(self.guard, &*self.clock);
            loop {
                if self.halted() {
                    self.stop_all()?;
                    return Ok(ManeuverStatus::Halted);
                }
                if self.bumps()?.both_pressed() {
                    break;
                }
                if window.expired(&*self.clock) {
                    self.stop_all()?;
                    return Ok(ManeuverStatus::TimedOut);
                }
                self.drive_both(-self.drive.left_speed, -self.drive.right_speed)?;
            }
            self.stop_all()?;
        }
        Ok(ManeuverStatus::Complete)
    }

    /// Pure wait gate: block while the chassis straddles a vertical line
    /// (exactly one sensor over the tape). Issues no motor commands;
    /// returning at all signals the line has been left.
    pub fn line_follow(&mut self) -> Result<ManeuverStatus> {
        let mut window = GuardWindow::open(self.guard, &*self.clock);
        loop {
            if self.halted() {
                return Ok(ManeuverStatus::Halted);
            }
            let (l, r) = self.line()?;
            if !straddling_line(l, r, self.thresholds.line_middle) {
                tracing::debug!(left = l, right = r, "line-follow: left the line");
                return Ok(ManeuverStatus::Complete);
            }
            if window.expired(&*self.clock) {
                return Ok(ManeuverStatus::TimedOut);
            }
        }
    }

    /// Drive both motors forward while neither line sensor has reached the
    /// tape; stop the instant both readings exceed the threshold at once.
    pub fn drive_until_line(&mut self) -> Result<ManeuverStatus> {
        let mut window = GuardWindow::open(self.guard, &*self.clock);
        loop {
            if self.halted() {
                self.stop_all()?;
                return Ok(ManeuverStatus::Halted);
            }
            let (l, r) = self.line()?;
            if on_line_horizontal(l, r, self.thresholds.line_middle) {
                break;
            }
            if window.expired(&*self.clock) {
                self.stop_all()?;
                return Ok(ManeuverStatus::TimedOut);
            }
            self.drive_both(self.drive.left_speed, self.drive.right_speed)?;
        }
        self.stop_all()?;
        tracing::info!("centered on horizontal line");
        Ok(ManeuverStatus::Complete)
    }

    /// Open-loop pivot: drive only the motor opposite the turn direction
    /// forward for a fixed wall-clock duration, then stop. No sensor
    /// feedback; the duration is the sole terminator.
    pub fn turn(&mut self, direction: Side, duration: Duration) -> Result<ManeuverStatus> {
        if self.halted() {
            return Ok(ManeuverStatus::Halted);
        }
        tracing::debug!(?direction, ?duration, "open-loop turn");
        match direction {
            Side::Right => self
                .left_motor
                .drive(self.drive.left_speed)
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
                .wrap_err("left motor drive")?,
            Side::Left => self
                .right_motor
                .drive(self.drive.right_speed)
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
                .wrap_err("right motor drive")?,
        }
        self.clock.sleep(duration);
        self.stop_all()?;
        Ok(ManeuverStatus::Complete)
    }

    /// Three-zone bang-bang reverse approach against the distance sensor,
    /// running until both bump switches press. Each sample selects one of
    /// three fixed command vectors; no continuous correction. On contact,
    /// nudge forward briefly to create clearance, then stop.
    pub fn hold_distance(&mut self) -> Result<ManeuverStatus> {
        let mut window = GuardWindow::open(self.guard, &*self.clock);
        loop {
            if self.halted() {
                self.stop_all()?;
                return Ok(ManeuverStatus::Halted);
            }
            if self.bumps()?.both_pressed() {
                break;
            }
            if window.expired(&*self.clock) {
                self.stop_all()?;
                return Ok(ManeuverStatus::TimedOut);
            }
            let reading = self
                .distance
                .read()
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
                .wrap_err("distance read")?;
            let zone = Zone::classify(
                reading,
                self.thresholds.focal_point,
                self.thresholds.too_close,
            );
            tracing::trace!(reading, ?zone, "distance hold");
            match zone {
                // Too far: bias the heading inward on the left side.
                Zone::TooFar => {
                    self.drive_both(-self.drive.shift_in_speed, -self.drive.right_speed)?
                }
                Zone::Band => self.drive_both(-self.drive.left_speed, -self.drive.right_speed)?,
                // Too close: bias the heading back out on the right side.
                Zone::TooClose => {
                    self.drive_both(-self.drive.right_speed, -self.drive.shift_out_speed)?
                }
            }
        }
        tracing::info!("both bumps pressed, backed against the wall; nudging forward for clearance");
        self.drive_both(self.drive.left_speed, self.drive.right_speed)?;
        self.clock.sleep(Duration::from_millis(self.drive.clearance_ms));
        self.stop_all()?;
        Ok(ManeuverStatus::Complete)
    }

    /// Encoder-gated alternating dispense. Unterminated by design: each
    /// cycle zeroes both encoders, advances until the left encoder reaches
    /// the tick gate, commands the servo to the current side's position and
    /// toggles the side. Only the guard or the halt callback end it.
    pub fn dispense(&mut self) -> Result<ManeuverStatus> {
        let mut side = SortSide::Right;
        let mut window = GuardWindow::open(self.guard, &*self.clock);
        loop {
            // Encoders must be zeroed immediately before the gate loop or
            // the threshold is measured against stale history.
            self.left_motor
                .reset_ticks()
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
                .wrap_err("left encoder reset")?;
            self.right_motor
                .reset_ticks()
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
                .wrap_err("right encoder reset")?;

            loop {
                if self.halted() {
                    self.stop_all()?;
                    return Ok(ManeuverStatus::Halted);
                }
                if window.expired(&*self.clock) {
                    self.stop_all()?;
                    return Ok(ManeuverStatus::TimedOut);
                }
                let ticks = self
                    .left_motor
                    .ticks()
                    .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
                    .wrap_err("left encoder read")?;
                if ticks >= self.gates.past_poms {
                    break;
                }
                self.drive_both(self.drive.left_speed, self.drive.right_speed)?;
            }

            let position = match side {
                SortSide::Right => self.servo_positions.right,
                SortSide::Left => self.servo_positions.left,
            };
            self.servo
                .set_position(position)
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
                .wrap_err("sort servo position")?;
            side = side.toggled();
            tracing::info!(next_side = ?side, "dispensed; toggled sort side");
        }
    }

    fn halted(&self) -> bool {
        self.halt_check.as_ref().is_some_and(|check| check())
    }

    fn bumps(&mut self) -> Result<BumpState> {
        let left = self
            .left_bump
            .is_pressed()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("left bump read")?;
        let right = self
            .right_bump
            .is_pressed()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("right bump read")?;
        Ok(BumpState { left, right })
    }

    fn line(&mut self) -> Result<(i32, i32)> {
        let left = self
            .line_left
            .read()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("left line read")?;
        let right = self
            .line_right
            .read()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("right line read")?;
        Ok((left, right))
    }

    fn drive_both(&mut self, left: i16, right: i16) -> Result<()> {
        self.left_motor
            .drive(left)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("left motor drive")?;
        self.right_motor
            .drive(right)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("right motor drive")
    }
}
