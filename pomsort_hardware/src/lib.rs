//! Simulated rig for the sorting-robot controller.
//!
//! One shared [`SimWorld`] models the board: reversing accrues approach
//! progress that walks the distance reading up through the control zones
//! and finally presses both bump switches against the wall; driving forward
//! accrues travel toward the painted line and encoder ticks. Per-device
//! handles implement the `pomsort_traits` HAL traits against that shared
//! state, so a full run completes end to end with no hardware attached.

pub mod error;

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pomsort_traits::{AnalogInput, DigitalInput, DriveMotor, Side, SortServo};

use crate::error::HwError;

/// Distance reading with the robot at its starting spot (zone A, too far).
const DISTANCE_BASE: i32 = 2550;
/// Distance gained per approach step while reversing.
const DISTANCE_PER_STEP: i32 = 25;
/// Approach steps after which the chassis contacts the wall.
const WALL_CONTACT_STEPS: i32 = 24;
/// Forward travel polls before both line sensors reach the tape.
const LINE_TRAVEL_STEPS: i32 = 15;
/// Line reading on the light board surface / on the dark tape.
const LINE_LIGHT: i32 = 120;
const LINE_DARK: i32 = 3000;
/// Encoder ticks accrued per poll while a motor is commanded to move.
const TICKS_PER_POLL: i32 = 10;

#[derive(Debug, Default)]
struct MotorChan {
    speed: i16,
    ticks: i32,
}

#[derive(Debug, Default)]
struct SimState {
    left: MotorChan,
    right: MotorChan,
    /// Reverse progress toward the wall.
    approach: i32,
    /// Forward progress toward the painted line.
    travel: i32,
    servo_enabled: bool,
    servo_position: u16,
}

impl SimState {
    fn reversing(&self) -> bool {
        self.left.speed < 0 && self.right.speed < 0
    }

    fn advancing(&self) -> bool {
        self.left.speed > 0 && self.right.speed > 0
    }

    fn at_wall(&self) -> bool {
        self.approach >= WALL_CONTACT_STEPS
    }
}

/// Shared simulated board state; cheap to clone into per-device handles.
#[derive(Clone, Default)]
pub struct SimWorld {
    state: Arc<Mutex<SimState>>,
    /// Emulated ADC conversion latency per sensor poll.
    poll_latency: Duration,
}

impl SimWorld {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState::default())),
            poll_latency: Duration::from_millis(1),
        }
    }

    /// Disable the per-poll latency (unit tests).
    pub fn without_latency(mut self) -> Self {
        self.poll_latency = Duration::ZERO;
        self
    }

    pub fn bumper(&self, side: Side) -> SimBumper {
        SimBumper {
            world: self.clone(),
            side,
        }
    }

    pub fn line_sensor(&self, side: Side) -> SimLineSensor {
        SimLineSensor {
            world: self.clone(),
            side,
        }
    }

    pub fn distance_sensor(&self) -> SimDistanceSensor {
        SimDistanceSensor { world: self.clone() }
    }

    pub fn motor(&self, side: Side) -> SimMotor {
        SimMotor {
            world: self.clone(),
            side,
        }
    }

    pub fn servo(&self) -> SimServo {
        SimServo { world: self.clone() }
    }

    pub fn servo_position(&self) -> u16 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).servo_position
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn settle(&self) {
        if !self.poll_latency.is_zero() {
            std::thread::sleep(self.poll_latency);
        }
    }
}

pub struct SimBumper {
    world: SimWorld,
    side: Side,
}

impl DigitalInput for SimBumper {
    fn is_pressed(&mut self) -> Result<bool, Box<dyn Error + Send + Sync>> {
        self.world.settle();
        let st = self.world.lock();
        let pressed = st.at_wall();
        tracing::trace!(side = ?self.side, pressed, "sim bump sample");
        Ok(pressed)
    }
}

pub struct SimLineSensor {
    world: SimWorld,
    side: Side,
}

impl AnalogInput for SimLineSensor {
    fn read(&mut self) -> Result<i32, Box<dyn Error + Send + Sync>> {
        self.world.settle();
        let mut st = self.world.lock();
        // Travel advances once per sample pair; count it on the left sensor.
        if matches!(self.side, Side::Left) && st.advancing() {
            st.travel += 1;
        }
        let reading = if st.travel >= LINE_TRAVEL_STEPS {
            LINE_DARK
        } else {
            LINE_LIGHT
        };
        tracing::trace!(side = ?self.side, reading, "sim line sample");
        Ok(reading)
    }
}

pub struct SimDistanceSensor {
    world: SimWorld,
}

impl AnalogInput for SimDistanceSensor {
    fn read(&mut self) -> Result<i32, Box<dyn Error + Send + Sync>> {
        self.world.settle();
        let mut st = self.world.lock();
        if st.reversing() && !st.at_wall() {
            st.approach += 1;
        }
        let reading = DISTANCE_BASE + st.approach * DISTANCE_PER_STEP;
        tracing::trace!(reading, approach = st.approach, "sim distance sample");
        Ok(reading)
    }
}

pub struct SimMotor {
    world: SimWorld,
    side: Side,
}

impl SimMotor {
    fn chan<'a>(&self, st: &'a mut SimState) -> &'a mut MotorChan {
        match self.side {
            Side::Left => &mut st.left,
            Side::Right => &mut st.right,
        }
    }
}

impl DriveMotor for SimMotor {
    fn drive(&mut self, speed: i16) -> Result<(), Box<dyn Error + Send + Sync>> {
        if !(-100..=100).contains(&speed) {
            return Err(Box::new(HwError::Gpio(format!(
                "speed {speed} out of range"
            ))));
        }
        let mut st = self.world.lock();
        self.chan(&mut st).speed = speed;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut st = self.world.lock();
        self.chan(&mut st).speed = 0;
        Ok(())
    }

    fn reset_ticks(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut st = self.world.lock();
        self.chan(&mut st).ticks = 0;
        Ok(())
    }

    fn ticks(&mut self) -> Result<i32, Box<dyn Error + Send + Sync>> {
        self.world.settle();
        let mut st = self.world.lock();
        let chan = self.chan(&mut st);
        if chan.speed != 0 {
            chan.ticks += TICKS_PER_POLL;
        }
        Ok(chan.ticks)
    }
}

pub struct SimServo {
    world: SimWorld,
}

impl SortServo for SimServo {
    fn enable(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut st = self.world.lock();
        st.servo_enabled = true;
        tracing::debug!("sim servo enabled");
        Ok(())
    }

    fn set_position(&mut self, position: u16) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut st = self.world.lock();
        if !st.servo_enabled {
            return Err(Box::new(HwError::ServoDisabled));
        }
        st.servo_position = position;
        tracing::debug!(position, "sim servo position");
        Ok(())
    }
}
