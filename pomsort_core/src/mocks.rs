//! Scripted devices and a manual clock for tests.
//!
//! These live in the library (not behind `cfg(test)`) so integration tests
//! and downstream crates can drive the maneuver core deterministically.
#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pomsort_traits::{AnalogInput, Clock, DigitalInput, DriveMotor, SortServo};

/// Bump switch that replays a scripted sequence, then repeats its last
/// value forever.
pub struct ScriptedBumper {
    script: VecDeque<bool>,
    last: bool,
}

impl ScriptedBumper {
    pub fn new(script: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: false,
        }
    }

    /// Constantly pressed / released.
    pub fn constant(pressed: bool) -> Self {
        Self {
            script: VecDeque::new(),
            last: pressed,
        }
    }
}

impl DigitalInput for ScriptedBumper {
    fn is_pressed(&mut self) -> Result<bool, Box<dyn Error + Send + Sync>> {
        if let Some(v) = self.script.pop_front() {
            self.last = v;
        }
        Ok(self.last)
    }
}

/// Analog sensor that replays a scripted sequence, then repeats its last
/// value forever.
pub struct ScriptedAnalog {
    script: VecDeque<i32>,
    last: i32,
}

impl ScriptedAnalog {
    pub fn new(script: impl IntoIterator<Item = i32>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: 0,
        }
    }

    pub fn constant(value: i32) -> Self {
        Self {
            script: VecDeque::new(),
            last: value,
        }
    }
}

impl AnalogInput for ScriptedAnalog {
    fn read(&mut self) -> Result<i32, Box<dyn Error + Send + Sync>> {
        if let Some(v) = self.script.pop_front() {
            self.last = v;
        }
        Ok(self.last)
    }
}

/// Observable state behind a [`SpyMotor`].
#[derive(Debug, Default)]
pub struct MotorState {
    /// Every `drive` command in order (signed percent).
    pub commands: Vec<i16>,
    /// Number of `stop` calls.
    pub stops: u32,
    /// Last commanded speed; zero after a stop.
    pub speed: i16,
    /// Encoder ticks since the last reset.
    pub ticks: i32,
    /// Number of `reset_ticks` calls.
    pub resets: u32,
    /// Ticks added per `ticks()` poll while the motor is commanded to move.
    pub ticks_per_poll: i32,
}

/// Motor spy: records commands and simulates an encoder that advances by a
/// fixed amount per poll while the motor is moving.
#[derive(Clone)]
pub struct SpyMotor {
    pub state: Arc<Mutex<MotorState>>,
}

impl SpyMotor {
    pub fn new() -> Self {
        Self::with_ticks_per_poll(0)
    }

    pub fn with_ticks_per_poll(ticks_per_poll: i32) -> Self {
        Self {
            state: Arc::new(Mutex::new(MotorState {
                ticks_per_poll,
                ..MotorState::default()
            })),
        }
    }

    pub fn drive_commands(&self) -> Vec<i16> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn stops(&self) -> u32 {
        self.state.lock().unwrap().stops
    }

    pub fn speed(&self) -> i16 {
        self.state.lock().unwrap().speed
    }

    pub fn resets(&self) -> u32 {
        self.state.lock().unwrap().resets
    }
}

impl Default for SpyMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl DriveMotor for SpyMotor {
    fn drive(&mut self, speed: i16) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut st = self.state.lock().unwrap();
        st.commands.push(speed);
        st.speed = speed;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut st = self.state.lock().unwrap();
        st.stops += 1;
        st.speed = 0;
        Ok(())
    }

    fn reset_ticks(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut st = self.state.lock().unwrap();
        st.ticks = 0;
        st.resets += 1;
        Ok(())
    }

    fn ticks(&mut self) -> Result<i32, Box<dyn Error + Send + Sync>> {
        let mut st = self.state.lock().unwrap();
        if st.speed != 0 {
            let step = st.ticks_per_poll;
            st.ticks += step;
        }
        Ok(st.ticks)
    }
}

/// Servo spy: records every commanded position, optionally snapshotting a
/// motor's tick count at the moment each command fires.
#[derive(Clone, Default)]
pub struct RecordingServo {
    pub positions: Arc<Mutex<Vec<u16>>>,
    pub enabled: Arc<Mutex<bool>>,
    tick_probe: Option<Arc<Mutex<MotorState>>>,
    pub ticks_at_fire: Arc<Mutex<Vec<i32>>>,
}

impl RecordingServo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `motor`'s outstanding ticks each time a position is set.
    pub fn with_tick_probe(mut self, motor: &SpyMotor) -> Self {
        self.tick_probe = Some(motor.state.clone());
        self
    }

    pub fn recorded(&self) -> Vec<u16> {
        self.positions.lock().unwrap().clone()
    }
}

impl SortServo for RecordingServo {
    fn enable(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        *self.enabled.lock().unwrap() = true;
        Ok(())
    }

    fn set_position(&mut self, position: u16) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.positions.lock().unwrap().push(position);
        if let Some(probe) = &self.tick_probe {
            let ticks = probe.lock().unwrap().ticks;
            self.ticks_at_fire.lock().unwrap().push(ticks);
        }
        Ok(())
    }
}

/// Deterministic clock: `sleep` advances simulated time instead of
/// blocking, and an optional auto-tick advances time on every `now()` so
/// wall-clock guard deadlines can expire inside a busy-poll loop.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
    tick_on_now: Duration,
    /// Every sleep request, in order.
    pub sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
            tick_on_now: Duration::ZERO,
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Advance simulated time by `tick` on every `now()` call.
    pub fn with_tick_on_now(tick: Duration) -> Self {
        Self {
            tick_on_now: tick,
            ..Self::new()
        }
    }

    pub fn advance(&self, d: Duration) {
        let mut off = self.offset.lock().unwrap();
        *off = off.saturating_add(d);
    }

    pub fn slept(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let mut off = self.offset.lock().unwrap();
        let now = self.origin + *off;
        *off = off.saturating_add(self.tick_on_now);
        now
    }

    fn sleep(&self, d: Duration) {
        self.sleeps.lock().unwrap().push(d);
        self.advance(d);
    }
}
