#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and validation for the sorting-robot controller.
//!
//! The calibration table is immutable for the duration of a run: channel
//! assignments, intensity thresholds, servo target positions, drive speeds
//! and tick gates all load from one TOML file and are validated before the
//! rig is built.

use serde::Deserialize;

/// Channel identifiers on the controller board. The simulated backend
/// ignores them but real wiring documentation lives here.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Ports {
    pub left_motor: u8,
    pub right_motor: u8,
    pub sort_servo: u8,
    pub left_bump: u8,
    pub right_bump: u8,
    pub line_left: u8,
    pub line_right: u8,
    pub distance: u8,
}

impl Default for Ports {
    fn default() -> Self {
        Self {
            left_motor: 0,
            right_motor: 1,
            sort_servo: 1,
            left_bump: 1,
            right_bump: 2,
            line_left: 0,
            line_right: 1,
            distance: 2,
        }
    }
}

/// Analog intensity thresholds. `focal_point` and `too_close` bound the
/// acceptable distance band; `too_close` must stay strictly above
/// `focal_point` or the middle control zone collapses.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Thresholds {
    /// Line-sensor level separating dark tape from light board surface.
    pub line_middle: i32,
    /// Distance reading below which the robot is too far from the wall.
    pub focal_point: i32,
    /// Distance reading at or above which the robot is too close.
    pub too_close: i32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            line_middle: 2500,
            focal_point: 2700,
            too_close: 2900,
        }
    }
}

/// Absolute servo positions for the three deposit targets.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ServoPositions {
    pub left: u16,
    pub middle: u16,
    pub right: u16,
}

impl Default for ServoPositions {
    fn default() -> Self {
        Self {
            left: 1220,
            middle: 443,
            right: 1895,
        }
    }
}

/// Drive speeds (signed percent magnitude, 1..=100) and open-loop timings.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Drive {
    pub left_speed: i16,
    pub right_speed: i16,
    /// Left-motor magnitude used to bias heading inward when too far.
    pub shift_in_speed: i16,
    /// Right-motor magnitude used to bias heading outward when too close.
    pub shift_out_speed: i16,
    /// Wall-clock duration of an open-loop pivot turn.
    pub turn_ms: u64,
    /// Forward nudge after wall contact to create clearance.
    pub clearance_ms: u64,
}

impl Default for Drive {
    fn default() -> Self {
        Self {
            left_speed: 50,
            right_speed: 50,
            shift_in_speed: 40,
            shift_out_speed: 30,
            turn_ms: 1850,
            clearance_ms: 300,
        }
    }
}

/// Encoder tick gates.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Ticks {
    /// Left-encoder ticks to advance between successive dispenses.
    pub past_poms: i32,
}

impl Default for Ticks {
    fn default() -> Self {
        Self { past_poms: 50 }
    }
}

/// Opt-in stall guard. Zero means unbounded, preserving the default
/// block-until-condition behavior of every maneuver loop.
#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(default)]
pub struct Guard {
    /// Wall-clock budget per maneuver in milliseconds (0 = unbounded).
    pub max_maneuver_ms: u64,
    /// Poll-iteration budget per maneuver (0 = unbounded).
    pub max_polls: u64,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub ports: Ports,
    pub thresholds: Thresholds,
    pub servo: ServoPositions,
    pub drive: Drive,
    pub ticks: Ticks,
    pub guard: Guard,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Validate cross-field invariants after deserialization.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.thresholds.too_close <= self.thresholds.focal_point {
            eyre::bail!(
                "too_close ({}) must be strictly greater than focal_point ({})",
                self.thresholds.too_close,
                self.thresholds.focal_point
            );
        }
        for (name, speed) in [
            ("left_speed", self.drive.left_speed),
            ("right_speed", self.drive.right_speed),
            ("shift_in_speed", self.drive.shift_in_speed),
            ("shift_out_speed", self.drive.shift_out_speed),
        ] {
            if !(1..=100).contains(&speed) {
                eyre::bail!("{name} must be in 1..=100, got {speed}");
            }
        }
        if self.ticks.past_poms <= 0 {
            eyre::bail!("past_poms must be > 0, got {}", self.ticks.past_poms);
        }
        if self.drive.turn_ms == 0 {
            eyre::bail!("turn_ms must be > 0");
        }
        Ok(())
    }
}
