//! Plain calibration-table structs used by the control core, plus `From`
//! implementations bridging the `pomsort_config` TOML schema.
//!
//! The table is immutable for the duration of a run; every primitive reads
//! its thresholds and speeds from here and nowhere else.

/// Analog comparison thresholds.
///
/// Invariant: `too_close > focal_point`. The two values define three ordered
/// distance zones; collapsing the ordering silently changes controller
/// behavior, so builds reject it.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub line_middle: i32,
    pub focal_point: i32,
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
#[derive(Debug, Clone, Copy)]
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

/// Drive speeds (signed percent magnitudes) and open-loop timings.
#[derive(Debug, Clone, Copy)]
pub struct DriveSpeeds {
    pub left_speed: i16,
    pub right_speed: i16,
    pub shift_in_speed: i16,
    pub shift_out_speed: i16,
    pub turn_ms: u64,
    pub clearance_ms: u64,
}

impl Default for DriveSpeeds {
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
#[derive(Debug, Clone, Copy)]
pub struct TickGates {
    /// Left-encoder ticks advanced between successive dispenses.
    pub past_poms: i32,
}

impl Default for TickGates {
    fn default() -> Self {
        Self { past_poms: 50 }
    }
}

/// Opt-in stall guard for the otherwise unbounded poll loops.
///
/// The default is fully unbounded: a maneuver whose exit condition never
/// becomes true blocks forever, exactly like the recorded run it models.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuardCfg {
    /// Wall-clock budget per maneuver in milliseconds. `None` = unbounded.
    pub max_maneuver_ms: Option<u64>,
    /// Poll-iteration budget per maneuver. `None` = unbounded.
    pub max_polls: Option<u64>,
}

impl From<&pomsort_config::Thresholds> for Thresholds {
    fn from(c: &pomsort_config::Thresholds) -> Self {
        Self {
            line_middle: c.line_middle,
            focal_point: c.focal_point,
            too_close: c.too_close,
        }
    }
}

impl From<&pomsort_config::ServoPositions> for ServoPositions {
    fn from(c: &pomsort_config::ServoPositions) -> Self {
        Self {
            left: c.left,
            middle: c.middle,
            right: c.right,
        }
    }
}

impl From<&pomsort_config::Drive> for DriveSpeeds {
    fn from(c: &pomsort_config::Drive) -> Self {
        Self {
            left_speed: c.left_speed,
            right_speed: c.right_speed,
            shift_in_speed: c.shift_in_speed,
            shift_out_speed: c.shift_out_speed,
            turn_ms: c.turn_ms,
            clearance_ms: c.clearance_ms,
        }
    }
}

impl From<&pomsort_config::Ticks> for TickGates {
    fn from(c: &pomsort_config::Ticks) -> Self {
        Self {
            past_poms: c.past_poms,
        }
    }
}

impl From<&pomsort_config::Guard> for GuardCfg {
    fn from(c: &pomsort_config::Guard) -> Self {
        let nonzero = |v: u64| if v == 0 { None } else { Some(v) };
        Self {
            max_maneuver_ms: nonzero(c.max_maneuver_ms),
            max_polls: nonzero(c.max_polls),
        }
    }
}
