//! Sensor classification: one function per physical condition.
//!
//! The predicates here are the only place raw readings are compared against
//! thresholds. Every maneuver tests "both bumps pressed", "centered on a
//! horizontal line" or "straddling a vertical line" through these functions,
//! so the logic cannot drift between call sites.

/// One fresh sample of both bump switches. Never cached across iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BumpState {
    pub left: bool,
    pub right: bool,
}

impl BumpState {
    #[inline]
    pub fn both_pressed(self) -> bool {
        self.left && self.right
    }
}

/// Both line sensors over the dark tape: the chassis is centered and
/// perpendicular on a horizontal line.
#[inline]
pub fn on_line_horizontal(left: i32, right: i32, line_middle: i32) -> bool {
    left > line_middle && right > line_middle
}

/// Exactly one line sensor over the tape: the chassis straddles a vertical
/// line. An XOR, not an OR; with both sensors on the same surface the
/// chassis has left the line.
#[inline]
pub fn straddling_line(left: i32, right: i32, line_middle: i32) -> bool {
    (left > line_middle) != (right > line_middle)
}

/// Distance-control zone. Selection is a pure function of the latest single
/// reading; no hysteresis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Reading below the focal point: not close enough to the wall.
    TooFar,
    /// Acceptable band: straight approach.
    Band,
    /// Reading at or above the too-close mark: back the heading off.
    TooClose,
}

impl Zone {
    /// The three zones partition the whole reading domain:
    /// `TooFar` iff `r < focal_point`, `TooClose` iff `r >= too_close`,
    /// `Band` otherwise. Requires `too_close > focal_point`.
    #[inline]
    pub fn classify(reading: i32, focal_point: i32, too_close: i32) -> Zone {
        if reading < focal_point {
            Zone::TooFar
        } else if reading >= too_close {
            Zone::TooClose
        } else {
            Zone::Band
        }
    }
}
