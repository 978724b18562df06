#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Maneuver control core for a differential-drive sorting robot
//! (hardware-agnostic).
//!
//! All hardware interactions go through the `pomsort_traits` HAL traits:
//! bump switches, line/distance intensity sensors, drive motors with
//! encoders, and the sort servo.
//!
//! ## Architecture
//!
//! - **Classification**: one predicate per physical condition (`sense`)
//! - **Calibration table**: immutable thresholds/speeds/positions (`config`)
//! - **Primitives**: blocking poll-act maneuvers (`maneuver`)
//! - **Sequencer**: table-driven run plan execution (`sequencer`)
//! - **Assembly**: boxed rig builder with typed build errors (`builder`)
//!
//! Control is single-threaded and fully synchronous by design: each
//! primitive samples, acts, and only then samples again. There is no
//! concurrency to arbitrate and none should be introduced.

pub mod builder;
pub mod config;
pub mod error;
pub mod maneuver;
pub mod mocks;
pub mod sense;
pub mod sequencer;

pub use builder::{Rig, RigBuilder};
pub use config::{DriveSpeeds, GuardCfg, ServoPositions, Thresholds, TickGates};
pub use error::{AbortReason, BuildError, Result, SorterError};
pub use maneuver::{ManeuverStatus, Maneuvers, SortSide};
pub use sense::{BumpState, Zone, on_line_horizontal, straddling_line};
pub use sequencer::{
    Maneuver, Plan, RunOutcome, RunReport, Sequencer, Step, StepOutcome, TimeoutPolicy,
};
