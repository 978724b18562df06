use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum SorterError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("invalid state: {0}")]
    State(String),
}

/// Why a run ended before its plan completed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    #[error("halted by operator")]
    Halted,
    #[error("maneuver deadline exceeded")]
    Deadline,
    #[error("maneuver retries exhausted")]
    MaxRetries,
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing device: {0}")]
    MissingDevice(&'static str),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

/// Map a boxed HAL error to a typed SorterError. Single chokepoint so the
/// primitives never inspect device error strings themselves.
pub(crate) fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> SorterError {
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        SorterError::Timeout
    } else {
        SorterError::Hardware(s)
    }
}
