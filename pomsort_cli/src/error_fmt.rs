//! Human-readable error descriptions and structured JSON error formatting.

use pomsort_core::error::{AbortReason, BuildError, SorterError};

/// Map an eyre::Report to a human-readable explanation with likely causes
/// and fix hints. Typed matches first, string heuristics last.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingDevice(what) => format!(
                "What happened: The rig is missing a required device ({what}).\nLikely causes: A sensor or motor failed to initialize or was not wired into the builder.\nHow to fix: Ensure every device is constructed and passed to the RigBuilder before build()."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(reason) = err.downcast_ref::<AbortReason>() {
        return match reason {
            AbortReason::Halted => "What happened: The run was halted by the operator.\nLikely causes: Ctrl-C was pressed mid-maneuver.\nHow to fix: Start a new run when ready.".to_string(),
            AbortReason::Deadline => "What happened: A maneuver exceeded its guard deadline.\nLikely causes: A termination condition never became true (broken bump wire, missed line), or the budget is too tight for the course.\nHow to fix: Inspect the rig, or raise guard.max_maneuver_ms in the config.".to_string(),
            AbortReason::MaxRetries => "What happened: A maneuver kept timing out until retries were exhausted.\nLikely causes: The exit condition is physically unreachable from the current position.\nHow to fix: Reposition the robot or adjust the plan and thresholds.".to_string(),
        };
    }

    if let Some(se) = err.downcast_ref::<SorterError>() {
        if matches!(se, SorterError::Timeout) {
            return "What happened: A sensor read timed out.\nLikely causes: Wiring or power fault on an analog or digital channel.\nHow to fix: Check the channel assignments under [ports] and the wiring, then rerun.".to_string();
        }
        return format!(
            "What happened: {se}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug for more detail."
        );
    }

    let msg = err.to_string();
    if msg.to_ascii_lowercase().contains("config") {
        return format!(
            "What happened: {msg}.\nLikely causes: The config TOML failed to parse or validate.\nHow to fix: Fix the file passed via --config, then rerun."
        );
    }
    msg
}

/// Structured JSON error for machine consumers (printed on stderr).
pub fn json_error(err: &eyre::Report) -> String {
    let kind = if err.downcast_ref::<BuildError>().is_some() {
        "build"
    } else if err.downcast_ref::<AbortReason>().is_some() {
        "abort"
    } else if err.downcast_ref::<SorterError>().is_some() {
        "sorter"
    } else {
        "other"
    };
    serde_json::json!({
        "error": err.to_string(),
        "kind": kind,
        "detail": humanize(err),
    })
    .to_string()
}
