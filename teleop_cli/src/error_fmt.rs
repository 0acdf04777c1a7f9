//! Human-readable error descriptions and structured JSON error formatting.

use teleop_core::error::{BuildError, FilterError, TeleopError};
use teleop_sim::SimError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSource => {
                "What happened: No axis source was provided to the drive loop.\nLikely causes: The stick script or gamepad failed to initialize.\nHow to fix: Pass a valid --scenario or --script.".to_string()
            }
            BuildError::MissingSink => {
                "What happened: No command sink was provided to the drive loop.\nLikely causes: The robot backend failed to initialize.\nHow to fix: Re-run with --log-level=debug to see why the sink was not created.".to_string()
            }
            BuildError::MissingShaping => {
                "What happened: No shaping configuration was provided.\nLikely causes: The drive loop was built without channel limits.\nHow to fix: Check the [forward], [lateral] and [yaw] sections of the config.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML or on the command line.\nHow to fix: Edit the config file or flags, then rerun."
            ),
        };
    }

    if let Some(FilterError::InvalidConfiguration(msg)) = err.downcast_ref::<FilterError>() {
        return format!(
            "What happened: A low-pass filter could not be designed ({msg}).\nLikely causes: cutoff_hz, quality or loop.rate_hz is zero or negative.\nHow to fix: Use a positive cutoff and quality, and a positive loop rate."
        );
    }

    if let Some(te) = err.downcast_ref::<TeleopError>() {
        return match te {
            TeleopError::Config(msg) => format!(
                "What happened: Configuration rejected: {msg}.\nLikely causes: A value in the TOML is out of range or has the wrong type.\nHow to fix: Fix the named key in the config file and try again."
            ),
            TeleopError::Input(msg) => format!(
                "What happened: Reading the operator input failed ({msg}).\nLikely causes: Gamepad unplugged or the stick script is unreadable.\nHow to fix: Reconnect the pad or check the script, then start a new drive."
            ),
            TeleopError::Sink(msg) => format!(
                "What happened: The robot rejected a command ({msg}).\nLikely causes: Locomotion link lost or a non-finite command.\nHow to fix: Check the link to the robot; re-run with --log-level=debug for the last commands."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<SimError>() {
        return format!(
            "What happened: {se}.\nLikely causes: Unknown scenario name or a malformed stick script.\nHow to fix: Use one of full-throttle, slalom, step-turn, idle, or fix the script CSV."
        );
    }

    // String-based heuristics for errors coming from config files
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("stick script csv must have headers") {
        return "Invalid headers in stick script CSV. Expected 't_s,forward,lateral,yaw'.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 configuration, 3 input, 4 sink, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some()
        || err.downcast_ref::<FilterError>().is_some()
        || err.downcast_ref::<SimError>().is_some()
    {
        return 2;
    }
    match err.downcast_ref::<TeleopError>() {
        Some(TeleopError::Config(_)) => 2,
        Some(TeleopError::Input(_)) => 3,
        Some(TeleopError::Sink(_)) => 4,
        None => 1,
    }
}

/// Short machine-readable name for the error class.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    match exit_code_for_error(err) {
        2 => "Config",
        3 => "Input",
        4 => "Sink",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
        "chain": err.chain().map(ToString::to_string).collect::<Vec<_>>(),
    })
    .to_string()
}
