//! Human-readable error descriptions and structured JSON error formatting.

use fader_core::error::{BuildError, FaderError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingPositionSensor => {
                "What happened: No position sensor was provided to the controller.\nLikely causes: The ADC adapter failed to initialize or was not wired into the builder.\nHow to fix: Pass the sensor via with_position_sensor(...).".to_string()
            }
            BuildError::MissingTouchSensor => {
                "What happened: No touch sensor was provided to the controller.\nLikely causes: The touch adapter was not wired into the builder.\nHow to fix: Pass the sensor via with_touch_sensor(...).".to_string()
            }
            BuildError::MissingMotor => {
                "What happened: No motor was provided to the controller.\nLikely causes: The motor driver failed to initialize or was not wired into the builder.\nHow to fix: Pass the motor via with_motor(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(fe) = err.downcast_ref::<FaderError>() {
        return match fe {
            FaderError::HardwareFault(msg) => format!(
                "What happened: A fader peripheral reported a fault ({msg}).\nLikely causes: Slide pot or touch pad disconnected, or the motor driver lost power.\nHow to fix: Check wiring and supply, then restart."
            ),
            FaderError::Io(msg) => format!(
                "What happened: An I/O operation failed ({msg}).\nLikely causes: The host closed the pipe or a device node went away.\nHow to fix: Reconnect the host and restart."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    if let Some(te) = err.downcast_ref::<toml::de::Error>() {
        return format!(
            "What happened: The config file is not valid TOML for this program.\nDetails: {}\nHow to fix: Fix the reported key or value and rerun.",
            te.message()
        );
    }

    // String-based heuristics for errors coming from config checks
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("reading config") {
        let cause = err.root_cause();
        return format!(
            "What happened: Could not read the config file ({cause}).\nHow to fix: Pass an existing file with --config <FILE>."
        );
    }

    if lower.contains(" must ") {
        return format!(
            "What happened: Configuration is invalid: {msg}.\nHow to fix: Edit the TOML config and try again."
        );
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

/// Stable exit codes: 2 config, 3 hardware, 4 I/O, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() || err.downcast_ref::<toml::de::Error>().is_some()
    {
        return 2;
    }
    if let Some(fe) = err.downcast_ref::<FaderError>() {
        return match fe {
            FaderError::Config(_) => 2,
            FaderError::Hardware(_) | FaderError::HardwareFault(_) => 3,
            FaderError::Io(_) => 4,
            FaderError::State(_) => 1,
        };
    }
    let msg = err.to_string();
    if msg.contains(" must ") || msg.contains("reading config") {
        return 2;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() || err.downcast_ref::<toml::de::Error>().is_some()
    {
        return "Config";
    }
    match err.downcast_ref::<FaderError>() {
        Some(FaderError::Hardware(_)) => "Hardware",
        Some(FaderError::HardwareFault(_)) => "HardwareFault",
        Some(FaderError::Config(_)) => "Config",
        Some(FaderError::State(_)) => "State",
        Some(FaderError::Io(_)) => "Io",
        None if exit_code_for_error(err) == 2 => "Config",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
