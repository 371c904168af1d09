//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use sweeper_core::error::{BuildError, SweeperError};

    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingDrivetrain | BuildError::MissingOdometer | BuildError::MissingSensors => format!(
                "What happened: {be}.\nLikely causes: The robot backend failed to initialize or was not wired into the builder.\nHow to fix: Ensure every hardware seam is passed to the control loop builder."
            ),
            BuildError::MissingSurface | BuildError::MissingRobot => format!(
                "What happened: {be}.\nLikely causes: The [surface] or [robot] section was not mapped.\nHow to fix: Check the config file has both sections."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/sweeper_config.toml for a sample."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<SweeperError>() {
        return match se {
            SweeperError::Timeout => "What happened: A sensor read timed out.\nLikely causes: Sensor unplugged or not powered.\nHow to fix: Check the sensor wiring, then start a new run.".to_string(),
            SweeperError::HardwareFault(msg) | SweeperError::Hardware(msg) => format!(
                "What happened: Hardware fault ({msg}).\nLikely causes: Odometer or drivetrain disconnected, or a motor refused a command.\nHow to fix: Check connections; the drivetrain was stopped before exiting."
            ),
            SweeperError::Config(msg) => format!(
                "What happened: Invalid substance table ({msg}).\nLikely causes: Duplicate names or bad limits in [[substances]] or the substance CSV.\nHow to fix: Make every substance name unique and every upper_limit >= 0."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from config loading
    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("substance csv must have headers") {
        return "Invalid headers in substance CSV. Expected 'name,s1,s2,s3,upper_limit,unit'."
            .to_string();
    }

    if lower.contains("read config") {
        return format!(
            "What happened: Could not read the config file.\nLikely causes: Wrong --config path or missing etc/sweeper_config.toml.\nHow to fix: Pass --config <FILE>. Original: {msg}"
        );
    }

    if lower.contains("parse config") {
        return format!(
            "What happened: The config file is not valid TOML for this tool.\nLikely causes: Missing [surface]/[robot] sections or a misspelled key.\nHow to fix: Compare with etc/sweeper_config.toml. Original: {msg}"
        );
    }

    if lower.contains("invalid configuration") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Out-of-range values, such as a robot wider than the surface.\nHow to fix: Edit the TOML config and try again."
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

/// Exit code for errors. Run outcomes use 0, 2 and 3; every error is 1.
pub fn exit_code_for_error(_err: &eyre::Report) -> i32 {
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    use sweeper_core::error::{BuildError, SweeperError};
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    match err.downcast_ref::<SweeperError>() {
        Some(SweeperError::Timeout) => "Timeout",
        Some(SweeperError::Hardware(_) | SweeperError::HardwareFault(_)) => "Hardware",
        Some(SweeperError::Config(_)) => "Config",
        Some(SweeperError::State(_)) => "State",
        Some(SweeperError::Io(_)) => "Io",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweeper_core::error::{BuildError, SweeperError};

    #[test]
    fn build_errors_are_explained() {
        let e = eyre::Report::new(BuildError::InvalidConfig("drive_ms must be >= 1"));
        let h = humanize(&e);
        assert!(h.contains("Invalid configuration (drive_ms must be >= 1)"));
    }

    #[test]
    fn wrapped_hardware_fault_keeps_reason() {
        let e = eyre::Report::new(SweeperError::HardwareFault("odometer disconnected".into()))
            .wrap_err("reading odometer");
        assert!(humanize(&e).contains("Hardware fault"));
        let j: serde_json::Value = serde_json::from_str(&format_error_json(&e)).unwrap();
        assert_eq!(j["reason"], "Hardware");
    }

    #[test]
    fn csv_header_error_is_special_cased() {
        let e = eyre::eyre!("substance CSV must have headers 'name,s1,s2,s3,upper_limit,unit', got: a,b");
        assert!(humanize(&e).starts_with("Invalid headers in substance CSV"));
    }
}
