//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Upper bound on the QR freshness window, in seconds.
pub const MAX_QR_WINDOW_SECS: u64 = 300;

/// Hex length of a 256-bit credential key.
const CREDENTIAL_KEY_HEX_LEN: usize = 64;

/// Validate a fully-merged configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub(crate) fn validate(config: &Config) -> ConfigResult<()> {
    validate_crypto(config)?;
    validate_gate(config)?;
    validate_history(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_crypto(config: &Config) -> ConfigResult<()> {
    let Some(key) = config.crypto.credential_key.as_deref() else {
        return Ok(());
    };
    if key.len() != CREDENTIAL_KEY_HEX_LEN || !key.chars().all(|c| c.is_ascii_hexdigit()) {
        // Never echo the key itself.
        return Err(invalid(
            "crypto.credential_key",
            format!("credential key must be {CREDENTIAL_KEY_HEX_LEN} hex characters"),
        ));
    }
    Ok(())
}

fn validate_gate(config: &Config) -> ConfigResult<()> {
    let secs = config.gate.qr_window_secs;
    if secs == 0 || secs > MAX_QR_WINDOW_SECS {
        return Err(invalid(
            "gate.qr_window_secs",
            format!("qr_window_secs must be between 1 and {MAX_QR_WINDOW_SECS}"),
        ));
    }
    Ok(())
}

fn validate_history(config: &Config) -> ConfigResult<()> {
    let h = &config.history;

    if h.window_days == 0 {
        return Err(invalid("history.window_days", "window_days must be at least 1"));
    }
    if h.personal_window_days == 0 {
        return Err(invalid(
            "history.personal_window_days",
            "personal_window_days must be at least 1",
        ));
    }
    if h.default_limit == 0 {
        return Err(invalid("history.default_limit", "default_limit must be at least 1"));
    }
    if h.default_limit > h.max_limit {
        return Err(invalid(
            "history.default_limit",
            format!(
                "default_limit {} exceeds max_limit {}",
                h.default_limit, h.max_limit
            ),
        ));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if !matches!(
        l.level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        return Err(invalid(
            "logging.level",
            format!(
                "unknown log level '{}'; expected one of: trace, debug, info, warn, error",
                l.level
            ),
        ));
    }

    if !matches!(l.format.as_str(), "pretty" | "compact" | "json" | "full") {
        return Err(invalid(
            "logging.format",
            format!(
                "unknown log format '{}'; expected one of: pretty, compact, json, full",
                l.format
            ),
        ));
    }

    Ok(())
}
