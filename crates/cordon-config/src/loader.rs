//! Config file loading.

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::types::GateConfig;
use crate::validate;

/// Load and validate a gate configuration from a TOML file.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, fails to parse,
/// or fails validation.
pub fn load(path: impl AsRef<Path>) -> ConfigResult<GateConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.display().to_string(),
        source,
    })?;
    let config = from_toml_str(&text, &path.display().to_string())?;
    info!(path = %path.display(), rules_version = config.rules.version, "loaded gate config");
    Ok(config)
}

/// Parse and validate a gate configuration from TOML text.
///
/// # Errors
///
/// Returns a [`ConfigError`] on parse or validation failure.
pub fn from_toml_str(text: &str, origin: &str) -> ConfigResult<GateConfig> {
    let config: GateConfig = toml::from_str(text).map_err(|source| ConfigError::ParseError {
        path: origin.to_string(),
        source,
    })?;
    validate::validate(&config)?;
    debug!(
        safe = config.rules.safe_rules.len(),
        local = config.rules.local_rules.len(),
        block = config.rules.block_rules.len(),
        "parsed rule tables"
    );
    Ok(config)
}
