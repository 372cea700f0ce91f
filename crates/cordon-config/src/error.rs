use std::io;

/// Errors from configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file at {path}: {source}")]
    ReadError {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file at {path}: {source}")]
    ParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Underlying TOML parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("validation error in field '{field}': {message}")]
    ValidationError {
        /// Field that failed validation.
        field: String,
        /// Validation failure description.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
