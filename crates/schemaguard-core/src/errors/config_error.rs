//! Errors raised while resolving `schemaguard.toml` and its overrides.

use super::error_code::{self, ErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    #[error("cannot parse config {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("invalid config value for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    /// A `SCHEMAGUARD_*` variable whose value does not parse.
    #[error("{var}={value:?} is not {expected}")]
    InvalidEnvOverride {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
