//! Top-level errors for file analysis entry points.

use std::path::PathBuf;

use super::error_code::{self, ErrorCode};
use super::{ConfigError, ParseError};

/// Errors surfaced by `analyze_file`-style entry points.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_code::IO_ERROR,
            Self::Parse(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}
