//! ErrorCode trait for host-facing error reporting.

/// Stable, machine-readable error codes.
///
/// Hosts embedding the engine (editor integrations, CI wrappers) match on the
/// code rather than on the human-readable message.
pub trait ErrorCode {
    /// Returns the error code string (e.g., "PARSE_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const UNSUPPORTED_LANGUAGE: &str = "UNSUPPORTED_LANGUAGE";
pub const IO_ERROR: &str = "IO_ERROR";
