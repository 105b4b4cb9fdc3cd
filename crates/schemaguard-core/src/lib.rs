//! schemaguard-core: shared foundation for the schemaguard advisory engine.
//!
//! - Errors: one `thiserror` enum per subsystem, each carrying a stable error code
//! - Config: TOML-based, layered resolution (CLI > env > project > user > defaults)
//! - Tracing: `tracing` + `EnvFilter` driven by `SCHEMAGUARD_LOG`
//! - Types: collection aliases shared across crates

pub mod config;
pub mod errors;
pub mod tracing;
pub mod types;

pub use config::SchemaGuardConfig;
pub use errors::{AnalysisError, ConfigError, ErrorCode, ParseError};
