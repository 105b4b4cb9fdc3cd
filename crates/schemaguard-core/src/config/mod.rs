//! Configuration system for schemaguard.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod rules_config;
pub mod schemaguard_config;

pub use rules_config::{
    JoinComplexityConfig, RequireRlsConfig, RulesConfig, SeverityLevel, TimestampsConfig,
    UuidIndexConfig, DEFAULT_MAX_JOINS, DEFAULT_SENSITIVE_PATTERNS,
};
pub use schemaguard_config::{parse_env_override, CliOverrides, SchemaGuardConfig};
