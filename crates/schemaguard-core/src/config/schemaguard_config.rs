//! Top-level schemaguard configuration with layered resolution.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RulesConfig;
use crate::errors::ConfigError;

/// Name of the project-level config file looked up in the analysis root.
pub const PROJECT_CONFIG_FILE: &str = "schemaguard.toml";

pub const ENV_MAX_JOINS: &str = "SCHEMAGUARD_MAX_JOINS";
pub const ENV_SENSITIVE_TABLES: &str = "SCHEMAGUARD_SENSITIVE_TABLES";
pub const ENV_EXEMPT_PRIMARY_KEYS: &str = "SCHEMAGUARD_EXEMPT_PRIMARY_KEYS";

/// Top-level configuration.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`SCHEMAGUARD_*`)
/// 3. Project config (`schemaguard.toml` in project root)
/// 4. User config (`~/.schemaguard/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SchemaGuardConfig {
    pub rules: RulesConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub max_joins: Option<u32>,
    pub sensitive_tables: Vec<String>,
}

impl SchemaGuardConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Lowest priority: user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(ConfigError::ParseError { message, .. }) => {
                        return Err(ConfigError::ParseError {
                            path: user_config_path.display().to_string(),
                            message,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &SchemaGuardConfig) -> Result<(), ConfigError> {
        if config.rules.join_complexity.max_joins == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "rules.join_complexity.max_joins".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(patterns) = &config.rules.require_rls.patterns {
            if patterns.iter().any(|p| p.trim().is_empty()) {
                return Err(ConfigError::ValidationFailed {
                    field: "rules.require_rls.patterns".to_string(),
                    message: "patterns must not be empty strings".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.schemaguard/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".schemaguard").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored.
    fn merge_toml_file(config: &mut SchemaGuardConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: SchemaGuardConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it sets a value.
    fn merge(base: &mut SchemaGuardConfig, other: &SchemaGuardConfig) {
        for (rule, level) in &other.rules.severity {
            base.rules.severity.insert(rule.clone(), *level);
        }

        // Access control
        if !other.rules.require_rls.tables.is_empty() {
            base.rules.require_rls.tables = other.rules.require_rls.tables.clone();
        }
        if other.rules.require_rls.patterns.is_some() {
            base.rules.require_rls.patterns = other.rules.require_rls.patterns.clone();
        }
        if !other.rules.require_rls.ignore.is_empty() {
            base.rules.require_rls.ignore = other.rules.require_rls.ignore.clone();
        }

        // Timestamps
        if !other.rules.timestamps.tables.is_empty() {
            base.rules.timestamps.tables = other.rules.timestamps.tables.clone();
        }
        if !other.rules.timestamps.ignore.is_empty() {
            base.rules.timestamps.ignore = other.rules.timestamps.ignore.clone();
        }

        if other.rules.join_complexity.max_joins.is_some() {
            base.rules.join_complexity.max_joins = other.rules.join_complexity.max_joins;
        }
        if other.rules.uuid_index.exempt_primary_keys.is_some() {
            base.rules.uuid_index.exempt_primary_keys = other.rules.uuid_index.exempt_primary_keys;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `SCHEMAGUARD_MAX_JOINS`, `SCHEMAGUARD_SENSITIVE_TABLES`, etc.
    /// Unparsable values are skipped with a warning.
    fn apply_env_overrides(config: &mut SchemaGuardConfig) {
        if let Ok(val) = std::env::var(ENV_MAX_JOINS) {
            match parse_env_override::<u32>(ENV_MAX_JOINS, &val, "a non-negative integer") {
                Ok(v) => config.rules.join_complexity.max_joins = Some(v),
                Err(e) => tracing::warn!(error = %e, "ignoring environment override"),
            }
        }
        if let Ok(val) = std::env::var(ENV_SENSITIVE_TABLES) {
            let tables = split_list(&val);
            if !tables.is_empty() {
                config.rules.require_rls.tables = tables;
            }
        }
        if let Ok(val) = std::env::var(ENV_EXEMPT_PRIMARY_KEYS) {
            match parse_env_override::<bool>(ENV_EXEMPT_PRIMARY_KEYS, &val, "`true` or `false`") {
                Ok(v) => config.rules.uuid_index.exempt_primary_keys = Some(v),
                Err(e) => tracing::warn!(error = %e, "ignoring environment override"),
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut SchemaGuardConfig, cli: &CliOverrides) {
        if let Some(v) = cli.max_joins {
            config.rules.join_complexity.max_joins = Some(v);
        }
        if !cli.sensitive_tables.is_empty() {
            config.rules.require_rls.tables = cli.sensitive_tables.clone();
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Parse the value of one `SCHEMAGUARD_*` variable.
pub fn parse_env_override<T: FromStr>(
    var: &'static str,
    value: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride {
            var,
            value: value.to_string(),
            expected,
        })
}

fn split_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
