//! Per-rule options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Maximum join count allowed in one query chain unless configured otherwise.
pub const DEFAULT_MAX_JOINS: u32 = 3;

/// Table-name substrings that mark a table as holding sensitive data.
pub const DEFAULT_SENSITIVE_PATTERNS: &[&str] = &[
    "user", "account", "profile", "payment", "order", "invoice", "medical", "health",
    "personal", "private", "auth", "session", "token",
];

/// Severity override for a rule. `Off` disables the rule entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Error,
    Warning,
    Off,
}

/// Options for every rule, keyed by rule.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RulesConfig {
    /// Per-rule severity overrides, keyed by rule id (`no-select-star`, ...).
    pub severity: BTreeMap<String, SeverityLevel>,
    pub require_rls: RequireRlsConfig,
    pub timestamps: TimestampsConfig,
    pub join_complexity: JoinComplexityConfig,
    pub uuid_index: UuidIndexConfig,
}

impl RulesConfig {
    /// Returns the configured override for `rule_id`, if any.
    pub fn severity_override(&self, rule_id: &str) -> Option<SeverityLevel> {
        self.severity.get(rule_id).copied()
    }

    /// Returns false when the rule has been switched `off`.
    pub fn is_enabled(&self, rule_id: &str) -> bool {
        self.severity_override(rule_id) != Some(SeverityLevel::Off)
    }
}

/// Options for the access-control-required rule.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RequireRlsConfig {
    /// Tables that always require row level security, regardless of patterns.
    pub tables: Vec<String>,
    /// Case-insensitive substrings marking a table as sensitive.
    /// `None` falls back to [`DEFAULT_SENSITIVE_PATTERNS`].
    pub patterns: Option<Vec<String>>,
    /// Tables never checked.
    pub ignore: Vec<String>,
}

impl RequireRlsConfig {
    /// Returns the effective substring patterns, lowercased.
    pub fn effective_patterns(&self) -> Vec<String> {
        match &self.patterns {
            Some(patterns) => patterns.iter().map(|p| p.to_lowercase()).collect(),
            None => DEFAULT_SENSITIVE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Options for the timestamp-columns-required rule.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TimestampsConfig {
    /// Only these tables are checked. Empty means every table.
    pub tables: Vec<String>,
    /// Tables never checked.
    pub ignore: Vec<String>,
}

impl TimestampsConfig {
    /// Whether `table` falls under the check.
    pub fn applies_to(&self, table: &str) -> bool {
        if self.ignore.iter().any(|t| t == table) {
            return false;
        }
        self.tables.is_empty() || self.tables.iter().any(|t| t == table)
    }
}

/// Options for the join-complexity-limit rule.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JoinComplexityConfig {
    /// Maximum joins per chain. Default: 3.
    pub max_joins: Option<u32>,
}

impl JoinComplexityConfig {
    /// Returns the effective maximum, defaulting to 3.
    pub fn effective_max_joins(&self) -> u32 {
        self.max_joins.unwrap_or(DEFAULT_MAX_JOINS)
    }
}

/// Options for the uuid-index-required rule.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UuidIndexConfig {
    /// Skip primary-key columns (they carry an implicit index). Default: true.
    pub exempt_primary_keys: Option<bool>,
}

impl UuidIndexConfig {
    pub fn effective_exempt_primary_keys(&self) -> bool {
        self.exempt_primary_keys.unwrap_or(true)
    }
}
