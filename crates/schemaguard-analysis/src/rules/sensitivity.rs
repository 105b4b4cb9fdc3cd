//! Which tables must have row level security.

use schemaguard_core::config::RequireRlsConfig;
use schemaguard_core::types::collections::FxHashSet;

/// Decides whether a table name holds sensitive data.
///
/// Order: the ignore list excludes, the explicit list includes, then a
/// case-insensitive substring match against the patterns.
#[derive(Debug, Clone)]
pub struct SensitivityHeuristic {
    tables: FxHashSet<String>,
    ignore: FxHashSet<String>,
    patterns: Vec<String>,
}

impl SensitivityHeuristic {
    pub fn new(config: &RequireRlsConfig) -> Self {
        Self {
            tables: config.tables.iter().map(|t| t.to_lowercase()).collect(),
            ignore: config.ignore.iter().map(|t| t.to_lowercase()).collect(),
            patterns: config.effective_patterns(),
        }
    }

    pub fn is_sensitive(&self, table: &str) -> bool {
        let name = table.to_lowercase();
        if self.ignore.contains(&name) {
            return false;
        }
        if self.tables.contains(&name) {
            return true;
        }
        self.patterns.iter().any(|p| name.contains(p.as_str()))
    }

    /// The pattern that made `table` sensitive, for logging.
    pub fn matched_pattern(&self, table: &str) -> Option<&str> {
        let name = table.to_lowercase();
        self.patterns
            .iter()
            .find(|p| name.contains(p.as_str()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heuristic(tables: &[&str], patterns: Option<&[&str]>, ignore: &[&str]) -> SensitivityHeuristic {
        let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        SensitivityHeuristic::new(&RequireRlsConfig {
            tables: owned(tables),
            patterns: patterns.map(owned),
            ignore: owned(ignore),
        })
    }

    #[test]
    fn default_patterns() {
        let h = heuristic(&[], None, &[]);
        assert!(h.is_sensitive("users"));
        assert!(h.is_sensitive("UserSessions"));
        assert!(h.is_sensitive("purchase_orders"));
        assert!(!h.is_sensitive("tags"));
        assert_eq!(h.matched_pattern("user_tokens"), Some("user"));
    }

    #[test]
    fn explicit_list_short_circuits() {
        let h = heuristic(&["audit_log"], Some(&["secret"]), &[]);
        assert!(h.is_sensitive("audit_log"));
        assert!(h.is_sensitive("secrets"));
        assert!(!h.is_sensitive("users"));
    }

    #[test]
    fn ignore_wins() {
        let h = heuristic(&["users"], None, &["users"]);
        assert!(!h.is_sensitive("users"));
        assert!(h.is_sensitive("accounts"));
    }

    #[test]
    fn patterns_are_case_insensitive() {
        let h = heuristic(&[], Some(&["Ledger"]), &[]);
        assert!(h.is_sensitive("general_ledger"));
    }
}
