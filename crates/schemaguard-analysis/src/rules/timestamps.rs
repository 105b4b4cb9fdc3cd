//! Tables need `created_at` and `updated_at` columns.

use schemaguard_core::config::TimestampsConfig;

use crate::diagnostics::MessageId;

use super::{Rule, RuleContext, RuleId, Site};

/// Required column, followed by the names that satisfy it.
const REQUIRED: &[(&str, &[&str])] = &[
    ("created_at", &["created_at", "createdAt"]),
    ("updated_at", &["updated_at", "updatedAt"]),
];

pub struct TimestampColumnsRule {
    config: TimestampsConfig,
}

impl TimestampColumnsRule {
    pub fn new(config: &TimestampsConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl Rule for TimestampColumnsRule {
    fn id(&self) -> RuleId {
        RuleId::RequireTimestampColumns
    }

    fn check(&mut self, site: &Site<'_, '_>, cx: &mut RuleContext<'_>) {
        let Some(table) = site.table else {
            return;
        };
        if !self.config.applies_to(&table.name) {
            return;
        }
        for (column, accepted) in REQUIRED {
            if !table.has_column_named(accepted) {
                cx.report(
                    MessageId::MissingTimestampColumn,
                    table.location,
                    [("table", table.name.as_str()), ("column", *column)],
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use schemaguard_core::SchemaGuardConfig;

    use super::*;
    use crate::rules::test_support::{run_rule, run_rule_with};

    #[test]
    fn both_missing() {
        let found = run_rule(RuleId::RequireTimestampColumns, "pgTable('notes', { id: uuid('id') });");
        let missing: Vec<Option<&str>> = found.iter().map(|d| d.data_value("column")).collect();
        assert_eq!(missing, vec![Some("created_at"), Some("updated_at")]);
    }

    #[test]
    fn declared_or_property_names_satisfy() {
        let found = run_rule(
            RuleId::RequireTimestampColumns,
            "pgTable('notes', { createdAt: timestamp('created_at'), updatedAt: timestamp() });",
        );
        assert!(found.is_empty());
    }

    #[test]
    fn allow_list_and_ignore() {
        let source = "pgTable('notes', {}); pgTable('tags', {});";

        let mut config = SchemaGuardConfig::default();
        config.rules.timestamps.tables = vec!["notes".to_string()];
        let found = run_rule_with(RuleId::RequireTimestampColumns, source, &config);
        assert!(found.iter().all(|d| d.data_value("table") == Some("notes")));
        assert_eq!(found.len(), 2);

        let mut config = SchemaGuardConfig::default();
        config.rules.timestamps.ignore = vec!["notes".to_string()];
        let found = run_rule_with(RuleId::RequireTimestampColumns, source, &config);
        assert!(found.iter().all(|d| d.data_value("table") == Some("tags")));
        assert_eq!(found.len(), 2);
    }
}
