//! snake_case table and column names.

use std::sync::LazyLock;

use regex::Regex;

use crate::diagnostics::MessageId;

use super::{Rule, RuleContext, RuleId, Site};

static SNAKE_CASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap());

/// camelCase column names accepted as-is. Never applied to tables.
pub const COLUMN_NAME_EXCEPTIONS: &[&str] = &["createdAt", "updatedAt"];

pub fn is_snake_case(name: &str) -> bool {
    SNAKE_CASE.is_match(name)
}

pub struct SnakeCaseRule;

impl Rule for SnakeCaseRule {
    fn id(&self) -> RuleId {
        RuleId::SnakeCaseNaming
    }

    fn check(&mut self, site: &Site<'_, '_>, cx: &mut RuleContext<'_>) {
        let Some(table) = site.table else {
            return;
        };
        if !is_snake_case(&table.name) {
            cx.report(
                MessageId::TableNotSnakeCase,
                table.location,
                [("name", table.name.as_str())],
            );
        }

        // Columns named only by their key carry no schema identifier of their own.
        for column in table.columns.iter().filter(|c| c.name_is_explicit) {
            let name = column.declared_name.as_str();
            if is_snake_case(name) || COLUMN_NAME_EXCEPTIONS.contains(&name) {
                continue;
            }
            cx.report(MessageId::ColumnNotSnakeCase, column.location, [("name", name)]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::run_rule;

    #[test]
    fn grammar() {
        assert!(is_snake_case("user_accounts"));
        assert!(is_snake_case("a1_b2"));
        assert!(!is_snake_case("UserAccounts"));
        assert!(!is_snake_case("_users"));
        assert!(!is_snake_case("1users"));
        assert!(!is_snake_case("user-accounts"));
        assert!(!is_snake_case(""));
    }

    #[test]
    fn table_name() {
        let found = run_rule(RuleId::SnakeCaseNaming, "pgTable('userAccounts', {});");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message_id, MessageId::TableNotSnakeCase);
        assert_eq!(found[0].data_value("name"), Some("userAccounts"));
    }

    #[test]
    fn exceptions_apply_to_columns_only() {
        let found = run_rule(
            RuleId::SnakeCaseNaming,
            "pgTable('createdAt', { createdAt: timestamp('createdAt'), firstName: text('firstName') });",
        );
        let ids: Vec<(MessageId, Option<&str>)> = found
            .iter()
            .map(|d| (d.message_id, d.data_value("name")))
            .collect();
        assert_eq!(
            ids,
            vec![
                (MessageId::TableNotSnakeCase, Some("createdAt")),
                (MessageId::ColumnNotSnakeCase, Some("firstName")),
            ]
        );
    }

    #[test]
    fn implicit_column_names_are_not_checked() {
        let found = run_rule(RuleId::SnakeCaseNaming, "pgTable('people', { firstName: text() });");
        assert!(found.is_empty());
    }
}
