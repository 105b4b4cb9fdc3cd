//! Integer primary keys where a UUID would do.

use crate::diagnostics::MessageId;
use crate::syntax::classifier::INTEGER_CONSTRUCTORS;

use super::{Rule, RuleContext, RuleId, Site};

pub struct UuidPrimaryKeyRule;

impl Rule for UuidPrimaryKeyRule {
    fn id(&self) -> RuleId {
        RuleId::PreferUuidPrimaryKey
    }

    fn check(&mut self, site: &Site<'_, '_>, cx: &mut RuleContext<'_>) {
        let Some(table) = site.table else {
            return;
        };
        for column in table.columns.iter().filter(|c| c.is_primary_key) {
            if !INTEGER_CONSTRUCTORS.contains(&column.type_tag.as_str()) {
                continue;
            }
            cx.report(
                MessageId::PreferUuidPrimaryKey,
                column.location,
                [
                    ("column", column.declared_name.as_str()),
                    ("table", table.name.as_str()),
                    ("type", column.type_tag.as_str()),
                ],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::run_rule;

    #[test]
    fn serial_primary_key() {
        let found = run_rule(
            RuleId::PreferUuidPrimaryKey,
            "pgTable('items', { id: serial('id').primaryKey(), n: integer('n') });",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].data_value("type"), Some("serial"));
        assert_eq!(found[0].message(), "Primary key 'id' on table 'items' uses serial; prefer uuid");
    }

    #[test]
    fn uuid_primary_key_is_fine() {
        let found = run_rule(
            RuleId::PreferUuidPrimaryKey,
            "pgTable('items', { id: uuid('id').primaryKey().defaultRandom() });",
        );
        assert!(found.is_empty());
    }
}
