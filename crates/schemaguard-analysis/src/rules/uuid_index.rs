//! UUID-like columns should be indexed.
//!
//! Indexes reference columns by property name (`table.userId`) while the
//! diagnostic names the declared column (`user_id`).

use schemaguard_core::config::UuidIndexConfig;

use crate::diagnostics::MessageId;

use super::{Rule, RuleContext, RuleId, Site};

pub struct UuidIndexRule {
    exempt_primary_keys: bool,
}

impl UuidIndexRule {
    pub fn new(config: &UuidIndexConfig) -> Self {
        Self {
            exempt_primary_keys: config.effective_exempt_primary_keys(),
        }
    }
}

impl Rule for UuidIndexRule {
    fn id(&self) -> RuleId {
        RuleId::RequireUuidIndex
    }

    fn check(&mut self, site: &Site<'_, '_>, cx: &mut RuleContext<'_>) {
        let Some(table) = site.table else {
            return;
        };
        for column in &table.columns {
            if !column.is_uuid_like() || column.is_unique {
                continue;
            }
            if column.is_primary_key && self.exempt_primary_keys {
                continue;
            }
            if table.is_indexed(&column.property_name) {
                continue;
            }
            cx.report(
                MessageId::MissingUuidIndex,
                column.location,
                [("column", column.declared_name.as_str()), ("table", table.name.as_str())],
            );
        }
    }
}
