//! Sensitive tables need row level security and at least one policy.
//!
//! Enabling statements and policies may appear anywhere in the unit, before
//! or after the table they name, so this rule only reports from `finalize`.

use schemaguard_core::config::RequireRlsConfig;

use crate::diagnostics::MessageId;

use super::sensitivity::SensitivityHeuristic;
use super::{Rule, RuleContext, RuleId, Site};

pub struct RequireRlsRule {
    heuristic: SensitivityHeuristic,
}

impl RequireRlsRule {
    pub fn new(config: &RequireRlsConfig) -> Self {
        Self {
            heuristic: SensitivityHeuristic::new(config),
        }
    }
}

impl Rule for RequireRlsRule {
    fn id(&self) -> RuleId {
        RuleId::RequireRls
    }

    fn check(&mut self, _site: &Site<'_, '_>, _cx: &mut RuleContext<'_>) {}

    fn finalize(&mut self, cx: &mut RuleContext<'_>) {
        let facts = cx.facts;
        for table in facts.tables() {
            if !self.heuristic.is_sensitive(&table.name) {
                continue;
            }
            let message_id = if !facts.has_rls(&table.name) {
                MessageId::MissingRls
            } else if !facts.has_policy(&table.name) {
                MessageId::MissingPolicy
            } else {
                continue;
            };
            tracing::debug!(
                table = %table.name,
                pattern = ?self.heuristic.matched_pattern(&table.name),
                %message_id,
                "sensitive table lacks access control"
            );
            cx.report(message_id, table.location, [("table", table.name.as_str())]);
        }
    }
}
