//! Bare `.select()` in a query chain selects every column.

use crate::diagnostics::MessageId;
use crate::parsers::Range;
use crate::syntax::call_arguments;
use crate::syntax::classifier::{ChainVerb, NodeCategory, QUERY_CONTEXT_VERBS};

use super::{Rule, RuleContext, RuleId, Site};

pub struct SelectStarRule;

impl Rule for SelectStarRule {
    fn id(&self) -> RuleId {
        RuleId::NoSelectStar
    }

    fn check(&mut self, site: &Site<'_, '_>, cx: &mut RuleContext<'_>) {
        if !matches!(site.category, NodeCategory::ChainSegment(ChainVerb::Select)) {
            return;
        }
        if !call_arguments(site.node).is_empty() {
            return;
        }
        // `.select()` on something that is not a query builder (e.g. a DOM API).
        if !site.chain.is_some_and(|chain| chain.contains_any(QUERY_CONTEXT_VERBS)) {
            return;
        }
        cx.report(
            MessageId::SelectStar,
            Range::from_ts_node(&site.node),
            std::iter::empty::<(String, String)>(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::run_rule;

    #[test]
    fn bare_select_in_query() {
        let found = run_rule(RuleId::NoSelectStar, "const rows = await db.select().from(users).limit(10);");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message_id, MessageId::SelectStar);
    }

    #[test]
    fn explicit_columns() {
        let found = run_rule(
            RuleId::NoSelectStar,
            "await db.select({ id: users.id }).from(users);",
        );
        assert!(found.is_empty());
    }

    #[test]
    fn select_outside_query_context() {
        assert!(run_rule(RuleId::NoSelectStar, "input.select();").is_empty());
        assert!(run_rule(RuleId::NoSelectStar, "editor.select().focus();").is_empty());
    }

    #[test]
    fn query_verbs_before_select_count() {
        let found = run_rule(RuleId::NoSelectStar, "db.$with('x').where(y).select();");
        assert_eq!(found.len(), 1);
    }
}
