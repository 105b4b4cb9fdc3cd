//! Too many joins in one query chain.
//!
//! Every join segment of a chain sees the same linearized chain. Only the
//! first join (root to tip) reports, so a chain yields one finding no matter
//! how many of its joins are visited.

use schemaguard_core::config::JoinComplexityConfig;

use crate::diagnostics::MessageId;
use crate::parsers::Range;
use crate::syntax::classifier::{NodeCategory, JOIN_VERBS};

use super::{Rule, RuleContext, RuleId, Site};

pub struct JoinComplexityRule {
    max_joins: u32,
}

impl JoinComplexityRule {
    pub fn new(config: &JoinComplexityConfig) -> Self {
        Self {
            max_joins: config.effective_max_joins(),
        }
    }
}

impl Rule for JoinComplexityRule {
    fn id(&self) -> RuleId {
        RuleId::JoinComplexityLimit
    }

    fn check(&mut self, site: &Site<'_, '_>, cx: &mut RuleContext<'_>) {
        let NodeCategory::ChainSegment(verb) = site.category else {
            return;
        };
        if !verb.is_join() {
            return;
        }
        let Some(chain) = site.chain else {
            return;
        };
        let is_first = chain
            .matching(JOIN_VERBS)
            .next()
            .is_some_and(|first| first.node.id() == site.node.id());
        if !is_first {
            return;
        }

        let count = chain.count_matching(JOIN_VERBS);
        if count <= self.max_joins as usize {
            return;
        }
        cx.report(
            MessageId::TooManyJoins,
            Range::from_ts_node(&site.node),
            [("count", count.to_string()), ("max", self.max_joins.to_string())],
        );
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use schemaguard_core::SchemaGuardConfig;

    use super::*;
    use crate::rules::test_support::{run_rule, run_rule_with};

    #[test]
    fn four_joins_against_three() {
        let found = run_rule(
            RuleId::JoinComplexityLimit,
            "db.select().from(a).leftJoin(b, x).innerJoin(c, y).rightJoin(d, z).fullJoin(e, w);",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].data_value("count"), Some("4"));
        assert_eq!(found[0].data_value("max"), Some("3"));
    }

    #[test]
    fn at_the_limit() {
        let found = run_rule(
            RuleId::JoinComplexityLimit,
            "db.select().from(a).leftJoin(b, x).leftJoin(c, y).leftJoin(d, z);",
        );
        assert!(found.is_empty());
    }

    #[test]
    fn configured_limit() {
        let mut config = SchemaGuardConfig::default();
        config.rules.join_complexity.max_joins = Some(1);
        let found = run_rule_with(
            RuleId::JoinComplexityLimit,
            "db.select().from(a).leftJoin(b, x).leftJoin(c, y);",
            &config,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].data_value("count"), Some("2"));
    }

    #[test]
    fn separate_chains_are_counted_separately() {
        let found = run_rule(
            RuleId::JoinComplexityLimit,
            "q1.leftJoin(a, x).leftJoin(b, y); q2.leftJoin(c, z).leftJoin(d, w);",
        );
        assert!(found.is_empty());
    }

    #[test]
    fn report_sits_on_the_first_join() {
        let source = "db.select().from(a).where(p).leftJoin(b, x).leftJoin(c, y).leftJoin(d, z).leftJoin(e, w);";
        let found = run_rule(RuleId::JoinComplexityLimit, source);
        assert_eq!(found.len(), 1);
        let start = found[0].range.start_byte;
        let end = found[0].range.end_byte;
        // The innermost join call spans from the chain start to its own `)`.
        assert!(source[start..end].ends_with("leftJoin(b, x)"));
    }

    const JOINS: [&str; 4] = ["leftJoin", "innerJoin", "rightJoin", "fullJoin"];
    const OTHERS: [&str; 3] = ["where", "orderBy", "limit"];

    proptest! {
        #[test]
        fn one_finding_per_chain_with_exact_count(
            steps in proptest::collection::vec((any::<bool>(), 0usize..4), 0..10),
        ) {
            let mut source = String::from("db.select().from(t)");
            let mut joins = 0usize;
            for (is_join, pick) in &steps {
                if *is_join {
                    joins += 1;
                    source.push_str(&format!(".{}(t{}, c)", JOINS[*pick], joins));
                } else {
                    source.push_str(&format!(".{}(c)", OTHERS[pick % OTHERS.len()]));
                }
            }
            source.push(';');

            let found = run_rule(RuleId::JoinComplexityLimit, &source);
            if joins > 3 {
                prop_assert_eq!(found.len(), 1);
                let expected = joins.to_string();
                prop_assert_eq!(found[0].data_value("count"), Some(expected.as_str()));
            } else {
                prop_assert!(found.is_empty());
            }
        }
    }
}
