//! `delete`/`update` chains without a `where` filter.
//!
//! The whole chain is inspected, so `db.delete(t).returning().where(x)` is
//! as filtered as `db.delete(t).where(x)`. An `update` is only judged once it
//! has a `.set(...)`; without one the statement is incomplete anyway.

use crate::diagnostics::MessageId;
use crate::parsers::Range;
use crate::syntax::classifier::{MutationVerb, NodeCategory};
use crate::syntax::{call_arguments, node_text};

use super::{Rule, RuleContext, RuleId, Site};

pub struct MissingWhereRule {
    verb: MutationVerb,
}

impl MissingWhereRule {
    pub fn delete() -> Self {
        Self {
            verb: MutationVerb::Delete,
        }
    }

    pub fn update() -> Self {
        Self {
            verb: MutationVerb::Update,
        }
    }
}

impl Rule for MissingWhereRule {
    fn id(&self) -> RuleId {
        match self.verb {
            MutationVerb::Delete => RuleId::NoDeleteWithoutWhere,
            MutationVerb::Update => RuleId::NoUpdateWithoutWhere,
        }
    }

    fn check(&mut self, site: &Site<'_, '_>, cx: &mut RuleContext<'_>) {
        let NodeCategory::MutatingRoot(verb) = site.category else {
            return;
        };
        if *verb != self.verb {
            return;
        }
        let Some(chain) = site.chain else {
            return;
        };
        if chain.contains("where") {
            return;
        }
        if self.verb == MutationVerb::Update && !chain.contains("set") {
            return;
        }

        let table = call_arguments(site.node)
            .first()
            .map(|arg| node_text(*arg, cx.source).to_string())
            .unwrap_or_else(|| "unknown".to_string());
        cx.report(
            MessageId::MissingWhere,
            Range::from_ts_node(&site.node),
            [("operation", self.verb.as_str().to_string()), ("table", table)],
        );
    }
}
