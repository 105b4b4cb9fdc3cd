//! Row level security bypasses need a justification comment.

use tree_sitter::Node;

use crate::diagnostics::MessageId;
use crate::parsers::Range;
use crate::syntax::chain::receiver_call;
use crate::syntax::comments::has_justification;
use crate::syntax::{call_arguments, callee_property, member_property, object_pairs, unwrap_parens};

use super::{Rule, RuleContext, RuleId, Site};

/// Property names that hand out a client running past RLS.
pub const BYPASS_PROPERTIES: &[&str] = &["serviceRole", "adminClient", "serviceClient", "bypassRLS"];

pub struct RlsBypassRule;

/// The bypass indicator `node` carries, if any.
pub fn bypass_indicator(node: Node<'_>, source: &[u8]) -> Option<String> {
    match node.kind() {
        "member_expression" => member_property(node, source)
            .filter(|p| BYPASS_PROPERTIES.contains(p))
            .map(str::to_string),
        "call_expression" => {
            if callee_property(node, source) == Some("bypass")
                && receiver_call(node).and_then(|r| callee_property(r, source)) == Some("rls")
            {
                return Some("rls().bypass()".to_string());
            }
            call_arguments(node)
                .iter()
                .skip(1)
                .any(|options| disables_token_refresh(*options, source))
                .then(|| "auth.autoRefreshToken: false".to_string())
        }
        _ => None,
    }
}

/// `{ auth: { autoRefreshToken: false } }`, the options of a server-side
/// client built with a service key.
fn disables_token_refresh(options: Node<'_>, source: &[u8]) -> bool {
    object_pairs(unwrap_parens(options), source)
        .into_iter()
        .filter(|(key, _)| key == "auth")
        .flat_map(|(_, auth)| object_pairs(unwrap_parens(auth), source))
        .any(|(key, value)| key == "autoRefreshToken" && unwrap_parens(value).kind() == "false")
}

impl Rule for RlsBypassRule {
    fn id(&self) -> RuleId {
        RuleId::NoRlsBypass
    }

    fn check(&mut self, site: &Site<'_, '_>, cx: &mut RuleContext<'_>) {
        let Some(indicator) = bypass_indicator(site.node, cx.source) else {
            return;
        };
        if has_justification(site.node, cx.source) {
            tracing::trace!(%indicator, "bypass justified by comment");
            return;
        }
        cx.report(
            MessageId::RlsBypass,
            Range::from_ts_node(&site.node),
            [("indicator", indicator)],
        );
    }
}
