//! Chain navigator for fluent call chains.
//!
//! A chain like `db.select().from(users).leftJoin(a).where(x)` nests
//! inside-out: the `where` call wraps a member access whose object is the
//! `leftJoin` call, and so on down to `db`. Rather than walking both directions
//! from whichever segment triggered a rule, the chain is linearized once into
//! root-to-tip order and rules scan that sequence. Every segment of a chain
//! therefore sees the same `Chain`, which makes per-chain counts independent of
//! the entry point.

use schemaguard_core::types::collections::SmallVec8;
use tree_sitter::Node;

use super::{callee_identifier, callee_property};

/// One call in a fluent chain.
#[derive(Debug, Clone)]
pub struct ChainSegment<'t> {
    /// Property name for `.verb(...)` calls, identifier for the bare root call.
    pub method_name: String,
    pub node: Node<'t>,
}

/// A linearized call chain, root first.
#[derive(Debug, Clone, Default)]
pub struct Chain<'t> {
    segments: SmallVec8<ChainSegment<'t>>,
}

/// The call wrapping `call` as its receiver: for `call.next(...)` returns the
/// `next` call.
pub fn wrapping_call(call: Node<'_>) -> Option<Node<'_>> {
    let member = call.parent()?;
    if member.kind() != "member_expression" || member.child_by_field_name("object")?.id() != call.id() {
        return None;
    }
    let outer = member.parent()?;
    if outer.kind() != "call_expression" || outer.child_by_field_name("function")?.id() != member.id() {
        return None;
    }
    Some(outer)
}

/// The call this one is invoked on: for `prev(...).verb(...)` returns `prev(...)`.
pub fn receiver_call(call: Node<'_>) -> Option<Node<'_>> {
    let function = call.child_by_field_name("function")?;
    if function.kind() != "member_expression" {
        return None;
    }
    let object = function.child_by_field_name("object")?;
    (object.kind() == "call_expression").then_some(object)
}

/// Outermost call of the chain containing `call`.
pub fn find_tip(mut call: Node<'_>) -> Node<'_> {
    while let Some(outer) = wrapping_call(call) {
        call = outer;
    }
    call
}

/// Innermost call of the chain containing `call`: steps from each call to its
/// receiver until the receiver is no longer a call.
pub fn find_root(mut call: Node<'_>) -> Node<'_> {
    while let Some(inner) = receiver_call(call) {
        call = inner;
    }
    call
}

impl<'t> Chain<'t> {
    /// Linearize the whole chain that `call` belongs to.
    ///
    /// Returns an empty chain when `call` is not a call expression.
    pub fn from_call(call: Node<'t>, source: &[u8]) -> Self {
        if call.kind() != "call_expression" {
            return Self::default();
        }

        let mut segments: SmallVec8<ChainSegment<'t>> = SmallVec8::new();
        let mut current = Some(find_tip(call));
        while let Some(node) = current {
            let name = callee_property(node, source)
                .or_else(|| callee_identifier(node, source))
                .unwrap_or("");
            segments.push(ChainSegment {
                method_name: name.to_string(),
                node,
            });
            current = receiver_call(node);
        }
        segments.reverse();
        Self { segments }
    }

    pub fn segments(&self) -> &[ChainSegment<'t>] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Innermost call (e.g. `db.select()` or `pgTable(...)`).
    pub fn root(&self) -> Option<&ChainSegment<'t>> {
        self.segments.first()
    }

    /// Outermost call.
    pub fn tip(&self) -> Option<&ChainSegment<'t>> {
        self.segments.last()
    }

    pub fn contains(&self, method: &str) -> bool {
        self.segments.iter().any(|s| s.method_name == method)
    }

    pub fn contains_any(&self, methods: &[&str]) -> bool {
        self.segments
            .iter()
            .any(|s| methods.contains(&s.method_name.as_str()))
    }

    /// Segments whose method is in `methods`, root first.
    pub fn matching<'a>(
        &'a self,
        methods: &'a [&'a str],
    ) -> impl Iterator<Item = &'a ChainSegment<'t>> + 'a {
        self.segments
            .iter()
            .filter(move |s| methods.contains(&s.method_name.as_str()))
    }

    pub fn count_matching(&self, methods: &[&str]) -> usize {
        self.matching(methods).count()
    }

    /// First segment named `method`, root first.
    pub fn find(&self, method: &str) -> Option<&ChainSegment<'t>> {
        self.segments.iter().find(|s| s.method_name == method)
    }

    /// Index of `node` in the chain.
    pub fn position(&self, node: Node<'_>) -> Option<usize> {
        self.segments.iter().position(|s| s.node.id() == node.id())
    }
}
