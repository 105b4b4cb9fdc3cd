//! Structural helpers over the TypeScript tree.
//!
//! Everything here is shape-based: no name resolution, no type information.
//! Helpers return `Option`/empty collections on shapes they do not recognize,
//! and callers treat absence as "nothing to report".

pub mod chain;
pub mod classifier;
pub mod comments;
pub mod extractor;

use schemaguard_core::types::collections::SmallVec4;
use tree_sitter::Node;

pub use chain::{Chain, ChainSegment};
pub use classifier::{classify, NodeCategory};

/// Source text of `node`, or `""` if the bytes are not valid UTF-8.
pub fn node_text<'s>(node: Node<'_>, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

/// Named children, skipping comments (which tree-sitter attaches as extras).
pub fn named_children<'t>(node: Node<'t>) -> SmallVec4<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Strip any number of wrapping parentheses: `((x))` -> `x`.
pub fn unwrap_parens(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_expression" {
        match named_children(node).first() {
            Some(inner) => node = *inner,
            None => break,
        }
    }
    node
}

/// Argument expressions of a call, in order. Tagged templates have none.
pub fn call_arguments<'t>(call: Node<'t>) -> SmallVec4<Node<'t>> {
    match call.child_by_field_name("arguments") {
        Some(args) if args.kind() == "arguments" => named_children(args),
        _ => SmallVec4::new(),
    }
}

/// The callee name when it is a bare identifier: `pgTable(...)` -> `pgTable`.
pub fn callee_identifier<'s>(call: Node<'_>, source: &'s [u8]) -> Option<&'s str> {
    let function = call.child_by_field_name("function")?;
    (function.kind() == "identifier").then(|| node_text(function, source))
}

/// The property name when the callee is a property access: `db.delete(...)` -> `delete`.
pub fn callee_property<'s>(call: Node<'_>, source: &'s [u8]) -> Option<&'s str> {
    let function = call.child_by_field_name("function")?;
    if function.kind() != "member_expression" {
        return None;
    }
    member_property(function, source)
}

/// Property name of a member expression: `a.b` -> `b`.
pub fn member_property<'s>(member: Node<'_>, source: &'s [u8]) -> Option<&'s str> {
    let property = member.child_by_field_name("property")?;
    (property.kind() == "property_identifier").then(|| node_text(property, source))
}

/// Value of a plain string literal, quotes removed. Template literals without
/// substitutions count as plain strings.
pub fn string_value(node: Node<'_>, source: &[u8]) -> Option<String> {
    let node = unwrap_parens(node);
    match node.kind() {
        "string" => {
            let text = node_text(node, source);
            if text.len() < 2 {
                return None;
            }
            Some(text[1..text.len() - 1].to_string())
        }
        "template_string" => {
            let mut cursor = node.walk();
            let has_substitution = node
                .named_children(&mut cursor)
                .any(|c| c.kind() == "template_substitution");
            if has_substitution {
                None
            } else {
                template_text(node, source)
            }
        }
        _ => None,
    }
}

/// Static text of a template literal: literal chunks concatenated, `${...}`
/// substitutions dropped. Returns `None` for malformed templates.
pub fn template_text(node: Node<'_>, source: &[u8]) -> Option<String> {
    if node.kind() != "template_string" || node.has_error() || node.is_missing() {
        return None;
    }
    let (start, end) = (node.start_byte(), node.end_byte());
    if end < start + 2 || source.get(start) != Some(&b'`') || source.get(end - 1) != Some(&b'`') {
        return None;
    }

    let mut text = String::new();
    let mut pos = start + 1;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "template_substitution" {
            continue;
        }
        text.push_str(std::str::from_utf8(source.get(pos..child.start_byte())?).ok()?);
        pos = child.end_byte();
    }
    text.push_str(std::str::from_utf8(source.get(pos..end - 1)?).ok()?);
    Some(text)
}

/// Key of an object-literal pair as a plain name.
pub fn pair_key(pair: Node<'_>, source: &[u8]) -> Option<String> {
    let key = pair.child_by_field_name("key")?;
    match key.kind() {
        "property_identifier" | "number" => Some(node_text(key, source).to_string()),
        "string" => string_value(key, source),
        _ => None,
    }
}

/// `(key, value)` for every `pair` of an object literal, in source order.
pub fn object_pairs<'t>(object: Node<'t>, source: &[u8]) -> Vec<(String, Node<'t>)> {
    if object.kind() != "object" {
        return Vec::new();
    }
    named_children(object)
        .into_iter()
        .filter(|child| child.kind() == "pair")
        .filter_map(|pair| {
            let key = pair_key(pair, source)?;
            let value = pair.child_by_field_name("value")?;
            Some((key, value))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use tree_sitter::Node;

    use crate::parsers::{parse_source, ParsedUnit};

    pub fn parse(source: &str) -> ParsedUnit {
        parse_source(source, Path::new("test.ts")).unwrap()
    }

    /// All nodes of `kind` in pre-order.
    pub fn find_all<'t>(root: Node<'t>, kind: &str) -> Vec<Node<'t>> {
        let mut found = Vec::new();
        crate::engine::walker::walk(root, |node| {
            if node.kind() == kind {
                found.push(node);
            }
        });
        found
    }

    /// First call expression whose callee ends in `.name` or is `name`.
    pub fn find_call<'t>(root: Node<'t>, source: &[u8], name: &str) -> Node<'t> {
        find_all(root, "call_expression")
            .into_iter()
            .find(|call| {
                super::callee_property(*call, source) == Some(name)
                    || super::callee_identifier(*call, source) == Some(name)
            })
            .unwrap_or_else(|| panic!("no call to {name}"))
    }
}
