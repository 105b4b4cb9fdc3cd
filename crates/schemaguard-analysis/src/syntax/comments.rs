//! Comment justification matcher.
//!
//! A comment directly above an expression (or above the statement that holds
//! it) may justify an otherwise flagged construct, e.g.
//! `// migration: runs with the service role`.

use std::sync::LazyLock;

use regex::{RegexSet, RegexSetBuilder};
use smallvec::SmallVec;
use tree_sitter::Node;

use super::node_text;

/// Accepted justification vocabulary, matched anywhere in the comment.
pub const JUSTIFICATION_PATTERNS: &[&str] = &[
    r"bypass",
    r"security",
    r"admin",
    r"service[\s_-]?role",
    r"system[\s_-]?operation",
    r"migration",
    r"background[\s_-]?job",
    r"cron",
];

static JUSTIFICATIONS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSetBuilder::new(JUSTIFICATION_PATTERNS)
        .case_insensitive(true)
        .build()
        .unwrap()
});

/// Comments immediately preceding `node`, nearest first.
///
/// Consecutive comment siblings are collected until any other token is hit.
/// When `node` is the first child of its parent, the walk continues before
/// the parent, since nothing separates the two.
pub fn leading_comments(node: Node<'_>) -> SmallVec<[Node<'_>; 2]> {
    let mut comments = SmallVec::new();
    let mut current = node;
    loop {
        match current.prev_sibling() {
            Some(prev) if prev.kind() == "comment" => {
                comments.push(prev);
                current = prev;
            }
            Some(_) => break,
            None => match current.parent() {
                Some(parent) => current = parent,
                None => break,
            },
        }
    }
    comments
}

pub fn is_justification(comment: &str) -> bool {
    JUSTIFICATIONS.is_match(comment)
}

/// Whether a justification comment precedes `node` or any ancestor up to the
/// enclosing statement.
pub fn has_justification(node: Node<'_>, source: &[u8]) -> bool {
    let mut current = Some(node);
    while let Some(n) = current {
        if leading_comments(n)
            .iter()
            .any(|comment| is_justification(node_text(*comment, source)))
        {
            return true;
        }
        if is_statement(n) || n.kind() == "program" {
            break;
        }
        current = n.parent();
    }
    false
}

fn is_statement(node: Node<'_>) -> bool {
    let kind = node.kind();
    if !(kind.ends_with("_statement") || kind.ends_with("_declaration")) {
        return false;
    }
    // `export const x = ...`: the export wraps the declaration and owns its comments.
    node.parent().map_or(true, |p| p.kind() != "export_statement")
}
