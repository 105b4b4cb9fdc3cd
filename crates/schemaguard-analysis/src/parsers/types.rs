//! Source positions and the parsed unit handed to the engine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Tree};

use super::SourceLanguage;

/// Zero-based line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// A span in the source file, kept both as positions and byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Range {
    pub fn from_ts_node(node: &Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start: Position {
                line: start.row as u32,
                column: start.column as u32,
            },
            end: Position {
                line: end.row as u32,
                column: end.column as u32,
            },
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
        }
    }

    /// Whether `other` lies entirely inside this range.
    pub fn contains(&self, other: &Range) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }
}

/// One compilation unit: source text plus the tree parsed from it.
///
/// The tree is immutable for the whole analysis; every `Node` handed to the
/// rules borrows from it.
pub struct ParsedUnit {
    pub path: PathBuf,
    pub language: SourceLanguage,
    pub source: String,
    pub tree: Tree,
    pub error_count: u32,
}

impl ParsedUnit {
    pub fn source_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

impl std::fmt::Debug for ParsedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedUnit")
            .field("path", &self.path)
            .field("language", &self.language)
            .field("error_count", &self.error_count)
            .finish_non_exhaustive()
    }
}
