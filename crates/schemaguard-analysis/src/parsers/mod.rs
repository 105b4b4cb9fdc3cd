//! Tree-sitter front end: turns TypeScript/JavaScript source into a `ParsedUnit`.

pub mod error_tolerant;
pub mod types;

use std::path::Path;
use std::time::Instant;

use schemaguard_core::errors::ParseError;
use serde::{Deserialize, Serialize};
use tree_sitter::{Language, Parser};

pub use types::{ParsedUnit, Position, Range};

/// Grammar used for a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceLanguage {
    TypeScript,
    /// TSX grammar; also used for plain JavaScript, which it parses as a superset.
    Tsx,
}

impl SourceLanguage {
    /// Pick the grammar from a file extension. Paths without an extension are
    /// treated as TypeScript.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_ascii_lowercase(),
            None => return Ok(Self::TypeScript),
        };
        match ext.as_str() {
            "ts" | "mts" | "cts" => Ok(Self::TypeScript),
            "tsx" | "js" | "jsx" | "mjs" | "cjs" => Ok(Self::Tsx),
            _ => Err(ParseError::UnsupportedLanguage { extension: ext }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
        }
    }

    fn ts_language(&self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Parse `source` with the grammar matching `path`.
pub fn parse_source(source: &str, path: &Path) -> Result<ParsedUnit, ParseError> {
    let start = Instant::now();
    let language = SourceLanguage::from_path(path)?;

    let mut parser = Parser::new();
    parser
        .set_language(&language.ts_language())
        .map_err(|e| ParseError::GrammarNotFound {
            language: language.name().to_string(),
            message: e.to_string(),
        })?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::TreeSitterError {
            path: path.to_path_buf(),
            message: "parser produced no tree".to_string(),
        })?;

    let error_count = error_tolerant::count_errors(tree.root_node());
    tracing::debug!(
        path = %path.display(),
        language = language.name(),
        error_count,
        parse_time_us = start.elapsed().as_micros() as u64,
        "parsed unit"
    );

    Ok(ParsedUnit {
        path: path.to_path_buf(),
        language,
        source: source.to_string(),
        tree,
        error_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_grammar_from_extension() {
        assert_eq!(
            SourceLanguage::from_path(Path::new("schema.ts")).unwrap(),
            SourceLanguage::TypeScript
        );
        assert_eq!(
            SourceLanguage::from_path(Path::new("page.tsx")).unwrap(),
            SourceLanguage::Tsx
        );
        assert_eq!(
            SourceLanguage::from_path(Path::new("db.mjs")).unwrap(),
            SourceLanguage::Tsx
        );
        assert!(SourceLanguage::from_path(Path::new("models.py")).is_err());
    }

    #[test]
    fn parses_clean_source() {
        let unit = parse_source("const x = db.select().from(users);", Path::new("q.ts")).unwrap();
        assert_eq!(unit.root().kind(), "program");
        assert!(!unit.has_errors());
    }

    #[test]
    fn tolerates_syntax_errors() {
        let unit = parse_source("const x = db.select(.from(users);", Path::new("q.ts")).unwrap();
        assert!(unit.has_errors());
    }
}
