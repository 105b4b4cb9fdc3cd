//! # schemaguard-analysis
//!
//! Static advisory engine for Drizzle-style schema and query builder code.
//! Parses TypeScript/JavaScript with tree-sitter, classifies call sites by
//! shape and runs eleven checks over one unit at a time.
//!
//! ## Pipeline
//! 1. **Parse**: source text to a `ParsedUnit` (error tolerant)
//! 2. **Walk**: single pre-order pass; each node is classified and offered to the rules
//! 3. **Finalize**: rules that need whole-unit facts report after the walk
//! 4. **Report**: diagnostics rendered by a `Reporter` (console or JSON)

pub mod diagnostics;
pub mod engine;
pub mod parsers;
pub mod reporters;
pub mod rules;
pub mod syntax;

use std::path::{Path, PathBuf};

use schemaguard_core::errors::{AnalysisError, ParseError};
use schemaguard_core::SchemaGuardConfig;
use serde::Serialize;

pub use diagnostics::{Diagnostic, MessageId, Severity};
pub use engine::Engine;
pub use parsers::{parse_source, ParsedUnit, Range};
pub use reporters::{create_reporter, Reporter};
pub use rules::RuleId;

/// Diagnostics for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Parse and analyze in-memory source. `path` selects the grammar and labels
/// the report.
pub fn analyze_source(
    source: &str,
    path: &Path,
    config: &SchemaGuardConfig,
) -> Result<FileReport, ParseError> {
    let unit = parse_source(source, path)?;
    let diagnostics = Engine::new(config).analyze(&unit);
    Ok(FileReport {
        file: path.to_path_buf(),
        diagnostics,
    })
}

/// Read, parse and analyze a file.
pub fn analyze_file(path: &Path, config: &SchemaGuardConfig) -> Result<FileReport, AnalysisError> {
    let source = std::fs::read_to_string(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(analyze_source(&source, path, config)?)
}
