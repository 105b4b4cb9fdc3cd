//! Single-pass analysis engine.
//!
//! Walks the unit once in pre-order. Each node is classified, folded into the
//! unit facts, then offered to every enabled rule. After the walk the rules'
//! finalize hooks run, in registry order. All state is created per call, so
//! analyzing the same unit twice gives the same diagnostics.

pub mod facts;
pub mod walker;

use std::time::Instant;

use schemaguard_core::SchemaGuardConfig;
use tree_sitter::Node;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::parsers::ParsedUnit;
use crate::rules::{RuleSet, Site};
use crate::syntax::chain::Chain;
use crate::syntax::classifier::{classify, NodeCategory};
use crate::syntax::extractor::extract_table;

use self::facts::UnitFacts;

/// Per-unit state: the facts gathered so far and the findings reported so far.
#[derive(Debug, Default)]
pub struct UnitState {
    pub facts: UnitFacts,
    pub diagnostics: DiagnosticSink,
}

impl UnitState {
    fn visit(&mut self, node: Node<'_>, source: &[u8], rules: &mut RuleSet) {
        let category = classify(node, source);
        self.facts.observe(node, &category);

        let is_table = match &category {
            NodeCategory::TableDeclaration(table) => {
                self.facts.record_table(extract_table(node, table, source));
                true
            }
            _ => false,
        };

        let chain = match &category {
            NodeCategory::MutatingRoot(_) | NodeCategory::ChainSegment(_) => {
                Some(Chain::from_call(node, source))
            }
            _ => None,
        };

        let site = Site {
            node,
            category: &category,
            table: if is_table { self.facts.tables().last() } else { None },
            chain: chain.as_ref(),
        };
        rules.check(&site, source, &self.facts, &mut self.diagnostics);
    }
}

/// Runs the configured rules over parsed units.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: SchemaGuardConfig,
}

impl Engine {
    pub fn new(config: &SchemaGuardConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &SchemaGuardConfig {
        &self.config
    }

    /// Analyze one unit and return its diagnostics in report order.
    pub fn analyze(&self, unit: &ParsedUnit) -> Vec<Diagnostic> {
        let start = Instant::now();
        let source = unit.source_bytes();
        let mut rules = RuleSet::from_config(&self.config);
        let mut state = UnitState::default();

        walker::walk(unit.root(), |node| state.visit(node, source, &mut rules));
        rules.finalize(source, &state.facts, &mut state.diagnostics);

        tracing::debug!(
            path = %unit.path.display(),
            rules = rules.len(),
            tables = state.facts.tables().len(),
            diagnostics = state.diagnostics.len(),
            parse_errors = unit.error_count,
            elapsed_us = start.elapsed().as_micros() as u64,
            "analyzed unit"
        );
        state.diagnostics.into_vec()
    }
}
