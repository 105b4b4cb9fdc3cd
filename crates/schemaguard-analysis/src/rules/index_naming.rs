//! Index names follow `idx_<table>_<cols>` / `uq_<table>_<cols>`.
//!
//! Two gates. Every literal index name must have the generic
//! `{idx|uq|uk}_segment(_segment)*` shape. Inside a table declaration the
//! name must also carry that table's prefix.

use std::sync::LazyLock;

use regex::Regex;

use crate::diagnostics::MessageId;
use crate::parsers::Range;
use crate::syntax::classifier::NodeCategory;

use super::{Rule, RuleContext, RuleId, Site};

static INDEX_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(idx|uq|uk)_[a-z0-9]+(_[a-z0-9]+)*$").unwrap());

const GENERIC_SHAPE: &str = "{idx|uq|uk}_<table>_<columns>";

#[derive(Default)]
pub struct IndexNamingRule {
    /// Most recent table declaration; replaced by each new one.
    current_table: Option<(String, Range)>,
}

impl IndexNamingRule {
    fn table_for(&self, range: &Range) -> Option<&str> {
        self.current_table
            .as_ref()
            .filter(|(_, table_range)| table_range.contains(range))
            .map(|(name, _)| name.as_str())
    }
}

/// Returns the expected shape when `name` fails a gate.
pub fn naming_violation(name: &str, table: Option<&str>) -> Option<String> {
    if !INDEX_NAME.is_match(name) {
        return Some(GENERIC_SHAPE.to_string());
    }
    let table = table?;
    let prefixes = [format!("idx_{table}_"), format!("uq_{table}_")];
    if prefixes.iter().any(|p| name.starts_with(p.as_str())) {
        None
    } else {
        Some(format!("idx_{table}_<columns> or uq_{table}_<columns>"))
    }
}

impl Rule for IndexNamingRule {
    fn id(&self) -> RuleId {
        RuleId::IndexNaming
    }

    fn check(&mut self, site: &Site<'_, '_>, cx: &mut RuleContext<'_>) {
        match site.category {
            NodeCategory::TableDeclaration(_) => {
                if let Some(table) = site.table {
                    self.current_table = Some((table.name.clone(), table.location));
                }
            }
            NodeCategory::IndexBuilder(builder) => {
                let Some(name) = builder.name.as_deref() else {
                    return;
                };
                let range = Range::from_ts_node(&site.node);
                if let Some(expected) = naming_violation(name, self.table_for(&range)) {
                    cx.report(
                        MessageId::InvalidIndexName,
                        range,
                        [("name", name.to_string()), ("expected", expected)],
                    );
                }
            }
            _ => {}
        }
    }
}
