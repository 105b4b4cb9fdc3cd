//! Diagnostic reporter: findings accumulated during one unit's analysis.

use std::collections::BTreeMap;
use std::fmt;

use schemaguard_core::config::SeverityLevel;
use serde::{Deserialize, Serialize};

use crate::parsers::Range;
use crate::rules::RuleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Severity for a configured level; `None` when the rule is off.
    pub fn from_level(level: SeverityLevel) -> Option<Self> {
        match level {
            SeverityLevel::Error => Some(Self::Error),
            SeverityLevel::Warning => Some(Self::Warning),
            SeverityLevel::Off => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// Kind of finding. Each id owns a message template with `{{key}}` slots
/// filled from the diagnostic's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageId {
    MissingWhere,
    SelectStar,
    MissingUuidIndex,
    PreferUuidPrimaryKey,
    TableNotSnakeCase,
    ColumnNotSnakeCase,
    InvalidIndexName,
    MissingTimestampColumn,
    TooManyJoins,
    RlsBypass,
    MissingRls,
    MissingPolicy,
}

impl MessageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingWhere => "missingWhere",
            Self::SelectStar => "selectStar",
            Self::MissingUuidIndex => "missingUuidIndex",
            Self::PreferUuidPrimaryKey => "preferUuidPrimaryKey",
            Self::TableNotSnakeCase => "tableNotSnakeCase",
            Self::ColumnNotSnakeCase => "columnNotSnakeCase",
            Self::InvalidIndexName => "invalidIndexName",
            Self::MissingTimestampColumn => "missingTimestampColumn",
            Self::TooManyJoins => "tooManyJoins",
            Self::RlsBypass => "rlsBypass",
            Self::MissingRls => "missingRls",
            Self::MissingPolicy => "missingPolicy",
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            Self::MissingWhere => {
                "{{operation}} on {{table}} has no .where() clause and will affect every row"
            }
            Self::SelectStar => "Avoid .select() without arguments; list the columns the query needs",
            Self::MissingUuidIndex => "UUID column '{{column}}' on table '{{table}}' has no index",
            Self::PreferUuidPrimaryKey => {
                "Primary key '{{column}}' on table '{{table}}' uses {{type}}; prefer uuid"
            }
            Self::TableNotSnakeCase => "Table name '{{name}}' should be snake_case",
            Self::ColumnNotSnakeCase => "Column name '{{name}}' should be snake_case",
            Self::InvalidIndexName => "Index name '{{name}}' should match {{expected}}",
            Self::MissingTimestampColumn => "Table '{{table}}' is missing a '{{column}}' column",
            Self::TooManyJoins => "Query chain has {{count}} joins (max {{max}})",
            Self::RlsBypass => {
                "Row level security bypass via {{indicator}} needs a justification comment"
            }
            Self::MissingRls => {
                "Table '{{table}}' holds sensitive data but never enables row level security"
            }
            Self::MissingPolicy => {
                "Table '{{table}}' enables row level security but declares no policy"
            }
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule_id: RuleId,
    pub message_id: MessageId,
    pub severity: Severity,
    pub range: Range,
    pub data: BTreeMap<String, String>,
}

impl Diagnostic {
    /// Render the message template, substituting `{{key}}` from `data`.
    /// Unknown keys are left as written.
    pub fn message(&self) -> String {
        interpolate(self.message_id.template(), &self.data)
    }

    pub fn data_value(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

fn interpolate(template: &str, data: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => {
                let key = after[..close].trim();
                match data.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[open..open + 2 + close + 2]),
                }
                rest = &after[close + 2..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Append-only list of findings for one unit, in report order.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::Position;

    fn diagnostic(message_id: MessageId, data: &[(&str, &str)]) -> Diagnostic {
        Diagnostic {
            rule_id: RuleId::RequireRls,
            message_id,
            severity: Severity::Error,
            range: Range {
                start: Position { line: 0, column: 0 },
                end: Position { line: 0, column: 1 },
                start_byte: 0,
                end_byte: 1,
            },
            data: data
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn message_interpolates_data() {
        let d = diagnostic(MessageId::TooManyJoins, &[("count", "4"), ("max", "3")]);
        assert_eq!(d.message(), "Query chain has 4 joins (max 3)");
    }

    #[test]
    fn missing_keys_are_left_verbatim() {
        let d = diagnostic(MessageId::MissingRls, &[]);
        assert_eq!(
            d.message(),
            "Table '{{table}}' holds sensitive data but never enables row level security"
        );
    }

    #[test]
    fn message_ids_serialize_camel_case() {
        let json = serde_json::to_string(&MessageId::MissingUuidIndex).unwrap();
        assert_eq!(json, "\"missingUuidIndex\"");
        assert_eq!(MessageId::MissingUuidIndex.as_str(), "missingUuidIndex");
    }

    #[test]
    fn severity_from_level() {
        assert_eq!(Severity::from_level(SeverityLevel::Warning), Some(Severity::Warning));
        assert_eq!(Severity::from_level(SeverityLevel::Off), None);
    }
}
