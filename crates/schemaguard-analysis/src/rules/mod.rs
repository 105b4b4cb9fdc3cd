//! The eleven per-check analyzers.
//!
//! Immediate rules report from `check` while the unit is walked. Rules whose
//! verdict depends on facts from anywhere in the unit report from `finalize`,
//! which runs once after the walk in registry order.

pub mod index_naming;
pub mod join_complexity;
pub mod mutations;
pub mod naming;
pub mod require_rls;
pub mod rls_bypass;
pub mod select_star;
pub mod sensitivity;
pub mod timestamps;
pub mod uuid_index;
pub mod uuid_primary_key;

use std::collections::BTreeMap;
use std::fmt;

use schemaguard_core::SchemaGuardConfig;
use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use crate::diagnostics::{Diagnostic, DiagnosticSink, MessageId, Severity};
use crate::engine::facts::UnitFacts;
use crate::parsers::Range;
use crate::syntax::chain::Chain;
use crate::syntax::classifier::NodeCategory;
use crate::syntax::extractor::TableDeclaration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    NoDeleteWithoutWhere,
    NoUpdateWithoutWhere,
    NoSelectStar,
    RequireUuidIndex,
    PreferUuidPrimaryKey,
    SnakeCaseNaming,
    IndexNaming,
    RequireTimestampColumns,
    JoinComplexityLimit,
    NoRlsBypass,
    RequireRls,
}

impl RuleId {
    pub const ALL: [RuleId; 11] = [
        Self::NoDeleteWithoutWhere,
        Self::NoUpdateWithoutWhere,
        Self::NoSelectStar,
        Self::RequireUuidIndex,
        Self::PreferUuidPrimaryKey,
        Self::SnakeCaseNaming,
        Self::IndexNaming,
        Self::RequireTimestampColumns,
        Self::JoinComplexityLimit,
        Self::NoRlsBypass,
        Self::RequireRls,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoDeleteWithoutWhere => "no-delete-without-where",
            Self::NoUpdateWithoutWhere => "no-update-without-where",
            Self::NoSelectStar => "no-select-star",
            Self::RequireUuidIndex => "require-uuid-index",
            Self::PreferUuidPrimaryKey => "prefer-uuid-primary-key",
            Self::SnakeCaseNaming => "snake-case-naming",
            Self::IndexNaming => "index-naming",
            Self::RequireTimestampColumns => "require-timestamp-columns",
            Self::JoinComplexityLimit => "join-complexity-limit",
            Self::NoRlsBypass => "no-rls-bypass",
            Self::RequireRls => "require-rls",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Self::NoDeleteWithoutWhere
            | Self::NoUpdateWithoutWhere
            | Self::NoRlsBypass
            | Self::RequireRls => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A visited node as the rules see it.
pub struct Site<'a, 't> {
    pub node: Node<'t>,
    pub category: &'a NodeCategory<'t>,
    /// The extracted declaration, for table declarations.
    pub table: Option<&'a TableDeclaration>,
    /// The linearized chain, for mutating roots and chain segments.
    pub chain: Option<&'a Chain<'t>>,
}

/// What a rule may read and where it reports.
pub struct RuleContext<'a> {
    pub source: &'a [u8],
    pub facts: &'a UnitFacts,
    sink: &'a mut DiagnosticSink,
    rule: RuleId,
    severity: Severity,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        source: &'a [u8],
        facts: &'a UnitFacts,
        sink: &'a mut DiagnosticSink,
        rule: RuleId,
        severity: Severity,
    ) -> Self {
        Self {
            source,
            facts,
            sink,
            rule,
            severity,
        }
    }

    pub fn report<K, V>(
        &mut self,
        message_id: MessageId,
        range: Range,
        data: impl IntoIterator<Item = (K, V)>,
    ) where
        K: Into<String>,
        V: Into<String>,
    {
        let data: BTreeMap<String, String> = data
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.sink.push(Diagnostic {
            rule_id: self.rule,
            message_id,
            severity: self.severity,
            range,
            data,
        });
    }
}

pub trait Rule: Send {
    fn id(&self) -> RuleId;

    /// Called for every visited node, in pre-order.
    fn check(&mut self, site: &Site<'_, '_>, cx: &mut RuleContext<'_>);

    /// Called once after the whole unit has been visited.
    fn finalize(&mut self, _cx: &mut RuleContext<'_>) {}
}

/// Enabled rules with their effective severities, in registry order.
pub struct RuleSet {
    rules: Vec<(Box<dyn Rule>, Severity)>,
}

impl RuleSet {
    /// Build a fresh set of rules. Rule state lives for one unit, so a new set
    /// is built per analysis.
    pub fn from_config(config: &SchemaGuardConfig) -> Self {
        let rules_config = &config.rules;
        let all: Vec<Box<dyn Rule>> = vec![
            Box::new(mutations::MissingWhereRule::delete()),
            Box::new(mutations::MissingWhereRule::update()),
            Box::new(select_star::SelectStarRule),
            Box::new(uuid_index::UuidIndexRule::new(&rules_config.uuid_index)),
            Box::new(uuid_primary_key::UuidPrimaryKeyRule),
            Box::new(naming::SnakeCaseRule),
            Box::new(index_naming::IndexNamingRule::default()),
            Box::new(timestamps::TimestampColumnsRule::new(&rules_config.timestamps)),
            Box::new(join_complexity::JoinComplexityRule::new(&rules_config.join_complexity)),
            Box::new(rls_bypass::RlsBypassRule),
            Box::new(require_rls::RequireRlsRule::new(&rules_config.require_rls)),
        ];

        let rules = all
            .into_iter()
            .filter_map(|rule| {
                let id = rule.id();
                let severity = match rules_config.severity_override(id.as_str()) {
                    Some(level) => Severity::from_level(level)?,
                    None => id.default_severity(),
                };
                Some((rule, severity))
            })
            .collect();
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn ids(&self) -> Vec<RuleId> {
        self.rules.iter().map(|(rule, _)| rule.id()).collect()
    }

    pub fn check(
        &mut self,
        site: &Site<'_, '_>,
        source: &[u8],
        facts: &UnitFacts,
        sink: &mut DiagnosticSink,
    ) {
        for (rule, severity) in &mut self.rules {
            let mut cx = RuleContext::new(source, facts, sink, rule.id(), *severity);
            rule.check(site, &mut cx);
        }
    }

    pub fn finalize(&mut self, source: &[u8], facts: &UnitFacts, sink: &mut DiagnosticSink) {
        for (rule, severity) in &mut self.rules {
            let mut cx = RuleContext::new(source, facts, sink, rule.id(), *severity);
            rule.finalize(&mut cx);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use schemaguard_core::SchemaGuardConfig;

    use crate::diagnostics::Diagnostic;
    use crate::engine::Engine;
    use crate::syntax::test_support::parse;

    use super::RuleId;

    /// Diagnostics from `rule` only, with the default config.
    pub fn run_rule(rule: RuleId, source: &str) -> Vec<Diagnostic> {
        run_rule_with(rule, source, &SchemaGuardConfig::default())
    }

    pub fn run_rule_with(rule: RuleId, source: &str, config: &SchemaGuardConfig) -> Vec<Diagnostic> {
        let unit = parse(source);
        Engine::new(config)
            .analyze(&unit)
            .into_iter()
            .filter(|d| d.rule_id == rule)
            .collect()
    }
}
