//! Whole-unit facts gathered during the forward pass.
//!
//! Tables, the tables that have row level security enabled, and the tables
//! that carry at least one policy. Raw statements can name a table before or
//! after its declaration, so these are only read once the walk is complete.

use std::sync::LazyLock;

use regex::Regex;
use schemaguard_core::types::collections::FxHashSet;
use tree_sitter::Node;

use crate::parsers::Range;
use crate::syntax::classifier::NodeCategory;
use crate::syntax::extractor::TableDeclaration;

static ENABLE_RLS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)ALTER\s+TABLE\s+(?:IF\s+EXISTS\s+)?(?:ONLY\s+)?(?:"?\w+"?\.)?"?(\w+)"?\s+ENABLE\s+ROW\s+LEVEL\s+SECURITY"#,
    )
    .unwrap()
});

static CREATE_POLICY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)CREATE\s+POLICY\s+(?:"[^"]*"|\S+)\s+ON\s+(?:"?\w+"?\.)?"?(\w+)"?"#,
    )
    .unwrap()
});

/// Table names enabled by `ALTER TABLE ... ENABLE ROW LEVEL SECURITY`.
pub fn rls_enabled_tables(statement: &str) -> impl Iterator<Item = &str> {
    ENABLE_RLS_RE
        .captures_iter(statement)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
}

/// Table names targeted by `CREATE POLICY ... ON <table>`.
pub fn policy_tables(statement: &str) -> impl Iterator<Item = &str> {
    CREATE_POLICY_RE
        .captures_iter(statement)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
}

#[derive(Debug, Default)]
pub struct UnitFacts {
    tables: Vec<TableDeclaration>,
    /// Lowercased names.
    rls_enabled: FxHashSet<String>,
    /// Lowercased names.
    policies: FxHashSet<String>,
}

impl UnitFacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record what `category` says about the unit. Table declarations are
    /// recorded separately through [`UnitFacts::record_table`].
    pub fn observe(&mut self, node: Node<'_>, category: &NodeCategory<'_>) {
        match category {
            NodeCategory::RawStatement(text) => self.observe_statement(text),
            NodeCategory::RlsEnable { table } => {
                self.rls_enabled.insert(table.to_lowercase());
            }
            NodeCategory::PolicyDeclaration => {
                let range = Range::from_ts_node(&node);
                match self.enclosing_table(&range).map(|t| t.name.to_lowercase()) {
                    Some(table) => {
                        self.policies.insert(table);
                    }
                    None => tracing::trace!(line = range.start.line, "policy outside any table"),
                }
            }
            _ => {}
        }
    }

    fn observe_statement(&mut self, text: &str) {
        for table in rls_enabled_tables(text) {
            self.rls_enabled.insert(table.to_lowercase());
        }
        for table in policy_tables(text) {
            self.policies.insert(table.to_lowercase());
        }
    }

    pub fn record_table(&mut self, table: TableDeclaration) {
        if table.rls_enabled {
            self.rls_enabled.insert(table.name.to_lowercase());
        }
        self.tables.push(table);
    }

    pub fn tables(&self) -> &[TableDeclaration] {
        &self.tables
    }

    /// Innermost recorded table whose declaration contains `range`.
    pub fn enclosing_table(&self, range: &Range) -> Option<&TableDeclaration> {
        self.tables
            .iter()
            .filter(|t| t.location.contains(range))
            .min_by_key(|t| t.location.end_byte - t.location.start_byte)
    }

    pub fn has_rls(&self, table: &str) -> bool {
        self.rls_enabled.contains(&table.to_lowercase())
    }

    pub fn has_policy(&self, table: &str) -> bool {
        self.policies.contains(&table.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_statement_variants() {
        let found: Vec<&str> = rls_enabled_tables(
            r#"ALTER TABLE users ENABLE ROW LEVEL SECURITY;
               alter table if exists only "public"."Accounts" enable row level security;
               ALTER TABLE sessions DISABLE ROW LEVEL SECURITY;"#,
        )
        .collect();
        assert_eq!(found, vec!["users", "Accounts"]);
    }

    #[test]
    fn policy_statements() {
        let found: Vec<&str> = policy_tables(
            "CREATE POLICY \"own rows\" ON public.profiles FOR SELECT USING (auth.uid() = id);\n\
             create policy p2\n  on payments using (true);",
        )
        .collect();
        assert_eq!(found, vec!["profiles", "payments"]);
    }

    #[test]
    fn quoted_policy_name_containing_on() {
        let found: Vec<&str> =
            policy_tables("CREATE POLICY \"read on own rows\" ON users FOR SELECT USING (true);")
                .collect();
        assert_eq!(found, vec!["users"]);

        let mut facts = UnitFacts::new();
        facts.observe_statement("ALTER TABLE users ENABLE ROW LEVEL SECURITY");
        facts.observe_statement("create policy \"edit on weekdays\" on public.users using (true)");
        assert!(facts.has_policy("users"));
        assert!(!facts.has_policy("weekdays"));
    }

    #[test]
    fn statement_without_table_name() {
        assert_eq!(rls_enabled_tables("ALTER TABLE  ENABLE ROW LEVEL SECURITY").count(), 0);
    }

    #[test]
    fn names_compare_case_insensitively() {
        let mut facts = UnitFacts::new();
        facts.observe_statement("ALTER TABLE Users ENABLE ROW LEVEL SECURITY");
        assert!(facts.has_rls("users"));
        assert!(!facts.has_policy("users"));
    }
}
