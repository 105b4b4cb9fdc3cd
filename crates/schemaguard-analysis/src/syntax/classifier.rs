//! Call-site classifier.
//!
//! Tags each call expression with a closed category by its syntactic shape.
//! Nothing is resolved: `pgTable` is a table constructor because of its name,
//! not because of where it was imported from.

use serde::Serialize;
use tree_sitter::Node;

use super::chain::receiver_call;
use super::{
    call_arguments, callee_identifier, callee_property, node_text, string_value, template_text,
    unwrap_parens,
};

pub const TABLE_CONSTRUCTORS: &[&str] = &["pgTable", "mysqlTable", "sqliteTable"];

/// Property on a table constructor that declares a table with RLS already on.
pub const TABLE_WITH_RLS: &str = "withRLS";

/// Method on a table declaration that enables RLS for it.
pub const ENABLE_RLS_METHOD: &str = "enableRLS";

pub const UUID_CONSTRUCTORS: &[&str] = &["uuid"];

pub const STRING_CONSTRUCTORS: &[&str] = &["varchar", "text", "char"];

pub const INTEGER_CONSTRUCTORS: &[&str] = &[
    "serial",
    "bigserial",
    "smallserial",
    "integer",
    "int",
    "bigint",
    "smallint",
];

/// Every constructor recognized as a column declaration.
pub const COLUMN_CONSTRUCTORS: &[&str] = &[
    "uuid",
    "varchar",
    "text",
    "char",
    "serial",
    "bigserial",
    "smallserial",
    "integer",
    "int",
    "bigint",
    "smallint",
    "boolean",
    "timestamp",
    "date",
    "time",
    "interval",
    "json",
    "jsonb",
    "numeric",
    "decimal",
    "real",
    "doublePrecision",
];

pub const JOIN_VERBS: &[&str] = &["leftJoin", "innerJoin", "rightJoin", "fullJoin"];

/// Verbs that put a bare `.select()` in a query context.
pub const QUERY_CONTEXT_VERBS: &[&str] = &[
    "from",
    "where",
    "orderBy",
    "limit",
    "offset",
    "leftJoin",
    "innerJoin",
    "rightJoin",
    "fullJoin",
];

pub const INDEX_BUILDERS: &[&str] = &["index", "uniqueIndex", "unique"];

pub const POLICY_BUILDERS: &[&str] = &["pgPolicy"];

/// Tag for templated raw statements (`sql\`...\``, `sql.raw(...)`).
pub const RAW_TAG: &str = "sql";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationVerb {
    Delete,
    Update,
}

impl MutationVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Update => "update",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Left,
    Inner,
    Right,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainVerb {
    Where,
    Set,
    From,
    OrderBy,
    Limit,
    Offset,
    Join(JoinKind),
    Select,
}

impl ChainVerb {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "where" => Self::Where,
            "set" => Self::Set,
            "from" => Self::From,
            "orderBy" => Self::OrderBy,
            "limit" => Self::Limit,
            "offset" => Self::Offset,
            "leftJoin" => Self::Join(JoinKind::Left),
            "innerJoin" => Self::Join(JoinKind::Inner),
            "rightJoin" => Self::Join(JoinKind::Right),
            "fullJoin" => Self::Join(JoinKind::Full),
            "select" => Self::Select,
            _ => return None,
        })
    }

    pub fn is_join(&self) -> bool {
        matches!(self, Self::Join(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Index,
    Unique,
}

impl IndexKind {
    pub fn from_builder(name: &str) -> Self {
        match name {
            "uniqueIndex" | "unique" => Self::Unique,
            _ => Self::Index,
        }
    }
}

/// A recognized table constructor call.
#[derive(Debug, Clone)]
pub struct TableCall<'t> {
    pub name: String,
    /// Second argument: the column object, or a function returning it.
    pub columns: Option<Node<'t>>,
    /// Third argument: the index/constraint builder.
    pub extra: Option<Node<'t>>,
    pub rls_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnCall {
    pub constructor: String,
    pub declared_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBuilderCall {
    pub kind: IndexKind,
    pub name: Option<String>,
}

/// Category of a visited node. Only call expressions get anything other than
/// `Other`.
#[derive(Debug, Clone)]
pub enum NodeCategory<'t> {
    TableDeclaration(TableCall<'t>),
    ColumnDeclaration(ColumnCall),
    MutatingRoot(MutationVerb),
    ChainSegment(ChainVerb),
    /// Reconstructed static text of a raw statement.
    RawStatement(String),
    IndexBuilder(IndexBuilderCall),
    PolicyDeclaration,
    /// `pgTable('name', ...).enableRLS()`.
    RlsEnable { table: String },
    Other,
}

/// Classify `node` by shape.
pub fn classify<'t>(node: Node<'t>, source: &[u8]) -> NodeCategory<'t> {
    if node.kind() != "call_expression" {
        return NodeCategory::Other;
    }

    if let Some(name) = callee_identifier(node, source) {
        return classify_identifier_call(node, name, source);
    }
    if let Some(property) = callee_property(node, source) {
        return classify_method_call(node, property, source);
    }
    NodeCategory::Other
}

fn classify_identifier_call<'t>(call: Node<'t>, name: &str, source: &[u8]) -> NodeCategory<'t> {
    if TABLE_CONSTRUCTORS.contains(&name) {
        return table_call(call, false, source).map_or(NodeCategory::Other, NodeCategory::TableDeclaration);
    }
    if name == RAW_TAG {
        return match call.child_by_field_name("arguments") {
            Some(template) if template.kind() == "template_string" => template_text(template, source)
                .map_or(NodeCategory::Other, NodeCategory::RawStatement),
            _ => NodeCategory::Other,
        };
    }
    if INDEX_BUILDERS.contains(&name) {
        return NodeCategory::IndexBuilder(IndexBuilderCall {
            kind: IndexKind::from_builder(name),
            name: first_string_argument(call, source),
        });
    }
    if POLICY_BUILDERS.contains(&name) {
        return NodeCategory::PolicyDeclaration;
    }
    if COLUMN_CONSTRUCTORS.contains(&name) {
        return NodeCategory::ColumnDeclaration(ColumnCall {
            constructor: name.to_string(),
            declared_name: first_string_argument(call, source),
        });
    }
    NodeCategory::Other
}

fn classify_method_call<'t>(call: Node<'t>, property: &str, source: &[u8]) -> NodeCategory<'t> {
    let object = call
        .child_by_field_name("function")
        .and_then(|f| f.child_by_field_name("object"));
    let object_name = object
        .filter(|o| o.kind() == "identifier")
        .map(|o| node_text(o, source));

    match property {
        TABLE_WITH_RLS if object_name.is_some_and(|o| TABLE_CONSTRUCTORS.contains(&o)) => {
            table_call(call, true, source).map_or(NodeCategory::Other, NodeCategory::TableDeclaration)
        }
        "raw" if object_name == Some(RAW_TAG) => call_arguments(call)
            .first()
            .and_then(|arg| raw_argument_text(*arg, source))
            .map_or(NodeCategory::Other, NodeCategory::RawStatement),
        ENABLE_RLS_METHOD => receiver_call(call)
            .filter(|receiver| {
                callee_identifier(*receiver, source).is_some_and(|n| TABLE_CONSTRUCTORS.contains(&n))
            })
            .and_then(|receiver| first_string_argument(receiver, source))
            .map_or(NodeCategory::Other, |table| NodeCategory::RlsEnable { table }),
        "delete" => NodeCategory::MutatingRoot(MutationVerb::Delete),
        "update" => NodeCategory::MutatingRoot(MutationVerb::Update),
        _ => ChainVerb::from_name(property).map_or(NodeCategory::Other, NodeCategory::ChainSegment),
    }
}

fn table_call<'t>(call: Node<'t>, rls_enabled: bool, source: &[u8]) -> Option<TableCall<'t>> {
    let args = call_arguments(call);
    let name = string_value(*args.first()?, source)?;
    Some(TableCall {
        name,
        columns: args.get(1).map(|n| unwrap_parens(*n)),
        extra: args.get(2).map(|n| unwrap_parens(*n)),
        rls_enabled,
    })
}

fn raw_argument_text(arg: Node<'_>, source: &[u8]) -> Option<String> {
    let arg = unwrap_parens(arg);
    match arg.kind() {
        "string" => string_value(arg, source),
        "template_string" => template_text(arg, source),
        _ => None,
    }
}

fn first_string_argument(call: Node<'_>, source: &[u8]) -> Option<String> {
    call_arguments(call)
        .first()
        .and_then(|arg| string_value(*arg, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::test_support::*;

    fn classify_first<'t>(unit: &'t crate::parsers::ParsedUnit, name: &str) -> NodeCategory<'t> {
        let call = find_call(unit.root(), unit.source_bytes(), name);
        classify(call, unit.source_bytes())
    }

    #[test]
    fn table_declaration_with_columns_and_extra() {
        let unit = parse("export const users = pgTable('users', { id: uuid('id') }, (t) => ({}));");
        match classify_first(&unit, "pgTable") {
            NodeCategory::TableDeclaration(table) => {
                assert_eq!(table.name, "users");
                assert_eq!(table.columns.unwrap().kind(), "object");
                assert_eq!(table.extra.unwrap().kind(), "arrow_function");
                assert!(!table.rls_enabled);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn table_without_literal_name_is_other() {
        let unit = parse("pgTable(name, {});");
        assert!(matches!(classify_first(&unit, "pgTable"), NodeCategory::Other));
    }

    #[test]
    fn with_rls_table() {
        let unit = parse("pgTable.withRLS('accounts', {});");
        match classify_first(&unit, "withRLS") {
            NodeCategory::TableDeclaration(table) => {
                assert_eq!(table.name, "accounts");
                assert!(table.rls_enabled);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn enable_rls_names_the_receiver_table() {
        let unit = parse("pgTable('sessions', {}).enableRLS();");
        match classify_first(&unit, "enableRLS") {
            NodeCategory::RlsEnable { table } => assert_eq!(table, "sessions"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn column_declaration() {
        let unit = parse("uuid('user_id'); text();");
        match classify_first(&unit, "uuid") {
            NodeCategory::ColumnDeclaration(col) => {
                assert_eq!(col.constructor, "uuid");
                assert_eq!(col.declared_name.as_deref(), Some("user_id"));
            }
            other => panic!("unexpected {other:?}"),
        }
        match classify_first(&unit, "text") {
            NodeCategory::ColumnDeclaration(col) => assert_eq!(col.declared_name, None),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn mutating_roots_and_verbs() {
        let unit = parse("db.update(users).set({ a: 1 }).where(x); db.select().from(t).fullJoin(u, y);");
        assert!(matches!(
            classify_first(&unit, "update"),
            NodeCategory::MutatingRoot(MutationVerb::Update)
        ));
        assert!(matches!(
            classify_first(&unit, "set"),
            NodeCategory::ChainSegment(ChainVerb::Set)
        ));
        assert!(matches!(
            classify_first(&unit, "fullJoin"),
            NodeCategory::ChainSegment(ChainVerb::Join(JoinKind::Full))
        ));
        assert!(matches!(
            classify_first(&unit, "select"),
            NodeCategory::ChainSegment(ChainVerb::Select)
        ));
    }

    #[test]
    fn raw_statements() {
        let unit = parse("sql`ALTER TABLE users ENABLE ROW LEVEL SECURITY`; sql.raw('CREATE POLICY p ON users');");
        match classify_first(&unit, "sql") {
            NodeCategory::RawStatement(text) => {
                assert_eq!(text, "ALTER TABLE users ENABLE ROW LEVEL SECURITY")
            }
            other => panic!("unexpected {other:?}"),
        }
        match classify_first(&unit, "raw") {
            NodeCategory::RawStatement(text) => assert_eq!(text, "CREATE POLICY p ON users"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn plain_sql_call_is_not_raw() {
        let unit = parse("sql('x');");
        assert!(matches!(classify_first(&unit, "sql"), NodeCategory::Other));
    }

    #[test]
    fn index_builders() {
        let unit = parse("uniqueIndex('uq_users_email'); index();");
        match classify_first(&unit, "uniqueIndex") {
            NodeCategory::IndexBuilder(b) => {
                assert_eq!(b.kind, IndexKind::Unique);
                assert_eq!(b.name.as_deref(), Some("uq_users_email"));
            }
            other => panic!("unexpected {other:?}"),
        }
        match classify_first(&unit, "index") {
            NodeCategory::IndexBuilder(b) => assert_eq!(b.name, None),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_calls_are_other() {
        let unit = parse("const x = users.id;");
        assert!(matches!(classify(unit.root(), unit.source_bytes()), NodeCategory::Other));
    }
}
