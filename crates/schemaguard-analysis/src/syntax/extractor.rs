//! Declarative object extractor.
//!
//! Reconstructs table facts from the literal arguments of a table constructor
//! without evaluating anything: the column object (or a function returning it)
//! and the extra builder whose returned object/array declares indexes.
//!
//! Two names per column are tracked. `property_name` is the object key used in
//! TypeScript (`userId`), `declared_name` is the schema identifier given to the
//! constructor (`user_id`). Index references resolve through `table.<key>`, so
//! they always name properties.

use std::collections::BTreeSet;

use serde::Serialize;
use tree_sitter::Node;

use super::chain::Chain;
use super::classifier::{IndexKind, TableCall, STRING_CONSTRUCTORS, UUID_CONSTRUCTORS};
use super::{call_arguments, named_children, node_text, object_pairs, string_value, unwrap_parens};
use crate::parsers::Range;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub property_name: String,
    pub declared_name: String,
    /// Whether `declared_name` came from a string literal rather than the key.
    pub name_is_explicit: bool,
    /// Root constructor of the column chain (`uuid`, `varchar`, ...).
    pub type_tag: String,
    pub is_primary_key: bool,
    pub is_unique: bool,
    pub location: Range,
}

impl ColumnSpec {
    pub fn has_inline_unique_or_primary_key(&self) -> bool {
        self.is_primary_key || self.is_unique
    }

    /// UUID constructor, or a string column whose name looks like an id.
    pub fn is_uuid_like(&self) -> bool {
        if UUID_CONSTRUCTORS.contains(&self.type_tag.as_str()) {
            return true;
        }
        if !STRING_CONSTRUCTORS.contains(&self.type_tag.as_str()) {
            return false;
        }
        let name = self.declared_name.to_ascii_lowercase();
        name.contains("uuid") || name.ends_with("_id") || name == "id"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDeclaration {
    pub index_name: String,
    pub kind: IndexKind,
    /// Column property names passed to `.on(...)`.
    pub referenced_properties: BTreeSet<String>,
    pub location: Range,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableDeclaration {
    pub name: String,
    pub location: Range,
    /// In declaration order; a repeated key replaces the earlier entry.
    pub columns: Vec<ColumnSpec>,
    pub indexes: Vec<IndexDeclaration>,
    pub rls_enabled: bool,
}

impl TableDeclaration {
    pub fn column(&self, property_name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.property_name == property_name)
    }

    pub fn is_indexed(&self, property_name: &str) -> bool {
        self.indexes
            .iter()
            .any(|idx| idx.referenced_properties.contains(property_name))
    }

    pub fn has_column_named(&self, names: &[&str]) -> bool {
        self.columns.iter().any(|c| {
            names.contains(&c.declared_name.as_str()) || names.contains(&c.property_name.as_str())
        })
    }
}

/// Build the full declaration for a classified table call.
pub fn extract_table(call: Node<'_>, table: &TableCall<'_>, source: &[u8]) -> TableDeclaration {
    TableDeclaration {
        name: table.name.clone(),
        location: Range::from_ts_node(&call),
        columns: table
            .columns
            .map(|node| extract_columns(node, source))
            .unwrap_or_default(),
        indexes: table
            .extra
            .map(|node| extract_indexes(node, source))
            .unwrap_or_default(),
        rls_enabled: table.rls_enabled,
    }
}

/// Columns from an object literal, or from a function returning one.
pub fn extract_columns(columns: Node<'_>, source: &[u8]) -> Vec<ColumnSpec> {
    let columns = unwrap_parens(columns);
    let object = if is_function(columns) {
        match returned_literal(columns) {
            Some(literal) => literal,
            None => return Vec::new(),
        }
    } else {
        columns
    };

    let mut specs: Vec<ColumnSpec> = Vec::new();
    for (key, value) in object_pairs(object, source) {
        let Some(spec) = column_spec(key, value, source) else {
            tracing::trace!(column = %node_text(value, source), "unrecognized column shape");
            continue;
        };
        match specs.iter_mut().find(|s| s.property_name == spec.property_name) {
            Some(existing) => *existing = spec,
            None => specs.push(spec),
        }
    }
    specs
}

fn column_spec(property_name: String, value: Node<'_>, source: &[u8]) -> Option<ColumnSpec> {
    let value = unwrap_parens(value);
    if value.kind() != "call_expression" {
        return None;
    }
    let chain = Chain::from_call(value, source);
    let root = chain.root()?;
    if root.method_name.is_empty() {
        return None;
    }

    let (declared_name, name_is_explicit) = match call_arguments(root.node)
        .first()
        .and_then(|arg| string_value(*arg, source))
    {
        Some(name) => (name, true),
        None => (property_name.clone(), false),
    };

    Some(ColumnSpec {
        declared_name,
        name_is_explicit,
        type_tag: root.method_name.clone(),
        is_primary_key: chain.contains("primaryKey"),
        is_unique: chain.contains("unique"),
        location: Range::from_ts_node(&value),
        property_name,
    })
}

/// Indexes declared by the extra builder `(table) => ({ ... })` or
/// `(table) => [ ... ]`, with either an expression or a block body.
pub fn extract_indexes(extra: Node<'_>, source: &[u8]) -> Vec<IndexDeclaration> {
    let extra = unwrap_parens(extra);
    if !is_function(extra) {
        return Vec::new();
    }
    let Some(param) = first_parameter_name(extra, source) else {
        return Vec::new();
    };
    let Some(literal) = returned_literal(extra) else {
        return Vec::new();
    };

    match literal.kind() {
        "object" => object_pairs(literal, source)
            .into_iter()
            .filter_map(|(key, value)| index_declaration(value, Some(&key), param, source))
            .collect(),
        "array" => named_children(literal)
            .into_iter()
            .filter_map(|element| index_declaration(element, None, param, source))
            .collect(),
        _ => Vec::new(),
    }
}

fn index_declaration(
    value: Node<'_>,
    key: Option<&str>,
    param: &str,
    source: &[u8],
) -> Option<IndexDeclaration> {
    let value = unwrap_parens(value);
    if value.kind() != "call_expression" {
        return None;
    }
    let chain = Chain::from_call(value, source);
    if !chain.contains("on") {
        return None;
    }
    let root = chain.root()?;

    let mut referenced_properties = BTreeSet::new();
    for segment in chain.segments().iter().filter(|s| s.method_name == "on") {
        for arg in call_arguments(segment.node) {
            if let Some(property) = parameter_property(arg, param, source) {
                referenced_properties.insert(property.to_string());
            }
        }
    }

    let index_name = call_arguments(root.node)
        .first()
        .and_then(|arg| string_value(*arg, source))
        .or_else(|| key.map(str::to_string))
        .unwrap_or_default();

    Some(IndexDeclaration {
        index_name,
        kind: IndexKind::from_builder(&root.method_name),
        referenced_properties,
        location: Range::from_ts_node(&value),
    })
}

/// `param.prop` -> `prop`.
fn parameter_property<'s>(arg: Node<'_>, param: &str, source: &'s [u8]) -> Option<&'s str> {
    let arg = unwrap_parens(arg);
    if arg.kind() != "member_expression" {
        return None;
    }
    let object = arg.child_by_field_name("object")?;
    if object.kind() != "identifier" || node_text(object, source) != param {
        return None;
    }
    let property = arg.child_by_field_name("property")?;
    Some(node_text(property, source))
}

fn is_function(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "arrow_function" | "function_expression" | "function"
    )
}

/// Name of the first parameter when it is a plain identifier.
pub fn first_parameter_name<'s>(function: Node<'_>, source: &'s [u8]) -> Option<&'s str> {
    if let Some(single) = function.child_by_field_name("parameter") {
        return (single.kind() == "identifier").then(|| node_text(single, source));
    }
    let params = function.child_by_field_name("parameters")?;
    let first = *named_children(params).first()?;
    let pattern = match first.kind() {
        "required_parameter" | "optional_parameter" => first.child_by_field_name("pattern")?,
        _ => first,
    };
    (pattern.kind() == "identifier").then(|| node_text(pattern, source))
}

/// The object or array literal a function evaluates to: its expression body,
/// or the argument of the first top-level `return` in a block body.
pub fn returned_literal(function: Node<'_>) -> Option<Node<'_>> {
    let body = unwrap_parens(function.child_by_field_name("body")?);
    let returned = match body.kind() {
        "statement_block" => {
            let ret = named_children(body)
                .into_iter()
                .find(|child| child.kind() == "return_statement")?;
            unwrap_parens(*named_children(ret).first()?)
        }
        _ => body,
    };
    matches!(returned.kind(), "object" | "array").then_some(returned)
}
