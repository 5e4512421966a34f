// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Structural validation of values that are not graph entities
//
// An unknown value is matched to a node or edge type by its own type name,
// or failing that by a field whose value names a type. Fields are then
// matched to the type's properties case-insensitively.

use serde::Serialize;

use super::property::{coerce, evaluate};
use super::validator::check_keys;
use super::{Outcome, ValidationError, ValidationResult};
use crate::schema::types::{EntityKind, TypeDefinition};
use crate::schema::Schema;
use crate::value::Value;

/// Shape of an unknown value
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Named fields, as in a struct or a string-keyed map
    Record(Vec<(String, Value)>),
    /// Anything else; holds a short description of what it was
    Other(String),
}

/// A value to be validated by its shape rather than by declared identity
#[derive(Debug, Clone, PartialEq)]
pub struct Unknown {
    pub type_name: Option<String>,
    pub shape: Shape,
}

impl Unknown {
    /// A record without a type name of its own
    pub fn record<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            type_name: None,
            shape: Shape::Record(
                fields
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// A record carrying its own type name
    pub fn named<K, V>(type_name: impl Into<String>, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            type_name: Some(type_name.into()),
            ..Self::record(fields)
        }
    }

    /// Decode a JSON value; only objects become records
    pub fn from_json(value: serde_json::Value) -> Self {
        let shape = match value {
            serde_json::Value::Object(fields) => Shape::Record(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
            other => Shape::Other(json_kind(&other).to_string()),
        };
        Self {
            type_name: None,
            shape,
        }
    }

    /// Introspect any serializable Rust value. The last path segment of
    /// the Rust type name, without generics, becomes the type name.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        let type_name = short_type_name(std::any::type_name::<T>());
        let mut unknown = match serde_json::to_value(value) {
            Ok(json) => Self::from_json(json),
            Err(err) => Self {
                type_name: None,
                shape: Shape::Other(format!("unserializable value ({})", err)),
            },
        };
        unknown.type_name = Some(type_name);
        unknown
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// How a candidate type was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Found {
    ByTypeName,
    ByValue,
}

/// Validate an unknown value as a node and as an edge
pub(crate) fn validate_unknown(schema: &Schema, unknown: &Unknown) -> ValidationResult<Outcome> {
    let fields = match &unknown.shape {
        Shape::Record(fields) => fields,
        Shape::Other(kind) => return Err(ValidationError::UnsupportedShape(kind.clone())),
    };

    let (as_node, as_edge) = find_candidates(schema, unknown.type_name.as_deref(), fields);
    if as_node.is_none() && as_edge.is_none() {
        log::trace!("No type matches unknown value {:?}", unknown.type_name);
        return Err(ValidationError::NoMatchingType);
    }

    let node_result = as_node.map(|(t, found)| validate_as(t, found, fields));
    let edge_result = as_edge.map(|(t, found)| validate_as(t, found, fields));

    match (node_result, edge_result) {
        (Some(Ok(())), Some(Ok(()))) => Ok(Outcome::ValidAsNodeAndEdge),
        (Some(Ok(())), _) => Ok(Outcome::ValidAsNode),
        (_, Some(Ok(()))) => Ok(Outcome::ValidAsEdge),
        (node, edge) => Err(ValidationError::StructuralMismatch {
            as_node: describe_failure(node, EntityKind::Node),
            as_edge: describe_failure(edge, EntityKind::Edge),
        }),
    }
}

fn describe_failure(result: Option<ValidationResult<()>>, kind: EntityKind) -> String {
    match result {
        Some(Err(err)) => err.to_string(),
        _ => format!("there is no such {} type in the schema", kind),
    }
}

type Candidate<'s> = Option<(&'s TypeDefinition, Found)>;

fn find_candidates<'s>(
    schema: &'s Schema,
    type_name: Option<&str>,
    fields: &[(String, Value)],
) -> (Candidate<'s>, Candidate<'s>) {
    if let Some(name) = type_name {
        let as_node = schema.node_type(name).map(|t| (t, Found::ByTypeName));
        let as_edge = schema.edge_type(name).map(|t| (t, Found::ByTypeName));
        if as_node.is_some() || as_edge.is_some() {
            return (as_node, as_edge);
        }
    }

    let mut as_node = None;
    let mut as_edge = None;
    for (_, value) in fields {
        if let Some(name) = value.as_str() {
            if as_node.is_none() {
                as_node = schema.node_type(name).map(|t| (t, Found::ByValue));
            }
            if as_edge.is_none() {
                as_edge = schema.edge_type(name).map(|t| (t, Found::ByValue));
            }
        }
    }
    (as_node, as_edge)
}

fn validate_as(
    definition: &TypeDefinition,
    found: Found,
    fields: &[(String, Value)],
) -> ValidationResult<()> {
    let embeds_type = |value: &Value| {
        found == Found::ByValue && value.as_str() == Some(definition.name.as_str())
    };
    let fields: Vec<&(String, Value)> = fields.iter().filter(|(_, v)| !embeds_type(v)).collect();

    let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
    let matched = check_keys(definition, keys)?;

    for (key, property) in matched {
        let value = fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or(Value::Null);
        let value = coerce(&property.descriptor, value);
        evaluate(property, &value).map_err(|source| ValidationError::Property {
            kind: definition.kind,
            type_name: definition.name.clone(),
            property: property.name.clone(),
            source,
        })?;
    }
    Ok(())
}
