// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph data files
//!
//! A data file lists loose nodes and triplets:
//!
//! ```yaml
//! nodes:
//!   - type: Person
//!     properties: {name: Jora}
//! triplets:
//!   - main: {type: Person, properties: {name: Jora}}
//!     edge: {type: friend, properties: {since: "2020-01-01T00:00:00Z"}}
//!     subject: {type: Person, properties: {name: Vasya}}
//! ```
//!
//! YAML has no datetime scalars and only string-friendly map keys, so
//! property values are coerced toward the types the schema declares.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use stg::schema::EntityKind;
use stg::validation::property::coerce;
use stg::{Edge, Node, Schema, Triplet, Value};

#[derive(Error, Debug)]
pub enum DataError {
    #[error("can't read data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data file {path} is malformed: {source}")]
    Syntax {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DataFile {
    #[serde(default)]
    nodes: Vec<EntityDef>,
    #[serde(default)]
    triplets: Vec<TripletDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntityDef {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    properties: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TripletDef {
    main: Option<EntityDef>,
    edge: Option<EntityDef>,
    subject: Option<EntityDef>,
}

/// Entities loaded from a data file, ready for validation
#[derive(Debug, Default)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub triplets: Vec<Triplet>,
}

impl GraphData {
    pub fn load(path: &Path, schema: &Schema) -> Result<Self, DataError> {
        let source = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source, schema).map_err(|source| DataError::Syntax {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(source: &str, schema: &Schema) -> Result<Self, serde_yaml::Error> {
        let file: DataFile = serde_yaml::from_str(source)?;
        let loader = Loader { schema };

        let nodes = file.nodes.into_iter().map(|def| loader.node(def)).collect();
        let triplets = file
            .triplets
            .into_iter()
            .map(|def| {
                Triplet::partial(
                    def.main.map(|d| loader.node(d)),
                    def.subject.map(|d| loader.node(d)),
                    def.edge.map(|d| loader.edge(d)),
                )
            })
            .collect();
        Ok(Self { nodes, triplets })
    }
}

struct Loader<'s> {
    schema: &'s Schema,
}

impl Loader<'_> {
    fn node(&self, def: EntityDef) -> Node {
        let properties = self.properties(EntityKind::Node, &def);
        Node::new(def.type_name, properties)
    }

    fn edge(&self, def: EntityDef) -> Edge {
        let properties = self.properties(EntityKind::Edge, &def);
        Edge::new(def.type_name, properties)
    }

    /// Convert property values, coercing those the schema declares
    fn properties(&self, kind: EntityKind, def: &EntityDef) -> Vec<(String, Value)> {
        let definition = self.schema.type_of(kind, &def.type_name);
        def.properties
            .iter()
            .map(|(key, raw)| {
                let value = from_yaml(raw);
                let value = match definition.and_then(|d| d.property_ignore_case(key)) {
                    Some(property) => coerce(&property.descriptor, value),
                    None => value,
                };
                (key.clone(), value)
            })
            .collect()
    }
}

fn from_yaml(value: &serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_yaml::Value::String(s) => Value::String(s.clone()),
        serde_yaml::Value::Sequence(items) => Value::Array(items.iter().map(from_yaml).collect()),
        serde_yaml::Value::Mapping(entries) => Value::Map(
            entries
                .iter()
                .map(|(k, v)| (from_yaml(k), from_yaml(v)))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => from_yaml(&tagged.value),
    }
}
