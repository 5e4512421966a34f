// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Typed graph entities: nodes, edges and their combinations
//!
//! Two entities are equal when their type names match and every property
//! holds an equal value. Property order never matters.

use std::collections::HashMap;

use crate::schema::types::EntityKind;
use crate::value::Value;

/// Shared read access to nodes and edges
pub trait Entity {
    fn kind(&self) -> EntityKind;
    fn type_name(&self) -> &str;
    fn properties(&self) -> &HashMap<String, Value>;

    fn property(&self, key: &str) -> Option<&Value> {
        self.properties().get(key)
    }

    /// Property keys in sorted order
    fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.properties().keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

fn collect_properties<K, V>(properties: impl IntoIterator<Item = (K, V)>) -> HashMap<String, Value>
where
    K: Into<String>,
    V: Into<Value>,
{
    properties
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// A graph vertex instance
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    type_name: String,
    properties: HashMap<String, Value>,
}

impl Node {
    pub fn new<K, V>(type_name: impl Into<String>, properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            type_name: type_name.into(),
            properties: collect_properties(properties),
        }
    }

    /// A node without properties
    pub fn empty(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl Entity for Node {
    fn kind(&self) -> EntityKind {
        EntityKind::Node
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn properties(&self) -> &HashMap<String, Value> {
        &self.properties
    }
}

/// A directed graph connector instance
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    type_name: String,
    properties: HashMap<String, Value>,
}

impl Edge {
    pub fn new<K, V>(type_name: impl Into<String>, properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            type_name: type_name.into(),
            properties: collect_properties(properties),
        }
    }

    pub fn empty(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl Entity for Edge {
    fn kind(&self) -> EntityKind {
        EntityKind::Edge
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn properties(&self) -> &HashMap<String, Value> {
        &self.properties
    }
}

/// One directed connection: `main -edge-> subject`.
///
/// Parts may be absent; graph insertion gives partial triplets their own
/// meaning, while validation requires all three.
#[derive(Debug, Clone, PartialEq)]
pub struct Triplet {
    pub main: Option<Node>,
    pub edge: Option<Edge>,
    pub subject: Option<Node>,
}

impl Triplet {
    pub fn new(main: Node, subject: Node, edge: Edge) -> Self {
        Self {
            main: Some(main),
            edge: Some(edge),
            subject: Some(subject),
        }
    }

    pub fn partial(main: Option<Node>, subject: Option<Node>, edge: Option<Edge>) -> Self {
        Self {
            main,
            edge,
            subject,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.main.is_some() && self.edge.is_some() && self.subject.is_some()
    }
}

/// A node and an edge whose other endpoint is left implicit
#[derive(Debug, Clone, PartialEq)]
pub struct Duplet {
    pub node: Node,
    pub edge: Edge,
}

impl Duplet {
    pub fn new(node: Node, edge: Edge) -> Self {
        Self { node, edge }
    }
}
