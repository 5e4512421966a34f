// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Schema module - graph template definitions and their resolution
//
// A schema is parsed from a YAML template into node types, edge types and
// connection rules. Labels are resolved away during building; the result
// is an immutable `Schema` that can be shared across validating threads.

pub mod builder;
pub(crate) mod context;
pub mod document;
pub mod types;

pub use builder::{parse_schema, SchemaBuilder};
pub use types::{
    Cardinality, Connection, DataType, EntityKind, Property, Restriction, RestrictionError,
    RestrictionKind, TypeDefinition, TypeDescriptor, TypeError, UNBOUNDED,
};

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use thiserror::Error;

/// Result alias for schema loading
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema loading errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("template >> can't read schema source: {0}")]
    Io(#[from] std::io::Error),

    #[error("template >> .yaml parsing error: {0}")]
    Syntax(#[from] serde_yaml::Error),

    #[error("template >> there are no edge definitions")]
    NoEdges,

    #[error("template >> there are no node definitions")]
    NoNodes,

    #[error("{0}")]
    Invalid(SchemaIssues),
}

impl SchemaError {
    /// Issues accumulated while building, empty for loading failures
    pub fn issues(&self) -> &[SchemaIssue] {
        match self {
            SchemaError::Invalid(issues) => issues.as_slice(),
            _ => &[],
        }
    }
}

/// Location of a definition inside the template, e.g.
/// `template | nodes | Person | properties | age`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SchemaPath(Vec<String>);

impl SchemaPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend the path by one segment
    pub fn join(&self, segment: impl ToString) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("template")?;
        for segment in &self.0 {
            write!(f, " | {}", segment)?;
        }
        Ok(())
    }
}

/// A single problem found while building a schema
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaIssue {
    pub path: SchemaPath,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(path: SchemaPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} >> {}", self.path, self.message)
    }
}

/// Every issue of a failed build, one per line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaIssues(Vec<SchemaIssue>);

impl SchemaIssues {
    /// Issues are ordered by their rendered text so that reports do not
    /// depend on builder scheduling
    pub fn new(mut issues: Vec<SchemaIssue>) -> Self {
        issues.sort_by_cached_key(|issue| issue.to_string());
        Self(issues)
    }

    pub fn as_slice(&self) -> &[SchemaIssue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SchemaIssue> {
        self.0.iter()
    }
}

impl fmt::Display for SchemaIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SchemaIssues {
    type Item = &'a SchemaIssue;
    type IntoIter = std::slice::Iter<'a, SchemaIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// main type -> subject type -> edge type -> bounds
pub(crate) type ConnectionTable = HashMap<String, HashMap<String, HashMap<String, Cardinality>>>;

/// Resolved schema: node types, edge types and connection rules with
/// labels already folded into the nodes wearing them
#[derive(Debug, Clone, Default)]
pub struct Schema {
    nodes: HashMap<String, TypeDefinition>,
    edges: HashMap<String, TypeDefinition>,
    connections: ConnectionTable,
}

impl Schema {
    pub(crate) fn from_parts(
        nodes: HashMap<String, TypeDefinition>,
        edges: HashMap<String, TypeDefinition>,
        connections: ConnectionTable,
    ) -> Self {
        Self {
            nodes,
            edges,
            connections,
        }
    }

    /// Parse and resolve a schema from an already opened source
    pub fn from_reader<R: Read>(reader: R) -> SchemaResult<Self> {
        parse_schema(reader)
    }

    pub fn node_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.nodes.get(name)
    }

    pub fn edge_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.edges.get(name)
    }

    /// Type of the given kind
    pub fn type_of(&self, kind: EntityKind, name: &str) -> Option<&TypeDefinition> {
        match kind {
            EntityKind::Node => self.node_type(name),
            EntityKind::Edge => self.edge_type(name),
        }
    }

    pub fn node_types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.nodes.values()
    }

    pub fn edge_types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.edges.values()
    }

    /// Bounds of the rule for edges of type `edge` from `main` to `subject`
    pub fn connection(&self, main: &str, subject: &str, edge: &str) -> Option<Cardinality> {
        self.connections
            .get(main)
            .and_then(|by_subject| by_subject.get(subject))
            .and_then(|by_edge| by_edge.get(edge))
            .copied()
    }

    /// All rules with `main` as main type, ordered by subject then edge
    pub fn connections_from(&self, main: &str) -> Vec<Connection> {
        let mut result: Vec<Connection> = self
            .connections
            .get(main)
            .into_iter()
            .flat_map(|by_subject| {
                by_subject.iter().flat_map(move |(subject, by_edge)| {
                    by_edge.iter().map(move |(edge, bounds)| Connection {
                        main: main.to_string(),
                        subject: subject.clone(),
                        edge: edge.clone(),
                        bounds: *bounds,
                    })
                })
            })
            .collect();
        result.sort_by(|a, b| (&a.subject, &a.edge).cmp(&(&b.subject, &b.edge)));
        result
    }

    /// Every connection rule, ordered by main, subject and edge
    pub fn connections(&self) -> Vec<Connection> {
        let mut mains: Vec<&String> = self.connections.keys().collect();
        mains.sort();
        mains
            .into_iter()
            .flat_map(|main| self.connections_from(main))
            .collect()
    }

    /// Whether any rule uses `edge` with `node` on either end
    pub fn has_connection_involving(&self, node: &str, edge: &str) -> bool {
        self.connections.iter().any(|(main, by_subject)| {
            by_subject.iter().any(|(subject, by_edge)| {
                (main == node || subject == node) && by_edge.contains_key(edge)
            })
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections
            .values()
            .flat_map(|by_subject| by_subject.values())
            .map(|by_edge| by_edge.len())
            .sum()
    }
}

impl FromStr for Schema {
    type Err = SchemaError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        parse_schema(source.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_rendering() {
        let path = SchemaPath::root().join("nodes").join("Person").join(1);
        assert_eq!(path.to_string(), "template | nodes | Person | 1");
        assert_eq!(SchemaPath::root().to_string(), "template");
    }

    #[test]
    fn test_issues_are_sorted_and_newline_joined() {
        let issues = SchemaIssues::new(vec![
            SchemaIssue::new(SchemaPath::root().join("nodes"), "second"),
            SchemaIssue::new(SchemaPath::root().join("edges"), "first"),
        ]);
        assert_eq!(
            issues.to_string(),
            "template | edges >> first\ntemplate | nodes >> second"
        );
    }
}
