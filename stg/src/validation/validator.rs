// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Schema validator implementation

use std::collections::HashMap;

use super::entity::{Duplet, Edge, Entity, Node, Triplet};
use super::property::evaluate;
use super::structural::{validate_unknown, Unknown};
use super::{Role, ValidationError, ValidationResult};
use crate::graph::Graph;
use crate::schema::types::{Property, TypeDefinition};
use crate::schema::Schema;

/// Anything the validator accepts
#[derive(Debug, Clone, Copy)]
pub enum Validatable<'a> {
    Node(&'a Node),
    Edge(&'a Edge),
    Triplet(&'a Triplet),
    Duplet(&'a Duplet),
    Graph(&'a Graph),
    Unknown(&'a Unknown),
}

impl<'a> From<&'a Node> for Validatable<'a> {
    fn from(node: &'a Node) -> Self {
        Validatable::Node(node)
    }
}

impl<'a> From<&'a Edge> for Validatable<'a> {
    fn from(edge: &'a Edge) -> Self {
        Validatable::Edge(edge)
    }
}

impl<'a> From<&'a Triplet> for Validatable<'a> {
    fn from(triplet: &'a Triplet) -> Self {
        Validatable::Triplet(triplet)
    }
}

impl<'a> From<&'a Duplet> for Validatable<'a> {
    fn from(duplet: &'a Duplet) -> Self {
        Validatable::Duplet(duplet)
    }
}

impl<'a> From<&'a Graph> for Validatable<'a> {
    fn from(graph: &'a Graph) -> Self {
        Validatable::Graph(graph)
    }
}

impl<'a> From<&'a Unknown> for Validatable<'a> {
    fn from(unknown: &'a Unknown) -> Self {
        Validatable::Unknown(unknown)
    }
}

/// What a successful validation established
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Valid,
    ValidAsNode,
    ValidAsEdge,
    ValidAsNodeAndEdge,
}

/// Validate any supported value against a schema
pub fn validate<'a>(schema: &Schema, value: impl Into<Validatable<'a>>) -> ValidationResult<Outcome> {
    Validator::new(schema).validate(value)
}

/// Validates graph data against one resolved schema. Holds no state
/// besides the schema reference, so it can be copied freely across threads.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'s> {
    schema: &'s Schema,
}

impl<'s> Validator<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Route a value to the check matching its shape
    pub fn validate<'a>(&self, value: impl Into<Validatable<'a>>) -> ValidationResult<Outcome> {
        match value.into() {
            Validatable::Node(node) => self.validate_node(node).map(|_| Outcome::Valid),
            Validatable::Edge(edge) => self.validate_edge(edge).map(|_| Outcome::Valid),
            Validatable::Triplet(triplet) => self.validate_triplet(triplet).map(|_| Outcome::Valid),
            Validatable::Duplet(duplet) => self.validate_duplet(duplet).map(|_| Outcome::Valid),
            Validatable::Graph(graph) => self.validate_graph(graph).map(|_| Outcome::Valid),
            Validatable::Unknown(unknown) => self.validate_unknown(unknown),
        }
    }

    pub fn validate_node(&self, node: &Node) -> ValidationResult<()> {
        self.validate_entity(node)
    }

    pub fn validate_edge(&self, edge: &Edge) -> ValidationResult<()> {
        self.validate_entity(edge)
    }

    /// Check one entity: its type exists, its keys match the declared
    /// properties and every value satisfies its property
    fn validate_entity<E: Entity>(&self, entity: &E) -> ValidationResult<()> {
        let kind = entity.kind();
        log::trace!("Validating {} {}", kind, entity.type_name());

        let definition = self
            .schema
            .type_of(kind, entity.type_name())
            .ok_or_else(|| ValidationError::UnknownType {
                kind,
                type_name: entity.type_name().to_string(),
            })?;

        for (key, property) in check_keys(definition, entity.keys())? {
            let value = match entity.property(key) {
                Some(value) => value,
                None => continue,
            };
            evaluate(property, value).map_err(|source| ValidationError::Property {
                kind,
                type_name: definition.name.clone(),
                property: property.name.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn validate_triplet(&self, triplet: &Triplet) -> ValidationResult<()> {
        let main = triplet
            .main
            .as_ref()
            .ok_or(ValidationError::IncompleteTriplet(Role::Main))?;
        let subject = triplet
            .subject
            .as_ref()
            .ok_or(ValidationError::IncompleteTriplet(Role::Subject))?;
        let edge = triplet
            .edge
            .as_ref()
            .ok_or(ValidationError::IncompleteTriplet(Role::Edge))?;
        self.check_connection(main, edge, subject)
    }

    /// A rule must exist for the three types, then each part must be valid
    pub(crate) fn check_connection(&self, main: &Node, edge: &Edge, subject: &Node) -> ValidationResult<()> {
        if self
            .schema
            .connection(main.type_name(), subject.type_name(), edge.type_name())
            .is_none()
        {
            return Err(ValidationError::UndeclaredConnection {
                main: main.type_name().to_string(),
                subject: subject.type_name().to_string(),
                edge: edge.type_name().to_string(),
            });
        }
        self.validate_node(main).map_err(|e| e.in_role(Role::Main))?;
        self.validate_node(subject)
            .map_err(|e| e.in_role(Role::Subject))?;
        self.validate_edge(edge).map_err(|e| e.in_role(Role::Edge))
    }

    /// Passes when some rule uses the duplet's edge with its node on either
    /// end; the missing endpoint's direction is not checked
    pub fn validate_duplet(&self, duplet: &Duplet) -> ValidationResult<()> {
        let node = duplet.node.type_name();
        let edge = duplet.edge.type_name();
        if !self.schema.has_connection_involving(node, edge) {
            return Err(ValidationError::NoDupletConnection {
                node: node.to_string(),
                edge: edge.to_string(),
            });
        }
        self.validate_node(&duplet.node)?;
        self.validate_edge(&duplet.edge)
    }

    /// Check every node, every outgoing edge and subject, and the number of
    /// connections per rule against its bounds
    pub fn validate_graph(&self, graph: &Graph) -> ValidationResult<()> {
        log::debug!(
            "Validating graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        for (main, children) in graph.adjacency() {
            self.validate_node(main)?;

            let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
            for (edge, subject) in &children {
                self.validate_edge(edge).map_err(|e| e.in_role(Role::Edge))?;
                self.validate_node(subject)
                    .map_err(|e| e.in_role(Role::Subject))?;
                *counts
                    .entry((subject.type_name(), edge.type_name()))
                    .or_default() += 1;
            }

            for (edge, subject) in &children {
                let bounds = self
                    .schema
                    .connection(main.type_name(), subject.type_name(), edge.type_name())
                    .ok_or_else(|| ValidationError::UndeclaredConnection {
                        main: main.type_name().to_string(),
                        subject: subject.type_name().to_string(),
                        edge: edge.type_name().to_string(),
                    })?;
                let count = counts[&(subject.type_name(), edge.type_name())];
                if bounds.is_above(count) {
                    return Err(ValidationError::AboveMaximum {
                        main: main.type_name().to_string(),
                        subject: subject.type_name().to_string(),
                        edge: edge.type_name().to_string(),
                        count,
                        bounds,
                    });
                }
            }

            // Rules are checked against their minimum even when the node
            // has no matching connection at all
            for rule in self.schema.connections_from(main.type_name()) {
                let count = counts
                    .get(&(rule.subject.as_str(), rule.edge.as_str()))
                    .copied()
                    .unwrap_or(0);
                if rule.bounds.is_below(count) {
                    return Err(ValidationError::BelowMinimum {
                        main: rule.main,
                        subject: rule.subject,
                        edge: rule.edge,
                        count,
                        bounds: rule.bounds,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn validate_unknown(&self, unknown: &Unknown) -> ValidationResult<Outcome> {
        validate_unknown(self.schema, unknown)
    }
}

/// Match given keys to declared properties, ignoring case. Fails when a
/// key has no property or a property has no key; on success returns the
/// pairs ordered by key.
pub(crate) fn check_keys<'d, 'k>(
    definition: &'d TypeDefinition,
    keys: Vec<&'k str>,
) -> ValidationResult<Vec<(&'k str, &'d Property)>> {
    let mut declared: HashMap<String, &'d Property> = definition
        .properties
        .values()
        .map(|p| (p.name.to_lowercase(), p))
        .collect();

    let mut matched = Vec::with_capacity(keys.len());
    let mut extra = Vec::new();
    for key in keys {
        match declared.remove(&key.to_lowercase()) {
            Some(property) => matched.push((key, property)),
            None => extra.push(key.to_string()),
        }
    }

    let mut missing: Vec<String> = declared.into_values().map(|p| p.name.clone()).collect();
    missing.sort();
    extra.sort();

    if !extra.is_empty() {
        return Err(ValidationError::ExtraProperty {
            kind: definition.kind,
            type_name: definition.name.clone(),
            extra,
            missing,
        });
    }
    if !missing.is_empty() {
        return Err(ValidationError::MissingProperty {
            kind: definition.kind,
            type_name: definition.name.clone(),
            missing,
        });
    }

    matched.sort_by(|a, b| a.0.cmp(b.0));
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{DataType, TypeDescriptor};

    fn person_type() -> TypeDefinition {
        TypeDefinition::node("Person")
            .with_property(Property::new("name", TypeDescriptor::scalar(DataType::String)))
            .with_property(Property::new("Age", TypeDescriptor::scalar(DataType::Int)))
    }

    #[test]
    fn test_check_keys_ignores_case() {
        let person = person_type();
        let matched = check_keys(&person, vec!["NAME", "age"]).unwrap();
        let pairs: Vec<(&str, &str)> = matched
            .iter()
            .map(|(k, p)| (*k, p.name.as_str()))
            .collect();
        assert_eq!(pairs, vec![("NAME", "name"), ("age", "Age")]);
    }

    #[test]
    fn test_check_keys_reports_extra_and_missing() {
        let person = person_type();
        match check_keys(&person, vec!["name", "nick"]) {
            Err(ValidationError::ExtraProperty { extra, missing, .. }) => {
                assert_eq!(extra, vec!["nick".to_string()]);
                assert_eq!(missing, vec!["Age".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            check_keys(&person, vec!["name"]),
            Err(ValidationError::MissingProperty { .. })
        ));
    }
}
