// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Shared state of a schema build
//
// Builder stages run their entries on the rayon pool and all of them read
// and write through this context. Every access takes the single state lock
// for the duration of one operation; nothing hands out references into the
// maps themselves.

use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};

use super::types::{Cardinality, EntityKind, Property, TypeDefinition};
use super::{ConnectionTable, Schema, SchemaIssue, SchemaIssues};

/// Owner of a property being defined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Owner {
    Node,
    Edge,
    Label,
}

#[derive(Debug, Default)]
struct LabelState {
    properties: HashMap<String, Property>,
    nodes: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct BuildState {
    nodes: HashMap<String, TypeDefinition>,
    edges: HashMap<String, TypeDefinition>,
    labels: HashMap<String, LabelState>,
    node_labels: HashMap<String, Vec<String>>,
    label_connections: ConnectionTable,
    node_connections: ConnectionTable,
}

/// Lock-protected builder state plus the accumulated issue list
#[derive(Debug, Default)]
pub(crate) struct BuildContext {
    state: Mutex<BuildState>,
    issues: Mutex<Vec<SchemaIssue>>,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------- issues ---------------------- //

    pub fn report(&self, issue: SchemaIssue) {
        log::trace!("schema issue: {}", issue);
        self.issues.lock().push(issue);
    }

    pub fn issue_count(&self) -> usize {
        self.issues.lock().len()
    }

    /// Consume the context into a schema, or every issue recorded
    pub fn finish(self) -> Result<Schema, SchemaIssues> {
        let issues = self.issues.into_inner();
        if !issues.is_empty() {
            return Err(SchemaIssues::new(issues));
        }
        let state = self.state.into_inner();
        Ok(Schema::from_parts(
            state.nodes,
            state.edges,
            state.node_connections,
        ))
    }

    // ---------------------- types ---------------------- //

    pub fn insert_type(&self, definition: TypeDefinition) {
        let mut state = self.state.lock();
        match definition.kind {
            EntityKind::Node => state.nodes.insert(definition.name.clone(), definition),
            EntityKind::Edge => state.edges.insert(definition.name.clone(), definition),
        };
    }

    pub fn insert_label(&self, name: &str) {
        self.state
            .lock()
            .labels
            .entry(name.to_string())
            .or_default();
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.state.lock().nodes.contains_key(name)
    }

    pub fn has_edge(&self, name: &str) -> bool {
        self.state.lock().edges.contains_key(name)
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.state.lock().labels.contains_key(name)
    }

    // ---------------------- properties ---------------------- //

    /// Set a property on an already registered owner; returns false when
    /// the owner is unknown
    pub fn set_property(&self, owner: Owner, owner_name: &str, property: Property) -> bool {
        let mut state = self.state.lock();
        let properties = match owner {
            Owner::Node => state.nodes.get_mut(owner_name).map(|t| &mut t.properties),
            Owner::Edge => state.edges.get_mut(owner_name).map(|t| &mut t.properties),
            Owner::Label => state.labels.get_mut(owner_name).map(|l| &mut l.properties),
        };
        match properties {
            Some(properties) => {
                properties.insert(property.name.clone(), property);
                true
            }
            None => false,
        }
    }

    /// Add a property to a node unless the node already has one by that name
    pub fn set_node_property_if_absent(&self, node: &str, property: Property) -> bool {
        let mut state = self.state.lock();
        match state.nodes.get_mut(node) {
            Some(definition) if !definition.properties.contains_key(&property.name) => {
                definition.properties.insert(property.name.clone(), property);
                true
            }
            _ => false,
        }
    }

    pub fn label_properties(&self, label: &str) -> Vec<Property> {
        let state = self.state.lock();
        let mut properties: Vec<Property> = state
            .labels
            .get(label)
            .map(|l| l.properties.values().cloned().collect())
            .unwrap_or_default();
        properties.sort_by(|a, b| a.name.cmp(&b.name));
        properties
    }

    // ---------------------- labels ---------------------- //

    /// Record that `node` wears `label`, in both directions. Returns false
    /// when the label is undefined.
    pub fn attach_label(&self, node: &str, label: &str) -> bool {
        let mut state = self.state.lock();
        match state.labels.get_mut(label) {
            Some(label_state) => {
                label_state.nodes.insert(node.to_string());
                state
                    .node_labels
                    .entry(node.to_string())
                    .or_default()
                    .push(label.to_string());
                true
            }
            None => false,
        }
    }

    /// Labels of a node in the order they were attached
    pub fn node_labels(&self, node: &str) -> Vec<String> {
        self.state
            .lock()
            .node_labels
            .get(node)
            .cloned()
            .unwrap_or_default()
    }

    pub fn label_nodes(&self, label: &str) -> Vec<String> {
        self.state
            .lock()
            .labels
            .get(label)
            .map(|l| l.nodes.iter().cloned().collect())
            .unwrap_or_default()
    }

    // ---------------------- connections ---------------------- //

    pub fn has_connection(&self, owner: Owner, main: &str, subject: &str, edge: &str) -> bool {
        let state = self.state.lock();
        table(&state, owner)
            .get(main)
            .and_then(|by_subject| by_subject.get(subject))
            .map_or(false, |by_edge| by_edge.contains_key(edge))
    }

    /// Insert a rule unless one already exists for the same triple; returns
    /// whether it was inserted
    pub fn insert_connection_if_absent(
        &self,
        owner: Owner,
        main: &str,
        subject: &str,
        edge: &str,
        bounds: Cardinality,
    ) -> bool {
        let mut state = self.state.lock();
        let by_edge = table_mut(&mut state, owner)
            .entry(main.to_string())
            .or_default()
            .entry(subject.to_string())
            .or_default();
        if by_edge.contains_key(edge) {
            return false;
        }
        by_edge.insert(edge.to_string(), bounds);
        true
    }

    /// Label-level rules with `label` as main: (subject label, edge, bounds),
    /// ordered by subject then edge
    pub fn label_connections_from(&self, label: &str) -> Vec<(String, String, Cardinality)> {
        let state = self.state.lock();
        let mut rules: Vec<(String, String, Cardinality)> = state
            .label_connections
            .get(label)
            .into_iter()
            .flat_map(|by_subject| {
                by_subject.iter().flat_map(|(subject, by_edge)| {
                    by_edge
                        .iter()
                        .map(move |(edge, bounds)| (subject.clone(), edge.clone(), *bounds))
                })
            })
            .collect();
        rules.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        rules
    }
}

fn table(state: &BuildState, owner: Owner) -> &ConnectionTable {
    match owner {
        Owner::Label => &state.label_connections,
        _ => &state.node_connections,
    }
}

fn table_mut(state: &mut BuildState, owner: Owner) -> &mut ConnectionTable {
    match owner {
        Owner::Label => &mut state.label_connections,
        _ => &mut state.node_connections,
    }
}
