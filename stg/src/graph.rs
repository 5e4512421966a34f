// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory property graph
//!
//! Nodes and edges live in a `StableDiGraph` arena, so indices stay valid
//! across removals. Entities have no identity besides their content:
//! inserting a node equal to one already present is a no-op, and the same
//! holds for equal edges between the same pair of nodes.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::validation::entity::{Edge, Entity, Node, Triplet};

/// Borrowed view of one connection stored in a graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripletRef<'a> {
    pub main: &'a Node,
    pub edge: &'a Edge,
    pub subject: &'a Node,
}

impl TripletRef<'_> {
    pub fn to_triplet(&self) -> Triplet {
        Triplet::new(self.main.clone(), self.subject.clone(), self.edge.clone())
    }
}

/// Graph of unique nodes connected by directed, typed edges
#[derive(Debug, Clone, Default)]
pub struct Graph {
    inner: StableDiGraph<Node, Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from loose nodes and triplets, inserted in that order
    pub fn from_parts(
        nodes: impl IntoIterator<Item = Node>,
        triplets: impl IntoIterator<Item = Triplet>,
    ) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node);
        }
        for triplet in triplets {
            graph.add_triplet(triplet);
        }
        graph
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    fn find(&self, node: &Node) -> Option<NodeIndex> {
        self.inner
            .node_indices()
            .find(|&index| &self.inner[index] == node)
    }

    fn find_edge(&self, main: NodeIndex, subject: NodeIndex, edge: &Edge) -> Option<EdgeIndex> {
        self.inner
            .edges_directed(main, Direction::Outgoing)
            .find(|e| e.target() == subject && e.weight() == edge)
            .map(|e| e.id())
    }

    fn find_or_insert(&mut self, node: Node) -> (NodeIndex, bool) {
        match self.find(&node) {
            Some(index) => (index, false),
            None => (self.inner.add_node(node), true),
        }
    }

    /// Outgoing (edge, subject) pairs of a node, in insertion order
    fn outgoing(&self, index: NodeIndex) -> Vec<(&Edge, &Node)> {
        let mut edges: Vec<_> = self
            .inner
            .edges_directed(index, Direction::Outgoing)
            .collect();
        edges.sort_by_key(|e| e.id());
        edges
            .into_iter()
            .map(|e| (e.weight(), &self.inner[e.target()]))
            .collect()
    }

    /// Insert a node unless an equal one is present; returns whether it
    /// was inserted
    pub fn add_node(&mut self, node: Node) -> bool {
        self.find_or_insert(node).1
    }

    /// Insert a triplet; returns whether the graph changed.
    ///
    /// - an equal edge already between the same nodes cancels the insertion
    /// - without an edge, the present nodes are inserted unconnected
    /// - an edge without both endpoints is dropped
    pub fn add_triplet(&mut self, triplet: Triplet) -> bool {
        let Triplet {
            main,
            edge,
            subject,
        } = triplet;

        if let (Some(m), Some(s), Some(e)) = (&main, &subject, &edge) {
            if let (Some(mi), Some(si)) = (self.find(m), self.find(s)) {
                if self.find_edge(mi, si, e).is_some() {
                    log::trace!("Edge {} already present, triplet skipped", e.type_name());
                    return false;
                }
            }
        }

        let mut changed = false;
        let main = main.map(|m| {
            let (index, inserted) = self.find_or_insert(m);
            changed |= inserted;
            index
        });
        let subject = subject.map(|s| {
            let (index, inserted) = self.find_or_insert(s);
            changed |= inserted;
            index
        });

        match (main, subject, edge) {
            (Some(mi), Some(si), Some(e)) => {
                self.inner.add_edge(mi, si, e);
                true
            }
            (_, _, Some(e)) => {
                log::debug!("Edge {} has a missing endpoint and was dropped", e.type_name());
                changed
            }
            _ => changed,
        }
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, node: &Node) -> bool {
        match self.find(node) {
            Some(index) => self.inner.remove_node(index).is_some(),
            None => false,
        }
    }

    /// Remove the edge described by a complete triplet
    pub fn remove_edge(&mut self, triplet: &Triplet) -> bool {
        let (main, subject, edge) = match (&triplet.main, &triplet.subject, &triplet.edge) {
            (Some(m), Some(s), Some(e)) => (m, s, e),
            _ => return false,
        };
        let found = self
            .find(main)
            .zip(self.find(subject))
            .and_then(|(mi, si)| self.find_edge(mi, si, edge));
        match found {
            Some(index) => self.inner.remove_edge(index).is_some(),
            None => false,
        }
    }

    pub fn contains_node(&self, node: &Node) -> bool {
        self.find(node).is_some()
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> Vec<&Node> {
        self.inner
            .node_indices()
            .map(|index| &self.inner[index])
            .collect()
    }

    pub fn nodes_by_type(&self, type_name: &str) -> Vec<&Node> {
        self.nodes()
            .into_iter()
            .filter(|n| n.type_name() == type_name)
            .collect()
    }

    /// Outgoing (edge, subject) pairs of `node`; empty if it is absent
    pub fn children(&self, node: &Node) -> Vec<(&Edge, &Node)> {
        self.find(node)
            .map(|index| self.outgoing(index))
            .unwrap_or_default()
    }

    /// Every node with its outgoing (edge, subject) pairs
    pub fn adjacency(&self) -> Vec<(&Node, Vec<(&Edge, &Node)>)> {
        self.inner
            .node_indices()
            .map(|index| (&self.inner[index], self.outgoing(index)))
            .collect()
    }

    pub fn triplets(&self) -> Vec<TripletRef<'_>> {
        self.triplets_by_type(None, None, None)
    }

    /// Triplets with `node` as main node
    pub fn triplets_by_node(&self, node: &Node) -> Vec<TripletRef<'_>> {
        match self.find(node) {
            Some(index) => {
                let main = &self.inner[index];
                self.outgoing(index)
                    .into_iter()
                    .map(|(edge, subject)| TripletRef {
                        main,
                        edge,
                        subject,
                    })
                    .collect()
            }
            None => Vec::new(),
        }
    }

    /// Triplets filtered by main, subject and edge type; `None` matches any
    pub fn triplets_by_type(
        &self,
        main: Option<&str>,
        subject: Option<&str>,
        edge: Option<&str>,
    ) -> Vec<TripletRef<'_>> {
        let matches = |filter: Option<&str>, name: &str| filter.map_or(true, |f| f == name);
        self.adjacency()
            .into_iter()
            .filter(|(m, _)| matches(main, m.type_name()))
            .flat_map(|(m, children)| {
                children.into_iter().map(move |(e, s)| TripletRef {
                    main: m,
                    edge: e,
                    subject: s,
                })
            })
            .filter(|t| matches(subject, t.subject.type_name()) && matches(edge, t.edge.type_name()))
            .collect()
    }
}
