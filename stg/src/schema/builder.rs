// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Schema builder - resolves a template document into a `Schema`
//
// Building runs in five stages. Each stage processes its entries in
// parallel and completes before the next one starts, since later stages
// read what earlier ones registered:
//
//   1. edge types and their properties
//   2. label types and their properties
//   3. label-to-label connections
//   4. node types, their properties and attached labels
//   5. label properties and connections folded into nodes, then the
//      nodes' own connections
//
// Problems never stop the build. Every issue is recorded with its
// template path and all of them are returned together at the end.

use rayon::prelude::*;
use std::collections::HashSet;
use std::io::Read;
use thiserror::Error;

use super::context::{BuildContext, Owner};
use super::document::{ConnectionDef, PropertyDef, RawScalar, SchemaDocument};
use super::types::{
    Cardinality, Property, Restriction, RestrictionKind, TypeDefinition, TypeDescriptor,
    UNBOUNDED,
};
use super::{Schema, SchemaError, SchemaIssue, SchemaPath, SchemaResult};

/// Definition problems that are not type or restriction errors
#[derive(Error, Debug)]
enum DefinitionError {
    #[error("{owner} \"{name}\" has undefined label \"{label}\" to attach it to node type")]
    UndefinedLabel {
        owner: &'static str,
        name: String,
        label: String,
    },

    #[error("{owner} \"{name}\" has undefined subject {owner} \"{subject}\" to create connection")]
    UndefinedSubject {
        owner: &'static str,
        name: String,
        subject: String,
    },

    #[error("{owner} \"{name}\" has undefined edge \"{edge}\" to create connection")]
    UndefinedEdge {
        owner: &'static str,
        name: String,
        edge: String,
    },

    #[error("{owner}-connection with \"{name}\" main, \"{edge}\" edge and \"{subject}\" subject already exists")]
    DuplicateConnection {
        owner: &'static str,
        name: String,
        subject: String,
        edge: String,
    },

    #[error("\"min\" can't be less than 0")]
    NegativeMin,

    #[error("\"max\" can't be equal to 0 or be less than -1 (-1 is considered as positive infinity)")]
    InvalidMax,
}

/// Parse a schema from an already opened source.
///
/// The source must contain at least one edge and one node definition;
/// otherwise the build fails before any entry is looked at.
pub fn parse_schema<R: Read>(mut reader: R) -> SchemaResult<Schema> {
    let mut source = Vec::new();
    reader.read_to_end(&mut source)?;
    let document: SchemaDocument = serde_yaml::from_slice(&source)?;
    SchemaBuilder::new(document).build()
}

/// Builds a `Schema` from a parsed template document
pub struct SchemaBuilder {
    document: SchemaDocument,
}

impl SchemaBuilder {
    pub fn new(document: SchemaDocument) -> Self {
        Self { document }
    }

    /// Run every stage and return the schema or all accumulated issues
    pub fn build(self) -> SchemaResult<Schema> {
        let doc = &self.document;
        if doc.edges.is_empty() {
            return Err(SchemaError::NoEdges);
        }
        if doc.nodes.is_empty() {
            return Err(SchemaError::NoNodes);
        }

        log::debug!(
            "Building schema: {} labels, {} nodes, {} edges",
            doc.labels.len(),
            doc.nodes.len(),
            doc.edges.len()
        );

        let ctx = BuildContext::new();
        let edges = SchemaPath::root().join("edges");
        let labels = SchemaPath::root().join("labels");
        let nodes = SchemaPath::root().join("nodes");

        doc.edges.par_iter().for_each(|(name, def)| {
            let path = edges.join(name);
            ctx.insert_type(TypeDefinition::edge(name.as_str()));
            build_properties(&ctx, Owner::Edge, name, &path, &def.properties);
        });
        log::trace!("Stage 1 done: edges registered");

        doc.labels.par_iter().for_each(|(name, def)| {
            let path = labels.join(name);
            ctx.insert_label(name);
            build_properties(&ctx, Owner::Label, name, &path, &def.properties);
        });
        log::trace!("Stage 2 done: labels registered");

        doc.labels.par_iter().for_each(|(name, def)| {
            let path = labels.join(name);
            for (subject, connections) in &def.connections {
                for (i, conn) in connections.iter().enumerate() {
                    let conn_path = path.join("connections").join(subject).join(i + 1);
                    build_connection(&ctx, Owner::Label, name, subject, conn, &conn_path);
                }
            }
        });
        log::trace!("Stage 3 done: label connections resolved");

        doc.nodes.par_iter().for_each(|(name, def)| {
            let path = nodes.join(name);
            ctx.insert_type(TypeDefinition::node(name.as_str()));
            build_properties(&ctx, Owner::Node, name, &path, &def.properties);
            for (i, label) in def.labels.iter().enumerate() {
                if !ctx.attach_label(name, label) {
                    let err = DefinitionError::UndefinedLabel {
                        owner: "node",
                        name: name.clone(),
                        label: label.clone(),
                    };
                    ctx.report(SchemaIssue::new(
                        path.join("labels").join(i + 1),
                        err.to_string(),
                    ));
                }
            }
        });
        log::trace!("Stage 4 done: nodes registered");

        doc.nodes.par_iter().for_each(|(name, def)| {
            let path = nodes.join(name);
            let declared: HashSet<(&str, &str)> = def
                .connections
                .iter()
                .flat_map(|(subject, conns)| {
                    conns.iter().map(move |c| (subject.as_str(), c.edge.as_str()))
                })
                .collect();
            enrich_by_labels(&ctx, name, &declared);
            for (subject, connections) in &def.connections {
                for (i, conn) in connections.iter().enumerate() {
                    let conn_path = path.join("connections").join(subject).join(i + 1);
                    build_connection(&ctx, Owner::Node, name, subject, conn, &conn_path);
                }
            }
        });
        log::trace!("Stage 5 done: node connections resolved");

        let issue_count = ctx.issue_count();
        if issue_count > 0 {
            log::warn!("Schema build found {} issue(s)", issue_count);
        }

        let schema = ctx.finish().map_err(SchemaError::Invalid)?;
        log::debug!(
            "Schema built: {} node types, {} edge types, {} connections",
            schema.node_count(),
            schema.edge_count(),
            schema.connection_count()
        );
        Ok(schema)
    }
}

fn build_properties(
    ctx: &BuildContext,
    owner: Owner,
    owner_name: &str,
    path: &SchemaPath,
    properties: &std::collections::BTreeMap<String, PropertyDef>,
) {
    for (name, def) in properties {
        let property = build_property(ctx, name, def, &path.join("properties").join(name));
        ctx.set_property(owner, owner_name, property);
    }
}

/// Resolve a property's type and restrictions. The property is returned
/// even when parts of it are broken; those parts are reported instead.
fn build_property(
    ctx: &BuildContext,
    name: &str,
    def: &PropertyDef,
    path: &SchemaPath,
) -> Property {
    let descriptor = match TypeDescriptor::parse(&def.type_name) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            ctx.report(SchemaIssue::new(path.join("type"), err.to_string()));
            TypeDescriptor::default()
        }
    };

    let mut property = Property::new(name, descriptor);
    let restrictions = &def.restrictions;
    let lists: [(RestrictionKind, &Vec<RawScalar>); 4] = [
        (RestrictionKind::Value, &restrictions.values),
        (RestrictionKind::Regexp, &restrictions.regexps),
        (RestrictionKind::KeyValue, &restrictions.key_values),
        (RestrictionKind::KeyRegexp, &restrictions.key_regexps),
    ];
    let restrictions_path = path.join("restrictions");
    for (kind, raws) in lists {
        for (i, raw) in raws.iter().enumerate() {
            match Restriction::new(&descriptor, kind, raw.as_str()) {
                Ok(restriction) => property.push_restriction(restriction),
                Err(err) => ctx.report(SchemaIssue::new(
                    restrictions_path.join(kind.section()).join(i + 1),
                    err.to_string(),
                )),
            }
        }
    }
    property
}

/// Fold the labels a node wears into it: label properties the node does
/// not define itself, and label connections expanded to every node wearing
/// the subject label.
///
/// A node's own declared (subject, edge) pairs are left to its direct
/// connections. Among labels, the first one attached wins.
fn enrich_by_labels(ctx: &BuildContext, node: &str, declared: &HashSet<(&str, &str)>) {
    for label in ctx.node_labels(node) {
        for property in ctx.label_properties(&label) {
            ctx.set_node_property_if_absent(node, property);
        }

        for (subject_label, edge, bounds) in ctx.label_connections_from(&label) {
            for subject in ctx.label_nodes(&subject_label) {
                if declared.contains(&(subject.as_str(), edge.as_str())) {
                    continue;
                }
                if ctx.insert_connection_if_absent(Owner::Node, node, &subject, &edge, bounds) {
                    log::trace!(
                        "Node {} inherits connection to {} via {} from label {}",
                        node,
                        subject,
                        edge,
                        label
                    );
                }
            }
        }
    }
}

fn build_connection(
    ctx: &BuildContext,
    owner: Owner,
    main: &str,
    subject: &str,
    def: &ConnectionDef,
    path: &SchemaPath,
) {
    let owner_name = match owner {
        Owner::Label => "label",
        _ => "node",
    };
    let mut errors: Vec<(SchemaPath, DefinitionError)> = Vec::new();

    let subject_defined = match owner {
        Owner::Label => ctx.has_label(subject),
        _ => ctx.has_node(subject),
    };
    if !subject_defined {
        errors.push((
            path.clone(),
            DefinitionError::UndefinedSubject {
                owner: owner_name,
                name: main.to_string(),
                subject: subject.to_string(),
            },
        ));
    }
    if !ctx.has_edge(&def.edge) {
        errors.push((
            path.clone(),
            DefinitionError::UndefinedEdge {
                owner: owner_name,
                name: main.to_string(),
                edge: def.edge.clone(),
            },
        ));
    }
    if ctx.has_connection(owner, main, subject, &def.edge) {
        errors.push((
            path.clone(),
            DefinitionError::DuplicateConnection {
                owner: owner_name,
                name: main.to_string(),
                subject: subject.to_string(),
                edge: def.edge.clone(),
            },
        ));
    }
    if def.ratio.min < 0 {
        errors.push((path.join("ratio").join("min"), DefinitionError::NegativeMin));
    }
    if def.ratio.max == 0 || def.ratio.max < UNBOUNDED {
        errors.push((path.join("ratio").join("max"), DefinitionError::InvalidMax));
    }

    if errors.is_empty() {
        let bounds = Cardinality::new(def.ratio.min, def.ratio.max);
        ctx.insert_connection_if_absent(owner, main, subject, &def.edge, bounds);
    } else {
        for (path, err) in errors {
            ctx.report(SchemaIssue::new(path, err.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
nodes:
    Person:
        properties:
            name:
                type: string
        connections:
            Person:
                - edge: friend
                  ratio:
                      min: 0
                      max: -1
edges:
    friend:
"#;

    #[test]
    fn test_minimal_schema() {
        let schema = parse_schema(MINIMAL.as_bytes()).unwrap();
        assert!(schema.node_type("Person").is_some());
        assert!(schema.edge_type("friend").is_some());
        assert_eq!(
            schema.connection("Person", "Person", "friend"),
            Some(Cardinality::new(0, UNBOUNDED))
        );
    }

    #[test]
    fn test_missing_sections() {
        let no_edges = "nodes:\n    Person:\n";
        assert!(matches!(
            parse_schema(no_edges.as_bytes()),
            Err(SchemaError::NoEdges)
        ));

        let no_nodes = "edges:\n    friend:\n";
        assert!(matches!(
            parse_schema(no_nodes.as_bytes()),
            Err(SchemaError::NoNodes)
        ));
    }

    #[test]
    fn test_ratio_errors_are_all_reported() {
        let source = r#"
nodes:
    Person:
        connections:
            Ghost:
                - edge: haunts
                  ratio:
                      min: -1
                      max: 0
edges:
    friend:
"#;
        let err = parse_schema(source.as_bytes()).unwrap_err();
        let lines: Vec<String> = err.issues().iter().map(|i| i.to_string()).collect();
        assert_eq!(lines.len(), 4);
        assert!(lines.contains(
            &"template | nodes | Person | connections | Ghost | 1 >> node \"Person\" has undefined subject node \"Ghost\" to create connection".to_string()
        ));
        assert!(lines.contains(
            &"template | nodes | Person | connections | Ghost | 1 >> node \"Person\" has undefined edge \"haunts\" to create connection".to_string()
        ));
        assert!(lines.contains(
            &"template | nodes | Person | connections | Ghost | 1 | ratio | min >> \"min\" can't be less than 0".to_string()
        ));
        assert!(lines
            .iter()
            .any(|l| l.starts_with("template | nodes | Person | connections | Ghost | 1 | ratio | max >>")));
    }

    #[test]
    fn test_undefined_label() {
        let source = r#"
nodes:
    Person:
        labels: [Creature]
edges:
    friend:
"#;
        let err = parse_schema(source.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "template | nodes | Person | labels | 1 >> node \"Person\" has undefined label \"Creature\" to attach it to node type"
        );
    }

    #[test]
    fn test_node_connection_overrides_label_connection() {
        let source = r#"
labels:
    Creature:
        connections:
            Creature:
                - edge: knows
                  ratio: {min: 0, max: -1}
nodes:
    Person:
        labels: [Creature]
        connections:
            Person:
                - edge: knows
                  ratio: {min: 1, max: 3}
edges:
    knows:
"#;
        let schema = parse_schema(source.as_bytes()).unwrap();
        assert_eq!(
            schema.connection("Person", "Person", "knows"),
            Some(Cardinality::new(1, 3))
        );
    }
}
