// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Schema building tests
//!
//! Covers label resolution, connection rules and accumulated error
//! reporting for templates read from strings and files.

#[path = "testutils/mod.rs"]
mod testutils;

use std::io::Write;

use stg::schema::{Cardinality, DataType, TypeDescriptor, UNBOUNDED};
use stg::{parse_schema, Schema, SchemaError};
use testutils::{reference_schema, schema, REFERENCE_TEMPLATE};

#[test]
fn test_reference_template_builds() {
    let schema = reference_schema();
    assert_eq!(schema.node_count(), 1);
    assert_eq!(schema.edge_count(), 1);
    assert_eq!(schema.connection_count(), 1);

    let person = schema.node_type("Person").unwrap();
    assert_eq!(person.properties.len(), 7);
    assert_eq!(
        person.property("name").unwrap().descriptor,
        TypeDescriptor::scalar(DataType::String)
    );
    assert_eq!(
        person.property("adresses").unwrap().descriptor,
        TypeDescriptor::map(DataType::String, DataType::String)
    );
    assert_eq!(person.property("age").unwrap().value_restrictions.len(), 2);
    assert_eq!(person.property("adresses").unwrap().key_restrictions.len(), 1);

    assert_eq!(
        schema.connection("Person", "Person", "friend"),
        Some(Cardinality::new(0, UNBOUNDED))
    );
}

#[test]
fn test_labels_are_not_types() {
    let schema = reference_schema();
    assert!(schema.node_type("Creature").is_none());
    assert!(schema.edge_type("Creature").is_none());
}

#[test]
fn test_wrong_datetime_restriction() {
    let source = r#"
nodes:
    Person:
        properties:
            birth:
                type: datetime
                restrictions:
                    values: ['1111-11-11T11:11:11']
edges:
    friend:
"#;
    let err = parse_schema(source.as_bytes()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "template | nodes | Person | properties | birth | restrictions | values | 1 >> restriction \"1111-11-11T11:11:11\" doesn't match \"datetime\" data type"
    );
}

#[test]
fn test_all_issues_are_reported_sorted() {
    let source = r#"
labels:
    Creature:
        properties:
            tags:
                type: array-array
nodes:
    Person:
        labels: [Creature, Ghost]
        properties:
            age:
                type: integer
            money:
                type: int
                restrictions:
                    values: [12.5]
            nick:
                type: string
                restrictions:
                    key_values: [a]
edges:
    friend:
"#;
    let err = parse_schema(source.as_bytes()).unwrap_err();
    let lines: Vec<String> = err.issues().iter().map(|i| i.to_string()).collect();
    assert_eq!(
        lines,
        vec![
            "template | labels | Creature | properties | tags | type >> data type \"array\" has wrong value data subtype \"array\"".to_string(),
            "template | nodes | Person | labels | 2 >> node \"Person\" has undefined label \"Ghost\" to attach it to node type".to_string(),
            "template | nodes | Person | properties | age | type >> undefined data type \"integer\"".to_string(),
            "template | nodes | Person | properties | money | restrictions | values | 1 >> restriction \"12.5\" doesn't match \"int\" data type".to_string(),
            "template | nodes | Person | properties | nick | restrictions | key_values | 1 >> data type \"string\" can't have key restrictions".to_string(),
        ]
    );
    assert_eq!(err.to_string(), lines.join("\n"));
}

#[test]
fn test_duplicate_label_connection() {
    let source = r#"
labels:
    Creature:
        connections:
            Creature:
                - edge: friend
                  ratio: {min: 0, max: -1}
                - edge: friend
                  ratio: {min: 1, max: 2}
nodes:
    Person:
        labels: [Creature]
edges:
    friend:
"#;
    let err = parse_schema(source.as_bytes()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "template | labels | Creature | connections | Creature | 2 >> label-connection with \"Creature\" main, \"friend\" edge and \"Creature\" subject already exists"
    );
}

#[test]
fn test_label_connections_expand_to_wearers() {
    let schema = schema(
        r#"
labels:
    Creature:
        properties:
            name:
                type: string
        connections:
            Creature:
                - edge: knows
                  ratio: {min: 0, max: 5}
nodes:
    Person:
        labels: [Creature]
    Robot:
        labels: [Creature]
        properties:
            name:
                type: int
    Stone:
edges:
    knows:
"#,
    );

    let bounds = Some(Cardinality::new(0, 5));
    assert_eq!(schema.connection("Person", "Person", "knows"), bounds);
    assert_eq!(schema.connection("Person", "Robot", "knows"), bounds);
    assert_eq!(schema.connection("Robot", "Person", "knows"), bounds);
    assert_eq!(schema.connection("Robot", "Robot", "knows"), bounds);
    assert_eq!(schema.connection("Stone", "Person", "knows"), None);
    assert_eq!(schema.connection_count(), 4);

    // Properties a node defines itself win over label properties
    assert_eq!(
        schema.node_type("Robot").unwrap().property("name").unwrap().descriptor,
        TypeDescriptor::scalar(DataType::Int)
    );
    assert_eq!(
        schema.node_type("Person").unwrap().property("name").unwrap().descriptor,
        TypeDescriptor::scalar(DataType::String)
    );
    assert!(schema.node_type("Stone").unwrap().properties.is_empty());
}

#[test]
fn test_building_is_deterministic() {
    let first: Vec<String> = (0..8)
        .map(|_| {
            let schema: Schema = REFERENCE_TEMPLATE.parse().unwrap();
            format!("{:?}", schema.connections())
        })
        .collect();
    assert!(first.windows(2).all(|w| w[0] == w[1]));

    let broken = REFERENCE_TEMPLATE.replace("max: -1", "max: 0").replace("type: bool", "type: boolean");
    let errors: Vec<String> = (0..8)
        .map(|_| parse_schema(broken.as_bytes()).unwrap_err().to_string())
        .collect();
    assert!(errors.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(errors[0].lines().count(), 3);
}

#[test]
fn test_yaml_syntax_error() {
    let err = parse_schema("nodes: [unclosed".as_bytes()).unwrap_err();
    assert!(matches!(err, SchemaError::Syntax(_)));
    assert!(err.to_string().starts_with("template >> .yaml parsing error"));
    assert!(err.issues().is_empty());
}

#[test]
fn test_unknown_template_keys_are_rejected() {
    let source = "nodes:\n    Person:\n        colour: red\nedges:\n    friend:\n";
    assert!(matches!(
        parse_schema(source.as_bytes()),
        Err(SchemaError::Syntax(_))
    ));
}

#[test]
fn test_schema_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(REFERENCE_TEMPLATE.as_bytes()).unwrap();

    let schema = Schema::from_reader(std::fs::File::open(file.path()).unwrap()).unwrap();
    assert!(schema.node_type("Person").is_some());
    assert!(schema.edge_type("friend").is_some());
}
