// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Structural validation of values that carry no graph identity

#[path = "testutils/mod.rs"]
mod testutils;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use stg::{validate, Outcome, Unknown, ValidationError, Value};
use testutils::{reference_schema, schema, test_time};

#[derive(Serialize)]
struct Person {
    name: String,
    birth: DateTime<Utc>,
    merried: bool,
    age: f64,
    money: i64,
    things: Vec<String>,
    adresses: HashMap<String, String>,
}

fn jora() -> Person {
    let mut adresses = HashMap::new();
    adresses.insert("street 1".to_string(), "house 12".to_string());
    Person {
        name: "Jora".to_string(),
        birth: test_time(),
        merried: true,
        age: 22.7,
        money: 34,
        things: vec!["thing".to_string()],
        adresses,
    }
}

fn jora_fields() -> Vec<(&'static str, Value)> {
    let mut adresses = HashMap::new();
    adresses.insert("street 1", "house 12");
    vec![
        ("NAME", Value::from("Jora")),
        ("birth", Value::from("1111-11-11T11:11:11Z")),
        ("merried", Value::from(true)),
        ("age", Value::from(22.7)),
        ("money", Value::from(34i64)),
        ("things", Value::from(vec!["thing"])),
        ("adresses", Value::from(adresses)),
    ]
}

#[test]
fn test_struct_matched_by_type_name() {
    let schema = reference_schema();
    let unknown = Unknown::from_serialize(&jora());
    assert_eq!(validate(&schema, &unknown), Ok(Outcome::ValidAsNode));
}

#[test]
fn test_struct_restrictions_still_apply() {
    let schema = reference_schema();
    let mut person = jora();
    person.money = 35;
    let err = validate(&schema, &Unknown::from_serialize(&person)).unwrap_err();
    let text = err.to_string();
    assert!(text.starts_with("unknown value failed both validations: as node - \"Person\"-node: \"money\"-property"));
    assert!(text.ends_with("as edge - there is no such edge type in the schema"));
}

#[test]
fn test_record_matched_by_embedded_type() {
    let schema = reference_schema();
    let mut fields = jora_fields();
    fields.push(("kind", Value::from("Person")));
    assert_eq!(
        validate(&schema, &Unknown::record(fields)),
        Ok(Outcome::ValidAsNode)
    );
}

#[test]
fn test_json_record() {
    let schema = reference_schema();
    let unknown = Unknown::from_json(serde_json::json!({
        "p": "Person",
        "name": "Jora",
        "birth": "1111-11-11T11:11:11Z",
        "merried": true,
        "age": 22.7,
        "money": 34,
        "things": ["thing"],
        "adresses": {"street 1": "house 12"}
    }));
    assert_eq!(validate(&schema, &unknown), Ok(Outcome::ValidAsNode));
}

#[test]
fn test_record_as_edge() {
    let schema = reference_schema();
    let unknown = Unknown::named("friend", [("since", "1111-11-11T11:11:11Z")]);
    assert_eq!(validate(&schema, &unknown), Ok(Outcome::ValidAsEdge));
}

#[test]
fn test_record_as_node_and_edge() {
    let schema = schema(
        r#"
nodes:
    link:
        properties:
            url:
                type: string
edges:
    link:
        properties:
            url:
                type: string
"#,
    );
    let unknown = Unknown::named("link", [("url", "https://example.org")]);
    assert_eq!(validate(&schema, &unknown), Ok(Outcome::ValidAsNodeAndEdge));
}

#[test]
fn test_no_matching_type() {
    let schema = reference_schema();
    let err = validate(&schema, &Unknown::record([("name", "Jora")])).unwrap_err();
    assert_eq!(err, ValidationError::NoMatchingType);
}

#[test]
fn test_non_record_shapes() {
    let schema = reference_schema();
    let err = validate(&schema, &Unknown::from_json(serde_json::json!(5))).unwrap_err();
    assert_eq!(
        err.to_string(),
        "unknown value can't be evaluated: number is not a record or map"
    );

    let err = validate(&schema, &Unknown::from_serialize("Person")).unwrap_err();
    assert!(matches!(err, ValidationError::UnsupportedShape(_)));
}
