// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Shared fixtures for STG integration tests
//!
//! Holds the reference template and constructors for entities that
//! satisfy it. Each test file pulls in only what it uses.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;

use stg::{Edge, Node, Schema, Value};

/// Reference template: a `Creature` label carrying a name, a `Person` node
/// wearing it with one property of every type, and an open-ended `friend`
/// connection between persons.
pub const REFERENCE_TEMPLATE: &str = r#"
labels:
    Creature:
        properties:
            name:
                type: string
                restrictions:
                    values: [Jora]
                    regexps: ['^[A-Za-z][a-z]+$']
nodes:
    Person:
        labels: [Creature]
        properties:
            birth:
                type: datetime
                restrictions:
                    values: ['1111-11-11T11:11:11Z']
                    regexps: ['1111-11']
            merried:
                type: bool
                restrictions:
                    values: [true]
            age:
                type: float
                restrictions:
                    values: [22.7]
                    regexps: ['^\d+\.\d$']
            money:
                type: int
                restrictions:
                    values: [34]
                    regexps: ['^\d\d$']
            things:
                type: array-string
                restrictions:
                    values: [thing]
                    regexps: ['^thi..']
            adresses:
                type: map-string-string
                restrictions:
                    regexps: ['^house.*']
                    key_regexps: ['^street .+']
        connections:
            Person:
                - edge: friend
                  ratio:
                      min: 0
                      max: -1
edges:
    friend:
        properties:
            since:
                type: datetime
"#;

pub fn reference_schema() -> Schema {
    REFERENCE_TEMPLATE
        .parse()
        .expect("reference template must build")
}

pub fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1111, 11, 11, 11, 11, 11).unwrap()
}

/// A person satisfying every restriction of the reference template
pub fn person() -> Node {
    let mut adresses = BTreeMap::new();
    adresses.insert("street 1", "house 12");
    Node::empty("Person")
        .with_property("name", "Jora")
        .with_property("birth", test_time())
        .with_property("merried", true)
        .with_property("age", 22.7)
        .with_property("money", 34i64)
        .with_property("things", vec!["thing"])
        .with_property("adresses", Value::from(adresses))
}

pub fn friend() -> Edge {
    Edge::empty("friend").with_property("since", test_time())
}

/// Build a schema from inline template text, panicking with every issue
pub fn schema(source: &str) -> Schema {
    match source.parse() {
        Ok(schema) => schema,
        Err(err) => panic!("template failed to build:\n{}", err),
    }
}
