// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! STG - schema templates for typed property graphs
//!
//! STG parses a declarative YAML template describing node types, edge types,
//! reusable labels and connection cardinalities, and validates graph data
//! against the resolved schema.
//!
//! # Features
//!
//! - **Template language**: typed properties (scalars, arrays, maps) with
//!   value, regexp, key-value and key-regexp restrictions
//! - **Labels**: reusable property and connection bundles merged into nodes
//! - **Error accumulation**: every template problem is reported at once with
//!   its location, e.g. `template | nodes | Person | properties | age >> ...`
//! - **Validation**: nodes, edges, duplets, triplets, whole graphs with
//!   min/max connection counts, and structurally typed unknown values
//!
//! # Usage
//!
//! ```ignore
//! use stg::{Graph, Node, Schema, Triplet};
//!
//! let schema: Schema = std::fs::read_to_string("template.yaml")?.parse()?;
//! let jora = Node::new("Person", [("name", "Jora")]);
//! stg::validate(&schema, &jora)?;
//! ```

pub mod config;
pub mod graph;
pub mod schema;
pub mod validation;
pub mod value;

pub use config::{EnforcementMode, ValidationConfig};
pub use graph::{Graph, TripletRef};
pub use schema::{parse_schema, Schema, SchemaError, SchemaIssue, SchemaIssues, SchemaResult};
pub use validation::{
    validate, BatchValidator, Duplet, Edge, Entity, Node, Outcome, Triplet, Unknown,
    Validatable, ValidationError, ValidationResult, ValidationStats, Validator,
};
pub use value::Value;

/// STG version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// STG crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
