// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Validation of graph data against a resolved schema
//!
//! Validation stops at the first failing check and reports it with the
//! entity type, property and role it concerns.

pub mod batch;
pub mod entity;
pub mod property;
pub mod structural;
pub mod validator;

pub use batch::{BatchValidator, ValidationStats};
pub use entity::{Duplet, Edge, Entity, Node, Triplet};
pub use property::{PropertyError, Position};
pub use structural::{Shape, Unknown};
pub use validator::{validate, Outcome, Validatable, Validator};

use std::fmt;
use thiserror::Error;

use crate::schema::types::{Cardinality, EntityKind};
use property::quote_list;

/// Result alias for validation calls
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Role of an entity within a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Main,
    Subject,
    Edge,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Main => f.write_str("main node"),
            Role::Subject => f.write_str("subject node"),
            Role::Edge => f.write_str("edge"),
        }
    }
}

/// Validation failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("\"{type_name}\"-{kind}: there is no such {kind} type in the schema")]
    UnknownType { kind: EntityKind, type_name: String },

    #[error("\"{type_name}\"-{kind}: validated entity has extra {} properties{}", quote_list(.extra), missing_suffix(.missing))]
    ExtraProperty {
        kind: EntityKind,
        type_name: String,
        extra: Vec<String>,
        missing: Vec<String>,
    },

    #[error("\"{type_name}\"-{kind}: validated entity doesn't have {} properties", quote_list(.missing))]
    MissingProperty {
        kind: EntityKind,
        type_name: String,
        missing: Vec<String>,
    },

    #[error("\"{type_name}\"-{kind}: \"{property}\"-property: {source}")]
    Property {
        kind: EntityKind,
        type_name: String,
        property: String,
        #[source]
        source: PropertyError,
    },

    #[error("triplet has no {0}")]
    IncompleteTriplet(Role),

    #[error("there is no connection from \"{main}\" to \"{subject}\" via \"{edge}\" in the schema")]
    UndeclaredConnection {
        main: String,
        subject: String,
        edge: String,
    },

    #[error("there is no connection involving \"{node}\" node via \"{edge}\" edge in the schema")]
    NoDupletConnection { node: String, edge: String },

    #[error("\"{main}\" node has {count} \"{edge}\" connection(s) to \"{subject}\" nodes, below the minimum of {}", .bounds.min)]
    BelowMinimum {
        main: String,
        subject: String,
        edge: String,
        count: usize,
        bounds: Cardinality,
    },

    #[error("\"{main}\" node has {count} \"{edge}\" connection(s) to \"{subject}\" nodes, above the maximum of {}", .bounds.max)]
    AboveMaximum {
        main: String,
        subject: String,
        edge: String,
        count: usize,
        bounds: Cardinality,
    },

    #[error("{role}: {source}")]
    InRole {
        role: Role,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("unknown value can't be evaluated: {0} is not a record or map")]
    UnsupportedShape(String),

    #[error("unknown value: its type name doesn't match any node or edge type in the schema")]
    NoMatchingType,

    #[error("unknown value failed both validations: as node - {as_node}; as edge - {as_edge}")]
    StructuralMismatch { as_node: String, as_edge: String },
}

fn missing_suffix(missing: &[String]) -> String {
    if missing.is_empty() {
        String::new()
    } else {
        format!(" and doesn't have {} properties", quote_list(missing))
    }
}

impl ValidationError {
    pub(crate) fn in_role(self, role: Role) -> Self {
        ValidationError::InRole {
            role,
            source: Box::new(self),
        }
    }

    /// The failure itself, without role wrappers
    pub fn root_cause(&self) -> &ValidationError {
        match self {
            ValidationError::InRole { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_property_names_both_sides() {
        let err = ValidationError::ExtraProperty {
            kind: EntityKind::Node,
            type_name: "Person".to_string(),
            extra: vec!["nick".to_string()],
            missing: vec!["name".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "\"Person\"-node: validated entity has extra \"nick\" properties and doesn't have \"name\" properties"
        );
    }

    #[test]
    fn test_root_cause_unwraps_roles() {
        let inner = ValidationError::UnknownType {
            kind: EntityKind::Edge,
            type_name: "enemy".to_string(),
        };
        let wrapped = inner.clone().in_role(Role::Edge).in_role(Role::Main);
        assert_eq!(wrapped.root_cause(), &inner);
        assert_eq!(
            inner.in_role(Role::Edge).to_string(),
            "edge: \"enemy\"-edge: there is no such edge type in the schema"
        );
    }
}
