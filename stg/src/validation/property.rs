// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Property evaluation against schema property definitions

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::schema::types::{DataType, Property, Restriction, RestrictionKind, TypeDescriptor};
use crate::value::Value;

/// Where in a property value a check failed
#[derive(Debug, Clone, PartialEq)]
pub enum Position {
    Value,
    ArrayElement(usize),
    MapValue(String),
    MapKey,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Value => f.write_str("value"),
            Position::ArrayElement(i) => write!(f, "array-value at index {}", i),
            Position::MapValue(key) => write!(f, "map-value under \"{}\" key", key),
            Position::MapKey => f.write_str("map-key"),
        }
    }
}

/// A property value failing its definition
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyError {
    #[error("{position} \"{value}\" doesn't match \"{expected}\" data type")]
    TypeMismatch {
        position: Position,
        value: String,
        expected: DataType,
    },

    #[error("{position} \"{value}\" doesn't match any {kind} restriction: {}", quote_list(.restrictions))]
    Unsatisfied {
        position: Position,
        value: String,
        kind: RestrictionKind,
        restrictions: Vec<String>,
    },
}

pub(crate) fn quote_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("\"{}\"", item))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check a runtime value against a property definition.
///
/// Containers are checked element by element. A restriction list of one
/// kind is satisfied when any of its restrictions matches; every present
/// kind must be satisfied by every element, value and key.
pub fn evaluate(property: &Property, value: &Value) -> Result<(), PropertyError> {
    let descriptor = &property.descriptor;
    match descriptor.data_type {
        DataType::Array => {
            let items = match value {
                Value::Array(items) => items,
                other => return Err(mismatch(Position::Value, other, DataType::Array)),
            };
            for (i, item) in items.iter().enumerate() {
                check_type(Position::ArrayElement(i), item, descriptor.value_type)?;
            }
            for (i, item) in items.iter().enumerate() {
                check_restrictions(
                    Position::ArrayElement(i),
                    item,
                    &property.value_restrictions,
                )?;
            }
            Ok(())
        }
        DataType::Map => {
            let entries = match value {
                Value::Map(entries) => entries,
                other => return Err(mismatch(Position::Value, other, DataType::Map)),
            };
            for (key, item) in entries {
                check_type(Position::MapKey, key, descriptor.key_type)?;
                check_type(
                    Position::MapValue(key.canonical_text()),
                    item,
                    descriptor.value_type,
                )?;
            }
            for (key, item) in entries {
                check_restrictions(
                    Position::MapValue(key.canonical_text()),
                    item,
                    &property.value_restrictions,
                )?;
                check_restrictions(Position::MapKey, key, &property.key_restrictions)?;
            }
            Ok(())
        }
        expected => {
            check_type(Position::Value, value, expected)?;
            check_restrictions(Position::Value, value, &property.value_restrictions)
        }
    }
}

fn mismatch(position: Position, value: &Value, expected: DataType) -> PropertyError {
    PropertyError::TypeMismatch {
        position,
        value: value.canonical_text(),
        expected,
    }
}

fn check_type(position: Position, value: &Value, expected: DataType) -> Result<(), PropertyError> {
    if value.data_type() == expected {
        Ok(())
    } else {
        Err(mismatch(position, value, expected))
    }
}

fn check_restrictions(
    position: Position,
    value: &Value,
    restrictions: &[Restriction],
) -> Result<(), PropertyError> {
    for kind in RestrictionKind::ALL {
        let of_kind: Vec<&Restriction> = restrictions.iter().filter(|r| r.kind() == kind).collect();
        if !of_kind.is_empty() && !of_kind.iter().any(|r| r.matches(value)) {
            return Err(PropertyError::Unsatisfied {
                position,
                value: value.canonical_text(),
                kind,
                restrictions: of_kind.iter().map(|r| r.to_string()).collect(),
            });
        }
    }
    Ok(())
}

/// Bring a loosely typed value (decoded from JSON or YAML) closer to a
/// declared type: RFC3339 strings become datetimes, integers become floats
/// and string map keys are parsed into the declared key type. Values that
/// cannot be converted are returned unchanged.
pub fn coerce(descriptor: &TypeDescriptor, value: Value) -> Value {
    match (descriptor.data_type, value) {
        (DataType::Array, Value::Array(items)) => Value::Array(
            items
                .into_iter()
                .map(|item| coerce_scalar(descriptor.value_type, item))
                .collect(),
        ),
        (DataType::Map, Value::Map(entries)) => Value::Map(
            entries
                .into_iter()
                .map(|(key, item)| {
                    (
                        coerce_scalar(descriptor.key_type, key),
                        coerce_scalar(descriptor.value_type, item),
                    )
                })
                .collect(),
        ),
        (data_type, value) => coerce_scalar(data_type, value),
    }
}

fn coerce_scalar(expected: DataType, value: Value) -> Value {
    match (expected, value) {
        (DataType::Float, Value::Int(i)) => Value::Float(i as f64),
        (DataType::DateTime, Value::String(s)) => match DateTime::parse_from_rfc3339(&s) {
            Ok(dt) => Value::DateTime(dt.with_timezone(&Utc)),
            Err(_) => Value::String(s),
        },
        (DataType::Int, Value::String(s)) => s.parse().map(Value::Int).unwrap_or(Value::String(s)),
        (DataType::Float, Value::String(s)) => {
            s.parse().map(Value::Float).unwrap_or(Value::String(s))
        }
        (DataType::Bool, Value::String(s)) => match s.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(s),
        },
        (_, value) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn restricted(descriptor: &str, restrictions: &[(RestrictionKind, &str)]) -> Property {
        let descriptor = TypeDescriptor::parse(descriptor).unwrap();
        let mut property = Property::new("p", descriptor);
        for (kind, raw) in restrictions {
            property.push_restriction(Restriction::new(&descriptor, *kind, raw).unwrap());
        }
        property
    }

    #[test]
    fn test_scalar_value_restriction() {
        let age = restricted("int", &[(RestrictionKind::Value, "34")]);
        assert!(evaluate(&age, &Value::Int(34)).is_ok());

        let err = evaluate(&age, &Value::Int(35)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "value \"35\" doesn't match any value restriction: \"34\""
        );
    }

    #[test]
    fn test_scalar_type_mismatch() {
        let name = restricted("string", &[]);
        let err = evaluate(&name, &Value::Int(1)).unwrap_err();
        assert!(matches!(
            err,
            PropertyError::TypeMismatch {
                expected: DataType::String,
                ..
            }
        ));
    }

    #[test]
    fn test_unrestricted_scalar_accepts_any_typed_value() {
        let flag = restricted("bool", &[]);
        assert!(evaluate(&flag, &Value::Bool(false)).is_ok());
    }

    #[test]
    fn test_every_kind_must_be_satisfied() {
        let name = restricted(
            "string",
            &[
                (RestrictionKind::Value, "Jora"),
                (RestrictionKind::Value, "Vasya"),
                (RestrictionKind::Regexp, "^J"),
            ],
        );
        assert!(evaluate(&name, &Value::from("Jora")).is_ok());
        let err = evaluate(&name, &Value::from("Vasya")).unwrap_err();
        assert!(matches!(
            err,
            PropertyError::Unsatisfied {
                kind: RestrictionKind::Regexp,
                ..
            }
        ));
    }

    #[test]
    fn test_array_element_restrictions() {
        let things = restricted(
            "array-string",
            &[(RestrictionKind::Regexp, "^thi..")],
        );
        assert!(evaluate(&things, &Value::from(vec!["thing", "this"])).is_ok());
        assert!(evaluate(&things, &Value::Array(vec![])).is_ok());

        let err = evaluate(&things, &Value::from(vec!["thing", "stone"])).unwrap_err();
        assert!(err.to_string().contains("\"stone\""));
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn test_array_element_types() {
        let numbers = restricted("array-int", &[]);
        let mixed = Value::Array(vec![Value::Int(1), Value::from("2")]);
        assert!(matches!(
            evaluate(&numbers, &mixed),
            Err(PropertyError::TypeMismatch {
                position: Position::ArrayElement(1),
                ..
            })
        ));
        assert!(evaluate(&numbers, &Value::Int(1)).is_err());
    }

    #[test]
    fn test_map_key_and_value_restrictions() {
        let addresses = restricted(
            "map-string-string",
            &[
                (RestrictionKind::Regexp, "^house"),
                (RestrictionKind::KeyRegexp, "^street .+"),
            ],
        );
        let good = Value::Map(vec![
            (Value::from("street 1"), Value::from("house 12")),
            (Value::from("street 2"), Value::from("house 3")),
        ]);
        assert!(evaluate(&addresses, &good).is_ok());

        let bad_value = Value::Map(vec![(Value::from("street 1"), Value::from("shed"))]);
        let err = evaluate(&addresses, &bad_value).unwrap_err();
        assert!(err.to_string().contains("\"shed\""));

        let bad_key = Value::Map(vec![(Value::from("avenue"), Value::from("house 1"))]);
        assert!(matches!(
            evaluate(&addresses, &bad_key),
            Err(PropertyError::Unsatisfied {
                position: Position::MapKey,
                ..
            })
        ));
    }

    #[test]
    fn test_datetime_restrictions_compare_instants() {
        let birth = restricted(
            "datetime",
            &[(RestrictionKind::Value, "1111-11-11T11:11:11Z")],
        );
        let dt = Utc.with_ymd_and_hms(1111, 11, 11, 11, 11, 11).unwrap();
        assert!(evaluate(&birth, &Value::DateTime(dt)).is_ok());
    }

    #[test]
    fn test_coerce() {
        let dt = TypeDescriptor::scalar(DataType::DateTime);
        assert!(matches!(
            coerce(&dt, Value::from("1111-11-11T11:11:11Z")),
            Value::DateTime(_)
        ));
        assert_eq!(
            coerce(&TypeDescriptor::scalar(DataType::Float), Value::Int(3)),
            Value::Float(3.0)
        );
        let map = TypeDescriptor::map(DataType::Int, DataType::String);
        assert_eq!(
            coerce(&map, Value::Map(vec![(Value::from("7"), Value::from("x"))])),
            Value::Map(vec![(Value::Int(7), Value::from("x"))])
        );
        assert_eq!(
            coerce(&TypeDescriptor::scalar(DataType::Int), Value::from("seven")),
            Value::from("seven")
        );
    }
}
