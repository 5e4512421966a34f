// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Core schema type definitions: data types, restrictions, properties,
// node/edge types and connection rules

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::value::Value;

/// `max` bound meaning "no upper limit"
pub const UNBOUNDED: i64 = -1;

static INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid int pattern"));
static FLOAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+$").expect("valid float pattern"));
static DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d\d\d\d-\d\d-\d\dT\d\d:\d\d:\d\dZ$").expect("valid datetime pattern")
});

/// Supported data types of template properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataType {
    #[default]
    Null,
    Int,
    Float,
    String,
    Bool,
    DateTime,
    Array,
    Map,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Null => "null",
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::String => "string",
            DataType::Bool => "bool",
            DataType::DateTime => "datetime",
            DataType::Array => "array",
            DataType::Map => "map",
        }
    }

    /// Non-container, non-null types; the only legal array/map subtypes
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            DataType::Int | DataType::Float | DataType::String | DataType::Bool | DataType::DateTime
        )
    }

    fn scalar_from_name(name: &str) -> Option<DataType> {
        match name {
            "int" => Some(DataType::Int),
            "float" => Some(DataType::Float),
            "string" => Some(DataType::String),
            "bool" => Some(DataType::Bool),
            "datetime" => Some(DataType::DateTime),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type descriptor parse errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("data type \"{0}\" can't have subtypes")]
    UnexpectedSubtype(String),

    #[error("data type \"array\" must have exactly 1 subtype")]
    ArrayArity,

    #[error("data type \"array\" has wrong value data subtype \"{0}\"")]
    ArrayValueType(String),

    #[error("data type \"map\" must have exactly 2 subtypes - 1 for keys and 1 for values")]
    MapArity,

    #[error("data type \"map\" has wrong key data subtype \"{0}\"")]
    MapKeyType(String),

    #[error("data type \"map\" has wrong value data subtype \"{0}\"")]
    MapValueType(String),

    #[error("data type \"map\" has wrong key data subtype \"{key}\"; data type \"map\" has wrong value data subtype \"{value}\"")]
    MapSubtypes { key: String, value: String },

    #[error("undefined data type \"{0}\"")]
    Undefined(String),
}

/// Full type of a property: the type itself plus, for containers, the
/// element (value) type and, for maps, the key type.
///
/// Scalars carry their own type as value type so restrictions can be
/// resolved the same way for scalars and container elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeDescriptor {
    pub data_type: DataType,
    pub value_type: DataType,
    pub key_type: DataType,
}

impl TypeDescriptor {
    pub fn scalar(data_type: DataType) -> Self {
        Self {
            data_type,
            value_type: data_type,
            key_type: DataType::Null,
        }
    }

    pub fn array(value_type: DataType) -> Self {
        Self {
            data_type: DataType::Array,
            value_type,
            key_type: DataType::Null,
        }
    }

    pub fn map(key_type: DataType, value_type: DataType) -> Self {
        Self {
            data_type: DataType::Map,
            value_type,
            key_type,
        }
    }

    /// Parse `<base>`, `array-<base>` or `map-<base>-<base>`
    pub fn parse(descriptor: &str) -> Result<Self, TypeError> {
        let parts: Vec<&str> = descriptor.split('-').collect();
        match parts[0] {
            "array" => {
                if parts.len() != 2 {
                    return Err(TypeError::ArrayArity);
                }
                DataType::scalar_from_name(parts[1])
                    .map(TypeDescriptor::array)
                    .ok_or_else(|| TypeError::ArrayValueType(parts[1].to_string()))
            }
            "map" => {
                if parts.len() != 3 {
                    return Err(TypeError::MapArity);
                }
                let key = DataType::scalar_from_name(parts[1]);
                let value = DataType::scalar_from_name(parts[2]);
                match (key, value) {
                    (Some(k), Some(v)) => Ok(TypeDescriptor::map(k, v)),
                    (None, Some(_)) => Err(TypeError::MapKeyType(parts[1].to_string())),
                    (Some(_), None) => Err(TypeError::MapValueType(parts[2].to_string())),
                    (None, None) => Err(TypeError::MapSubtypes {
                        key: parts[1].to_string(),
                        value: parts[2].to_string(),
                    }),
                }
            }
            base => match DataType::scalar_from_name(base) {
                Some(_) if parts.len() > 1 => Err(TypeError::UnexpectedSubtype(base.to_string())),
                Some(data_type) => Ok(TypeDescriptor::scalar(data_type)),
                None => Err(TypeError::Undefined(descriptor.to_string())),
            },
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data_type {
            DataType::Array => write!(f, "array-{}", self.value_type),
            DataType::Map => write!(f, "map-{}-{}", self.key_type, self.value_type),
            other => write!(f, "{}", other),
        }
    }
}

/// How a restriction restricts values of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestrictionKind {
    Value,
    Regexp,
    KeyValue,
    KeyRegexp,
}

impl RestrictionKind {
    pub const ALL: [RestrictionKind; 4] = [
        RestrictionKind::Value,
        RestrictionKind::Regexp,
        RestrictionKind::KeyValue,
        RestrictionKind::KeyRegexp,
    ];

    /// Key restrictions apply to map keys and are legal on maps only
    pub fn is_key(&self) -> bool {
        matches!(self, RestrictionKind::KeyValue | RestrictionKind::KeyRegexp)
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, RestrictionKind::Regexp | RestrictionKind::KeyRegexp)
    }

    /// Name of the restriction list in the schema source
    pub fn section(&self) -> &'static str {
        match self {
            RestrictionKind::Value => "values",
            RestrictionKind::Regexp => "regexps",
            RestrictionKind::KeyValue => "key_values",
            RestrictionKind::KeyRegexp => "key_regexps",
        }
    }
}

impl fmt::Display for RestrictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RestrictionKind::Value => "value",
            RestrictionKind::Regexp => "regexp",
            RestrictionKind::KeyValue => "key value",
            RestrictionKind::KeyRegexp => "key regexp",
        };
        f.write_str(name)
    }
}

/// Restriction construction errors
#[derive(Error, Debug, Clone)]
pub enum RestrictionError {
    #[error("restriction \"{0}\" can't be inferred because of undefined or wrong data type of restricted property")]
    UntypedProperty(String),

    #[error("data type \"{0}\" can't have key restrictions")]
    KeyRestrictionOnNonMap(DataType),

    #[error("restriction \"{raw}\" has wrong regexp schema")]
    InvalidPattern {
        raw: String,
        #[source]
        source: regex::Error,
    },

    #[error("restriction \"{raw}\" doesn't match \"{expected}\" data type")]
    TypeMismatch { raw: String, expected: DataType },

    #[error("\"datetime\" restriction \"{raw}\" doesn't match RFC3339 (YYYY-MM-DDTHH:MM:SSZ) format: {source}")]
    InvalidDateTime {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Clone)]
enum Matcher {
    Exact(Value),
    Pattern(Regex),
}

/// A single restriction of a property: an exact value or a compiled
/// pattern, applied either to values (elements) or to map keys
#[derive(Debug, Clone)]
pub struct Restriction {
    data_type: DataType,
    kind: RestrictionKind,
    matcher: Matcher,
}

impl Restriction {
    /// Build a restriction of `kind` for a property of type `descriptor`
    /// from its raw textual form
    pub fn new(
        descriptor: &TypeDescriptor,
        kind: RestrictionKind,
        raw: &str,
    ) -> Result<Self, RestrictionError> {
        if descriptor.data_type == DataType::Null {
            return Err(RestrictionError::UntypedProperty(raw.to_string()));
        }

        let data_type = if kind.is_key() {
            if descriptor.data_type != DataType::Map {
                return Err(RestrictionError::KeyRestrictionOnNonMap(
                    descriptor.data_type,
                ));
            }
            descriptor.key_type
        } else {
            descriptor.value_type
        };

        let matcher = if kind.is_pattern() {
            let re = Regex::new(raw).map_err(|source| RestrictionError::InvalidPattern {
                raw: raw.to_string(),
                source,
            })?;
            Matcher::Pattern(re)
        } else {
            Matcher::Exact(parse_exact(data_type, raw)?)
        };

        Ok(Self {
            data_type,
            kind,
            matcher,
        })
    }

    pub fn kind(&self) -> RestrictionKind {
        self.kind
    }

    /// Type of the values this restriction is checked against
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Exact restrictions compare by equality; pattern restrictions match
    /// the value's canonical text
    pub fn matches(&self, value: &Value) -> bool {
        match &self.matcher {
            Matcher::Exact(expected) => expected == value,
            Matcher::Pattern(re) => re.is_match(&value.canonical_text()),
        }
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.matcher {
            Matcher::Exact(value) => write!(f, "{}", value),
            Matcher::Pattern(re) => write!(f, "{}", re.as_str()),
        }
    }
}

fn parse_exact(data_type: DataType, raw: &str) -> Result<Value, RestrictionError> {
    let mismatch = || RestrictionError::TypeMismatch {
        raw: raw.to_string(),
        expected: data_type,
    };
    match data_type {
        DataType::Int if INT_RE.is_match(raw) => {
            raw.parse::<i64>().map(Value::Int).map_err(|_| mismatch())
        }
        DataType::Float if FLOAT_RE.is_match(raw) => {
            raw.parse::<f64>().map(Value::Float).map_err(|_| mismatch())
        }
        DataType::String => Ok(Value::String(raw.to_string())),
        DataType::Bool if raw == "true" || raw == "false" => Ok(Value::Bool(raw == "true")),
        DataType::DateTime if DATETIME_RE.is_match(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
            .map_err(|source| RestrictionError::InvalidDateTime {
                raw: raw.to_string(),
                source,
            }),
        _ => Err(mismatch()),
    }
}

/// Definition of a property within a node, edge or label
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub descriptor: TypeDescriptor,
    pub value_restrictions: Vec<Restriction>,
    pub key_restrictions: Vec<Restriction>,
}

impl Property {
    pub fn new(name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            descriptor,
            value_restrictions: Vec::new(),
            key_restrictions: Vec::new(),
        }
    }

    /// Attach a restriction to the value or key list according to its kind
    pub fn push_restriction(&mut self, restriction: Restriction) {
        if restriction.kind().is_key() {
            self.key_restrictions.push(restriction);
        } else {
            self.value_restrictions.push(restriction);
        }
    }

    pub fn with_restriction(mut self, restriction: Restriction) -> Self {
        self.push_restriction(restriction);
        self
    }
}

/// Which namespace a type lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Node,
    Edge,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Node => f.write_str("node"),
            EntityKind::Edge => f.write_str("edge"),
        }
    }
}

/// Definition of a node or edge type: a name and its declared properties
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub kind: EntityKind,
    pub name: String,
    pub properties: HashMap<String, Property>,
}

impl TypeDefinition {
    pub fn node(name: impl Into<String>) -> Self {
        Self::new(EntityKind::Node, name)
    }

    pub fn edge(name: impl Into<String>) -> Self {
        Self::new(EntityKind::Edge, name)
    }

    fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            properties: HashMap::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Case-insensitive property lookup
    pub fn property_ignore_case(&self, name: &str) -> Option<&Property> {
        self.properties.get(name).or_else(|| {
            let lower = name.to_lowercase();
            self.properties
                .values()
                .find(|p| p.name.to_lowercase() == lower)
        })
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.insert(property.name.clone(), property);
        self
    }
}

/// Minimum and maximum number of edges from one main node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cardinality {
    pub min: i64,
    pub max: i64,
}

impl Cardinality {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.max == UNBOUNDED
    }

    pub fn is_below(&self, count: usize) -> bool {
        (count as i64) < self.min
    }

    pub fn is_above(&self, count: usize) -> bool {
        !self.is_unbounded() && (count as i64) > self.max
    }

    pub fn admits(&self, count: usize) -> bool {
        !self.is_below(count) && !self.is_above(count)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            write!(f, "[{}, inf]", self.min)
        } else {
            write!(f, "[{}, {}]", self.min, self.max)
        }
    }
}

/// Connection rule: edges of type `edge` directed from one `main` node to
/// any number of `subject` nodes, bounded by `bounds`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub main: String,
    pub subject: String,
    pub edge: String,
    pub bounds: Cardinality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_descriptor_parsing() {
        assert_eq!(
            TypeDescriptor::parse("int").unwrap(),
            TypeDescriptor::scalar(DataType::Int)
        );
        assert_eq!(
            TypeDescriptor::parse("array-string").unwrap(),
            TypeDescriptor::array(DataType::String)
        );
        let map = TypeDescriptor::parse("map-string-datetime").unwrap();
        assert_eq!(map.key_type, DataType::String);
        assert_eq!(map.value_type, DataType::DateTime);
        assert_eq!(map.to_string(), "map-string-datetime");
    }

    #[test]
    fn test_type_descriptor_errors() {
        assert_eq!(
            TypeDescriptor::parse("int-string"),
            Err(TypeError::UnexpectedSubtype("int".to_string()))
        );
        assert_eq!(TypeDescriptor::parse("array"), Err(TypeError::ArrayArity));
        assert_eq!(
            TypeDescriptor::parse("array-string-int"),
            Err(TypeError::ArrayArity)
        );
        assert_eq!(
            TypeDescriptor::parse("array-map"),
            Err(TypeError::ArrayValueType("map".to_string()))
        );
        assert_eq!(TypeDescriptor::parse("map-string"), Err(TypeError::MapArity));
        assert_eq!(
            TypeDescriptor::parse("map-array-int"),
            Err(TypeError::MapKeyType("array".to_string()))
        );
        assert!(matches!(
            TypeDescriptor::parse("map-x-y"),
            Err(TypeError::MapSubtypes { .. })
        ));
        assert_eq!(
            TypeDescriptor::parse("decimal"),
            Err(TypeError::Undefined("decimal".to_string()))
        );
    }

    #[test]
    fn test_exact_restrictions() {
        let int = TypeDescriptor::scalar(DataType::Int);
        let r = Restriction::new(&int, RestrictionKind::Value, "34").unwrap();
        assert!(r.matches(&Value::Int(34)));
        assert!(!r.matches(&Value::Int(35)));
        assert_eq!(r.to_string(), "34");

        assert!(matches!(
            Restriction::new(&int, RestrictionKind::Value, "-3"),
            Err(RestrictionError::TypeMismatch { .. })
        ));

        let float = TypeDescriptor::scalar(DataType::Float);
        assert!(Restriction::new(&float, RestrictionKind::Value, "22.7").is_ok());
        assert!(Restriction::new(&float, RestrictionKind::Value, "22").is_err());

        let boolean = TypeDescriptor::scalar(DataType::Bool);
        assert!(Restriction::new(&boolean, RestrictionKind::Value, "true").is_ok());
        assert!(Restriction::new(&boolean, RestrictionKind::Value, "yes").is_err());
    }

    #[test]
    fn test_datetime_restriction() {
        let dt = TypeDescriptor::scalar(DataType::DateTime);
        let err = Restriction::new(&dt, RestrictionKind::Value, "1111-11-11T11:11:11").unwrap_err();
        assert_eq!(
            err.to_string(),
            "restriction \"1111-11-11T11:11:11\" doesn't match \"datetime\" data type"
        );

        assert!(matches!(
            Restriction::new(&dt, RestrictionKind::Value, "2020-13-45T11:11:11Z"),
            Err(RestrictionError::InvalidDateTime { .. })
        ));
        assert!(Restriction::new(&dt, RestrictionKind::Value, "1111-11-11T11:11:11Z").is_ok());
    }

    #[test]
    fn test_key_restrictions_require_map() {
        let string = TypeDescriptor::scalar(DataType::String);
        assert!(matches!(
            Restriction::new(&string, RestrictionKind::KeyRegexp, "^a"),
            Err(RestrictionError::KeyRestrictionOnNonMap(DataType::String))
        ));

        let map = TypeDescriptor::map(DataType::Int, DataType::String);
        let key = Restriction::new(&map, RestrictionKind::KeyValue, "7").unwrap();
        assert_eq!(key.data_type(), DataType::Int);
        assert!(key.matches(&Value::Int(7)));
    }

    #[test]
    fn test_invalid_pattern() {
        let string = TypeDescriptor::scalar(DataType::String);
        assert!(matches!(
            Restriction::new(&string, RestrictionKind::Regexp, "(unclosed"),
            Err(RestrictionError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_cardinality() {
        let open = Cardinality::new(0, UNBOUNDED);
        assert!(open.admits(0));
        assert!(open.admits(1000));

        let bounded = Cardinality::new(1, 2);
        assert!(bounded.is_below(0));
        assert!(bounded.admits(1));
        assert!(bounded.admits(2));
        assert!(bounded.is_above(3));
    }
}
