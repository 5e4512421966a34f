// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Serde model of the schema source document
//!
//! The document mirrors the YAML layout one to one: `labels`, `nodes` and
//! `edges` sections keyed by type name. Unknown keys are rejected. Entries
//! written without a body (`friend:`) deserialize to empty definitions.

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Top level of a schema document
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    #[serde(default, deserialize_with = "entries")]
    pub labels: BTreeMap<String, LabelDef>,
    #[serde(default, deserialize_with = "entries")]
    pub nodes: BTreeMap<String, NodeDef>,
    #[serde(default, deserialize_with = "entries")]
    pub edges: BTreeMap<String, EdgeDef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelDef {
    #[serde(default, deserialize_with = "entries")]
    pub properties: BTreeMap<String, PropertyDef>,
    #[serde(default, deserialize_with = "nullable")]
    pub connections: BTreeMap<String, Vec<ConnectionDef>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDef {
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "entries")]
    pub properties: BTreeMap<String, PropertyDef>,
    #[serde(default, deserialize_with = "nullable")]
    pub connections: BTreeMap<String, Vec<ConnectionDef>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeDef {
    #[serde(default, deserialize_with = "entries")]
    pub properties: BTreeMap<String, PropertyDef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDef {
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub restrictions: RestrictionsDef,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestrictionsDef {
    #[serde(default, deserialize_with = "nullable")]
    pub values: Vec<RawScalar>,
    #[serde(default, deserialize_with = "nullable")]
    pub regexps: Vec<RawScalar>,
    #[serde(default, deserialize_with = "nullable")]
    pub key_values: Vec<RawScalar>,
    #[serde(default, deserialize_with = "nullable")]
    pub key_regexps: Vec<RawScalar>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionDef {
    #[serde(default)]
    pub edge: String,
    #[serde(default, deserialize_with = "nullable")]
    pub ratio: RatioDef,
}

/// Connection bounds as written; both default to 0
#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatioDef {
    #[serde(default)]
    pub min: i64,
    #[serde(default)]
    pub max: i64,
}

/// A restriction exactly as written in the source, before typing.
///
/// YAML resolves `34`, `22.7` and `true` to numbers and booleans; the
/// builder needs their text back to parse them against the declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawScalar(pub String);

impl RawScalar {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for RawScalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawScalarVisitor;

        impl<'de> Visitor<'de> for RawScalarVisitor {
            type Value = RawScalar;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a scalar restriction value")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<RawScalar, E> {
                Ok(RawScalar(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawScalar, E> {
                Ok(RawScalar(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawScalar, E> {
                Ok(RawScalar(v.to_string()))
            }

            // Debug keeps the fractional part of whole floats ("1.0")
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<RawScalar, E> {
                Ok(RawScalar(format!("{:?}", v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RawScalar, E> {
                Ok(RawScalar(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<RawScalar, E> {
                Ok(RawScalar(v))
            }
        }

        deserializer.deserialize_any(RawScalarVisitor)
    }
}

/// Maps a possibly-null section to a map whose null entries become defaults
fn entries<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let raw: Option<BTreeMap<String, Option<T>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, def)| (name, def.unwrap_or_default()))
        .collect())
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
