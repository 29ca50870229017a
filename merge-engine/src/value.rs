//! Format-independent document values.
//!
//! Structured documents are parsed into a closed [`Value`] tree by one
//! adapter per format. The merge itself only ever sees `Value`s; the
//! adapters are the only code that knows about JSON or YAML syntax.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::MergeError;
use crate::types::Side;

/// A mapping of string keys to values. Key order is not significant;
/// documents are written back in sorted key order.
pub type Mapping = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Mapping(Mapping),
    Sequence(Vec<Value>),
}

impl Value {
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Canonical byte form used for equality checks.
    ///
    /// Two values are "the same change" only if these bytes match, so
    /// `1` and `1.0` compare unequal.
    pub fn canonical_bytes(&self) -> Option<Vec<u8>> {
        serde_json::to_vec(self).ok()
    }

    /// Compact single-line rendering for conflict reports.
    pub fn render(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Scalar(Scalar::Int(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

/// Equality by canonical serialization. Values that fail to serialize are
/// never equal, not even to themselves.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.canonical_bytes(), b.canonical_bytes()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(n) => serializer.serialize_i64(*n),
            Scalar::UInt(n) => serializer.serialize_u64(*n),
            Scalar::Float(f) => serializer.serialize_f64(*f),
            Scalar::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Scalar(s) => s.serialize(serializer),
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Mapping(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k, v)?;
                }
                m.end()
            }
        }
    }
}

/// Serialization formats understood by the structured merger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "JSON",
            DocumentFormat::Yaml => "YAML",
        }
    }

    /// Parse a document whose root must be a mapping.
    ///
    /// Empty or whitespace-only input is an empty mapping.
    pub fn parse(&self, side: Side, bytes: &[u8]) -> Result<Mapping, MergeError> {
        let parse_err = |message: String| MergeError::Parse {
            side,
            format: *self,
            message,
        };

        let text = std::str::from_utf8(bytes).map_err(|e| parse_err(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Mapping::new());
        }

        let value = match self {
            DocumentFormat::Json => serde_json::from_str::<serde_json::Value>(text)
                .map(from_json)
                .map_err(|e| parse_err(e.to_string()))?,
            DocumentFormat::Yaml => serde_yaml::from_str::<serde_yaml::Value>(text)
                .map(from_yaml)
                .map_err(|e| parse_err(e.to_string()))?,
        };

        match value {
            Value::Mapping(m) => Ok(m),
            Value::Scalar(Scalar::Null) => Ok(Mapping::new()),
            _ => Err(parse_err("document root is not a mapping".into())),
        }
    }

    /// Write a mapping back out in this format, newline-terminated.
    pub fn render(&self, map: &Mapping) -> Result<Vec<u8>, MergeError> {
        let ser_err = |message: String| MergeError::Serialize {
            format: *self,
            message,
        };
        match self {
            DocumentFormat::Json => {
                let mut out = serde_json::to_vec_pretty(map).map_err(|e| ser_err(e.to_string()))?;
                out.push(b'\n');
                Ok(out)
            }
            DocumentFormat::Yaml => serde_yaml::to_string(map)
                .map(String::into_bytes)
                .map_err(|e| ser_err(e.to_string())),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Scalar(Scalar::Null),
        serde_json::Value::Bool(b) => Value::Scalar(Scalar::Bool(b)),
        serde_json::Value::Number(n) => Value::Scalar(json_number(&n)),
        serde_json::Value::String(s) => Value::Scalar(Scalar::String(s)),
        serde_json::Value::Array(items) => {
            Value::Sequence(items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(obj) => {
            Value::Mapping(obj.into_iter().map(|(k, v)| (k, from_json(v))).collect())
        }
    }
}

fn json_number(n: &serde_json::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Int(i)
    } else if let Some(u) = n.as_u64() {
        Scalar::UInt(u)
    } else {
        Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn from_yaml(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Scalar(Scalar::Null),
        serde_yaml::Value::Bool(b) => Value::Scalar(Scalar::Bool(b)),
        serde_yaml::Value::Number(n) => Value::Scalar(yaml_number(&n)),
        serde_yaml::Value::String(s) => Value::Scalar(Scalar::String(s)),
        serde_yaml::Value::Sequence(items) => {
            Value::Sequence(items.into_iter().map(from_yaml).collect())
        }
        serde_yaml::Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (yaml_key(k), from_yaml(v)))
                .collect(),
        ),
        // Tags are dropped; only the tagged value takes part in the merge.
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Int(i)
    } else if let Some(u) = n.as_u64() {
        Scalar::UInt(u)
    } else {
        Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Non-string YAML keys (`1:`, `true:`) are keyed by their scalar text.
fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => from_yaml(other).render(),
    }
}
