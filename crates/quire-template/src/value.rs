//! Dynamic payload tree.
//!
//! Render payloads arrive as arbitrary JSON documents. [`Value`] mirrors that
//! shape as an explicit tagged union so the expander can pattern match on it
//! instead of probing untyped maps.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// String-keyed object node.
pub type Map = BTreeMap<String, Value>;

/// Top-level render payload (the document being rendered into a template).
pub type Payload = Map;

/// A node in the payload tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit `null`.
    #[default]
    Null,
    /// Boolean leaf.
    Bool(bool),
    /// Numeric leaf. All numbers are carried as `f64`, like JSON.
    Number(f64),
    /// String leaf.
    String(String),
    /// Ordered list of values.
    Array(Vec<Value>),
    /// String-keyed object.
    Object(Map),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for objects and arrays.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Borrow the object map, if this is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the string contents, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Compact JSON rendering, used for containers that end up in text.
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Plain string form.
///
/// Numbers use Rust's shortest round-trip formatting (`1`, `1.5`), `null`
/// is empty, and containers render as compact JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Array(_) | Self::Object(_) => f.write_str(&self.to_json()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Convert a JSON document into a render payload.
///
/// Non-object documents yield an empty payload.
#[must_use]
pub fn payload_from_json(value: serde_json::Value) -> Payload {
    match Value::from(value) {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}
