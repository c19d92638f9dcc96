//! Configuration values — a small closed set of scalar and list shapes.
//!
//! Values are a tagged variant rather than an open dynamic type; callers
//! request a concrete shape and get an explicit coercion failure instead of
//! silent stringification.

use serde::{Deserialize, Serialize};

/// A single configuration value.
///
/// Untagged so TOML scalars map naturally: `true`, `42`, `"text"`,
/// `["a", "b"]`. Variant order matters for deserialization — bool and
/// integer must be tried before string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    String(String),
    List(Vec<String>),
}

impl ConfigValue {
    /// The shape name used in coercion error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::String(_) => "string",
            ConfigValue::List(_) => "list",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Integer(i)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(items: Vec<String>) -> Self {
        ConfigValue::List(items)
    }
}
