/*!
 * Core data types for lazyconnect.
 *
 * Identifiers and the dynamic value type that device service calls return.
 */
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for lazyconnect resources
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id(String);

impl Id {
    /// Create a new ID with a random UUID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create an ID from a string
    pub fn from_string<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_string())
    }

    /// Create an ID by joining a prefix and a suffix without a separator
    pub fn prefixed<P: AsRef<str>, S: AsRef<str>>(prefix: P, suffix: S) -> Self {
        Self(format!("{}{}", prefix.as_ref(), suffix.as_ref()))
    }

    /// Get the string representation of the ID
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A dynamically-typed value returned by device service calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value, the neutral result of an inert call
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// String value
    String(String),
    /// Array of values
    Array(Vec<Value>),
    /// Map of string keys to values
    Object(HashMap<String, Value>),
}

impl Value {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// A key-value pair of metadata
pub type Metadata = HashMap<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = Id::new();
        assert!(!id.as_str().is_empty());
        assert_ne!(Id::new(), id);

        let id: Id = "RINCON_000E58".into();
        assert_eq!(id.as_str(), "RINCON_000E58");

        let id = Id::prefixed("lazy", "192.168.1.20");
        assert_eq!(id.to_string(), "lazy192.168.1.20");
    }

    #[test]
    fn test_value_accessors() {
        assert!(Value::default().is_null());
        assert_eq!(Value::from("Kitchen").as_str(), Some("Kitchen"));
        assert_eq!(Value::from(String::from("Den")).as_str(), Some("Den"));
        assert_eq!(Value::Bool(false).as_str(), None);
        assert!(!Value::Integer(0).is_null());
    }

    #[test]
    fn test_value_serde_untagged() {
        let mut map = HashMap::new();
        map.insert("volume".to_string(), Value::Integer(12));
        let json = serde_json::to_string(&Value::Object(map)).unwrap();
        assert_eq!(json, r#"{"volume":12}"#);

        let parsed: Value = serde_json::from_str("null").unwrap();
        assert!(parsed.is_null());
    }
}
