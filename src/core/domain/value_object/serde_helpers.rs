//! Serde helpers for custom deserialization.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes a JSON scalar into an optional string.
///
/// Attribute values arrive as strings, numbers, booleans or null depending on
/// the attribute type; all of them are compared as text.
pub mod lenient_string {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            Some(other) => Some(other.to_string()),
        })
    }
}
