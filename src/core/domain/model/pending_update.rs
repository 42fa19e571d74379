//! Temperature updates and the JSON-patch documents that carry them.

use crate::config::{SUMMER_TEMPERATURE_PATH, WINTER_TEMPERATURE_PATH};
use crate::core::domain::value_object::Temperature;
use serde::{Deserialize, Serialize};

/// A temperature the operator entered (or imported) for a source.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureInput {
    pub source: String,
    pub temperature: Temperature,
}

impl TemperatureInput {
    pub fn new(source: impl Into<String>, temperature: Temperature) -> Self {
        Self {
            source: source.into(),
            temperature,
        }
    }
}

/// A value to write to one node.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    pub node_id: String,
    pub value: f64,
}

impl PendingUpdate {
    pub fn new(node_id: impl Into<String>, value: f64) -> Self {
        Self {
            node_id: node_id.into(),
            value,
        }
    }

    /// Both seasonal cold water fields receive the same value.
    #[must_use]
    pub fn patch_document(&self) -> Vec<PatchOperation> {
        vec![
            PatchOperation::replace(SUMMER_TEMPERATURE_PATH, self.value),
            PatchOperation::replace(WINTER_TEMPERATURE_PATH, self.value),
        ]
    }
}

/// One entry of a JSON-patch style body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    pub value: f64,
}

impl PatchOperation {
    pub fn replace(path: &str, value: f64) -> Self {
        Self {
            op: "replace".to_string(),
            path: path.to_string(),
            value,
        }
    }
}
