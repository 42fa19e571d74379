//! Domain models for the `/api/v1/Core/Nodes` endpoint.
//!
//! Only the parts of a node needed to map source labels to node ids are
//! modelled; everything else in the payload is ignored.

use crate::core::domain::value_object::serde_helpers::lenient_string;
use serde::{Deserialize, Serialize};

/// Response of `GET /api/v1/Core/Nodes?getAttributes=True`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NodesResponse {
    /// The server sends `null` instead of an empty list when there are no nodes.
    #[serde(default)]
    pub nodes: Option<Vec<Node>>,
}

impl NodesResponse {
    /// Iterates over every attribute of every node.
    pub fn attributes(&self) -> impl Iterator<Item = &NodeAttribute> {
        self.nodes
            .iter()
            .flatten()
            .flat_map(|node| node.attributes.iter().flatten())
    }
}

/// A measurement point on the server.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Node {
    /// `null` for nodes without custom attributes.
    #[serde(default)]
    pub attributes: Option<Vec<NodeAttribute>>,
}

/// A typed attribute attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NodeAttribute {
    /// Attribute code, e.g. `sourceName`.
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub code: Option<String>,
    /// Attribute value rendered as text.
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub value: Option<String>,
    /// Id of the owning node.
    #[serde(
        rename = "nodeId",
        default,
        deserialize_with = "lenient_string::deserialize"
    )]
    pub node_id: Option<String>,
}

/// A source label paired with the id of the node that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeAttributeRow {
    pub attribute_value: String,
    pub node_id: String,
}

impl NodeAttributeRow {
    pub fn new(attribute_value: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            attribute_value: attribute_value.into(),
            node_id: node_id.into(),
        }
    }
}
