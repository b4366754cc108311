// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::handle;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(format!("conn_{}", Uuid::new_v4().simple()))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A directed edge from an output handle to an input handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source node ID
    pub source: NodeId,
    /// Output handle name on the source
    #[serde(default)]
    pub source_handle: String,
    /// Target node ID
    pub target: NodeId,
    /// Input handle name on the target
    #[serde(default)]
    pub target_handle: String,
}

impl Connection {
    /// Create a new connection
    pub fn new(
        source: NodeId,
        source_handle: impl Into<String>,
        target: NodeId,
        target_handle: impl Into<String>,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            source,
            source_handle: source_handle.into(),
            target,
            target_handle: target_handle.into(),
        }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: &NodeId) -> bool {
        self.source == *node_id || self.target == *node_id
    }

    /// Copy with missing handle names replaced by the default
    pub fn normalized(&self) -> Self {
        Self {
            source_handle: handle::normalize(&self.source_handle),
            target_handle: handle::normalize(&self.target_handle),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_json_shape() {
        let json = r#"{"id":"c1","source":"a","target":"b"}"#;
        let conn: Connection = serde_json::from_str(json).unwrap();
        assert_eq!(conn.source_handle, "");

        let normalized = conn.normalized();
        assert_eq!(normalized.source_handle, "main");
        assert_eq!(normalized.target_handle, "main");

        let value = serde_json::to_value(&normalized).unwrap();
        assert_eq!(value["sourceHandle"], "main");
        assert_eq!(value["targetHandle"], "main");
    }

    #[test]
    fn test_involves_node() {
        let conn = Connection::new("a".into(), "main_0", "b".into(), "main_0");
        assert!(conn.involves_node(&"a".into()));
        assert!(conn.involves_node(&"b".into()));
        assert!(!conn.involves_node(&"c".into()));
    }
}
