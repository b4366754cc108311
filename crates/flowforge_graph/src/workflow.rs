// SPDX-License-Identifier: MIT OR Apache-2.0
//! Workflow document: the load/save/export JSON shape.

use crate::connection::Connection;
use crate::graph::Graph;
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// A serialized workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    /// Backend id; `None` until first saved
    #[serde(default)]
    pub id: Option<String>,
    /// Workflow name
    pub name: String,
    /// Nodes
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Connections
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl WorkflowDocument {
    /// Empty unsaved workflow
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Snapshot a live graph
    pub fn from_graph(id: Option<String>, name: impl Into<String>, graph: &Graph) -> Self {
        Self {
            id,
            name: name.into(),
            nodes: graph.export_nodes(),
            connections: graph.get_connections(),
        }
    }

    /// Parse a JSON document
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::create_workflow_registry;
    use crate::handle::HandleRef;
    use crate::node::NodeOverrides;
    use egui::Pos2;
    use std::sync::Arc;

    #[test]
    fn test_document_round_trip() {
        let mut graph = Graph::new(Arc::new(create_workflow_registry()));
        let a = graph
            .create_node("manual_trigger", Pos2::new(0.0, 0.0), NodeOverrides::default())
            .unwrap();
        let b = graph
            .create_node("slack", Pos2::new(300.0, 0.0), NodeOverrides::default())
            .unwrap();
        graph.connect(&a, HandleRef::output(0), &b, HandleRef::input(0)).unwrap();

        let document = WorkflowDocument::from_graph(Some("wf_1".to_string()), "Notify", &graph);
        let json = document.to_json().unwrap();
        assert!(json.contains("\"sourceHandle\": \"main_0\""));

        let parsed = WorkflowDocument::from_json(&json).unwrap();
        assert_eq!(parsed, document);

        let mut reloaded = Graph::new(Arc::new(create_workflow_registry()));
        reloaded.load_workflow(&parsed);
        assert_eq!(reloaded.export_nodes(), graph.export_nodes());
        assert_eq!(reloaded.get_connections(), graph.get_connections());
    }

    #[test]
    fn test_minimal_document() {
        let parsed = WorkflowDocument::from_json(r#"{"name":"Empty"}"#).unwrap();
        assert_eq!(parsed, WorkflowDocument::new("Empty"));
    }
}
