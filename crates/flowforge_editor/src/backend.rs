// SPDX-License-Identifier: MIT OR Apache-2.0
//! Workflow backend bridge.
//!
//! The editor only depends on the [`WorkflowBackend`] trait. [`MockBackend`]
//! keeps workflows in memory as JSON text, so every load hands back a
//! fresh, unshared document.

use flowforge_graph::{Connection, Node, NodeId, WorkflowDocument};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Id of the workflow [`MockBackend::new`] is seeded with
pub const DEMO_WORKFLOW_ID: &str = "demo";

/// Backend errors
#[derive(Debug, Error)]
pub enum BackendError {
    /// No workflow with that id
    #[error("Workflow not found: {0}")]
    NotFound(String),

    /// Malformed payload
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reply to a save request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    /// Whether the save went through
    pub success: bool,
    /// Id the workflow is stored under
    pub id: String,
}

/// Where workflows are loaded from and saved to
pub trait WorkflowBackend {
    /// Fetch a workflow by id
    fn load_workflow(&self, id: &str) -> Result<WorkflowDocument, BackendError>;

    /// Store a workflow; documents without an id get one assigned
    fn save_workflow(&mut self, workflow: &WorkflowDocument) -> Result<SaveResponse, BackendError>;
}

/// In-memory backend
#[derive(Debug, Default)]
pub struct MockBackend {
    workflows: IndexMap<String, String>,
    next_id: u64,
}

impl MockBackend {
    /// Backend seeded with the demo workflow
    pub fn new() -> Self {
        let mut backend = Self::empty();
        let demo = demo_workflow();
        if let Ok(json) = serde_json::to_string(&demo) {
            backend.workflows.insert(DEMO_WORKFLOW_ID.to_string(), json);
        }
        backend
    }

    /// Backend with no stored workflows
    pub fn empty() -> Self {
        Self {
            workflows: IndexMap::new(),
            next_id: 1,
        }
    }

    /// Stored workflow ids
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.workflows.keys().map(String::as_str)
    }
}

impl WorkflowBackend for MockBackend {
    fn load_workflow(&self, id: &str) -> Result<WorkflowDocument, BackendError> {
        let json = self
            .workflows
            .get(id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        Ok(serde_json::from_str(json)?)
    }

    fn save_workflow(&mut self, workflow: &WorkflowDocument) -> Result<SaveResponse, BackendError> {
        let id = match &workflow.id {
            Some(id) => id.clone(),
            None => {
                let id = format!("wf_{}", self.next_id);
                self.next_id += 1;
                id
            }
        };

        let stored = WorkflowDocument {
            id: Some(id.clone()),
            ..workflow.clone()
        };
        self.workflows.insert(id.clone(), serde_json::to_string(&stored)?);
        tracing::info!(workflow = %id, nodes = stored.nodes.len(), "workflow saved");

        Ok(SaveResponse { success: true, id })
    }
}

fn demo_node(id: &str, node_type: &str, name: &str, x: f32, y: f32, parameters: serde_json::Value) -> Node {
    Node {
        id: NodeId::from(id),
        node_type: node_type.to_string(),
        name: name.to_string(),
        position: egui::Pos2::new(x, y),
        parameters: parameters.as_object().cloned().unwrap_or_default(),
        disabled: false,
        run_state: None,
    }
}

/// Small webhook -> branch -> notify workflow
pub fn demo_workflow() -> WorkflowDocument {
    WorkflowDocument {
        id: Some(DEMO_WORKFLOW_ID.to_string()),
        name: "Order notifications".to_string(),
        nodes: vec![
            demo_node("node_1", "webhook", "New order", 100.0, 200.0, json!({"path": "/orders", "method": "POST"})),
            demo_node("node_2", "if", "Large order?", 360.0, 200.0, json!({"condition": "{{ $json.total > 500 }}"})),
            demo_node("node_3", "slack", "Notify sales", 620.0, 100.0, json!({"channel": "#sales", "text": "Big order!"})),
            demo_node("node_4", "send_email", "Thank customer", 620.0, 300.0, json!({"to": "{{ $json.email }}", "subject": "Thanks", "body": ""})),
        ],
        connections: vec![
            Connection {
                id: "conn_1".into(),
                source: "node_1".into(),
                source_handle: "main_0".to_string(),
                target: "node_2".into(),
                target_handle: "main_0".to_string(),
            },
            Connection {
                id: "conn_2".into(),
                source: "node_2".into(),
                source_handle: "true_0".to_string(),
                target: "node_3".into(),
                target_handle: "main_0".to_string(),
            },
            Connection {
                id: "conn_3".into(),
                source: "node_2".into(),
                source_handle: "false_1".to_string(),
                target: "node_4".into(),
                target_handle: "main_0".to_string(),
            },
        ],
    }
}
