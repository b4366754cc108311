// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions: instances, type descriptors and the type registry.

use crate::handle::HandleKind;
use egui::Pos2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Parameter values keyed by parameter name
pub type Parameters = Map<String, Value>;

/// Unique identifier for a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(format!("node_{}", Uuid::new_v4().simple()))
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Node type category, used to group the palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    /// Nodes that start a workflow
    Trigger,
    /// Nodes that perform work
    Action,
    /// Branching, merging and waiting
    Flow,
    /// Data shaping helpers
    Data,
}

/// How a parameter is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// Free text
    String,
    /// Numeric field
    Number,
    /// Checkbox
    Boolean,
    /// One of a fixed set of options
    Options,
    /// Arbitrary JSON
    Json,
}

/// Parameter definition on a node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Key in the node's parameter map
    pub name: String,
    /// Label shown in the parameter panel
    pub display_name: String,
    /// Editor kind
    pub kind: ParameterKind,
    /// Value a new node starts with
    pub default: Value,
    /// Allowed values for [`ParameterKind::Options`]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl ParameterSpec {
    /// Create a parameter spec
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        kind: ParameterKind,
        default: Value,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            kind,
            default,
            options: Vec::new(),
        }
    }

    /// Restrict to a fixed set of options
    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| (*o).to_string()).collect();
        self
    }
}

/// Node type definition (static catalog entry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTypeDescriptor {
    /// Unique type identifier
    #[serde(rename = "type")]
    pub node_type: String,
    /// Display name
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Icon name
    pub icon: String,
    /// Description
    pub description: String,
    /// Ordered input slot names
    pub inputs: Vec<String>,
    /// Ordered output slot names
    pub outputs: Vec<String>,
    /// Ordered parameter specs
    pub parameters: Vec<ParameterSpec>,
}

impl NodeTypeDescriptor {
    /// Slot names for one direction
    pub fn slots(&self, kind: HandleKind) -> &[String] {
        match kind {
            HandleKind::Input => &self.inputs,
            HandleKind::Output => &self.outputs,
        }
    }

    /// Parameter map seeded from the defaults
    pub fn default_parameters(&self) -> Parameters {
        self.parameters
            .iter()
            .map(|p| (p.name.clone(), p.default.clone()))
            .collect()
    }
}

/// Presentation state set while the test walk visits a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Currently being visited
    Running,
    /// Visited
    Success,
    /// Disabled node passed over
    Skipped,
}

/// A node instance in the workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node type ID
    #[serde(rename = "type")]
    pub node_type: String,
    /// Display name (can be customized)
    pub name: String,
    /// Position on the canvas
    pub position: Pos2,
    /// Parameter values
    #[serde(default)]
    pub parameters: Parameters,
    /// Disabled nodes are skipped by the test walk
    #[serde(default)]
    pub disabled: bool,
    /// Runtime-only test walk status
    #[serde(skip)]
    pub run_state: Option<RunState>,
}

impl Node {
    /// Create a new node from a type definition
    pub fn new(descriptor: &NodeTypeDescriptor) -> Self {
        Self {
            id: NodeId::new(),
            node_type: descriptor.node_type.clone(),
            name: descriptor.name.clone(),
            position: Pos2::ZERO,
            parameters: descriptor.default_parameters(),
            disabled: false,
            run_state: None,
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Pos2::new(x, y);
        self
    }

    /// Editable fields as a standalone snapshot
    pub fn fields(&self) -> NodeFields {
        NodeFields {
            name: self.name.clone(),
            parameters: self.parameters.clone(),
            disabled: self.disabled,
        }
    }

    /// Copy without runtime-only state
    pub fn exported(&self) -> Self {
        Self {
            run_state: None,
            ..self.clone()
        }
    }
}

/// Optional settings applied when a node is created
#[derive(Debug, Clone, Default)]
pub struct NodeOverrides {
    /// Explicit id (kept so connections recorded elsewhere stay valid)
    pub id: Option<NodeId>,
    /// Display name
    pub name: Option<String>,
    /// Parameter values merged over the descriptor defaults
    pub parameters: Option<Parameters>,
    /// Initial disabled flag
    pub disabled: Option<bool>,
}

/// Partial update of a node's editable fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    /// New display name
    pub name: Option<String>,
    /// Replacement parameter map
    pub parameters: Option<Parameters>,
    /// New disabled flag
    pub disabled: Option<bool>,
}

impl NodeUpdate {
    /// Whether the update carries no fields
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.parameters.is_none() && self.disabled.is_none()
    }
}

/// Full snapshot of a node's editable fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFields {
    /// Display name
    pub name: String,
    /// Parameter values
    pub parameters: Parameters,
    /// Disabled flag
    pub disabled: bool,
}

impl From<NodeFields> for NodeUpdate {
    fn from(fields: NodeFields) -> Self {
        Self {
            name: Some(fields.name),
            parameters: Some(fields.parameters),
            disabled: Some(fields.disabled),
        }
    }
}

/// Registry of available node types
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    types: indexmap::IndexMap<String, NodeTypeDescriptor>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type
    pub fn register(&mut self, descriptor: NodeTypeDescriptor) {
        self.types.insert(descriptor.node_type.clone(), descriptor);
    }

    /// Get a node type by ID
    pub fn get(&self, node_type: &str) -> Option<&NodeTypeDescriptor> {
        self.types.get(node_type)
    }

    /// Whether a type is registered
    pub fn contains(&self, node_type: &str) -> bool {
        self.types.contains_key(node_type)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeTypeDescriptor> {
        self.types.values()
    }

    /// Get types by category
    pub fn types_in_category(
        &self,
        category: NodeCategory,
    ) -> impl Iterator<Item = &NodeTypeDescriptor> {
        self.types.values().filter(move |t| t.category == category)
    }

    /// Create a node from a type ID
    pub fn create_node(&self, node_type: &str) -> Option<Node> {
        self.get(node_type).map(Node::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn http() -> NodeTypeDescriptor {
        NodeTypeDescriptor {
            node_type: "http".to_string(),
            name: "HTTP Request".to_string(),
            category: NodeCategory::Action,
            icon: "globe".to_string(),
            description: String::new(),
            inputs: vec!["main".to_string()],
            outputs: vec!["main".to_string()],
            parameters: vec![
                ParameterSpec::new("url", "URL", ParameterKind::String, json!("")),
                ParameterSpec::new("method", "Method", ParameterKind::Options, json!("GET"))
                    .with_options(&["GET", "POST"]),
            ],
        }
    }

    #[test]
    fn test_node_from_descriptor() {
        let node = Node::new(&http());
        assert_eq!(node.node_type, "http");
        assert_eq!(node.name, "HTTP Request");
        assert_eq!(node.parameters.get("method"), Some(&json!("GET")));
        assert!(!node.disabled);
        assert!(node.id.as_str().starts_with("node_"));
    }

    #[test]
    fn test_node_json_shape() {
        let mut node = Node::new(&http()).with_position(20.0, 40.0);
        node.id = NodeId::from("n1");
        node.run_state = Some(RunState::Running);

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["id"], json!("n1"));
        assert_eq!(value["type"], json!("http"));
        assert_eq!(value["position"], json!({"x": 20.0, "y": 40.0}));
        assert!(value.get("run_state").is_none());

        let back: Node = serde_json::from_value(value).unwrap();
        assert_eq!(back, node.exported());
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = NodeRegistry::new();
        registry.register(http());
        assert!(registry.contains("http"));
        assert!(registry.create_node("nope").is_none());
        assert_eq!(registry.types_in_category(NodeCategory::Action).count(), 1);
        assert_eq!(registry.types_in_category(NodeCategory::Trigger).count(), 0);
    }
}
