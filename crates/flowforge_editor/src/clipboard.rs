// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node clipboard.
//!
//! Copies are owned snapshots taken at copy time; editing the originals
//! afterwards does not change what gets pasted.

use egui::Vec2;
use flowforge_graph::{Connection, ConnectionId, Graph, Node, NodeId};
use std::collections::HashMap;

/// Snapshot of copied nodes and the connections among them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipboardContent {
    /// Copied nodes
    pub nodes: Vec<Node>,
    /// Connections whose both ends were copied
    pub connections: Vec<Connection>,
}

impl ClipboardContent {
    /// Snapshot `ids` from the graph; unknown ids are skipped
    pub fn capture(graph: &Graph, ids: &[NodeId]) -> Self {
        let nodes: Vec<Node> = ids
            .iter()
            .filter_map(|id| graph.node(id))
            .map(Node::exported)
            .collect();

        let connections = graph
            .connections()
            .filter(|c| ids.contains(&c.source) && ids.contains(&c.target))
            .cloned()
            .collect();

        Self { nodes, connections }
    }

    /// Whether nothing was captured
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Fresh copies with new ids, shifted by `offset`.
    ///
    /// Internal connections are rewired to the new ids.
    pub fn instantiate(&self, offset: Vec2) -> (Vec<Node>, Vec<Connection>) {
        let mut remap: HashMap<&NodeId, NodeId> = HashMap::new();

        let nodes = self
            .nodes
            .iter()
            .map(|node| {
                let id = NodeId::new();
                remap.insert(&node.id, id.clone());
                Node {
                    id,
                    position: node.position + offset,
                    ..node.clone()
                }
            })
            .collect();

        let connections = self
            .connections
            .iter()
            .filter_map(|c| {
                Some(Connection {
                    id: ConnectionId::new(),
                    source: remap.get(&c.source)?.clone(),
                    target: remap.get(&c.target)?.clone(),
                    ..c.clone()
                })
            })
            .collect();

        (nodes, connections)
    }
}

/// Clipboard holding the last copy
#[derive(Debug, Default)]
pub struct Clipboard {
    content: Option<ClipboardContent>,
}

impl Clipboard {
    /// Create an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clipboard content
    pub fn set(&mut self, content: ClipboardContent) {
        self.content = Some(content);
    }

    /// Current content
    pub fn content(&self) -> Option<&ClipboardContent> {
        self.content.as_ref()
    }

    /// Whether there is anything to paste
    pub fn is_empty(&self) -> bool {
        self.content.as_ref().map_or(true, ClipboardContent::is_empty)
    }
}
