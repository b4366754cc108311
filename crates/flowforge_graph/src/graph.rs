// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph store: the single source of truth for nodes, connections and selection.

use crate::connection::{Connection, ConnectionId};
use crate::geometry::{self, NodeLayout, GRID_SIZE};
use crate::handle::{self, HandleKind, HandleRef};
use crate::node::{Node, NodeFields, NodeId, NodeOverrides, NodeRegistry, NodeTypeDescriptor, NodeUpdate};
use crate::router;
use crate::viewport::Viewport;
use crate::workflow::WorkflowDocument;
use egui::{Pos2, Rect};
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;

/// Change notification produced by every store mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    /// A node was inserted
    NodeCreated(NodeId),
    /// Name, parameters or disabled flag changed
    NodeUpdated(NodeId),
    /// Position changed
    NodeMoved(NodeId),
    /// A node (and its connections) was removed
    NodeDeleted(NodeId),
    /// A connection was inserted
    ConnectionCreated(ConnectionId),
    /// A connection was removed
    ConnectionDeleted(ConnectionId),
    /// Selection set changed
    SelectionChanged,
    /// Contents were replaced wholesale
    Loaded,
}

/// A workflow graph
#[derive(Debug, Clone)]
pub struct Graph {
    registry: Arc<NodeRegistry>,
    layout: NodeLayout,
    grid_size: f32,
    nodes: IndexMap<NodeId, Node>,
    connections: IndexMap<ConnectionId, Connection>,
    selection: IndexSet<NodeId>,
    events: Vec<GraphEvent>,
}

impl Graph {
    /// Create a new empty graph over a node catalog
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self {
            registry,
            layout: NodeLayout::default(),
            grid_size: GRID_SIZE,
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            selection: IndexSet::new(),
            events: Vec::new(),
        }
    }

    /// Override the snapping grid
    pub fn with_grid_size(mut self, grid_size: f32) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Override the node card layout
    pub fn with_layout(mut self, layout: NodeLayout) -> Self {
        self.layout = layout;
        self
    }

    /// The node catalog
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Active grid size
    pub fn grid_size(&self) -> f32 {
        self.grid_size
    }

    /// Drain pending change notifications
    pub fn take_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    // ─── Nodes ──────────────────────────────────────────────────────────

    /// Create a node of `node_type` at a grid-snapped `position`
    pub fn create_node(
        &mut self,
        node_type: &str,
        position: Pos2,
        overrides: NodeOverrides,
    ) -> Result<NodeId, GraphError> {
        let descriptor = self
            .registry
            .get(node_type)
            .ok_or_else(|| GraphError::NodeTypeNotFound(node_type.to_string()))?;

        let mut node = Node::new(descriptor);
        if let Some(id) = overrides.id {
            if self.nodes.contains_key(&id) {
                return Err(GraphError::DuplicateNodeId(id));
            }
            node.id = id;
        }
        if let Some(name) = overrides.name {
            node.name = name;
        }
        if let Some(parameters) = overrides.parameters {
            node.parameters.extend(parameters);
        }
        if let Some(disabled) = overrides.disabled {
            node.disabled = disabled;
        }
        node.position = geometry::snap_pos(position, self.grid_size);

        let id = node.id.clone();
        tracing::debug!(node = %id, node_type, x = node.position.x, y = node.position.y, "node created");
        self.nodes.insert(id.clone(), node);
        self.events.push(GraphEvent::NodeCreated(id.clone()));
        Ok(id)
    }

    /// Insert an exact node snapshot (used by history replay and paste)
    pub fn restore_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if !self.registry.contains(&node.node_type) {
            return Err(GraphError::NodeTypeNotFound(node.node_type));
        }
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNodeId(node.id));
        }

        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        self.events.push(GraphEvent::NodeCreated(id.clone()));
        Ok(id)
    }

    /// Merge `update` into a node, returning its previous fields.
    ///
    /// Unknown ids are ignored.
    pub fn update_node(&mut self, id: &NodeId, update: NodeUpdate) -> Option<NodeFields> {
        let Some(node) = self.nodes.get_mut(id) else {
            tracing::debug!(node = %id, "update on missing node ignored");
            return None;
        };
        let previous = node.fields();

        if let Some(name) = update.name {
            node.name = name;
        }
        if let Some(parameters) = update.parameters {
            node.parameters = parameters;
        }
        if let Some(disabled) = update.disabled {
            node.disabled = disabled;
        }

        self.events.push(GraphEvent::NodeUpdated(id.clone()));
        Some(previous)
    }

    /// Set a node's position without snapping
    pub fn update_node_position(&mut self, id: &NodeId, x: f32, y: f32) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.position = Pos2::new(x, y);
        self.events.push(GraphEvent::NodeMoved(id.clone()));
    }

    /// Remove a node and every connection touching it
    pub fn delete_node(&mut self, id: &NodeId) -> Option<(Node, Vec<Connection>)> {
        let node = self.nodes.shift_remove(id)?;

        let mut removed = Vec::new();
        self.connections.retain(|_, c| {
            if c.involves_node(id) {
                removed.push(c.clone());
                false
            } else {
                true
            }
        });

        if self.selection.shift_remove(id) {
            self.events.push(GraphEvent::SelectionChanged);
        }

        tracing::debug!(node = %id, connections = removed.len(), "node deleted");
        self.events.push(GraphEvent::NodeDeleted(id.clone()));
        Some((node, removed))
    }

    /// Get a node by ID
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Descriptor of a live node
    pub fn descriptor(&self, id: &NodeId) -> Option<&NodeTypeDescriptor> {
        self.nodes
            .get(id)
            .and_then(|node| self.registry.get(&node.node_type))
    }

    /// Set the presentation-only run state
    pub fn set_run_state(&mut self, id: &NodeId, state: Option<crate::node::RunState>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.run_state = state;
            self.events.push(GraphEvent::NodeUpdated(id.clone()));
        }
    }

    // ─── Geometry ───────────────────────────────────────────────────────

    /// Canvas-space box of a node
    pub fn node_rect(&self, id: &NodeId) -> Option<Rect> {
        let node = self.nodes.get(id)?;
        let descriptor = self.registry.get(&node.node_type)?;
        let size = self.layout.size(descriptor.inputs.len(), descriptor.outputs.len());
        Some(Rect::from_min_size(node.position, size))
    }

    /// Canvas-space box around every node
    pub fn bounds(&self) -> Option<Rect> {
        self.nodes
            .keys()
            .filter_map(|id| self.node_rect(id))
            .reduce(|acc, rect| acc.union(rect))
    }

    /// Canvas-space position of a handle
    pub fn handle_position(&self, id: &NodeId, handle: HandleRef) -> Option<Pos2> {
        let rect = self.node_rect(id)?;
        let count = self.descriptor(id)?.slots(handle.kind).len();
        if handle.index >= count {
            return None;
        }

        let y = rect.top() + geometry::handle_offset_y(rect.height(), count, handle.index);
        let x = match handle.kind {
            HandleKind::Input => rect.left(),
            HandleKind::Output => rect.right(),
        };
        Some(Pos2::new(x, y))
    }

    /// Resolve a connection end to its handle
    pub fn resolve_handle(&self, id: &NodeId, kind: HandleKind, name: &str) -> Option<HandleRef> {
        let descriptor = self.descriptor(id)?;
        handle::resolve(descriptor, kind, name).map(|index| HandleRef { kind, index })
    }

    // ─── Connections ────────────────────────────────────────────────────

    /// Connect two handles given in either order.
    ///
    /// The output side becomes the source.
    pub fn connect(
        &mut self,
        from_node: &NodeId,
        from_handle: HandleRef,
        to_node: &NodeId,
        to_handle: HandleRef,
    ) -> Result<ConnectionId, ConnectionError> {
        router::is_valid_connection(from_node, to_node, from_handle.kind, to_handle.kind)?;

        let (source, source_handle, target, target_handle) = match from_handle.kind {
            HandleKind::Output => (from_node, from_handle, to_node, to_handle),
            HandleKind::Input => (to_node, to_handle, from_node, from_handle),
        };

        let source_name = self.handle_name(source, source_handle)?;
        let target_name = self.handle_name(target, target_handle)?;
        self.add_connection(source, &source_name, target, &target_name)
    }

    fn handle_name(&self, id: &NodeId, handle: HandleRef) -> Result<String, ConnectionError> {
        let descriptor = self
            .descriptor(id)
            .ok_or_else(|| ConnectionError::NodeNotFound(id.clone()))?;
        handle::name_for(descriptor, handle).ok_or_else(|| ConnectionError::HandleNotFound {
            node: id.clone(),
            handle: format!("{:?} {}", handle.kind, handle.index),
        })
    }

    /// Add a connection between named handles
    pub fn add_connection(
        &mut self,
        source: &NodeId,
        source_handle: &str,
        target: &NodeId,
        target_handle: &str,
    ) -> Result<ConnectionId, ConnectionError> {
        let connection = Connection::new(source.clone(), source_handle, target.clone(), target_handle);
        self.restore_connection(connection)
    }

    /// Insert a connection keeping its id
    pub fn restore_connection(&mut self, connection: Connection) -> Result<ConnectionId, ConnectionError> {
        self.validate_connection(&connection)?;

        let id = connection.id.clone();
        tracing::debug!(
            connection = %id,
            source = %connection.source,
            target = %connection.target,
            "connection created"
        );
        self.connections.insert(id.clone(), connection);
        self.events.push(GraphEvent::ConnectionCreated(id.clone()));
        Ok(id)
    }

    fn validate_connection(&self, connection: &Connection) -> Result<(), ConnectionError> {
        if connection.source == connection.target {
            return Err(ConnectionError::SelfLoop);
        }

        for (node, kind, name) in [
            (&connection.source, HandleKind::Output, &connection.source_handle),
            (&connection.target, HandleKind::Input, &connection.target_handle),
        ] {
            if !self.nodes.contains_key(node) {
                return Err(ConnectionError::NodeNotFound(node.clone()));
            }
            if self.resolve_handle(node, kind, &handle::normalize(name)).is_none() {
                // Named slot exists but on the wrong side
                if self.resolve_handle(node, kind.opposite(), name).is_some() {
                    return Err(ConnectionError::SameDirection);
                }
                return Err(ConnectionError::HandleNotFound {
                    node: node.clone(),
                    handle: name.clone(),
                });
            }
        }

        if self.connections.contains_key(&connection.id) {
            return Err(ConnectionError::Duplicate);
        }
        // Handle names alias ("main", "main_0", ""), so compare resolved slots
        let slots = self.resolved_slots(connection);
        if self.connections.values().any(|c| {
            c.source == connection.source
                && c.target == connection.target
                && self.resolved_slots(c) == slots
        }) {
            return Err(ConnectionError::Duplicate);
        }

        Ok(())
    }

    fn resolved_slots(&self, connection: &Connection) -> Option<(HandleRef, HandleRef)> {
        let source = self.resolve_handle(
            &connection.source,
            HandleKind::Output,
            &handle::normalize(&connection.source_handle),
        )?;
        let target = self.resolve_handle(
            &connection.target,
            HandleKind::Input,
            &handle::normalize(&connection.target_handle),
        )?;
        Some((source, target))
    }

    /// Remove a connection; unknown ids are ignored
    pub fn remove_connection(&mut self, id: &ConnectionId) -> Option<Connection> {
        let removed = self.connections.shift_remove(id)?;
        tracing::debug!(connection = %id, "connection deleted");
        self.events.push(GraphEvent::ConnectionDeleted(id.clone()));
        Some(removed)
    }

    /// Get a connection by ID
    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get connections involving a node
    pub fn connections_for_node<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Connection> {
        self.connections.values().filter(move |c| c.involves_node(id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    // ─── Selection ──────────────────────────────────────────────────────

    /// Selected node ids in selection order
    pub fn selection(&self) -> impl Iterator<Item = &NodeId> {
        self.selection.iter()
    }

    /// Number of selected nodes
    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    /// Whether a node is selected
    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selection.contains(id)
    }

    /// Select a node (optionally add to selection)
    pub fn select_node(&mut self, id: &NodeId, additive: bool) {
        if !self.nodes.contains_key(id) {
            return;
        }
        if !additive {
            self.selection.clear();
        }
        self.selection.insert(id.clone());
        self.events.push(GraphEvent::SelectionChanged);
    }

    /// Toggle node selection
    pub fn toggle_node_selection(&mut self, id: &NodeId) {
        if !self.selection.shift_remove(id) {
            if !self.nodes.contains_key(id) {
                return;
            }
            self.selection.insert(id.clone());
        }
        self.events.push(GraphEvent::SelectionChanged);
    }

    /// Clear selection
    pub fn deselect_all(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.events.push(GraphEvent::SelectionChanged);
        }
    }

    /// Select every node
    pub fn select_all(&mut self) {
        self.selection = self.nodes.keys().cloned().collect();
        self.events.push(GraphEvent::SelectionChanged);
    }

    /// Replace the selection with the live subset of `ids`
    pub fn select_nodes(&mut self, ids: &[NodeId]) {
        self.selection = ids
            .iter()
            .filter(|id| self.nodes.contains_key(*id))
            .cloned()
            .collect();
        self.events.push(GraphEvent::SelectionChanged);
    }

    /// Select nodes whose on-screen box overlaps `screen_rect`
    pub fn select_nodes_in_rect(&mut self, screen_rect: Rect, viewport: &Viewport, additive: bool) {
        let hits: Vec<NodeId> = self
            .nodes
            .keys()
            .filter(|id| {
                self.node_rect(id).is_some_and(|rect| {
                    geometry::rects_overlap(viewport.canvas_rect_to_screen(rect), screen_rect)
                })
            })
            .cloned()
            .collect();

        if !additive {
            self.selection.clear();
        }
        self.selection.extend(hits);
        self.events.push(GraphEvent::SelectionChanged);
    }

    // ─── Load / export ──────────────────────────────────────────────────

    /// Remove everything
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.selection.clear();
        self.events.push(GraphEvent::Loaded);
    }

    /// Replace the node set; unknown types and duplicate ids are skipped
    pub fn load_nodes(&mut self, nodes: Vec<Node>) {
        let mark = self.events.len();
        self.clear();
        for node in nodes {
            if let Err(e) = self.restore_node(node.exported()) {
                tracing::warn!("Skipping node on load: {e}");
            }
        }
        // Loading is one change, not many creations
        self.collapse_events_since(mark, |e| matches!(e, GraphEvent::NodeCreated(_)));
    }

    /// Drop events matching `noise` that were queued after `mark`
    fn collapse_events_since(&mut self, mark: usize, noise: impl Fn(&GraphEvent) -> bool) {
        let recent = self.events.split_off(mark.min(self.events.len()));
        self.events.extend(recent.into_iter().filter(|e| !noise(e)));
    }

    /// Replace contents with a workflow document
    pub fn load_workflow(&mut self, document: &WorkflowDocument) {
        self.load_nodes(document.nodes.clone());
        let mark = self.events.len();
        for connection in &document.connections {
            if let Err(e) = self.restore_connection(connection.clone()) {
                tracing::warn!(connection = %connection.id, "Skipping connection on load: {e}");
            }
        }
        self.collapse_events_since(mark, |e| matches!(e, GraphEvent::ConnectionCreated(_)));
        tracing::info!(
            nodes = self.nodes.len(),
            connections = self.connections.len(),
            "workflow loaded"
        );
    }

    /// Nodes without runtime-only state
    pub fn export_nodes(&self) -> Vec<Node> {
        self.nodes.values().map(Node::exported).collect()
    }

    /// Connections with normalized handle names
    pub fn get_connections(&self) -> Vec<Connection> {
        self.connections.values().map(Connection::normalized).collect()
    }
}

/// Error from a node operation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// No descriptor for the requested type
    #[error("Unknown node type: {0}")]
    NodeTypeNotFound(String),

    /// Explicit id already in use
    #[error("Node id already in use: {0}")]
    DuplicateNodeId(NodeId),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
}

/// Error when creating a connection
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Handle does not exist on the node
    #[error("Handle {handle} not found on node {node}")]
    HandleNotFound {
        /// Node the handle was looked up on
        node: NodeId,
        /// Handle name as given
        handle: String,
    },

    /// Output-to-output or input-to-input
    #[error("Cannot connect two handles of the same direction")]
    SameDirection,

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,

    /// Same handles are already joined
    #[error("Connection already exists")]
    Duplicate,

    /// No connection draft is active
    #[error("Not connecting")]
    NotConnecting,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::create_workflow_registry;
    use serde_json::json;

    fn graph() -> Graph {
        Graph::new(Arc::new(create_workflow_registry()))
    }

    fn add(graph: &mut Graph, node_type: &str, x: f32, y: f32) -> NodeId {
        graph
            .create_node(node_type, Pos2::new(x, y), NodeOverrides::default())
            .unwrap()
    }

    #[test]
    fn test_create_node_snaps() {
        let mut g = graph();
        let a = add(&mut g, "http_request", 100.0, 100.0);
        let b = add(&mut g, "http_request", 117.0, 103.0);
        assert_eq!(g.node(&a).unwrap().position, Pos2::new(100.0, 100.0));
        assert_eq!(g.node(&b).unwrap().position, Pos2::new(120.0, 100.0));
        assert_eq!(
            g.take_events(),
            vec![GraphEvent::NodeCreated(a), GraphEvent::NodeCreated(b)]
        );
    }

    #[test]
    fn test_create_node_unknown_type() {
        let mut g = graph();
        let result = g.create_node("teleport", Pos2::ZERO, NodeOverrides::default());
        assert_eq!(result, Err(GraphError::NodeTypeNotFound("teleport".to_string())));
        assert_eq!(g.node_count(), 0);
        assert!(g.take_events().is_empty());
    }

    #[test]
    fn test_create_node_overrides() {
        let mut g = graph();
        let mut params = serde_json::Map::new();
        params.insert("url".to_string(), json!("https://example.com"));
        let id = g
            .create_node(
                "http_request",
                Pos2::ZERO,
                NodeOverrides {
                    id: Some("fixed".into()),
                    name: Some("Fetch".to_string()),
                    parameters: Some(params),
                    disabled: Some(true),
                },
            )
            .unwrap();

        let node = g.node(&id).unwrap();
        assert_eq!(id, NodeId::from("fixed"));
        assert_eq!(node.name, "Fetch");
        assert!(node.disabled);
        assert_eq!(node.parameters["url"], json!("https://example.com"));
        // Defaults survive for keys not overridden
        assert_eq!(node.parameters["method"], json!("GET"));

        let again = g.create_node(
            "http_request",
            Pos2::ZERO,
            NodeOverrides {
                id: Some("fixed".into()),
                ..Default::default()
            },
        );
        assert_eq!(again, Err(GraphError::DuplicateNodeId("fixed".into())));
    }

    #[test]
    fn test_update_missing_node_is_noop() {
        let mut g = graph();
        let previous = g.update_node(
            &"ghost".into(),
            NodeUpdate {
                name: Some("x".to_string()),
                ..Default::default()
            },
        );
        assert!(previous.is_none());
        g.update_node_position(&"ghost".into(), 1.0, 1.0);
        assert!(g.delete_node(&"ghost".into()).is_none());
        assert!(g.remove_connection(&"ghost".into()).is_none());
        assert!(g.take_events().is_empty());
    }

    #[test]
    fn test_update_node_merges() {
        let mut g = graph();
        let a = add(&mut g, "http_request", 0.0, 0.0);
        let previous = g
            .update_node(
                &a,
                NodeUpdate {
                    disabled: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!previous.disabled);

        let node = g.node(&a).unwrap();
        assert!(node.disabled);
        assert_eq!(node.name, "HTTP Request");
    }

    #[test]
    fn test_update_position_does_not_snap() {
        let mut g = graph();
        let a = add(&mut g, "http_request", 0.0, 0.0);
        g.update_node_position(&a, 13.5, 7.25);
        assert_eq!(g.node(&a).unwrap().position, Pos2::new(13.5, 7.25));
    }

    #[test]
    fn test_connect_rules() {
        let mut g = graph();
        let a = add(&mut g, "http_request", 0.0, 0.0);
        let b = add(&mut g, "http_request", 300.0, 0.0);

        assert_eq!(
            g.connect(&a, HandleRef::output(0), &a, HandleRef::input(0)),
            Err(ConnectionError::SelfLoop)
        );
        assert_eq!(
            g.connect(&a, HandleRef::output(0), &b, HandleRef::output(0)),
            Err(ConnectionError::SameDirection)
        );

        let id = g.connect(&a, HandleRef::output(0), &b, HandleRef::input(0)).unwrap();
        let conn = g.connection(&id).unwrap();
        assert_eq!(conn.source, a);
        assert_eq!(conn.source_handle, "main_0");
        assert_eq!(conn.target_handle, "main_0");

        assert_eq!(
            g.connect(&a, HandleRef::output(0), &b, HandleRef::input(0)),
            Err(ConnectionError::Duplicate)
        );
        assert_eq!(g.connection_count(), 1);
    }

    #[test]
    fn test_connect_from_input_side_is_normalized() {
        let mut g = graph();
        let a = add(&mut g, "http_request", 0.0, 0.0);
        let b = add(&mut g, "http_request", 300.0, 0.0);
        let id = g.connect(&b, HandleRef::input(0), &a, HandleRef::output(0)).unwrap();
        let conn = g.connection(&id).unwrap();
        assert_eq!(conn.source, a);
        assert_eq!(conn.target, b);
    }

    #[test]
    fn test_add_connection_checks_handles() {
        let mut g = graph();
        let a = add(&mut g, "if", 0.0, 0.0);
        let b = add(&mut g, "http_request", 300.0, 0.0);

        assert!(g.add_connection(&a, "false_1", &b, "main_0").is_ok());
        assert!(matches!(
            g.add_connection(&a, "maybe_2", &b, "main_0"),
            Err(ConnectionError::HandleNotFound { .. })
        ));
        assert_eq!(
            g.add_connection(&b, "main_0", &"ghost".into(), "main_0"),
            Err(ConnectionError::NodeNotFound("ghost".into()))
        );
    }

    #[test]
    fn test_cycles_are_allowed() {
        let mut g = graph();
        let a = add(&mut g, "http_request", 0.0, 0.0);
        let b = add(&mut g, "http_request", 300.0, 0.0);
        g.connect(&a, HandleRef::output(0), &b, HandleRef::input(0)).unwrap();
        assert!(g.connect(&b, HandleRef::output(0), &a, HandleRef::input(0)).is_ok());
    }

    #[test]
    fn test_delete_node_cascades() {
        let mut g = graph();
        let a = add(&mut g, "http_request", 0.0, 0.0);
        let b = add(&mut g, "http_request", 300.0, 0.0);
        let c = add(&mut g, "http_request", 600.0, 0.0);
        g.connect(&a, HandleRef::output(0), &b, HandleRef::input(0)).unwrap();
        g.connect(&b, HandleRef::output(0), &c, HandleRef::input(0)).unwrap();
        g.select_node(&b, false);
        g.take_events();

        let (node, removed) = g.delete_node(&b).unwrap();
        assert_eq!(node.id, b);
        assert_eq!(removed.len(), 2);
        assert_eq!(g.connection_count(), 0);
        assert!(!g.is_selected(&b));
        let events = g.take_events();
        assert_eq!(
            events.iter().filter(|e| matches!(e, GraphEvent::NodeDeleted(_))).count(),
            1
        );
    }

    #[test]
    fn test_handle_positions() {
        let mut g = graph();
        let branch = add(&mut g, "if", 0.0, 0.0);
        let rect = g.node_rect(&branch).unwrap();
        assert_eq!(rect.size(), egui::vec2(180.0, 80.0));

        let input = g.handle_position(&branch, HandleRef::input(0)).unwrap();
        assert_eq!(input, Pos2::new(0.0, 40.0));

        let out_true = g.handle_position(&branch, HandleRef::output(0)).unwrap();
        let out_false = g.handle_position(&branch, HandleRef::output(1)).unwrap();
        assert_eq!(out_true.x, 180.0);
        assert!((out_true.y - 80.0 / 3.0).abs() < 1e-4);
        assert!((out_false.y - 160.0 / 3.0).abs() < 1e-4);
        assert!(g.handle_position(&branch, HandleRef::output(2)).is_none());
    }

    #[test]
    fn test_selection_ops() {
        let mut g = graph();
        let a = add(&mut g, "http_request", 0.0, 0.0);
        let b = add(&mut g, "http_request", 300.0, 0.0);

        g.select_node(&a, false);
        g.select_node(&b, true);
        assert_eq!(g.selection_len(), 2);

        g.select_node(&b, false);
        assert_eq!(g.selection().cloned().collect::<Vec<_>>(), vec![b.clone()]);

        g.toggle_node_selection(&a);
        g.toggle_node_selection(&b);
        assert_eq!(g.selection().cloned().collect::<Vec<_>>(), vec![a.clone()]);

        g.select_all();
        assert_eq!(g.selection_len(), 2);
        g.deselect_all();
        assert_eq!(g.selection_len(), 0);

        g.select_node(&"ghost".into(), false);
        assert_eq!(g.selection_len(), 0);
    }

    #[test]
    fn test_select_in_screen_rect() {
        let mut g = graph();
        let a = add(&mut g, "http_request", 0.0, 0.0);
        let b = add(&mut g, "http_request", 400.0, 0.0);
        let viewport = Viewport::new(Rect::from_min_size(Pos2::ZERO, egui::vec2(1000.0, 800.0)));

        // Canvas origin sits at screen (500, 400); `a` spans x 500..680 on screen
        let rect = Rect::from_min_max(Pos2::new(480.0, 380.0), Pos2::new(520.0, 420.0));
        g.select_nodes_in_rect(rect, &viewport, false);
        assert_eq!(g.selection().cloned().collect::<Vec<_>>(), vec![a.clone()]);

        let rect = Rect::from_min_max(Pos2::new(890.0, 380.0), Pos2::new(950.0, 420.0));
        g.select_nodes_in_rect(rect, &viewport, true);
        assert!(g.is_selected(&a));
        assert!(g.is_selected(&b));
    }

    #[test]
    fn test_export_load_round_trip() {
        let mut g = graph();
        let a = add(&mut g, "http_request", 40.0, 60.0);
        let b = add(&mut g, "if", 300.0, 0.0);
        g.update_node(
            &b,
            NodeUpdate {
                disabled: Some(true),
                ..Default::default()
            },
        );
        g.set_run_state(&a, Some(crate::node::RunState::Success));

        let exported = g.export_nodes();
        assert!(exported.iter().all(|n| n.run_state.is_none()));

        let mut other = graph();
        other.load_nodes(exported.clone());
        assert_eq!(other.export_nodes(), exported);
        assert_eq!(other.take_events(), vec![GraphEvent::Loaded]);
    }

    #[test]
    fn test_load_workflow_skips_invalid() {
        let mut g = graph();
        let a = Node::new(g.registry().get("http_request").unwrap()).with_position(0.0, 0.0);
        let mut b = a.clone();
        b.id = "b".into();
        let mut unknown = a.clone();
        unknown.id = "u".into();
        unknown.node_type = "teleport".to_string();

        let document = WorkflowDocument {
            id: Some("wf".to_string()),
            name: "Test".to_string(),
            nodes: vec![a.clone(), b.clone(), unknown],
            connections: vec![
                Connection::new(a.id.clone(), "main", b.id.clone(), ""),
                Connection::new(a.id.clone(), "main", a.id.clone(), "main"),
                Connection::new(a.id.clone(), "main", "u".into(), "main"),
            ],
        };
        g.load_workflow(&document);

        assert_eq!(g.node_count(), 2);
        assert_eq!(g.connection_count(), 1);
        assert_eq!(g.get_connections()[0].target_handle, "main");
    }

    #[test]
    fn test_duplicate_detects_aliased_handle_names() {
        let mut g = graph();
        let a = add(&mut g, "set", 0.0, 0.0);
        let b = add(&mut g, "set", 300.0, 0.0);
        let document = WorkflowDocument {
            id: None,
            name: "Aliases".to_string(),
            nodes: g.export_nodes(),
            connections: vec![Connection::new(a.clone(), "main", b.clone(), "main")],
        };
        g.load_workflow(&document);
        assert_eq!(g.connection_count(), 1);

        // "main", "main_0" and "" all name the first slot
        assert_eq!(
            g.connect(&a, HandleRef::output(0), &b, HandleRef::input(0)),
            Err(ConnectionError::Duplicate)
        );
        assert_eq!(
            g.add_connection(&a, "", &b, "main_0"),
            Err(ConnectionError::Duplicate)
        );
        assert_eq!(g.connection_count(), 1);
    }

    #[test]
    fn test_load_keeps_earlier_pending_events() {
        let mut g = graph();
        let a = add(&mut g, "set", 0.0, 0.0);
        let document = WorkflowDocument::from_graph(None, "Copy", &g);

        g.load_workflow(&document);
        let events = g.take_events();
        assert_eq!(events[0], GraphEvent::NodeCreated(a));
        assert_eq!(
            events.iter().filter(|e| matches!(e, GraphEvent::NodeCreated(_))).count(),
            1
        );
        assert!(events.contains(&GraphEvent::Loaded));
    }
}
