// SPDX-License-Identifier: MIT OR Apache-2.0
//! The editor: turns pointer and keyboard input into graph edits.
//!
//! An [`Editor`] owns one graph, viewport, router, history and clipboard.
//! Nothing is global, so several editors can live side by side.
//!
//! Gestures (node drag, box select, connection draft, pan) only touch
//! visual state while the pointer moves. History is written once when the
//! gesture ends.

use crate::backend::{BackendError, WorkflowBackend};
use crate::clipboard::{Clipboard, ClipboardContent};
use crate::commands::{FieldChange, HistoryAction, NodeMove};
use crate::config::EditorConfig;
use crate::history::History;
use crate::input::{Focus, Modifiers, PointerButton, PointerTarget};
use crate::runner::{self, RunStep, RunSummary};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use egui::{Pos2, Rect, Vec2};
use flowforge_graph::geometry;
use flowforge_graph::node::Parameters;
use flowforge_graph::{
    BezierPath, Connection, ConnectionError, ConnectionId, ConnectionRouter, Graph, GraphError,
    GraphEvent, HandleRef, NodeId, NodeOverrides, NodeRegistry, NodeUpdate, Viewport,
    WorkflowDocument,
};
use std::path::Path;
use std::sync::Arc;

/// Editor-level errors
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Node operation failed
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Connection rejected
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Backend request failed
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Export failed
    #[error("Export failed: {0}")]
    Export(#[from] serde_json::Error),

    /// Export file could not be written
    #[error("Export failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational
    Info,
    /// Something worked
    Success,
    /// Something was refused
    Warning,
    /// Something failed
    Error,
}

/// Toast-style message for the host UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Text
    pub message: String,
}

/// Outcome of a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A shortcut ran
    Handled(ShortcutAction),
    /// Host should remove focus from the text field
    BlurFocus,
    /// Host should save through its backend
    SaveRequested,
    /// Not a shortcut in this context
    Ignored,
}

/// Active pointer gesture
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    /// Nothing in progress
    #[default]
    Idle,
    /// Dragging a node type from the palette
    PaletteDrag {
        /// Type being dragged
        node_type: String,
        /// Last pointer position (screen)
        pointer: Pos2,
    },
    /// Dragging the selected nodes
    DraggingNodes {
        /// Pointer position at drag start (screen)
        origin: Pos2,
        /// Positions at drag start
        start_positions: Vec<(NodeId, Pos2)>,
    },
    /// Drawing a selection rectangle
    BoxSelect {
        /// Corner where the drag began (screen)
        start: Pos2,
        /// Opposite corner (screen)
        current: Pos2,
        /// Add to the existing selection
        additive: bool,
    },
    /// Dragging a new connection from a handle
    Connecting,
    /// Panning the canvas
    Panning {
        /// Last pointer position (screen)
        last: Pos2,
    },
}

/// A workflow editor instance
pub struct Editor {
    config: EditorConfig,
    graph: Graph,
    viewport: Viewport,
    router: ConnectionRouter,
    history: History,
    clipboard: Clipboard,
    gesture: Gesture,
    workflow_id: Option<String>,
    workflow_name: String,
    notices: Vec<Notice>,
    dirty: bool,
}

impl Editor {
    /// Create an editor over a node catalog and a screen container
    pub fn new(registry: Arc<NodeRegistry>, container: Rect, config: EditorConfig) -> Self {
        let graph = Graph::new(registry)
            .with_grid_size(config.grid_size)
            .with_layout(config.node_layout);
        let viewport = Viewport::with_limits(container, config.zoom);
        let history = History::with_max_depth(config.history_limit);

        Self {
            config,
            graph,
            viewport,
            router: ConnectionRouter::new(),
            history,
            clipboard: Clipboard::new(),
            gesture: Gesture::Idle,
            workflow_id: None,
            workflow_name: "My workflow".to_string(),
            notices: Vec::new(),
            dirty: false,
        }
    }

    /// The graph store
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The viewport
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The connection router
    pub fn router(&self) -> &ConnectionRouter {
        &self.router
    }

    /// The history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Active configuration
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current gesture
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Whether there are unsaved edits
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Backend id of the loaded workflow
    pub fn workflow_id(&self) -> Option<&str> {
        self.workflow_id.as_deref()
    }

    /// Name of the loaded workflow
    pub fn workflow_name(&self) -> &str {
        &self.workflow_name
    }

    /// Rename the workflow
    pub fn set_workflow_name(&mut self, name: impl Into<String>) {
        self.workflow_name = name.into();
        self.dirty = true;
    }

    /// Drain pending notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Temporary connection curve, while drafting
    pub fn temp_connection(&self) -> Option<BezierPath> {
        self.router.temp_path()
    }

    /// Selection rectangle, while box selecting
    pub fn selection_rect(&self) -> Option<Rect> {
        match &self.gesture {
            Gesture::BoxSelect { start, current, .. } => Some(Rect::from_two_pos(*start, *current)),
            _ => None,
        }
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Warning | NoticeLevel::Error => tracing::warn!("{message}"),
            NoticeLevel::Info | NoticeLevel::Success => tracing::info!("{message}"),
        }
        self.notices.push(Notice { level, message });
    }

    /// Forward store notifications to the router
    fn sync(&mut self) {
        let events = self.graph.take_events();
        if events.is_empty() {
            return;
        }
        if events.iter().any(|e| !matches!(e, GraphEvent::SelectionChanged)) {
            self.dirty = true;
        }
        self.router.apply_events(&events, &self.graph, &self.viewport);
    }

    fn viewport_changed(&mut self) {
        self.router.rerender_all(&self.graph, &self.viewport);
    }

    fn record(&mut self, action: HistoryAction, description: impl Into<String>) {
        self.history.record(action, description);
    }

    // ─── Node edits ─────────────────────────────────────────────────────

    /// Create a node at a canvas position and select it
    pub fn add_node(&mut self, node_type: &str, position: Pos2) -> Result<NodeId, EditorError> {
        let id = match self.graph.create_node(node_type, position, NodeOverrides::default()) {
            Ok(id) => id,
            Err(e) => {
                self.notify(NoticeLevel::Error, e.to_string());
                return Err(e.into());
            }
        };

        if let Some(node) = self.graph.node(&id) {
            let description = format!("Add {}", node.name);
            let action = HistoryAction::Add {
                nodes: vec![node.clone()],
                connections: Vec::new(),
            };
            self.record(action, description);
        }
        self.graph.select_node(&id, false);
        self.sync();
        Ok(id)
    }

    /// Delete the selected nodes and their connections
    pub fn delete_selected(&mut self) {
        let ids: Vec<NodeId> = self.graph.selection().cloned().collect();
        self.delete_nodes(&ids);
    }

    /// Delete nodes and their connections as one edit
    pub fn delete_nodes(&mut self, ids: &[NodeId]) {
        let mut nodes = Vec::new();
        let mut connections: Vec<Connection> = Vec::new();

        for id in ids {
            if let Some((node, removed)) = self.graph.delete_node(id) {
                nodes.push(node);
                connections.extend(removed);
            }
        }
        if nodes.is_empty() {
            return;
        }

        let description = match nodes.len() {
            1 => format!("Delete {}", nodes[0].name),
            n => format!("Delete {n} nodes"),
        };
        self.record(HistoryAction::Delete { nodes, connections }, description);
        self.sync();
    }

    /// Merge `update` into a node as one edit.
    ///
    /// Returns `false` if the node is gone or nothing changed.
    pub fn update_node(&mut self, id: &NodeId, update: NodeUpdate) -> bool {
        if update.is_empty() {
            return false;
        }
        let Some(before) = self.graph.update_node(id, update) else {
            return false;
        };
        let Some(after) = self.graph.node(id).map(flowforge_graph::Node::fields) else {
            return false;
        };
        self.sync();
        if before == after {
            return false;
        }

        let description = format!("Edit {}", after.name);
        self.record(
            HistoryAction::Update {
                changes: vec![FieldChange {
                    id: id.clone(),
                    before,
                    after,
                }],
            },
            description,
        );
        true
    }

    /// Set one parameter value
    pub fn set_parameter(&mut self, id: &NodeId, key: &str, value: serde_json::Value) -> bool {
        let Some(node) = self.graph.node(id) else {
            return false;
        };
        let mut parameters: Parameters = node.parameters.clone();
        parameters.insert(key.to_string(), value);
        self.update_node(
            id,
            NodeUpdate {
                parameters: Some(parameters),
                ..Default::default()
            },
        )
    }

    /// Rename a node
    pub fn rename_node(&mut self, id: &NodeId, name: impl Into<String>) -> bool {
        self.update_node(
            id,
            NodeUpdate {
                name: Some(name.into()),
                ..Default::default()
            },
        )
    }

    /// Flip the disabled flag on every selected node as one edit
    pub fn toggle_disabled(&mut self) {
        let ids: Vec<NodeId> = self.graph.selection().cloned().collect();
        let mut changes = Vec::new();

        for id in ids {
            let Some(disabled) = self.graph.node(&id).map(|n| n.disabled) else {
                continue;
            };
            let update = NodeUpdate {
                disabled: Some(!disabled),
                ..Default::default()
            };
            if let Some(before) = self.graph.update_node(&id, update) {
                if let Some(after) = self.graph.node(&id).map(flowforge_graph::Node::fields) {
                    changes.push(FieldChange { id, before, after });
                }
            }
        }

        if !changes.is_empty() {
            self.record(HistoryAction::Update { changes }, "Toggle disabled");
        }
        self.sync();
    }

    /// Move a node to a canvas position (snapped) as one edit
    pub fn move_node(&mut self, id: &NodeId, position: Pos2) {
        let Some(from) = self.graph.node(id).map(|n| n.position) else {
            return;
        };
        let to = geometry::snap_pos(position, self.graph.grid_size());
        if from == to {
            return;
        }
        self.graph.update_node_position(id, to.x, to.y);
        self.record(
            HistoryAction::Move {
                moves: vec![NodeMove {
                    id: id.clone(),
                    from,
                    to,
                }],
            },
            "Move node",
        );
        self.sync();
    }

    // ─── Connection edits ───────────────────────────────────────────────

    /// Connect two handles as one edit
    pub fn connect(
        &mut self,
        from_node: &NodeId,
        from_handle: HandleRef,
        to_node: &NodeId,
        to_handle: HandleRef,
    ) -> Result<ConnectionId, EditorError> {
        let id = self.graph.connect(from_node, from_handle, to_node, to_handle)?;
        self.record_connection_add(&id);
        self.sync();
        Ok(id)
    }

    fn record_connection_add(&mut self, id: &ConnectionId) {
        if let Some(connection) = self.graph.connection(id) {
            let action = HistoryAction::ConnectionAdd(connection.clone());
            self.record(action, "Connect");
        }
    }

    /// Delete a connection as one edit
    pub fn delete_connection(&mut self, id: &ConnectionId) {
        if let Some(connection) = self.graph.remove_connection(id) {
            self.record(HistoryAction::ConnectionDelete(connection), "Disconnect");
            self.sync();
        }
    }

    // ─── Clipboard ──────────────────────────────────────────────────────

    /// Copy the selected nodes
    pub fn copy(&mut self) {
        let ids: Vec<NodeId> = self.graph.selection().cloned().collect();
        if ids.is_empty() {
            return;
        }
        let content = ClipboardContent::capture(&self.graph, &ids);
        tracing::debug!(nodes = content.nodes.len(), "copied to clipboard");
        self.clipboard.set(content);
    }

    /// Paste the clipboard, offset from the originals, and select the result
    pub fn paste(&mut self) -> Vec<NodeId> {
        let Some(content) = self.clipboard.content().cloned() else {
            return Vec::new();
        };
        self.insert_copies(&content, "Paste")
    }

    /// Copy and paste the selection without touching the clipboard
    pub fn duplicate(&mut self) -> Vec<NodeId> {
        let ids: Vec<NodeId> = self.graph.selection().cloned().collect();
        if ids.is_empty() {
            return Vec::new();
        }
        let content = ClipboardContent::capture(&self.graph, &ids);
        self.insert_copies(&content, "Duplicate")
    }

    fn insert_copies(&mut self, content: &ClipboardContent, description: &str) -> Vec<NodeId> {
        let [dx, dy] = self.config.paste_offset;
        let (nodes, connections) = content.instantiate(Vec2::new(dx, dy));

        let mut inserted = Vec::new();
        for node in &nodes {
            match self.graph.restore_node(node.clone()) {
                Ok(_) => inserted.push(node.clone()),
                Err(e) => tracing::warn!("Skipping pasted node: {e}"),
            }
        }
        let mut wired = Vec::new();
        for connection in connections {
            if self.graph.restore_connection(connection.clone()).is_ok() {
                wired.push(connection);
            }
        }
        if inserted.is_empty() {
            return Vec::new();
        }

        let ids: Vec<NodeId> = inserted.iter().map(|n| n.id.clone()).collect();
        self.graph.select_nodes(&ids);
        self.record(
            HistoryAction::Add {
                nodes: inserted,
                connections: wired,
            },
            description,
        );
        self.sync();
        ids
    }

    // ─── History ────────────────────────────────────────────────────────

    /// Undo the last edit
    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        let entry = match self.history.undo() {
            Ok(entry) => entry,
            Err(e) => {
                self.notify(NoticeLevel::Info, e.to_string());
                return false;
            }
        };
        if let Err(e) = entry.action.revert(&mut self.graph) {
            tracing::warn!(action = entry.action.label(), "Undo incomplete: {e}");
        }
        tracing::info!("Undo: {}", entry.description);
        self.sync();
        true
    }

    /// Redo the last undone edit
    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        let entry = match self.history.redo() {
            Ok(entry) => entry,
            Err(e) => {
                self.notify(NoticeLevel::Info, e.to_string());
                return false;
            }
        };
        if let Err(e) = entry.action.apply(&mut self.graph) {
            tracing::warn!(action = entry.action.label(), "Redo incomplete: {e}");
        }
        tracing::info!("Redo: {}", entry.description);
        self.sync();
        true
    }

    // ─── Selection ──────────────────────────────────────────────────────

    /// Select a node
    pub fn select_node(&mut self, id: &NodeId, additive: bool) {
        self.graph.select_node(id, additive);
        self.sync();
    }

    /// Select every node
    pub fn select_all(&mut self) {
        self.graph.select_all();
        self.sync();
    }

    /// Clear the selection
    pub fn deselect_all(&mut self) {
        self.graph.deselect_all();
        self.sync();
    }

    // ─── View ───────────────────────────────────────────────────────────

    /// Fit every node into view
    pub fn fit_view(&mut self) {
        self.viewport.fit_view(self.graph.bounds());
        self.viewport_changed();
    }

    /// Zoom in one step around the container center
    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.viewport_changed();
    }

    /// Zoom out one step around the container center
    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.viewport_changed();
    }

    /// Zoom anchored at a screen point
    pub fn zoom_at(&mut self, scale: f32, pivot: Pos2) {
        self.viewport.zoom_at_point(scale, pivot);
        self.viewport_changed();
    }

    /// Scale 1, canvas origin centered
    pub fn reset_view(&mut self) {
        self.viewport.reset();
        self.viewport_changed();
    }

    /// Pan by a screen delta
    pub fn pan_by(&mut self, delta: Vec2) {
        self.viewport.pan_by(delta);
        self.viewport_changed();
    }

    /// The host's canvas element moved or resized
    pub fn set_container(&mut self, container: Rect) {
        self.viewport.set_container(container);
        self.viewport_changed();
    }

    // ─── Pointer ────────────────────────────────────────────────────────

    /// Start dragging a node type out of the palette
    pub fn begin_palette_drag(&mut self, node_type: impl Into<String>, pointer: Pos2) {
        self.cancel_gesture();
        self.gesture = Gesture::PaletteDrag {
            node_type: node_type.into(),
            pointer,
        };
    }

    /// Pointer pressed
    pub fn pointer_down(
        &mut self,
        pos: Pos2,
        target: PointerTarget,
        button: PointerButton,
        modifiers: Modifiers,
    ) {
        if self.gesture != Gesture::Idle {
            return;
        }

        if button == PointerButton::Middle {
            self.gesture = Gesture::Panning { last: pos };
            return;
        }
        if button != PointerButton::Primary {
            return;
        }

        match target {
            PointerTarget::Handle { node, handle } => {
                if self
                    .router
                    .start_connection(&self.graph, &self.viewport, &node, handle)
                {
                    self.gesture = Gesture::Connecting;
                }
            }
            PointerTarget::Node(id) => {
                if modifiers.shift || modifiers.command() {
                    self.graph.toggle_node_selection(&id);
                } else if !self.graph.is_selected(&id) {
                    self.graph.select_node(&id, false);
                }
                self.sync();

                if self.graph.is_selected(&id) {
                    let start_positions = self
                        .graph
                        .selection()
                        .filter_map(|sid| self.graph.node(sid).map(|n| (sid.clone(), n.position)))
                        .collect();
                    self.gesture = Gesture::DraggingNodes {
                        origin: pos,
                        start_positions,
                    };
                }
            }
            PointerTarget::Background => {
                self.gesture = Gesture::BoxSelect {
                    start: pos,
                    current: pos,
                    additive: modifiers.shift,
                };
            }
            PointerTarget::Control | PointerTarget::Outside => {}
        }
    }

    /// Pointer moved
    pub fn pointer_move(&mut self, pos: Pos2) {
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::PaletteDrag { pointer, .. } => *pointer = pos,
            Gesture::BoxSelect { current, .. } => *current = pos,
            Gesture::Connecting => {
                self.router.update_temp_connection(pos.x, pos.y);
            }
            Gesture::Panning { last } => {
                let delta = pos - *last;
                *last = pos;
                self.pan_by(delta);
            }
            Gesture::DraggingNodes {
                origin,
                start_positions,
            } => {
                let delta = (pos - *origin) / self.viewport.scale;
                for (id, start) in start_positions.iter() {
                    let target = *start + delta;
                    self.graph.update_node_position(id, target.x, target.y);
                }
                self.sync();
            }
        }
    }

    /// Pointer released
    pub fn pointer_up(&mut self, pos: Pos2, target: PointerTarget) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle | Gesture::Panning { .. } => {}
            Gesture::PaletteDrag { node_type, .. } => {
                if self.viewport.contains_screen(pos) && target != PointerTarget::Outside {
                    let position = self.viewport.screen_to_canvas(pos);
                    // Failure is already surfaced as a notice
                    let _ = self.add_node(&node_type, position);
                } else {
                    tracing::debug!(node_type, "palette drop outside canvas ignored");
                }
            }
            Gesture::Connecting => match target {
                PointerTarget::Handle { node, handle } => {
                    match self.router.complete_connection(&mut self.graph, &node, handle) {
                        Ok(id) => {
                            self.record_connection_add(&id);
                            self.sync();
                        }
                        Err(e) => tracing::debug!("connection not made: {e}"),
                    }
                }
                _ => self.router.cancel_connection(),
            },
            Gesture::BoxSelect { start, additive, .. } => {
                let rect = Rect::from_two_pos(start, pos);
                let threshold = self.config.box_select_threshold;
                if rect.width() > threshold && rect.height() > threshold {
                    self.graph
                        .select_nodes_in_rect(rect, &self.viewport, additive);
                } else if !additive {
                    self.graph.deselect_all();
                }
                self.sync();
            }
            Gesture::DraggingNodes {
                origin,
                start_positions,
            } => self.finish_node_drag(origin, pos, start_positions),
        }
    }

    fn finish_node_drag(&mut self, origin: Pos2, pos: Pos2, start_positions: Vec<(NodeId, Pos2)>) {
        let delta = (pos - origin) / self.viewport.scale;
        let grid = self.graph.grid_size();
        let mut moves = Vec::new();

        for (id, from) in start_positions {
            if self.graph.node(&id).is_none() {
                continue;
            }
            let to = geometry::snap_pos(from + delta, grid);
            self.graph.update_node_position(&id, to.x, to.y);
            if to != from {
                moves.push(NodeMove { id, from, to });
            }
        }

        if !moves.is_empty() {
            let description = match moves.len() {
                1 => "Move node".to_string(),
                n => format!("Move {n} nodes"),
            };
            self.record(HistoryAction::Move { moves }, description);
        }
        self.sync();
    }

    /// Abandon the current gesture without committing anything
    pub fn cancel_gesture(&mut self) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Connecting => self.router.cancel_connection(),
            Gesture::DraggingNodes { start_positions, .. } => {
                for (id, start) in start_positions {
                    self.graph.update_node_position(&id, start.x, start.y);
                }
                self.sync();
            }
            _ => {}
        }
    }

    /// Wheel input: positive `delta` zooms in around `pos`
    pub fn scroll(&mut self, delta: f32, pos: Pos2) {
        let factor = 1.0 + delta * self.config.scroll_zoom_speed;
        if factor <= 0.0 {
            return;
        }
        self.zoom_at(self.viewport.scale * factor, pos);
    }

    // ─── Keyboard ───────────────────────────────────────────────────────

    /// Key pressed
    pub fn key_down(&mut self, key: &str, modifiers: Modifiers, focus: Focus) -> KeyOutcome {
        let Some(action) = ShortcutMap::resolve(key, modifiers, focus) else {
            return KeyOutcome::Ignored;
        };

        match action {
            ShortcutAction::BlurFocus => return KeyOutcome::BlurFocus,
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::SelectAll => self.select_all(),
            ShortcutAction::Copy => self.copy(),
            ShortcutAction::Paste => {
                self.paste();
            }
            ShortcutAction::Duplicate => {
                self.duplicate();
            }
            ShortcutAction::ZoomIn => self.zoom_in(),
            ShortcutAction::ZoomOut => self.zoom_out(),
            ShortcutAction::ZoomToFit => self.fit_view(),
            ShortcutAction::Save => return KeyOutcome::SaveRequested,
            ShortcutAction::Escape => {
                self.cancel_gesture();
                self.deselect_all();
            }
        }
        KeyOutcome::Handled(action)
    }

    // ─── Load / save ────────────────────────────────────────────────────

    /// Replace the editor contents with a document
    pub fn load_document(&mut self, document: &WorkflowDocument) {
        self.cancel_gesture();
        self.graph.load_workflow(document);
        self.workflow_id = document.id.clone();
        self.workflow_name = document.name.clone();
        self.history.clear();
        self.sync();
        self.fit_view();
        self.dirty = false;
    }

    /// Load a workflow from the backend
    pub fn load(&mut self, backend: &dyn WorkflowBackend, id: &str) -> Result<(), EditorError> {
        match backend.load_workflow(id) {
            Ok(document) => {
                self.load_document(&document);
                Ok(())
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("Failed to load workflow: {e}"));
                Err(e.into())
            }
        }
    }

    /// Current contents as a document
    pub fn document(&self) -> WorkflowDocument {
        WorkflowDocument::from_graph(self.workflow_id.clone(), self.workflow_name.clone(), &self.graph)
    }

    /// Save to the backend
    pub fn save(&mut self, backend: &mut dyn WorkflowBackend) -> Result<String, EditorError> {
        let response = match backend.save_workflow(&self.document()) {
            Ok(response) => response,
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("Failed to save workflow: {e}"));
                return Err(e.into());
            }
        };
        if response.success {
            self.workflow_id = Some(response.id.clone());
            self.dirty = false;
            self.notify(NoticeLevel::Success, "Workflow saved");
        } else {
            self.notify(NoticeLevel::Error, "Workflow was not saved");
        }
        Ok(response.id)
    }

    /// Pretty JSON of the current document
    pub fn export_json(&self) -> Result<String, EditorError> {
        Ok(self.document().to_json()?)
    }

    /// Write the JSON export to a file
    pub fn export_to_file(&self, path: &Path) -> Result<(), EditorError> {
        std::fs::write(path, self.export_json()?)?;
        tracing::info!("Exported workflow to {}", path.display());
        Ok(())
    }

    // ─── Test walk ──────────────────────────────────────────────────────

    /// Animate a test walk over the nodes
    pub async fn test_workflow<F>(&mut self, on_step: F) -> RunSummary
    where
        F: FnMut(&RunStep),
    {
        self.cancel_gesture();
        let summary = runner::run_test_walk(&mut self.graph, self.config.run_timing, on_step).await;
        // Run states are presentation only
        self.graph.take_events();
        self.notify(
            NoticeLevel::Success,
            format!("Workflow test finished: {} nodes", summary.succeeded),
        );
        summary
    }
}
