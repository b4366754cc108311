// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection routing: validation, bezier paths, and connection drafting.
//!
//! Paths are screen-space projections of store state. They are recomputed
//! from current node positions whenever nodes move or the viewport changes,
//! never carried along with node motion.

use crate::connection::{Connection, ConnectionId};
use crate::geometry::BezierPath;
use crate::graph::{ConnectionError, Graph, GraphEvent};
use crate::handle::{self, HandleKind, HandleRef};
use crate::node::NodeId;
use crate::viewport::Viewport;
use egui::Pos2;
use indexmap::IndexMap;

/// Check the structural rules for joining two handles.
///
/// Rejects self-loops and same-direction pairs. Cycles through other nodes
/// are allowed.
pub fn is_valid_connection(
    source: &NodeId,
    target: &NodeId,
    source_kind: HandleKind,
    target_kind: HandleKind,
) -> Result<(), ConnectionError> {
    if source == target {
        return Err(ConnectionError::SelfLoop);
    }
    if source_kind == target_kind {
        return Err(ConnectionError::SameDirection);
    }
    Ok(())
}

/// In-progress connection following the pointer
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDraft {
    /// Node the drag started on
    pub node: NodeId,
    /// Handle the drag started on
    pub handle: HandleRef,
    /// Screen position of that handle
    pub anchor: Pos2,
    /// Current pointer position (screen space)
    pub pointer: Pos2,
}

impl ConnectionDraft {
    /// Temporary curve between the handle and the pointer
    pub fn path(&self) -> BezierPath {
        match self.handle.kind {
            HandleKind::Output => BezierPath::between(self.anchor, self.pointer),
            HandleKind::Input => BezierPath::between(self.pointer, self.anchor),
        }
    }
}

/// Owns rendered connection paths and the connection draft
#[derive(Debug, Default)]
pub struct ConnectionRouter {
    paths: IndexMap<ConnectionId, BezierPath>,
    draft: Option<ConnectionDraft>,
}

impl ConnectionRouter {
    /// Create an empty router
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered path of a connection
    pub fn path(&self, id: &ConnectionId) -> Option<&BezierPath> {
        self.paths.get(id)
    }

    /// All rendered paths
    pub fn paths(&self) -> impl Iterator<Item = (&ConnectionId, &BezierPath)> {
        self.paths.iter()
    }

    /// Screen-space curve for a connection from current store state
    pub fn route(graph: &Graph, viewport: &Viewport, connection: &Connection) -> Option<BezierPath> {
        let source = graph.resolve_handle(
            &connection.source,
            HandleKind::Output,
            &handle::normalize(&connection.source_handle),
        )?;
        let target = graph.resolve_handle(
            &connection.target,
            HandleKind::Input,
            &handle::normalize(&connection.target_handle),
        )?;

        let start = graph.handle_position(&connection.source, source)?;
        let end = graph.handle_position(&connection.target, target)?;
        Some(BezierPath::between(
            viewport.canvas_to_screen(start),
            viewport.canvas_to_screen(end),
        ))
    }

    /// Recompute every path (load, viewport change)
    pub fn rerender_all(&mut self, graph: &Graph, viewport: &Viewport) {
        self.paths = graph
            .connections()
            .filter_map(|c| Self::route(graph, viewport, c).map(|path| (c.id.clone(), path)))
            .collect();

        if let Some(draft) = &mut self.draft {
            match graph.handle_position(&draft.node, draft.handle) {
                Some(anchor) => draft.anchor = viewport.canvas_to_screen(anchor),
                None => self.draft = None,
            }
        }
    }

    /// Recompute paths touching a node
    pub fn rerender_node(&mut self, graph: &Graph, viewport: &Viewport, node: &NodeId) {
        for connection in graph.connections_for_node(node) {
            if let Some(path) = Self::route(graph, viewport, connection) {
                self.paths.insert(connection.id.clone(), path);
            }
        }
    }

    /// Bring paths up to date with store notifications
    pub fn apply_events(&mut self, events: &[GraphEvent], graph: &Graph, viewport: &Viewport) {
        for event in events {
            match event {
                GraphEvent::Loaded => self.rerender_all(graph, viewport),
                GraphEvent::NodeCreated(id) | GraphEvent::NodeMoved(id) | GraphEvent::NodeUpdated(id) => {
                    self.rerender_node(graph, viewport, id);
                }
                GraphEvent::NodeDeleted(id) => {
                    self.paths.retain(|cid, _| graph.connection(cid).is_some());
                    if self.draft.as_ref().is_some_and(|d| d.node == *id) {
                        self.draft = None;
                    }
                }
                GraphEvent::ConnectionCreated(id) => {
                    if let Some(path) = graph
                        .connection(id)
                        .and_then(|c| Self::route(graph, viewport, c))
                    {
                        self.paths.insert(id.clone(), path);
                    }
                }
                GraphEvent::ConnectionDeleted(id) => {
                    self.paths.shift_remove(id);
                }
                GraphEvent::SelectionChanged => {}
            }
        }
    }

    // ─── Drafting ───────────────────────────────────────────────────────

    /// Whether a connection draft is active
    pub fn is_connecting(&self) -> bool {
        self.draft.is_some()
    }

    /// Current draft
    pub fn draft(&self) -> Option<&ConnectionDraft> {
        self.draft.as_ref()
    }

    /// Temporary curve following the pointer
    pub fn temp_path(&self) -> Option<BezierPath> {
        self.draft.as_ref().map(ConnectionDraft::path)
    }

    /// Enter the connecting state from a handle.
    ///
    /// Returns `false` if the handle does not exist.
    pub fn start_connection(
        &mut self,
        graph: &Graph,
        viewport: &Viewport,
        node: &NodeId,
        handle: HandleRef,
    ) -> bool {
        let Some(anchor) = graph.handle_position(node, handle) else {
            return false;
        };
        let anchor = viewport.canvas_to_screen(anchor);
        tracing::debug!(node = %node, ?handle, "connection draft started");
        self.draft = Some(ConnectionDraft {
            node: node.clone(),
            handle,
            anchor,
            pointer: anchor,
        });
        true
    }

    /// Follow the pointer while connecting
    pub fn update_temp_connection(&mut self, x: f32, y: f32) -> Option<BezierPath> {
        let draft = self.draft.as_mut()?;
        draft.pointer = Pos2::new(x, y);
        Some(draft.path())
    }

    /// Finish the draft on a target handle.
    ///
    /// The draft always ends; the connection is only committed if valid and new.
    pub fn complete_connection(
        &mut self,
        graph: &mut Graph,
        target: &NodeId,
        handle: HandleRef,
    ) -> Result<ConnectionId, ConnectionError> {
        let draft = self.draft.take().ok_or(ConnectionError::NotConnecting)?;
        let result = graph.connect(&draft.node, draft.handle, target, handle);
        if let Err(e) = &result {
            tracing::debug!(source = %draft.node, target = %target, "connection rejected: {e}");
        }
        result
    }

    /// Leave the connecting state without committing
    pub fn cancel_connection(&mut self) {
        if self.draft.take().is_some() {
            tracing::debug!("connection draft cancelled");
        }
    }
}
