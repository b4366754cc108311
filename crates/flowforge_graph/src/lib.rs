// SPDX-License-Identifier: MIT OR Apache-2.0
//! Workflow graph model for `FlowForge`.
//!
//! This crate holds the rendering-agnostic core of the workflow editor:
//! - Node catalog and node/connection model
//! - Graph store with selection and change notifications
//! - Viewport pan/zoom transform
//! - Bezier connection routing and connection drafting
//! - Workflow JSON documents
//!
//! ## Architecture
//!
//! The store never calls into other components. Each mutation appends a
//! [`GraphEvent`]; the owner drains them with [`Graph::take_events`] and
//! hands them to the [`ConnectionRouter`], which re-derives screen-space
//! paths from current positions and the [`Viewport`].

pub mod catalog;
pub mod connection;
pub mod geometry;
pub mod graph;
pub mod handle;
pub mod node;
pub mod router;
pub mod viewport;
pub mod workflow;

pub use connection::{Connection, ConnectionId};
pub use geometry::{BezierPath, NodeLayout};
pub use graph::{ConnectionError, Graph, GraphError, GraphEvent};
pub use handle::{HandleKind, HandleRef};
pub use node::{Node, NodeId, NodeOverrides, NodeRegistry, NodeTypeDescriptor, NodeUpdate};
pub use router::ConnectionRouter;
pub use viewport::Viewport;
pub use workflow::WorkflowDocument;
