// SPDX-License-Identifier: MIT OR Apache-2.0
//! `FlowForge` workflow editor core.
//!
//! Everything a node-canvas UI needs except the drawing itself:
//! - Pointer gestures (drag, box select, connection drafting, pan, palette drop)
//! - Keyboard shortcuts with text-field suppression
//! - Undo/redo over owned snapshots
//! - Clipboard, duplicate
//! - Load/save through a [`WorkflowBackend`]
//! - An animated "test workflow" walk
//!
//! Graph data, geometry and connection routing live in `flowforge_graph`.

pub mod backend;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod editor;
pub mod history;
pub mod input;
pub mod runner;
pub mod shortcuts;

pub use backend::{BackendError, MockBackend, SaveResponse, WorkflowBackend};
pub use commands::HistoryAction;
pub use config::{ConfigError, EditorConfig, RunTiming};
pub use editor::{Editor, EditorError, Gesture, KeyOutcome, Notice, NoticeLevel};
pub use history::{History, HistoryEntry, HistoryError};
pub use input::{Focus, Modifiers, PointerButton, PointerTarget};
pub use shortcuts::{ShortcutAction, ShortcutMap};
