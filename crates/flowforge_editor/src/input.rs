// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input types fed to the editor by the host UI.
//!
//! The host hit-tests its own rendering and reports what the pointer is
//! over; the editor never inspects rendered output.

use flowforge_graph::{HandleRef, NodeId};

/// Pointer button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    /// Left button / touch
    #[default]
    Primary,
    /// Right button
    Secondary,
    /// Wheel button (pans)
    Middle,
}

/// Keyboard modifier state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Shift held
    pub shift: bool,
    /// Control held
    pub ctrl: bool,
    /// Alt/Option held
    pub alt: bool,
    /// Command/Windows key held
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Shift only
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Control only
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Control or Command: the platform "command" modifier
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What the pointer is over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    /// Bare canvas background
    Background,
    /// Body of a node
    Node(NodeId),
    /// A connection handle on a node
    Handle {
        /// Node the handle belongs to
        node: NodeId,
        /// The handle
        handle: HandleRef,
    },
    /// A button or field inside a node or overlay
    Control,
    /// Outside the canvas (palette, panels)
    Outside,
}

/// Where keyboard focus is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Canvas or nothing focused
    #[default]
    Canvas,
    /// A text input, textarea or select
    TextField,
}
