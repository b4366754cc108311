// SPDX-License-Identifier: MIT OR Apache-2.0
//! Handles: the named, indexed input/output slots on a node.

use crate::node::NodeTypeDescriptor;
use serde::{Deserialize, Serialize};

/// Handle name used when a connection does not specify one
pub const DEFAULT_HANDLE: &str = "main";

/// Handle direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleKind {
    /// Input slot, drawn on the left edge
    Input,
    /// Output slot, drawn on the right edge
    Output,
}

impl HandleKind {
    /// The other direction
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

/// A handle on a specific node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleRef {
    /// Direction
    pub kind: HandleKind,
    /// Position within the descriptor's slot list
    pub index: usize,
}

impl HandleRef {
    /// Input handle at `index`
    pub fn input(index: usize) -> Self {
        Self {
            kind: HandleKind::Input,
            index,
        }
    }

    /// Output handle at `index`
    pub fn output(index: usize) -> Self {
        Self {
            kind: HandleKind::Output,
            index,
        }
    }
}

/// Wire name for a slot: `"<slot>_<index>"`
pub fn handle_name(slot: &str, index: usize) -> String {
    format!("{slot}_{index}")
}

/// Name of the handle `handle` on a node of type `descriptor`, if the slot exists
pub fn name_for(descriptor: &NodeTypeDescriptor, handle: HandleRef) -> Option<String> {
    descriptor
        .slots(handle.kind)
        .get(handle.index)
        .map(|slot| handle_name(slot, handle.index))
}

/// Resolve a wire name back to a slot index.
///
/// Accepts both the indexed form (`main_0`) and a bare slot name (`main`),
/// which maps to the first slot carrying that name.
pub fn resolve(descriptor: &NodeTypeDescriptor, kind: HandleKind, name: &str) -> Option<usize> {
    let slots = descriptor.slots(kind);

    if let Some((slot, index)) = name.rsplit_once('_') {
        if let Ok(index) = index.parse::<usize>() {
            if slots.get(index).is_some_and(|s| s == slot) {
                return Some(index);
            }
        }
    }

    slots.iter().position(|s| s == name)
}

/// Replace a missing handle name with [`DEFAULT_HANDLE`]
pub fn normalize(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        DEFAULT_HANDLE.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeCategory, NodeTypeDescriptor};

    fn branch() -> NodeTypeDescriptor {
        NodeTypeDescriptor {
            node_type: "if".to_string(),
            name: "If".to_string(),
            category: NodeCategory::Flow,
            icon: "split".to_string(),
            description: String::new(),
            inputs: vec!["main".to_string()],
            outputs: vec!["true".to_string(), "false".to_string()],
            parameters: vec![],
        }
    }

    #[test]
    fn test_handle_names() {
        let desc = branch();
        assert_eq!(name_for(&desc, HandleRef::output(1)).as_deref(), Some("false_1"));
        assert_eq!(name_for(&desc, HandleRef::input(0)).as_deref(), Some("main_0"));
        assert!(name_for(&desc, HandleRef::input(1)).is_none());
    }

    #[test]
    fn test_resolve() {
        let desc = branch();
        assert_eq!(resolve(&desc, HandleKind::Output, "false_1"), Some(1));
        assert_eq!(resolve(&desc, HandleKind::Output, "true"), Some(0));
        assert_eq!(resolve(&desc, HandleKind::Input, "main"), Some(0));
        // Index and slot name disagree
        assert_eq!(resolve(&desc, HandleKind::Output, "true_1"), None);
        // Wrong direction
        assert_eq!(resolve(&desc, HandleKind::Input, "true_0"), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(""), "main");
        assert_eq!(normalize("  "), "main");
        assert_eq!(normalize("true_0"), "true_0");
    }
}
