// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history.
//!
//! Entries own their payloads outright, so later edits to the live graph
//! can never reach back into a recorded entry.

use crate::commands::HistoryAction;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Maximum undo history depth
pub const MAX_HISTORY: usize = 50;

/// History errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// A recorded, reversible action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Human-readable description
    pub description: String,
    /// What happened, with everything needed to reverse it
    pub action: HistoryAction,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Bounded undo stack with a redo stack
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_depth: usize,
}

impl History {
    /// History with the default depth
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// History keeping at most `max_depth` undo entries
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record a new action.
    ///
    /// Clears the redo stack and drops the oldest entry past the depth limit.
    pub fn record(&mut self, action: HistoryAction, description: impl Into<String>) {
        let entry = HistoryEntry {
            description: description.into(),
            action,
            timestamp: now_millis(),
        };
        tracing::debug!(action = entry.action.label(), description = %entry.description, "history recorded");

        self.redo_stack.clear();
        self.undo_stack.push_back(entry);

        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    /// Move the newest entry to the redo stack and return it
    pub fn undo(&mut self) -> Result<HistoryEntry> {
        let entry = self
            .undo_stack
            .pop_back()
            .ok_or(HistoryError::NothingToUndo)?;

        self.redo_stack.push(entry.clone());
        Ok(entry)
    }

    /// Move the newest undone entry back to the undo stack and return it
    pub fn redo(&mut self) -> Result<HistoryEntry> {
        let entry = self
            .redo_stack
            .pop()
            .ok_or(HistoryError::NothingToRedo)?;

        self.undo_stack.push_back(entry.clone());
        Ok(entry)
    }

    /// Whether undo would do anything
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether redo would do anything
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get undo stack depth
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get redo stack depth
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forget everything (after loading a workflow)
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Get description of next undo entry
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|e| e.description.as_str())
    }

    /// Get description of next redo entry
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.description.as_str())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowforge_graph::Connection;

    fn action(n: usize) -> HistoryAction {
        HistoryAction::ConnectionAdd(Connection::new(
            format!("a{n}").as_str().into(),
            "main_0",
            "b".into(),
            "main_0",
        ))
    }

    #[test]
    fn test_empty_stacks() {
        let mut history = History::new();
        assert_eq!(history.undo(), Err(HistoryError::NothingToUndo));
        assert_eq!(history.redo(), Err(HistoryError::NothingToRedo));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_undo_redo_moves_entries() {
        let mut history = History::new();
        history.record(action(1), "Connect");
        assert_eq!(history.undo_description(), Some("Connect"));

        let undone = history.undo().unwrap();
        assert_eq!(undone.description, "Connect");
        assert!(undone.timestamp > 0);
        assert!(history.can_redo());
        assert_eq!(history.redo_description(), Some("Connect"));

        let redone = history.redo().unwrap();
        assert_eq!(redone, undone);
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::new();
        history.record(action(1), "one");
        history.record(action(2), "two");
        history.undo().unwrap();
        assert_eq!(history.redo_depth(), 1);

        history.record(action(3), "three");
        assert_eq!(history.redo_depth(), 0);
        assert_eq!(history.undo_description(), Some("three"));
    }

    #[test]
    fn test_depth_limit_drops_oldest() {
        let mut history = History::new();
        for n in 0..60 {
            history.record(action(n), format!("step {n}"));
        }
        assert_eq!(history.undo_depth(), MAX_HISTORY);

        let mut last = None;
        while let Ok(entry) = history.undo() {
            last = Some(entry);
        }
        assert_eq!(last.unwrap().description, "step 10");
    }
}
