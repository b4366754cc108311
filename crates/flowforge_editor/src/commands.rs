// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reversible graph edits recorded in the history.
//!
//! Each action carries owned snapshots taken at record time. `apply` replays
//! the edit and `revert` undoes it; neither ever generates new ids.

use flowforge_graph::node::NodeFields;
use flowforge_graph::{Connection, ConnectionError, Graph, GraphError, Node, NodeId};
use egui::Pos2;
use serde::{Deserialize, Serialize};

/// Error type for command replay
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Node insert/lookup failed
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Connection insert failed
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
}

/// A node position change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMove {
    /// Node that moved
    pub id: NodeId,
    /// Position before
    pub from: Pos2,
    /// Position after
    pub to: Pos2,
}

/// A node field change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Node that changed
    pub id: NodeId,
    /// Fields before
    pub before: NodeFields,
    /// Fields after
    pub after: NodeFields,
}

/// Recorded edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum HistoryAction {
    /// Nodes (and connections among them) were created
    Add {
        /// Created nodes
        nodes: Vec<Node>,
        /// Connections created alongside them
        connections: Vec<Connection>,
    },
    /// Nodes were deleted along with their connections
    Delete {
        /// Deleted nodes
        nodes: Vec<Node>,
        /// Connections removed by the cascade
        connections: Vec<Connection>,
    },
    /// Nodes were moved
    Move {
        /// One entry per moved node
        moves: Vec<NodeMove>,
    },
    /// Node fields were edited
    Update {
        /// One entry per edited node
        changes: Vec<FieldChange>,
    },
    /// A connection was created
    ConnectionAdd(Connection),
    /// A connection was deleted
    ConnectionDelete(Connection),
}

impl HistoryAction {
    /// Replay the edit (redo)
    pub fn apply(&self, graph: &mut Graph) -> Result<(), CommandError> {
        match self {
            Self::Add { nodes, connections } => restore(graph, nodes, connections),
            Self::Delete { nodes, .. } => {
                remove(graph, nodes);
                Ok(())
            }
            Self::Move { moves } => {
                for m in moves {
                    graph.update_node_position(&m.id, m.to.x, m.to.y);
                }
                Ok(())
            }
            Self::Update { changes } => {
                for change in changes {
                    graph.update_node(&change.id, change.after.clone().into());
                }
                Ok(())
            }
            Self::ConnectionAdd(connection) => {
                graph.restore_connection(connection.clone())?;
                Ok(())
            }
            Self::ConnectionDelete(connection) => {
                graph.remove_connection(&connection.id);
                Ok(())
            }
        }
    }

    /// Reverse the edit (undo)
    pub fn revert(&self, graph: &mut Graph) -> Result<(), CommandError> {
        match self {
            Self::Add { nodes, .. } => {
                remove(graph, nodes);
                Ok(())
            }
            Self::Delete { nodes, connections } => restore(graph, nodes, connections),
            Self::Move { moves } => {
                for m in moves {
                    graph.update_node_position(&m.id, m.from.x, m.from.y);
                }
                Ok(())
            }
            Self::Update { changes } => {
                for change in changes {
                    graph.update_node(&change.id, change.before.clone().into());
                }
                Ok(())
            }
            Self::ConnectionAdd(connection) => {
                graph.remove_connection(&connection.id);
                Ok(())
            }
            Self::ConnectionDelete(connection) => {
                graph.restore_connection(connection.clone())?;
                Ok(())
            }
        }
    }

    /// Short label for notices and logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Delete { .. } => "delete",
            Self::Move { .. } => "move",
            Self::Update { .. } => "update",
            Self::ConnectionAdd(_) => "connection-add",
            Self::ConnectionDelete(_) => "connection-delete",
        }
    }
}

fn restore(graph: &mut Graph, nodes: &[Node], connections: &[Connection]) -> Result<(), CommandError> {
    for node in nodes {
        graph.restore_node(node.clone())?;
    }
    for connection in connections {
        graph.restore_connection(connection.clone())?;
    }
    Ok(())
}

fn remove(graph: &mut Graph, nodes: &[Node]) {
    for node in nodes {
        graph.delete_node(&node.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowforge_graph::catalog::create_workflow_registry;
    use flowforge_graph::{HandleRef, NodeOverrides};
    use serde_json::json;
    use std::sync::Arc;

    fn graph_with_edge() -> (Graph, NodeId, NodeId, Connection) {
        let mut graph = Graph::new(Arc::new(create_workflow_registry()));
        let a = graph
            .create_node("http_request", Pos2::new(100.0, 100.0), NodeOverrides::default())
            .unwrap();
        let b = graph
            .create_node("code", Pos2::new(400.0, 100.0), NodeOverrides::default())
            .unwrap();
        let id = graph.connect(&a, HandleRef::output(0), &b, HandleRef::input(0)).unwrap();
        let connection = graph.connection(&id).unwrap().clone();
        (graph, a, b, connection)
    }

    #[test]
    fn test_delete_round_trip() {
        let (mut graph, a, _, connection) = graph_with_edge();
        let (node, removed) = graph.delete_node(&a).unwrap();
        let action = HistoryAction::Delete {
            nodes: vec![node.clone()],
            connections: removed,
        };

        action.revert(&mut graph).unwrap();
        assert_eq!(graph.node(&a), Some(&node));
        assert_eq!(graph.connection(&connection.id), Some(&connection));

        action.apply(&mut graph).unwrap();
        assert!(graph.node(&a).is_none());
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_add_redo_keeps_ids() {
        let (mut graph, a, _, _) = graph_with_edge();
        let node = graph.node(&a).unwrap().clone();
        let action = HistoryAction::Add {
            nodes: vec![node.clone()],
            connections: vec![],
        };

        action.revert(&mut graph).unwrap();
        assert!(graph.node(&a).is_none());
        action.apply(&mut graph).unwrap();
        assert_eq!(graph.node(&a), Some(&node));
    }

    #[test]
    fn test_move_and_update() {
        let (mut graph, a, _, _) = graph_with_edge();
        let moved = HistoryAction::Move {
            moves: vec![NodeMove {
                id: a.clone(),
                from: Pos2::new(100.0, 100.0),
                to: Pos2::new(240.0, 60.0),
            }],
        };
        moved.apply(&mut graph).unwrap();
        assert_eq!(graph.node(&a).unwrap().position, Pos2::new(240.0, 60.0));
        moved.revert(&mut graph).unwrap();
        assert_eq!(graph.node(&a).unwrap().position, Pos2::new(100.0, 100.0));

        let before = graph.node(&a).unwrap().fields();
        let mut after = before.clone();
        after.name = "Fetch users".to_string();
        after.parameters.insert("url".to_string(), json!("https://api.test/users"));
        let update = HistoryAction::Update {
            changes: vec![FieldChange {
                id: a.clone(),
                before: before.clone(),
                after: after.clone(),
            }],
        };
        update.apply(&mut graph).unwrap();
        assert_eq!(graph.node(&a).unwrap().fields(), after);
        update.revert(&mut graph).unwrap();
        assert_eq!(graph.node(&a).unwrap().fields(), before);
    }

    #[test]
    fn test_connection_actions() {
        let (mut graph, _, _, connection) = graph_with_edge();
        let add = HistoryAction::ConnectionAdd(connection.clone());
        add.revert(&mut graph).unwrap();
        assert_eq!(graph.connection_count(), 0);
        add.apply(&mut graph).unwrap();
        assert_eq!(graph.connection(&connection.id), Some(&connection));

        let delete = HistoryAction::ConnectionDelete(connection.clone());
        delete.apply(&mut graph).unwrap();
        assert_eq!(graph.connection_count(), 0);
        delete.revert(&mut graph).unwrap();
        assert_eq!(graph.connection_count(), 1);
    }

    #[test]
    fn test_entry_json_shape() {
        let (_, _, _, connection) = graph_with_edge();
        let value = serde_json::to_value(HistoryAction::ConnectionAdd(connection)).unwrap();
        assert_eq!(value["type"], json!("connection-add"));
        assert!(value["data"]["sourceHandle"].is_string());
    }
}
