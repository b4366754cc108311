// SPDX-License-Identifier: MIT OR Apache-2.0
//! "Test workflow" walk.
//!
//! Purely presentational: nodes are visited one at a time in store order
//! (not connection order), each marked running and then done after a short
//! random pause. Nothing is executed.

use crate::config::RunTiming;
use flowforge_graph::node::RunState;
use flowforge_graph::{Graph, NodeId};
use rand::Rng;
use std::time::Duration;

/// One status change during the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStep {
    /// Position of the node in the walk
    pub index: usize,
    /// Visited node
    pub node: NodeId,
    /// New status
    pub state: RunState,
}

/// Outcome of a walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Nodes marked successful
    pub succeeded: usize,
    /// Disabled nodes passed over
    pub skipped: usize,
}

fn pause(timing: RunTiming) -> Duration {
    let ms = if timing.max_delay_ms <= timing.min_delay_ms {
        timing.min_delay_ms
    } else {
        rand::rng().random_range(timing.min_delay_ms..=timing.max_delay_ms)
    };
    Duration::from_millis(ms)
}

/// Walk every node in store order, reporting each status change
pub async fn run_test_walk<F>(graph: &mut Graph, timing: RunTiming, mut on_step: F) -> RunSummary
where
    F: FnMut(&RunStep),
{
    let order: Vec<NodeId> = graph.node_ids().cloned().collect();
    for id in &order {
        graph.set_run_state(id, None);
    }

    let mut summary = RunSummary::default();
    tracing::info!(nodes = order.len(), "test walk started");

    for (index, id) in order.into_iter().enumerate() {
        // The walk holds the graph exclusively; this only guards stale ids
        let Some(node) = graph.node(&id) else {
            continue;
        };

        if node.disabled {
            graph.set_run_state(&id, Some(RunState::Skipped));
            on_step(&RunStep {
                index,
                node: id,
                state: RunState::Skipped,
            });
            summary.skipped += 1;
            continue;
        }

        graph.set_run_state(&id, Some(RunState::Running));
        on_step(&RunStep {
            index,
            node: id.clone(),
            state: RunState::Running,
        });

        let delay = pause(timing);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        graph.set_run_state(&id, Some(RunState::Success));
        on_step(&RunStep {
            index,
            node: id,
            state: RunState::Success,
        });
        summary.succeeded += 1;
    }

    tracing::info!(succeeded = summary.succeeded, skipped = summary.skipped, "test walk finished");
    summary
}
