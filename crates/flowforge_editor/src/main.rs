// SPDX-License-Identifier: MIT OR Apache-2.0
//! `FlowForge` headless editor session.
//!
//! Loads the demo workflow from the in-memory backend, frames it, runs the
//! test walk, saves it back and prints the exported JSON.
//!
//! Set `FLOWFORGE_CONFIG` to a RON file to override editor settings and
//! `RUST_LOG` to adjust log output.

use flowforge_editor::backend::DEMO_WORKFLOW_ID;
use flowforge_editor::config::CONFIG_ENV;
use flowforge_editor::{Editor, EditorConfig, MockBackend};
use flowforge_graph::catalog::create_workflow_registry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "flowforge_editor=debug,flowforge_graph=debug";

#[tokio::main]
async fn main() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FlowForge editor v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run().await {
        tracing::error!("Editor session failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), flowforge_editor::EditorError> {
    let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let config = EditorConfig::load_or_default(config_path.as_deref());

    let container = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1280.0, 800.0));
    let mut editor = Editor::new(Arc::new(create_workflow_registry()), container, config);
    let mut backend = MockBackend::new();

    editor.load(&backend, DEMO_WORKFLOW_ID)?;
    tracing::info!(
        workflow = editor.workflow_name(),
        nodes = editor.graph().node_count(),
        connections = editor.graph().connection_count(),
        scale = editor.viewport().scale,
        "workflow loaded"
    );

    let summary = editor
        .test_workflow(|step| {
            tracing::info!(index = step.index, node = %step.node, state = ?step.state, "test step");
        })
        .await;
    tracing::debug!(?summary, "test walk done");

    let id = editor.save(&mut backend)?;
    for notice in editor.take_notices() {
        tracing::info!(level = ?notice.level, "{}", notice.message);
    }
    tracing::info!(workflow = %id, "session complete");

    println!("{}", editor.export_json()?);
    Ok(())
}
