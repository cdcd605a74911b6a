// SPDX-License-Identifier: MIT OR Apache-2.0
//! `EconoFlow` headless runner.
//!
//! Loads a saved graph document, runs a full evaluation sweep, prints the
//! per-node status, exports any configured sink destinations, and
//! optionally re-saves the document.

use econoflow_graph::nodes::{default_registry, TableSink};
use econoflow_graph::{PersistError, Scene};
use std::path::{Path, PathBuf};

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("econoflow_graph=info".parse().unwrap())
        .add_directive("econoflow_cli=info".parse().unwrap());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((graph_path, save_path)) = parse_args(&args) else {
        eprintln!("Usage: econoflow <graph.json> [--save <path>]");
        std::process::exit(2);
    };

    if let Err(e) = run(&graph_path, save_path.as_deref()) {
        tracing::error!("Run failed: {e}");
        std::process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Option<(PathBuf, Option<PathBuf>)> {
    let mut graph_path = None;
    let mut save_path = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--save" {
            save_path = Some(PathBuf::from(iter.next()?));
        } else if graph_path.is_none() {
            graph_path = Some(PathBuf::from(arg));
        } else {
            return None;
        }
    }
    graph_path.map(|p| (p, save_path))
}

fn run(graph_path: &Path, save_path: Option<&Path>) -> Result<(), PersistError> {
    let registry = default_registry();
    let mut scene = Scene::load_from_file(graph_path, &registry)?;
    tracing::info!(
        "Loaded {} with {} nodes and {} edges",
        graph_path.display(),
        scene.node_count(),
        scene.edge_count()
    );

    let report = scene.evaluate_all();
    for node in scene.nodes() {
        let state = if node.is_invalid() {
            format!("invalid: {}", node.error_message().unwrap_or("unknown"))
        } else if node.is_dirty() {
            "dirty".to_string()
        } else {
            "clean".to_string()
        };
        println!("{:<28} [{}] {}", node.title, node.content.op_code(), state);
    }
    if !report.is_clean() {
        tracing::warn!("{} node(s) failed during the sweep", report.failures.len());
    }

    for node in scene.nodes() {
        if let Some(sink) = node.content.as_any().downcast_ref::<TableSink>() {
            if sink.write()? {
                tracing::info!("Exported sink '{}'", node.title);
            }
        }
    }

    if let Some(path) = save_path {
        scene.save_to_file(path)?;
        tracing::info!("Saved graph to {}", path.display());
    }
    Ok(())
}
