// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! View command - derives one of the four graph projections

use crate::graph::{data_dir, graph_to_dot, Workspace};
use crate::types::NodeKind;
use crate::views::{self, ViewMode};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Run the view command
pub fn run(
    mode: &str,
    group: Option<String>,
    types: Option<String>,
    format: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let mode = ViewMode::parse(mode).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown view: {}. Valid: landscape, firewalls, dataservices, credentials",
            mode
        )
    })?;

    let selected_types = parse_types(types.as_deref())?;
    let selected_group = group.unwrap_or_default();

    let dir = data_dir()?;
    let workspace = Workspace::load(&dir)
        .with_context(|| format!("Failed to load workspace from {}", dir.display()))?;

    if workspace.is_empty() {
        eprintln!("Warning: Workspace is empty. Run 'landgraph load <model.json>' first.");
    }

    info!("Deriving {} view", mode.code());
    let graph = views::derive(
        mode,
        &workspace.model,
        &workspace.graph,
        &selected_group,
        &selected_types,
    );

    let content = match format {
        "json" => serde_json::to_string_pretty(&graph).context("Failed to serialize view")?,
        "dot" => graph_to_dot(&graph),
        other => anyhow::bail!("Unknown format: {}. Supported: json, dot", other),
    };

    match output {
        Some(path) => {
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            println!(
                "Wrote {} view ({} nodes, {} edges) to {}",
                mode.code(),
                graph.nodes.len(),
                graph.edges.len(),
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}

/// Parse a comma-separated node kind selection
fn parse_types(types: Option<&str>) -> Result<HashSet<NodeKind>> {
    let mut selected = HashSet::new();
    let Some(types) = types else {
        return Ok(selected);
    };
    for code in types.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let kind = NodeKind::parse(code).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown node type: {}. Valid: computer, software, user, service, user-service, dataservice, key, lock, internet",
                code
            )
        })?;
        selected.insert(kind);
    }
    Ok(selected)
}
