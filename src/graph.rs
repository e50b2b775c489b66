// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Workspace persistence and export for the landscape graph

use crate::build::{build_landscape, BuildOptions};
use crate::types::{GraphData, Model};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// The working state: a raw model and its derived canonical graph
#[derive(Debug, Default)]
pub struct Workspace {
    /// The raw landscape model
    pub model: Model,
    /// The derived canonical landscape graph
    pub graph: GraphData,
}

impl Workspace {
    /// Create an empty workspace
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a workspace from a directory holding model.json and graph.json
    ///
    /// Missing files yield empty defaults, so a fresh data directory is a
    /// valid (not-ready) workspace.
    pub fn load(dir: &Path) -> Result<Self> {
        let model_path = dir.join("model.json");
        let graph_path = dir.join("graph.json");

        let model: Model = if model_path.exists() {
            let content = fs::read_to_string(&model_path)
                .with_context(|| format!("Failed to read {}", model_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", model_path.display()))?
        } else {
            Model::default()
        };

        let graph: GraphData = if graph_path.exists() {
            let content = fs::read_to_string(&graph_path)
                .with_context(|| format!("Failed to read {}", graph_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", graph_path.display()))?
        } else {
            GraphData::default()
        };

        Ok(Self { model, graph })
    }

    /// Save the workspace to a directory
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let model_path = dir.join("model.json");
        let graph_path = dir.join("graph.json");

        let model_json =
            serde_json::to_string_pretty(&self.model).context("Failed to serialize model")?;
        fs::write(&model_path, model_json)
            .with_context(|| format!("Failed to write {}", model_path.display()))?;

        let graph_json =
            serde_json::to_string_pretty(&self.graph).context("Failed to serialize graph")?;
        fs::write(&graph_path, graph_json)
            .with_context(|| format!("Failed to write {}", graph_path.display()))?;

        Ok(())
    }

    /// Rebuild the canonical graph from the current model
    pub fn rebuild(&mut self, options: BuildOptions) {
        self.graph = build_landscape(&self.model, options);
    }

    /// True if no model has been loaded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.model.is_ready()
    }

    /// Export the derived graph as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.graph).context("Failed to serialize graph to JSON")
    }

    /// Export the derived graph to DOT format for Graphviz
    #[must_use]
    pub fn to_dot(&self) -> String {
        graph_to_dot(&self.graph)
    }
}

/// Render a derived graph as a Graphviz digraph, groups as dashed clusters
#[must_use]
pub fn graph_to_dot(graph: &GraphData) -> String {
    let mut dot = String::from("digraph landscape {\n");
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [shape=box, style=rounded];\n\n");

    for node in &graph.nodes {
        let label = format!("{}\\n{}", node.label, node.kind.code());
        dot.push_str(&format!("  \"{}\" [label=\"{}\"];\n", node.id, label));
    }

    dot.push('\n');

    for edge in &graph.edges {
        dot.push_str(&format!(
            "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
            edge.source.id(),
            edge.target.id(),
            edge.label.as_deref().unwrap_or("")
        ));
    }

    let mut groups: Vec<&str> = Vec::new();
    for node in &graph.nodes {
        if let Some(group) = node.group.as_deref() {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
    }

    for group in groups {
        let cluster = group.replace(['.', ':'], "_");
        dot.push_str(&format!("\n  subgraph cluster_{cluster} {{\n"));
        dot.push_str(&format!("    label=\"{group}\";\n"));
        dot.push_str("    style=dashed;\n");
        for node in graph.nodes.iter().filter(|n| n.group.as_deref() == Some(group)) {
            dot.push_str(&format!("    \"{}\";\n", node.id));
        }
        dot.push_str("  }\n");
    }

    dot.push_str("}\n");
    dot
}

/// Resolve the data directory for persistent workspace state
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("LANDGRAPH_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }

    let dir = directories::ProjectDirs::from("org", "hyperpolymath", "landgraph")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".landgraph")
        });

    Ok(dir)
}
