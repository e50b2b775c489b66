// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Load command - reads a model file and builds the canonical graph

use crate::build::BuildOptions;
use crate::filter::available_groups;
use crate::graph::{data_dir, Workspace};
use crate::loader::{read_model, validate};
use crate::normalize::count_relevant;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing::info;

/// Run the load command
pub fn run(path: PathBuf, show_operating_systems: bool) -> Result<()> {
    info!("Loading model: {:?}", path);

    let model = read_model(&path)
        .with_context(|| format!("Failed to load model from {}", path.display()))?;

    let violations = validate(&model);

    let mut workspace = Workspace::new();
    workspace.model = model;
    workspace.rebuild(BuildOptions {
        show_operating_systems,
    });

    if workspace.graph.is_empty() {
        println!(
            "Model in {} is not ready (no computers); stored an empty workspace.",
            path.display()
        );
    } else {
        let relevant: usize = workspace
            .model
            .computers
            .values()
            .map(|comp| count_relevant(comp.installed_software.values()))
            .sum();

        println!("{} {}:", "Loaded".green().bold(), path.display());
        println!(
            "  {} computers, {} relevant software entries",
            workspace.model.computers.len(),
            relevant
        );
        println!(
            "  {} nodes, {} edges in the landscape graph",
            workspace.graph.nodes.len(),
            workspace.graph.edges.len()
        );

        let groups = available_groups(&workspace.graph);
        if !groups.is_empty() {
            println!("  groups: {}", groups.join(", "));
        }
    }

    if !violations.is_empty() {
        eprintln!(
            "{} {} structural violation(s); run 'landgraph validate' for details",
            "warning:".yellow().bold(),
            violations.len()
        );
    }

    let dir = data_dir()?;
    workspace
        .save(&dir)
        .with_context(|| format!("Failed to save workspace to {}", dir.display()))?;

    println!("Workspace saved to {}", dir.display());
    Ok(())
}
