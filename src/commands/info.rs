// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Info commands - list available groups and node types

use crate::filter::{available_groups, available_types};
use crate::graph::{data_dir, Workspace};
use anyhow::{Context, Result};

/// List the groups present in the stored landscape graph
pub fn groups() -> Result<()> {
    let workspace = load_workspace()?;
    let groups = available_groups(&workspace.graph);

    if groups.is_empty() {
        println!("No groups. Run 'landgraph load <model.json>' first.");
        return Ok(());
    }

    println!("Groups ({}):", groups.len());
    for group in groups {
        let members = workspace
            .graph
            .nodes
            .iter()
            .filter(|n| n.group.as_deref() == Some(group.as_str()))
            .count();
        println!("  {group} ({members} nodes)");
    }
    Ok(())
}

/// List the node kinds present in the stored landscape graph
pub fn types() -> Result<()> {
    let workspace = load_workspace()?;
    let kinds = available_types(&workspace.graph.nodes);

    if kinds.is_empty() {
        println!("No nodes. Run 'landgraph load <model.json>' first.");
        return Ok(());
    }

    println!("Node types ({}):", kinds.len());
    for kind in kinds {
        let count = workspace
            .graph
            .nodes
            .iter()
            .filter(|n| n.kind == kind)
            .count();
        println!("  {} ({count})", kind.code());
    }
    Ok(())
}

fn load_workspace() -> Result<Workspace> {
    let dir = data_dir()?;
    Workspace::load(&dir)
        .with_context(|| format!("Failed to load workspace from {}", dir.display()))
}
