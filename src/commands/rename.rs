// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Rename command - renames a computer across the model and derived graph

use crate::graph::{data_dir, Workspace};
use crate::propagate::rename_computer;
use anyhow::{Context, Result};
use tracing::info;

/// Run the rename command
pub fn run(old_id: &str, new_id: &str) -> Result<()> {
    let dir = data_dir()?;
    let mut workspace = Workspace::load(&dir)
        .with_context(|| format!("Failed to load workspace from {}", dir.display()))?;

    if !workspace.model.computers.contains_key(old_id) {
        anyhow::bail!("Computer not found: {}", old_id);
    }
    if old_id != new_id && workspace.model.computers.contains_key(new_id) {
        anyhow::bail!("Computer already exists: {}", new_id);
    }

    // Reference counts from the pre-rename model, for the report below.
    let credentials_touched = workspace
        .model
        .credentials
        .values()
        .filter(|cred| {
            cred.stored_at.iter().any(|s| s == old_id)
                || cred
                    .linked_software
                    .iter()
                    .any(|s| s.starts_with(&format!("{old_id}>")))
        })
        .count();
    let rules_touched = workspace
        .model
        .firewall_rules
        .values()
        .filter(|rule| {
            rule.from_objects
                .iter()
                .chain(rule.to_objects.iter())
                .any(|endpoint| endpoint == old_id || endpoint.starts_with(&format!("{old_id}>")))
        })
        .count();

    info!("Renaming {} -> {}", old_id, new_id);
    let (model, graph) = rename_computer(&workspace.model, &workspace.graph, old_id, new_id);
    workspace.model = model;
    workspace.graph = graph;

    workspace
        .save(&dir)
        .with_context(|| format!("Failed to save workspace to {}", dir.display()))?;

    println!("Renamed {old_id} -> {new_id}");
    if credentials_touched > 0 {
        println!("  {credentials_touched} credential(s) updated");
    }
    if rules_touched > 0 {
        println!("  {rules_touched} firewall rule(s) updated");
    }

    Ok(())
}
