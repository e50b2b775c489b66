// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Set-network command - moves a computer between network segments

use crate::graph::{data_dir, Workspace};
use crate::ident::network_group;
use crate::propagate::{
    propagate_network_change, update_computer, ComputerPatch, NetworkChange, ViewPolicy,
};
use crate::views::ViewMode;
use anyhow::{Context, Result};
use tracing::info;

/// Run the set-network command
pub fn run(computer: &str, networks: &str, label: Option<String>, view: &str) -> Result<()> {
    let view_mode = ViewMode::parse(view).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown view: {}. Valid: landscape, firewalls, dataservices, credentials",
            view
        )
    })?;

    let network_ids = parse_networks(networks)?;

    let dir = data_dir()?;
    let mut workspace = Workspace::load(&dir)
        .with_context(|| format!("Failed to load workspace from {}", dir.display()))?;

    if !workspace.model.computers.contains_key(computer) {
        anyhow::bail!("Computer not found: {}", computer);
    }

    let group = network_group(&network_ids);
    info!("Moving {} to {}", computer, group);

    let patch = ComputerPatch {
        label: label.clone(),
        network_idn: Some(network_ids.clone()),
        ..ComputerPatch::default()
    };
    workspace.model = update_computer(&workspace.model, computer, &patch, None);

    let display_label = label.unwrap_or_else(|| {
        workspace
            .graph
            .node(computer)
            .map_or_else(|| computer.to_string(), |node| node.label.clone())
    });

    let policy = match view_mode {
        ViewMode::Landscape => ViewPolicy::landscape(),
        ViewMode::Firewalls => ViewPolicy::firewalls(),
        ViewMode::Dataservices => ViewPolicy::dataservices(),
        ViewMode::Credentials => ViewPolicy::credentials(),
    };
    let change = NetworkChange {
        group: group.clone(),
        network_ids,
        label: display_label,
    };
    workspace.graph = propagate_network_change(&workspace.graph, computer, &change, policy);

    workspace
        .save(&dir)
        .with_context(|| format!("Failed to save workspace to {}", dir.display()))?;

    println!("Moved {computer} to {group}");
    Ok(())
}

/// Parse a comma-separated list of network segment identifiers
fn parse_networks(networks: &str) -> Result<Vec<i64>> {
    networks
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .with_context(|| format!("Invalid network id: {part}"))
        })
        .collect()
}
