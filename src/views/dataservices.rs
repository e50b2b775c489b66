// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Data-services view: data assets and the software touching them
//!
//! Computers appear only when at least one installed entry is workstation
//! software; assets appear only when they are end-user relevant
//! (`person_indexes` contains 0) and actually linked to software. Assets
//! link to installed software either through person-group membership or,
//! for group-less software, through the FinApp/InternetBanking services.

use crate::filter::{edge_exists, filter_by_types, filter_strict_by_group, restrict_edges};
use crate::ident::{format_server_id, network_group, strip_variant};
use crate::normalize::binary_label;
use crate::types::{Edge, EdgeKind, GraphData, Model, Node, NodeKind, NodeMeta};
use crate::views::NodeBag;
use std::collections::HashSet;

/// Network services that link group-less software to data assets
const DATA_SERVICE_BRIDGES: [&str; 2] = ["FinApp", "InternetBanking"];

/// Derive the data-services projection from the raw model
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn filter_dataservices(
    model: &Model,
    selected_group: &str,
    selected_types: &HashSet<NodeKind>,
) -> GraphData {
    if !model.is_ready() {
        return GraphData::empty();
    }

    let mut bag = NodeBag::new();
    let mut edges: Vec<Edge> = Vec::new();

    for (comp_id, comp) in &model.computers {
        let group = network_group(&comp.network_idn);

        let has_person_zero = comp
            .installed_software
            .values()
            .any(|sw| sw.person_index == Some(0));
        if !has_person_zero {
            continue;
        }

        let mut comp_node =
            Node::new(comp_id.clone(), format_server_id(comp_id), NodeKind::Computer)
                .with_group(group.clone());
        comp_node.meta = NodeMeta {
            origin_computer: Some(comp.clone()),
            network_ids: Some(comp.network_idn.clone()),
            data: Some(comp.data.clone()),
            ..NodeMeta::default()
        };
        bag.add(comp_node);

        for (sw_id, sw) in &comp.installed_software {
            if sw.person_index != Some(0) {
                continue;
            }
            if sw.provides_user_services.is_empty() && sw.provides_network_services.is_empty() {
                continue;
            }

            let mut label = binary_label(sw);
            if sw.provides_user_services.iter().any(|s| s == "Office") {
                label = "Office".to_string();
            }
            if sw.provides_user_services.iter().any(|s| s == "EmailClient") {
                label = "Outlook".to_string();
            }
            if sw.provides_user_services.iter().any(|s| s == "Browser") {
                label = "Firefox".to_string();
            }

            let mut sw_node =
                Node::new(sw_id.clone(), label, NodeKind::Software).with_group(group.clone());
            sw_node.meta = NodeMeta {
                origin_software: Some(sw.clone()),
                computer_idn: Some(comp_id.clone()),
                ..NodeMeta::default()
            };
            bag.add(sw_node);

            edges.push(Edge::new(
                format!("edge-{comp_id}-{sw_id}"),
                comp_id.clone(),
                sw_id.clone(),
                EdgeKind::ComputerSoftware,
            ));
        }
    }

    for (ds_id, asset) in &model.data {
        if !asset.person_indexes.contains(&0) || asset.linked_software.is_empty() {
            continue;
        }

        if !bag.contains(ds_id) {
            let mut ds_node = Node::new(
                ds_id.clone(),
                asset
                    .data_definition_idn
                    .clone()
                    .unwrap_or_else(|| ds_id.clone()),
                NodeKind::Dataservice,
            );
            ds_node.meta.origin_data = Some(asset.clone());
            bag.add(ds_node);
        }

        // Link to every matching installed copy, on every computer.
        for sw_id in &asset.linked_software {
            let target_cpe = strip_variant(sw_id);

            for comp in model.computers.values() {
                for (installed_id, sw) in &comp.installed_software {
                    if sw.cpe_idn.as_deref() != Some(target_cpe) {
                        continue;
                    }
                    if sw.person_index != Some(0) {
                        continue;
                    }

                    match &sw.person_group_id {
                        None => {
                            let bridges = sw
                                .provides_network_services
                                .iter()
                                .any(|srv| DATA_SERVICE_BRIDGES.contains(&srv.as_str()));
                            if !bridges {
                                continue;
                            }
                        }
                        Some(group_id) => {
                            if !asset.person_groups.contains(group_id) {
                                continue;
                            }
                        }
                    }

                    if !bag.contains(installed_id) {
                        continue;
                    }
                    if !edge_exists(&edges, ds_id, installed_id) {
                        edges.push(Edge::new(
                            format!("edge-{ds_id}-{installed_id}"),
                            ds_id.clone(),
                            installed_id.clone(),
                            EdgeKind::DataserviceSoftware,
                        ));
                    }
                }
            }
        }

        if let Some(principal) = &asset.principal_software {
            let target_cpe = strip_variant(principal);
            let principal_node = bag.nodes().iter().find(|node| {
                node.kind == NodeKind::Software
                    && node
                        .meta
                        .origin_software
                        .as_ref()
                        .and_then(|sw| sw.cpe_idn.as_deref())
                        == Some(target_cpe)
            });
            if let Some(principal_node) = principal_node {
                let principal_id = principal_node.id.clone();
                if !edge_exists(&edges, ds_id, &principal_id) {
                    edges.push(Edge::new(
                        format!("edge-{ds_id}-{principal_id}"),
                        ds_id.clone(),
                        principal_id,
                        EdgeKind::DataservicePrincipal,
                    ));
                }
            }
        }

        for user_id in &asset.person_groups {
            if !bag.contains(user_id) {
                bag.add(Node::new(user_id.clone(), user_id.clone(), NodeKind::User));
            }
            if !edge_exists(&edges, user_id, ds_id) {
                edges.push(Edge::new(
                    format!("edge-{user_id}-{ds_id}"),
                    user_id.clone(),
                    ds_id.clone(),
                    EdgeKind::UserDataservice,
                ));
            }
        }
    }

    let nodes = bag.into_nodes();

    if selected_group.is_empty() {
        let mut edges = edges;

        // user <-> software shortcuts for asset-relevant workstation software
        if selected_types.contains(&NodeKind::User)
            && selected_types.contains(&NodeKind::Software)
        {
            let asset_software: HashSet<&str> = model
                .data
                .values()
                .flat_map(|asset| asset.linked_software.iter())
                .map(|sw_id| strip_variant(sw_id))
                .collect();

            let mut virtual_edges: Vec<Edge> = Vec::new();
            for user in nodes.iter().filter(|n| n.kind == NodeKind::User) {
                let workstation_prefix = format!("{}:0:1>", user.id);
                for sw in nodes.iter().filter(|n| n.kind == NodeKind::Software) {
                    let sw_cpe = sw
                        .meta
                        .origin_software
                        .as_ref()
                        .and_then(|s| s.cpe_idn.as_deref());
                    let relevant =
                        sw_cpe.is_some_and(|cpe| asset_software.contains(cpe));
                    if sw.id.starts_with(&workstation_prefix) && relevant {
                        if !edge_exists(&edges, &user.id, &sw.id)
                            && !edge_exists(&virtual_edges, &user.id, &sw.id)
                        {
                            virtual_edges.push(Edge::new(
                                format!("edge-{}-{}", user.id, sw.id),
                                user.id.clone(),
                                sw.id.clone(),
                                EdgeKind::UserSoftwareVirtual,
                            ));
                        }
                    }
                }
            }
            edges.extend(virtual_edges);
        }

        let nodes = filter_by_types(nodes, selected_types);
        let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let edges = restrict_edges(&edges, &node_ids);
        GraphData { nodes, edges }
    } else {
        filter_strict_by_group(&GraphData { nodes, edges }, selected_group, selected_types)
    }
}
