// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Landscape view: group/type refinement plus virtual-edge synthesis
//!
//! After the generic group-closure and type filter, pairs of co-selected
//! kinds that lost their connecting node get a synthesized edge wherever a
//! structural relationship (shared identifier prefix, same owning computer)
//! implies one. Virtual edges are only added when no equivalent real edge
//! exists, and the synthesis is idempotent.

use crate::filter::filter_graph_common;
use crate::types::{Edge, EdgeKind, GraphData, NodeKind};
use std::collections::{HashMap, HashSet};

/// Refine the canonical landscape graph by group and node kinds
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn filter_landscape(
    data: &GraphData,
    selected_group: &str,
    selected_types: &HashSet<NodeKind>,
) -> GraphData {
    let GraphData { nodes, mut edges } = filter_graph_common(data, selected_group, selected_types);

    let mut extra: Vec<Edge> = Vec::new();
    let mut added: HashSet<String> = HashSet::new();

    let has = |kind: NodeKind| selected_types.contains(&kind);
    let real_edge = |source: &str, target: &str| {
        data.edges
            .iter()
            .any(|e| e.source.id() == source && e.target.id() == target)
    };

    // software -> service / user-service by identifier containment
    if has(NodeKind::Software) {
        for soft in nodes.iter().filter(|n| n.kind == NodeKind::Software) {
            for sub in nodes.iter().filter(|n| {
                matches!(n.kind, NodeKind::Service | NodeKind::UserService)
                    && n.id.contains(&soft.id)
            }) {
                let id = format!("virtual-{}-{}", soft.id, sub.id);
                if !real_edge(&soft.id, &sub.id) && added.insert(id.clone()) {
                    extra.push(Edge::new(
                        id,
                        soft.id.clone(),
                        sub.id.clone(),
                        EdgeKind::SoftwareSubVirtual,
                    ));
                }
            }
        }
    }

    // user -> user-service when neither software nor computer is selected
    if has(NodeKind::User)
        && has(NodeKind::UserService)
        && !has(NodeKind::Software)
        && !has(NodeKind::Computer)
    {
        for user in nodes.iter().filter(|n| n.kind == NodeKind::User) {
            let user_short = user.id.strip_prefix("user-").unwrap_or(&user.id);
            for us in nodes.iter().filter(|n| n.kind == NodeKind::UserService) {
                let prefix = us.id.split('>').next().unwrap_or_default();
                if !prefix.contains(user_short) {
                    continue;
                }
                let id = format!("virtual-{}-{}", user.id, us.id);
                if !real_edge(&user.id, &us.id) && added.insert(id.clone()) {
                    extra.push(Edge::new(
                        id,
                        user.id.clone(),
                        us.id.clone(),
                        EdgeKind::UserUserServiceVirtual,
                    ));
                }
            }
        }
    }

    // computer -> user-service when software is not selected
    if has(NodeKind::Computer) && has(NodeKind::UserService) && !has(NodeKind::Software) {
        for comp in nodes.iter().filter(|n| n.kind == NodeKind::Computer) {
            for us in nodes.iter().filter(|n| n.kind == NodeKind::UserService) {
                let prefix = us.id.split('>').next().unwrap_or_default();
                let us_computer = prefix.rsplit('-').next().unwrap_or_default();
                if us_computer != comp.id {
                    continue;
                }
                let id = format!("virtual-{}-{}", comp.id, us.id);
                if !real_edge(&comp.id, &us.id) && added.insert(id.clone()) {
                    extra.push(Edge::new(
                        id,
                        comp.id.clone(),
                        us.id.clone(),
                        EdgeKind::ComputerUserServiceVirtual,
                    ));
                }
            }
        }
    }

    // service -> software, falling back to the owning computer
    if has(NodeKind::Service) {
        let has_software = has(NodeKind::Software);
        let has_computer = has(NodeKind::Computer);
        for svc in nodes.iter().filter(|n| n.kind == NodeKind::Service) {
            let mut linked = false;
            if has_software {
                for soft in nodes.iter().filter(|n| n.kind == NodeKind::Software) {
                    if !svc.id.contains(&soft.id) {
                        continue;
                    }
                    let id = format!("virtual-{}-{}", soft.id, svc.id);
                    if !real_edge(&soft.id, &svc.id) && added.insert(id.clone()) {
                        extra.push(Edge::new(
                            id,
                            soft.id.clone(),
                            svc.id.clone(),
                            EdgeKind::SoftwareSubVirtual,
                        ));
                    }
                    linked = true;
                    break;
                }
            }
            if !linked && has_computer {
                let service_computer = svc
                    .id
                    .split('-')
                    .nth(1)
                    .and_then(|part| part.split('>').next())
                    .unwrap_or_default();
                for comp in nodes.iter().filter(|n| n.kind == NodeKind::Computer) {
                    if service_computer != comp.id {
                        continue;
                    }
                    let id = format!("virtual-{}-{}", comp.id, svc.id);
                    if !real_edge(&comp.id, &svc.id) && added.insert(id.clone()) {
                        extra.push(Edge::new(
                            id,
                            comp.id.clone(),
                            svc.id.clone(),
                            EdgeKind::ComputerServiceVirtual,
                        ));
                    }
                    break;
                }
            }
        }
    }

    // user <-> software sharing a computer, only when the computer itself is
    // filtered out (otherwise the real edges already connect them)
    if has(NodeKind::Software) && has(NodeKind::User) && !has(NodeKind::Computer) {
        #[derive(Default)]
        struct PerComputer {
            user: Option<String>,
            software: Vec<String>,
        }

        let mut computers: HashMap<String, PerComputer> = HashMap::new();
        for edge in &data.edges {
            match edge.kind {
                EdgeKind::UserComputer => {
                    computers
                        .entry(edge.target.id().to_string())
                        .or_default()
                        .user = Some(edge.source.id().to_string());
                }
                EdgeKind::ComputerSoftware => {
                    computers
                        .entry(edge.source.id().to_string())
                        .or_default()
                        .software
                        .push(edge.target.id().to_string());
                }
                _ => {}
            }
        }

        for per_computer in computers.values() {
            let Some(user_id) = &per_computer.user else {
                continue;
            };
            if !nodes
                .iter()
                .any(|n| &n.id == user_id && n.kind == NodeKind::User)
            {
                continue;
            }
            for soft_id in &per_computer.software {
                if !nodes
                    .iter()
                    .any(|n| &n.id == soft_id && n.kind == NodeKind::Software)
                {
                    continue;
                }
                let id = format!("virtual-{user_id}-{soft_id}");
                if !real_edge(user_id, soft_id) && added.insert(id.clone()) {
                    extra.push(Edge::new(
                        id,
                        user_id.clone(),
                        soft_id.clone(),
                        EdgeKind::UserSoftwareVirtual,
                    ));
                }
            }
        }
    }

    edges.extend(extra);
    GraphData { nodes, edges }
}
