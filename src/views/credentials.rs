// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Credentials view: keys, locks and what they open
//!
//! Inclusion is an exhaustive case split over the credential's identifier
//! prefix, its root flag and its linked employees. Root credentials render
//! as locks, everything else as keys. When no credential survives the
//! filters at all, the view falls back to synthesizing user/computer to
//! software edges so the projection stays informative.

use crate::filter::{edge_exists, filter_credentials_custom};
use crate::ident::{format_server_id, network_group, CompositeId};
use crate::normalize::binary_label;
use crate::types::{
    Credential, Edge, EdgeKind, GraphData, Model, Node, NodeKind, NodeMeta,
};
use crate::views::NodeBag;
use std::collections::HashSet;

/// How a credential appears in the view, if at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CredentialClass {
    /// Shown as a lock (root access)
    Lock,
    /// Shown as a key
    Key,
    /// Not shown
    Hidden,
}

/// The inclusion case split
///
/// | admin prefix | root | svc. prefix | employee 0 | result |
/// |--------------|------|-------------|------------|--------|
/// | yes          | yes  | -           | -          | lock   |
/// | yes          | no   | -           | -          | hidden |
/// | no           | yes  | -           | yes        | lock   |
/// | no           | yes  | -           | no         | hidden |
/// | -            | no   | yes         | -          | key    |
/// | no           | no   | no          | yes        | key    |
/// | no           | no   | no          | no         | hidden |
fn classify(cred_id: &str, cred: &Credential) -> CredentialClass {
    let is_admin = cred_id.starts_with("admin");
    let is_svc = cred_id.starts_with("svc.");

    if is_admin && cred.has_root {
        return CredentialClass::Lock;
    }
    if is_admin && !cred.has_root {
        return CredentialClass::Hidden;
    }
    if !is_admin && cred.has_root {
        if cred.has_employee_zero() {
            return CredentialClass::Lock;
        }
        return CredentialClass::Hidden;
    }
    if is_svc && !cred.has_root {
        return CredentialClass::Key;
    }
    if cred.has_employee_zero() {
        return CredentialClass::Key;
    }
    CredentialClass::Hidden
}

/// Derive the credentials projection from the raw model
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn filter_credentials(
    model: &Model,
    selected_group: &str,
    selected_types: &HashSet<NodeKind>,
) -> GraphData {
    let mut bag = NodeBag::new();
    let mut edges: Vec<Edge> = Vec::new();

    for (cred_id, cred) in &model.credentials {
        let class = classify(cred_id, cred);
        if class == CredentialClass::Hidden {
            continue;
        }
        let kind = match class {
            CredentialClass::Lock => NodeKind::Lock,
            _ => NodeKind::Key,
        };
        let is_admin = cred_id.starts_with("admin");

        // The credential clusters with the computer it is physically
        // stored on.
        let cred_group = cred
            .stored_at
            .first()
            .and_then(|comp_id| model.computers.get(comp_id))
            .map_or_else(
                || network_group(&[]),
                |comp| network_group(&comp.network_idn),
            );

        let mut cred_node = Node::new(cred_id.clone(), "", kind).with_group(cred_group);
        cred_node.meta = NodeMeta {
            origin_credential: Some(cred.clone()),
            credential_group: Some("credentials".to_string()),
            ..NodeMeta::default()
        };
        bag.add(cred_node);

        for (role, _index) in &cred.linked_employees {
            if role.is_empty() {
                continue;
            }
            if !bag.contains(role) {
                bag.add(Node::new(role.clone(), role.clone(), NodeKind::User));
            }

            if kind == NodeKind::Key && !edge_exists(&edges, cred_id, role) {
                edges.push(Edge::new(
                    format!("edge-{cred_id}-{role}"),
                    cred_id.clone(),
                    role.clone(),
                    EdgeKind::UserKey,
                ));
            }
            if kind == NodeKind::Lock && is_admin && !edge_exists(&edges, role, cred_id) {
                edges.push(Edge::new(
                    format!("edge-{role}-{cred_id}"),
                    role.clone(),
                    cred_id.clone(),
                    EdgeKind::UserLock,
                ));
            }
        }

        for comp_id in &cred.stored_at {
            let Some(comp) = model.computers.get(comp_id) else {
                continue;
            };
            let comp_group = network_group(&comp.network_idn);

            if !bag.contains(comp_id) {
                let label = comp
                    .label
                    .clone()
                    .unwrap_or_else(|| format_server_id(comp_id));
                let mut comp_node =
                    Node::new(comp_id.clone(), label, NodeKind::Computer).with_group(comp_group);
                comp_node.meta = NodeMeta {
                    origin_computer: Some(comp.clone()),
                    network_ids: Some(comp.network_idn.clone()),
                    ..NodeMeta::default()
                };
                bag.add(comp_node);
            }

            if !edge_exists(&edges, cred_id, comp_id) {
                edges.push(Edge::new(
                    format!("edge-{cred_id}-{comp_id}"),
                    cred_id.clone(),
                    comp_id.clone(),
                    EdgeKind::CredentialComputer,
                ));
            }
        }

        for sw_id in &cred.linked_software {
            let comp_id = sw_id.split('>').next().unwrap_or_default();
            let Some(comp) = model.computers.get(comp_id) else {
                continue;
            };
            let Some(installed) = comp.installed_software.get(sw_id) else {
                continue;
            };
            if installed.person_index != Some(0) {
                continue;
            }

            let label = {
                let label = binary_label(installed);
                if label.is_empty() {
                    sw_id.clone()
                } else {
                    label
                }
            };

            // The software clusters where the credential is stored, not
            // where it runs.
            let sw_group = cred
                .stored_at
                .first()
                .and_then(|stored| model.computers.get(stored))
                .map_or_else(
                    || network_group(&[]),
                    |stored| network_group(&stored.network_idn),
                );

            if !bag.contains(sw_id) {
                bag.add(
                    Node::new(sw_id.clone(), label, NodeKind::Software).with_group(sw_group),
                );
            }

            if !edge_exists(&edges, cred_id, sw_id) {
                edges.push(Edge::new(
                    format!("edge-{cred_id}-{sw_id}"),
                    cred_id.clone(),
                    sw_id.clone(),
                    EdgeKind::CredentialSoftware,
                ));
            }
        }
    }

    let mut nodes = bag.into_nodes();

    if !selected_types.is_empty() {
        nodes.retain(|n| selected_types.contains(&n.kind));
        let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        edges.retain(|e| node_ids.contains(e.source.id()) && node_ids.contains(e.target.id()));
    }

    let has_credential_nodes = nodes
        .iter()
        .any(|n| matches!(n.kind, NodeKind::Key | NodeKind::Lock));

    if !has_credential_nodes {
        // No credential applies; fall back to structural user/computer to
        // software edges so the view still says something.
        for comp in model.computers.values() {
            for (sw_id, sw) in &comp.installed_software {
                let Some(person_group) = &sw.person_group_id else {
                    continue;
                };
                if sw.person_index != Some(0) {
                    continue;
                }

                let user_node = nodes.iter().find(|n| {
                    n.kind == NodeKind::User
                        && (n.id == *person_group || n.id == format!("user-{person_group}"))
                });
                let sw_node = nodes.iter().find(|n| {
                    n.kind == NodeKind::Software
                        && (n.full_name.as_deref() == Some(sw_id) || n.id.contains(sw_id))
                });

                if let (Some(user_node), Some(sw_node)) = (user_node, sw_node) {
                    if !edge_exists(&edges, &user_node.id, &sw_node.id) {
                        edges.push(Edge::new(
                            format!("edge-{}-{}", user_node.id, sw_node.id),
                            user_node.id.clone(),
                            sw_node.id.clone(),
                            EdgeKind::UserSoftwareVirtual,
                        ));
                    }
                }
            }
        }

        let mut computer_links: Vec<(String, String)> = Vec::new();
        for sw_node in nodes.iter().filter(|n| n.kind == NodeKind::Software) {
            let owner = CompositeId::parse(&sw_node.id).computer;
            let comp_node = nodes
                .iter()
                .find(|n| n.kind == NodeKind::Computer && n.id == owner);
            if let Some(comp_node) = comp_node {
                if !edge_exists(&edges, &comp_node.id, &sw_node.id) {
                    computer_links.push((comp_node.id.clone(), sw_node.id.clone()));
                }
            }
        }
        for (comp_id, sw_id) in computer_links {
            edges.push(Edge::new(
                format!("edge-{comp_id}-{sw_id}"),
                comp_id,
                sw_id,
                EdgeKind::ComputerSoftwareVirtual,
            ));
        }
    }

    filter_credentials_custom(&GraphData { nodes, edges }, selected_group)
}
