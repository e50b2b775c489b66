// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Edit propagation: renames and attribute changes, applied consistently
//!
//! Renaming a computer touches every structurally-encoded reference to it:
//! software keys and fields, credentials, firewall rules, data assets, and
//! the derived graph's node/edge identifiers and metadata. All functions
//! here are pure; callers replace their current model/graph value with the
//! returned one, so a half-applied rename can never be observed.

use crate::ident::{replace_structural, short_user_id};
use crate::types::{
    Computer, EdgeEndpoint, GraphData, Model, NodeKind, Software,
};
use std::collections::BTreeMap;

/// Partial update for a computer record
#[derive(Debug, Clone, Default)]
pub struct ComputerPatch {
    /// New display label
    pub label: Option<String>,
    /// New name
    pub name: Option<String>,
    /// New network segment assignment
    pub network_idn: Option<Vec<i64>>,
    /// New hosted data asset list
    pub data: Option<Vec<String>>,
    /// New stored credential list
    pub stored_credentials: Option<Vec<String>>,
}

/// Apply a partial update to one computer, optionally dropping a stale key
///
/// When the update accompanies a rekey, `old_id` names the entry to remove.
#[must_use]
pub fn update_computer(
    model: &Model,
    id: &str,
    patch: &ComputerPatch,
    old_id: Option<&str>,
) -> Model {
    let mut out = model.clone();

    if let Some(old) = old_id {
        if old != id {
            out.computers.remove(old);
        }
    }

    let comp = out.computers.entry(id.to_string()).or_default();
    if let Some(label) = &patch.label {
        comp.label = Some(label.clone());
    }
    if let Some(name) = &patch.name {
        comp.name = Some(name.clone());
    }
    if let Some(network_idn) = &patch.network_idn {
        comp.network_idn.clone_from(network_idn);
    }
    if let Some(data) = &patch.data {
        comp.data.clone_from(data);
    }
    if let Some(stored) = &patch.stored_credentials {
        comp.stored_credentials.clone_from(stored);
    }

    out
}

/// Rekey a computer entry without touching any references
///
/// The bare map move; use [`rename_computer_in_model`] for a full rename.
#[must_use]
pub fn rename_computer_key(model: &Model, old_id: &str, new_id: &str) -> Model {
    let mut out = model.clone();
    if let Some(comp) = out.computers.remove(old_id) {
        out.computers.insert(new_id.to_string(), comp);
    }
    out
}

/// Rewrite every structural reference inside a software record
fn rename_software_record(sw: &Software, old_id: &str, new_id: &str) -> Software {
    let rewrite = |s: &String| replace_structural(s, old_id, new_id);
    let rewrite_all = |list: &[String]| list.iter().map(|s| rewrite(s)).collect();

    Software {
        idn: sw.idn.as_ref().map(rewrite),
        computer_idn: sw.computer_idn.as_ref().map(rewrite),
        provides_user_services: rewrite_all(&sw.provides_user_services),
        provides_network_services: rewrite_all(&sw.provides_network_services),
        accepts_credentials: rewrite_all(&sw.accepts_credentials),
        installed_combination: rewrite_all(&sw.installed_combination),
        local_dependencies: rewrite_all(&sw.local_dependencies),
        ..sw.clone()
    }
}

/// Rewrite every structural reference inside a computer record
///
/// Installed-software keys are rewritten on every computer, not just the
/// renamed one: other machines may hold entries referencing the renamed
/// computer by prefix.
fn rename_computer_record(comp: &Computer, old_id: &str, new_id: &str) -> Computer {
    let installed_software: BTreeMap<String, Software> = comp
        .installed_software
        .iter()
        .map(|(sw_id, sw)| {
            (
                replace_structural(sw_id, old_id, new_id),
                rename_software_record(sw, old_id, new_id),
            )
        })
        .collect();

    Computer {
        idn: comp
            .idn
            .as_ref()
            .map(|s| replace_structural(s, old_id, new_id)),
        installed_software,
        stored_credentials: comp
            .stored_credentials
            .iter()
            .map(|s| replace_structural(s, old_id, new_id))
            .collect(),
        ..comp.clone()
    }
}

/// Rename a computer across the whole raw model
///
/// Rekeys the computer itself and rewrites software keys and fields,
/// credentials (identifier, `stored_at`, `linked_software`), firewall rules
/// (identifier and both endpoint lists) and data asset references. Renaming
/// an identifier to itself is a structural no-op.
#[must_use]
pub fn rename_computer_in_model(model: &Model, old_id: &str, new_id: &str) -> Model {
    let rewrite = |s: &str| replace_structural(s, old_id, new_id);

    let computers: BTreeMap<String, Computer> = model
        .computers
        .iter()
        .map(|(comp_id, comp)| (rewrite(comp_id), rename_computer_record(comp, old_id, new_id)))
        .collect();

    let credentials = model
        .credentials
        .iter()
        .map(|(cred_id, cred)| {
            let mut cred = cred.clone();
            cred.idn = cred.idn.as_deref().map(rewrite);
            cred.stored_at = cred.stored_at.iter().map(|s| rewrite(s)).collect();
            cred.linked_software = cred.linked_software.iter().map(|s| rewrite(s)).collect();
            (rewrite(cred_id), cred)
        })
        .collect();

    let firewall_rules = model
        .firewall_rules
        .iter()
        .map(|(rule_id, rule)| {
            let mut rule = rule.clone();
            rule.idn = rule.idn.as_deref().map(rewrite);
            rule.from_objects = rule.from_objects.iter().map(|s| rewrite(s)).collect();
            rule.to_objects = rule.to_objects.iter().map(|s| rewrite(s)).collect();
            (rewrite(rule_id), rule)
        })
        .collect();

    let data = model
        .data
        .iter()
        .map(|(ds_id, asset)| {
            let mut asset = asset.clone();
            asset.linked_software = asset.linked_software.iter().map(|s| rewrite(s)).collect();
            asset.principal_software = asset.principal_software.as_deref().map(rewrite);
            (ds_id.clone(), asset)
        })
        .collect();

    Model {
        computers,
        credentials,
        firewall_rules,
        data,
        ..model.clone()
    }
}

/// Rename a computer across a derived graph
///
/// Rewrites the computer node, its `user-<short>` role node, prefixed
/// software nodes, containing service/user-service nodes, metadata
/// back-references and every edge identifier/endpoint.
#[must_use]
pub fn rename_computer_in_graph(graph: &GraphData, old_id: &str, new_id: &str) -> GraphData {
    let old_user = format!("user-{}", short_user_id(old_id));
    let new_user = format!("user-{}", short_user_id(new_id));

    let rewrite = |s: &str| {
        let s = replace_structural(s, old_id, new_id);
        replace_structural(&s, &old_user, &new_user)
    };

    let nodes = graph
        .nodes
        .iter()
        .map(|node| {
            let mut node = node.clone();

            if node.id == old_id {
                node.id = new_id.to_string();
            } else if node.id == old_user {
                node.id = new_user.clone();
            } else if node.kind == NodeKind::Software
                && (node.id.starts_with(&format!("{old_id}>"))
                    || node.id.starts_with(&format!("{old_id}#")))
            {
                node.id = replace_structural(&node.id, old_id, new_id);
            } else if matches!(node.kind, NodeKind::Service | NodeKind::UserService)
                && node.id.contains(old_id)
            {
                node.id = replace_structural(&node.id, old_id, new_id);
            }

            node.full_name = node.full_name.as_deref().map(&rewrite);
            node.meta.computer_idn = node
                .meta
                .computer_idn
                .as_deref()
                .map(|s| replace_structural(s, old_id, new_id));
            node.meta.origin_computer = node
                .meta
                .origin_computer
                .as_ref()
                .map(|comp| rename_computer_record(comp, old_id, new_id));
            node.meta.origin_software = node
                .meta
                .origin_software
                .as_ref()
                .map(|sw| rename_software_record(sw, old_id, new_id));
            node.meta.origin_credential = node.meta.origin_credential.as_ref().map(|cred| {
                let mut cred = cred.clone();
                cred.idn = cred
                    .idn
                    .as_deref()
                    .map(|s| replace_structural(s, old_id, new_id));
                cred.stored_at = cred
                    .stored_at
                    .iter()
                    .map(|s| replace_structural(s, old_id, new_id))
                    .collect();
                cred.linked_software = cred
                    .linked_software
                    .iter()
                    .map(|s| replace_structural(s, old_id, new_id))
                    .collect();
                cred
            });

            node
        })
        .collect();

    let edges = graph
        .edges
        .iter()
        .map(|edge| {
            let mut edge = edge.clone();
            edge.id = rewrite(&edge.id);
            edge.source = rewrite_endpoint(&edge.source, &rewrite);
            edge.target = rewrite_endpoint(&edge.target, &rewrite);
            edge
        })
        .collect();

    GraphData { nodes, edges }
}

fn rewrite_endpoint(
    endpoint: &EdgeEndpoint,
    rewrite: &impl Fn(&str) -> String,
) -> EdgeEndpoint {
    match endpoint {
        EdgeEndpoint::Id(id) => EdgeEndpoint::Id(rewrite(id)),
        EdgeEndpoint::Resolved(node) => {
            let mut node = node.clone();
            node.id = rewrite(&node.id);
            EdgeEndpoint::Resolved(node)
        }
    }
}

/// Rename a computer in the model and the derived graph together
#[must_use]
pub fn rename_computer(
    model: &Model,
    graph: &GraphData,
    old_id: &str,
    new_id: &str,
) -> (Model, GraphData) {
    (
        rename_computer_in_model(model, old_id, new_id),
        rename_computer_in_graph(graph, old_id, new_id),
    )
}

/// The attribute change applied by [`propagate_network_change`]
#[derive(Debug, Clone)]
pub struct NetworkChange {
    /// New group key
    pub group: String,
    /// New network segment assignment
    pub network_ids: Vec<i64>,
    /// New display label for the edited computer
    pub label: String,
}

/// Per-view propagation policy
///
/// The four views propagate identically except that the credentials view
/// never rewrites the edited computer's label.
#[derive(Debug, Clone, Copy)]
pub struct ViewPolicy {
    /// Whether the edited computer takes the new label
    pub cascade_label: bool,
}

impl ViewPolicy {
    /// Landscape view policy
    #[must_use]
    pub fn landscape() -> Self {
        Self { cascade_label: true }
    }

    /// Firewalls view policy
    #[must_use]
    pub fn firewalls() -> Self {
        Self { cascade_label: true }
    }

    /// Data-services view policy
    #[must_use]
    pub fn dataservices() -> Self {
        Self { cascade_label: true }
    }

    /// Credentials view policy (group and networks only)
    #[must_use]
    pub fn credentials() -> Self {
        Self {
            cascade_label: false,
        }
    }
}

/// Propagate a group/network change onto a computer's neighborhood
///
/// The edited computer and every node one edge-hop away take the new group
/// and network assignment; the computer additionally takes the new label
/// when the policy allows. The group then cascades from neighborhood
/// software nodes onto their service/user-service successors.
#[must_use]
pub fn propagate_network_change(
    graph: &GraphData,
    computer_id: &str,
    change: &NetworkChange,
    policy: ViewPolicy,
) -> GraphData {
    let mut out = graph.clone();

    let mut connected: Vec<String> = vec![computer_id.to_string()];
    for edge in &out.edges {
        if edge.source.id() == computer_id {
            let target = edge.target.id().to_string();
            if !connected.contains(&target) {
                connected.push(target);
            }
        }
        if edge.target.id() == computer_id {
            let source = edge.source.id().to_string();
            if !connected.contains(&source) {
                connected.push(source);
            }
        }
    }

    for node in &mut out.nodes {
        if !connected.contains(&node.id) {
            continue;
        }
        if node.id == computer_id && policy.cascade_label {
            node.label.clone_from(&change.label);
        }
        node.group = Some(change.group.clone());
        node.meta.network_ids = Some(change.network_ids.clone());
    }

    // Services hang off software, one hop further than the neighborhood.
    let software_ids: Vec<String> = out
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Software && connected.contains(&n.id))
        .map(|n| n.id.clone())
        .collect();

    let service_targets: Vec<String> = out
        .edges
        .iter()
        .filter(|e| software_ids.contains(&e.source.id().to_string()))
        .map(|e| e.target.id().to_string())
        .collect();

    for node in &mut out.nodes {
        if !service_targets.contains(&node.id) {
            continue;
        }
        if matches!(node.kind, NodeKind::Service | NodeKind::UserService) {
            node.group = Some(change.group.clone());
            node.meta.network_ids = Some(change.network_ids.clone());
        }
    }

    out
}
