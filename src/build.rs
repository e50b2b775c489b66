// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Canonical landscape graph construction
//!
//! Walks the raw model once and emits the "landscape" projection: computers,
//! user roles, relevant software, network services and user-facing services,
//! wired by structural edges. All other views either refine this graph or
//! derive their own node set from the model directly.

use crate::ident::{computer_label, format_server_id, network_group};
use crate::normalize::{
    binary_label, customer_label, is_unwanted_operating_system, provides_valid_network_service,
    software_relevant,
};
use crate::types::{Edge, EdgeKind, GraphData, Model, Node, NodeKind, NodeMeta};
use std::collections::{BTreeSet, HashMap};
use std::f64::consts::PI;

/// Options for the landscape builder
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Include operating-system-only software entries
    pub show_operating_systems: bool,
}

/// Radial distance multiplier for group seed positions
const GROUP_RADIUS_STEP: f64 = 800.0;

/// Build the canonical landscape graph from a raw model
///
/// A model without computers yields an empty graph ("not ready"), never an
/// error.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn build_landscape(model: &Model, options: BuildOptions) -> GraphData {
    if !model.is_ready() {
        return GraphData::empty();
    }

    let mut nodes: Vec<Node> = Vec::new();
    let mut edges: Vec<Edge> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let insert = |nodes: &mut Vec<Node>, index: &mut HashMap<String, usize>, node: Node| {
        if !index.contains_key(&node.id) {
            index.insert(node.id.clone(), nodes.len());
            nodes.push(node);
        }
    };

    // Service names referenced by declared data collections keep otherwise
    // silent runtimes (e.g. .NET Framework) in the picture.
    let referenced_services: BTreeSet<String> = model
        .data_collections
        .iter()
        .flat_map(|dc| dc.services.iter())
        .map(|srv| srv.to_lowercase())
        .collect();

    // Pre-seed one user node per declared role.
    let roles: BTreeSet<&String> = model
        .employee_groups
        .values()
        .flat_map(|group| group.keys())
        .collect();

    for role in roles {
        let role_id = format!("user-{role}");
        let mut node = Node::new(role_id.clone(), role.clone(), NodeKind::User)
            .with_group("users");
        node.meta.origin_user = Some(role.clone());
        insert(&mut nodes, &mut index, node);
    }

    for (raw_comp_id, comp) in &model.computers {
        let mut person_id: Option<String> = None;
        let mut valid_software: Vec<&String> = Vec::new();

        for (sw_id, sw) in &comp.installed_software {
            if !software_relevant(sw) {
                continue;
            }
            valid_software.push(sw_id);
            if person_id.is_none() && sw.person_index == Some(0) {
                person_id.clone_from(&sw.person_group_id);
            }
        }

        let has_person = person_id.is_some();
        let is_server = !has_person && !comp.provides_network_services.is_empty();

        if !has_person && valid_software.is_empty() {
            continue;
        }

        let comp_id = if is_server {
            format_server_id(raw_comp_id)
        } else {
            raw_comp_id.clone()
        };
        let comp_display = computer_label(&comp_id);
        let group = network_group(&comp.network_idn);

        let mut comp_node = Node::new(comp_id.clone(), comp_display, NodeKind::Computer)
            .with_group(group.clone());
        comp_node.meta = NodeMeta {
            network_ids: Some(comp.network_idn.clone()),
            origin_computer: Some(comp.clone()),
            data: Some(comp.data.clone()),
            ..NodeMeta::default()
        };
        insert(&mut nodes, &mut index, comp_node);

        if let Some(person) = &person_id {
            let user_node_id = format!("user-{person}");
            if let Some(&idx) = index.get(&user_node_id) {
                nodes[idx].group = Some(group.clone());
            } else {
                // Role missing from employee_groups; create it on the fly.
                let mut node = Node::new(user_node_id.clone(), person.clone(), NodeKind::User)
                    .with_group(group.clone());
                node.full_name = Some(format!("User role: {person}"));
                node.meta.origin_user = Some(person.clone());
                node.meta.computer_idn = Some(comp_id.clone());
                insert(&mut nodes, &mut index, node);
            }
            edges.push(Edge::new(
                format!("edge-{user_node_id}-{comp_id}"),
                user_node_id,
                comp_id.clone(),
                EdgeKind::UserComputer,
            ));
        }

        for sw_id in &valid_software {
            let sw = &comp.installed_software[*sw_id];
            if !options.show_operating_systems && is_unwanted_operating_system(sw) {
                continue;
            }

            let label = binary_label(sw);
            if label.is_empty() {
                continue;
            }
            let label_lower = label.to_lowercase();
            if label_lower == "internet_connection" {
                continue;
            }

            let provides_valid = provides_valid_network_service(sw);
            let is_referenced = referenced_services.contains(&label_lower);
            let is_dotnet =
                label_lower.contains(".net framework") || label_lower.contains("4.8");

            // Bare runtimes only earn a node when something actually uses
            // them; everything else qualifies via the owning person too.
            let include = if is_dotnet {
                provides_valid || is_referenced
            } else {
                has_person || provides_valid || is_referenced
            };
            if !include {
                continue;
            }

            let full_name = sw
                .name
                .clone()
                .or_else(|| sw.idn.clone())
                .or_else(|| sw.cpe_idn.clone())
                .unwrap_or_else(|| (*sw_id).clone());

            let mut sw_node = Node::new((*sw_id).clone(), label.clone(), NodeKind::Software)
                .with_group(group.clone());
            sw_node.full_name = Some(full_name);
            sw_node.meta = NodeMeta {
                computer_idn: Some(raw_comp_id.clone()),
                cpe: Some(sw.cpe_idn.clone().unwrap_or_else(|| "N/A".to_string())),
                version: Some(sw.version.clone().unwrap_or_else(|| "N/A".to_string())),
                person_index: sw.person_index,
                origin_software: Some(sw.clone()),
                ..NodeMeta::default()
            };
            insert(&mut nodes, &mut index, sw_node);

            edges.push(Edge::new(
                format!("edge-{comp_id}-{sw_id}"),
                comp_id.clone(),
                (*sw_id).clone(),
                EdgeKind::ComputerSoftware,
            ));

            if has_person {
                let customer = customer_label(&label);
                let customer_id = format!("{customer}-{sw_id}");
                let node = Node::new(customer_id.clone(), customer, NodeKind::UserService)
                    .with_group(group.clone());
                insert(&mut nodes, &mut index, node);
                edges.push(Edge::new(
                    format!("edge-{sw_id}-{customer_id}"),
                    (*sw_id).clone(),
                    customer_id,
                    EdgeKind::SoftwareUserService,
                ));
            }

            for service_name in &sw.provides_network_services {
                if service_name.to_lowercase() == "internet" {
                    continue;
                }
                let service_id = format!("{service_name}-{sw_id}");
                let node = Node::new(service_id.clone(), service_name.clone(), NodeKind::Service)
                    .with_group(group.clone());
                insert(&mut nodes, &mut index, node);
                edges.push(Edge::new(
                    format!("edge-{sw_id}-{service_id}"),
                    (*sw_id).clone(),
                    service_id,
                    EdgeKind::SoftwareService,
                ));
            }
        }

        // Servers without qualifying software still advertise their services.
        if is_server && valid_software.is_empty() {
            for service_name in &comp.provides_network_services {
                let service_id = format!("{service_name}-{comp_id}");
                let node = Node::new(service_id.clone(), service_name.clone(), NodeKind::Service)
                    .with_group(group.clone());
                insert(&mut nodes, &mut index, node);
                edges.push(Edge::new(
                    format!("edge-{comp_id}-{service_id}"),
                    comp_id.clone(),
                    service_id,
                    EdgeKind::ComputerService,
                ));
            }
        }
    }

    assign_group_seeds(&mut nodes);

    GraphData { nodes, edges }
}

/// Assign a deterministic radial seed position per distinct group
///
/// Groups are placed on a circle in first-appearance order; the radius grows
/// with the group count so downstream layout starts from a stable, spread
/// configuration.
fn assign_group_seeds(nodes: &mut [Node]) {
    let mut group_order: Vec<String> = Vec::new();
    for node in nodes.iter() {
        if let Some(group) = &node.group {
            if !group_order.contains(group) {
                group_order.push(group.clone());
            }
        }
    }

    let group_count = group_order.len();
    if group_count == 0 {
        return;
    }

    #[allow(clippy::cast_precision_loss)]
    let radius = GROUP_RADIUS_STEP * group_count as f64;
    let coordinates: HashMap<&String, (f64, f64)> = group_order
        .iter()
        .enumerate()
        .map(|(idx, group)| {
            #[allow(clippy::cast_precision_loss)]
            let angle = (idx as f64 / group_count as f64) * 2.0 * PI;
            (group, (radius * angle.cos(), radius * angle.sin()))
        })
        .collect();

    for node in nodes.iter_mut() {
        if let Some(group) = &node.group {
            if let Some(&(x, y)) = coordinates.get(group) {
                node.x = Some(x);
                node.y = Some(y);
            }
        }
    }
}
