// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Firewalls view: rule endpoints, internet exposure and flows
//!
//! Built from `firewall_rules` directly, with a sentinel `Internet` node
//! always present. The from-side of a rule is only materialized when the
//! source software has `person_index == 0`; rules referencing unknown
//! computers or software are skipped entry by entry.

use crate::ident::{format_server_id, network_group, user_id_from_software_id};
use crate::normalize::binary_label;
use crate::types::{
    Edge, EdgeKind, GraphData, Model, Node, NodeKind, NodeMeta, INTERNET,
};
use crate::views::NodeBag;
use std::collections::HashSet;

/// Identifier and label of the sentinel node
pub const INTERNET_NODE_ID: &str = "Internet";

/// Derive the firewalls projection from the model's rules
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn filter_firewalls(
    landscape: &GraphData,
    model: &Model,
    selected_group: &str,
    selected_types: &HashSet<NodeKind>,
) -> GraphData {
    if !model.is_ready() || landscape.nodes.is_empty() {
        return GraphData::empty();
    }

    let mut bag = NodeBag::new();
    let mut edges: Vec<Edge> = Vec::new();
    let mut edge_index: HashSet<(String, String)> = HashSet::new();

    let add_edge = |edges: &mut Vec<Edge>,
                    index: &mut HashSet<(String, String)>,
                    edge: Edge| {
        let key = (edge.source.id().to_string(), edge.target.id().to_string());
        if index.insert(key) {
            edges.push(edge);
        }
    };

    bag.add(
        Node::new(INTERNET_NODE_ID, "Internet", NodeKind::Internet).with_group("internet"),
    );

    let computer_node = |comp_id: &str, comp: &crate::types::Computer, group: &str| {
        let mut node = Node::new(comp_id, format_server_id(comp_id), NodeKind::Computer)
            .with_group(group);
        node.meta = NodeMeta {
            origin_computer: Some(comp.clone()),
            network_ids: Some(comp.network_idn.clone()),
            ..NodeMeta::default()
        };
        node
    };

    for rule in model.firewall_rules.values() {
        for from in &rule.from_objects {
            let is_internet_from = from == INTERNET;

            for to in &rule.to_objects {
                let Some((to_comp_id, to_sw_id)) = to.split_once('>') else {
                    continue;
                };
                let Some(to_comp) = model.computers.get(to_comp_id) else {
                    continue;
                };
                let to_sw = to_comp.installed_software.get(to);
                let to_group = network_group(&to_comp.network_idn);

                bag.add(computer_node(to_comp_id, to_comp, &to_group));

                let to_label = to_sw.map_or_else(
                    || {
                        to_sw_id
                            .rsplit(':')
                            .next()
                            .and_then(|part| part.split('#').next())
                            .filter(|part| !part.is_empty())
                            .unwrap_or(to_sw_id)
                            .to_string()
                    },
                    binary_label,
                );

                let mut sw_node =
                    Node::new(to_sw_id, format_server_id(&to_label), NodeKind::Software)
                        .with_group(&to_group);
                sw_node.full_name = Some(
                    to_sw
                        .and_then(|sw| sw.name.clone())
                        .unwrap_or_else(|| to_sw_id.to_string()),
                );
                sw_node.meta = NodeMeta {
                    computer_idn: Some(to_comp_id.to_string()),
                    origin_software: to_sw.cloned(),
                    ..NodeMeta::default()
                };
                bag.add(sw_node);

                add_edge(
                    &mut edges,
                    &mut edge_index,
                    Edge::new(
                        format!("edge-{to_comp_id}-{to_sw_id}"),
                        to_comp_id,
                        to_sw_id,
                        EdgeKind::ComputerSoftware,
                    ),
                );

                if is_internet_from {
                    add_edge(
                        &mut edges,
                        &mut edge_index,
                        Edge::new(
                            format!("edge-{INTERNET_NODE_ID}-{to_sw_id}"),
                            INTERNET_NODE_ID,
                            to_sw_id,
                            EdgeKind::Internet,
                        ),
                    );
                }
            }

            if !is_internet_from && from.contains('>') {
                let Some((from_comp_id, from_sw_id)) = from.split_once('>') else {
                    continue;
                };
                let Some(from_comp) = model.computers.get(from_comp_id) else {
                    continue;
                };
                let Some(from_sw) = from_comp.installed_software.get(from) else {
                    continue;
                };
                // Server-side sources are only drawn for workstation software.
                if from_sw.person_index != Some(0) {
                    continue;
                }

                let from_group = network_group(&from_comp.network_idn);
                bag.add(computer_node(from_comp_id, from_comp, &from_group));

                let from_label = binary_label(from_sw);
                let mut sw_node =
                    Node::new(from_sw_id, format_server_id(&from_label), NodeKind::Software)
                        .with_group(&from_group);
                sw_node.full_name = Some(
                    from_sw
                        .name
                        .clone()
                        .unwrap_or_else(|| from_sw_id.to_string()),
                );
                sw_node.meta = NodeMeta {
                    computer_idn: Some(from_comp_id.to_string()),
                    user_id: user_id_from_software_id(from),
                    origin_software: Some(from_sw.clone()),
                    ..NodeMeta::default()
                };
                bag.add(sw_node);

                add_edge(
                    &mut edges,
                    &mut edge_index,
                    Edge::new(
                        format!("edge-{from_comp_id}-{from_sw_id}"),
                        from_comp_id,
                        from_sw_id,
                        EdgeKind::ComputerSoftware,
                    ),
                );

                for to in &rule.to_objects {
                    if to == INTERNET {
                        add_edge(
                            &mut edges,
                            &mut edge_index,
                            Edge::new(
                                format!("edge-{from_sw_id}-{INTERNET_NODE_ID}"),
                                from_sw_id,
                                INTERNET_NODE_ID,
                                EdgeKind::Internet,
                            ),
                        );
                        continue;
                    }

                    let Some((to_comp_id, to_sw_id)) = to.split_once('>') else {
                        continue;
                    };
                    let Some(to_comp) = model.computers.get(to_comp_id) else {
                        continue;
                    };
                    let Some(to_sw) = to_comp.installed_software.get(to) else {
                        continue;
                    };

                    let to_group = network_group(&to_comp.network_idn);
                    bag.add(computer_node(to_comp_id, to_comp, &to_group));

                    let to_label = binary_label(to_sw);
                    let mut node =
                        Node::new(to_sw_id, format_server_id(&to_label), NodeKind::Software)
                            .with_group(&to_group);
                    node.full_name =
                        Some(to_sw.name.clone().unwrap_or_else(|| to_sw_id.to_string()));
                    node.meta = NodeMeta {
                        computer_idn: Some(to_comp_id.to_string()),
                        origin_software: Some(to_sw.clone()),
                        ..NodeMeta::default()
                    };
                    bag.add(node);

                    add_edge(
                        &mut edges,
                        &mut edge_index,
                        Edge::new(
                            format!("edge-{to_comp_id}-{to_sw_id}"),
                            to_comp_id,
                            to_sw_id,
                            EdgeKind::ComputerSoftware,
                        ),
                    );
                    add_edge(
                        &mut edges,
                        &mut edge_index,
                        Edge::new(
                            format!("edge-{from_sw_id}-{to_sw_id}"),
                            from_sw_id,
                            to_sw_id,
                            EdgeKind::SoftwareSoftware,
                        ),
                    );
                }
            }
        }
    }

    let mut final_nodes = bag.into_nodes();

    if !selected_group.is_empty() && selected_group != "internet" {
        let group_computers: Vec<String> = final_nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Computer && n.group.as_deref() == Some(selected_group))
            .map(|n| n.id.clone())
            .collect();

        final_nodes.retain(|n| {
            (n.kind == NodeKind::Computer && n.group.as_deref() == Some(selected_group))
                || (n.kind == NodeKind::Software
                    && n.meta
                        .computer_idn
                        .as_ref()
                        .is_some_and(|comp| group_computers.contains(comp)))
        });
    }

    if !selected_types.is_empty() {
        let keep_sentinel = selected_group.is_empty() || selected_group == "internet";
        final_nodes.retain(|n| {
            (n.id == INTERNET_NODE_ID && keep_sentinel) || selected_types.contains(&n.kind)
        });
    }

    let final_ids: HashSet<&str> = final_nodes.iter().map(|n| n.id.as_str()).collect();
    let final_edges: Vec<Edge> = edges
        .into_iter()
        .filter(|e| final_ids.contains(e.source.id()) && final_ids.contains(e.target.id()))
        .collect();

    GraphData {
        nodes: final_nodes,
        edges: final_edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Computer, FirewallRule, Software};
    use std::collections::BTreeMap;

    fn model_with_rule(rule: FirewallRule) -> Model {
        let mut server = Computer {
            idn: Some("None:0:0".to_string()),
            network_idn: vec![2],
            ..Computer::default()
        };
        server.installed_software.insert(
            "None:0:0>banking".to_string(),
            Software {
                idn: Some("None:0:0>banking".to_string()),
                name: Some("Internet Banking Server".to_string()),
                person_index: Some(1),
                provides_network_services: vec!["InternetBanking".to_string()],
                ..Software::default()
            },
        );

        let mut workstation = Computer {
            idn: Some("alice:0:1".to_string()),
            network_idn: vec![1],
            ..Computer::default()
        };
        workstation.installed_software.insert(
            "alice:0:1>browser".to_string(),
            Software {
                idn: Some("alice:0:1>browser".to_string()),
                cpe_idn: Some("cpe:/a:mozilla:firefox:102".to_string()),
                person_index: Some(0),
                provides_user_services: vec!["Browser".to_string()],
                ..Software::default()
            },
        );

        let mut computers = BTreeMap::new();
        computers.insert("None:0:0".to_string(), server);
        computers.insert("alice:0:1".to_string(), workstation);

        let mut firewall_rules = BTreeMap::new();
        firewall_rules.insert("rule1".to_string(), rule);

        Model {
            computers,
            firewall_rules,
            ..Model::default()
        }
    }

    fn landscape_stub() -> GraphData {
        GraphData {
            nodes: vec![Node::new("stub", "stub", NodeKind::Computer)],
            edges: vec![],
        }
    }

    #[test]
    fn inbound_rule_produces_internet_edge() {
        let model = model_with_rule(FirewallRule {
            idn: Some("rule1".to_string()),
            from_objects: vec![INTERNET.to_string()],
            to_objects: vec!["None:0:0>banking".to_string()],
        });

        let graph = filter_firewalls(&landscape_stub(), &model, "", &HashSet::new());

        assert!(graph.node(INTERNET_NODE_ID).is_some());
        assert!(graph.node("None:0:0").is_some());
        assert!(graph.node("banking").is_some());

        // Sentinel -> software, computer -> software, and never an edge with
        // the sentinel as target.
        assert!(graph.edges.iter().any(|e| {
            e.kind == EdgeKind::Internet
                && e.source.id() == INTERNET_NODE_ID
                && e.target.id() == "banking"
        }));
        assert!(graph.edges.iter().any(|e| {
            e.kind == EdgeKind::ComputerSoftware
                && e.source.id() == "None:0:0"
                && e.target.id() == "banking"
        }));
        assert!(!graph
            .edges
            .iter()
            .any(|e| e.target.id() == INTERNET_NODE_ID));
    }

    #[test]
    fn outbound_rule_points_at_sentinel() {
        let model = model_with_rule(FirewallRule {
            idn: Some("rule1".to_string()),
            from_objects: vec!["alice:0:1>browser".to_string()],
            to_objects: vec![INTERNET.to_string()],
        });

        let graph = filter_firewalls(&landscape_stub(), &model, "", &HashSet::new());

        assert!(graph.edges.iter().any(|e| {
            e.kind == EdgeKind::Internet
                && e.source.id() == "browser"
                && e.target.id() == INTERNET_NODE_ID
        }));
    }

    #[test]
    fn server_side_source_requires_person_index_zero() {
        // The banking server has person_index 1, so a rule sourced from it
        // must not materialize a from-side.
        let model = model_with_rule(FirewallRule {
            idn: Some("rule1".to_string()),
            from_objects: vec!["None:0:0>banking".to_string()],
            to_objects: vec![INTERNET.to_string()],
        });

        let graph = filter_firewalls(&landscape_stub(), &model, "", &HashSet::new());
        assert!(!graph
            .edges
            .iter()
            .any(|e| e.kind == EdgeKind::SoftwareSoftware || e.kind == EdgeKind::Internet));
    }

    #[test]
    fn workstation_to_server_flow() {
        let model = model_with_rule(FirewallRule {
            idn: Some("rule1".to_string()),
            from_objects: vec!["alice:0:1>browser".to_string()],
            to_objects: vec!["None:0:0>banking".to_string()],
        });

        let graph = filter_firewalls(&landscape_stub(), &model, "", &HashSet::new());

        assert!(graph.edges.iter().any(|e| {
            e.kind == EdgeKind::SoftwareSoftware
                && e.source.id() == "browser"
                && e.target.id() == "banking"
        }));
    }

    #[test]
    fn group_filter_keeps_owned_software() {
        let model = model_with_rule(FirewallRule {
            idn: Some("rule1".to_string()),
            from_objects: vec!["alice:0:1>browser".to_string()],
            to_objects: vec!["None:0:0>banking".to_string()],
        });

        let graph = filter_firewalls(
            &landscape_stub(),
            &model,
            "network.internal.1",
            &HashSet::new(),
        );

        let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert!(ids.contains("alice:0:1"));
        assert!(ids.contains("browser"));
        assert!(!ids.contains("None:0:0"));
        assert!(!ids.contains(INTERNET_NODE_ID));
    }

    #[test]
    fn dangling_rule_entries_are_skipped() {
        let model = model_with_rule(FirewallRule {
            idn: Some("rule1".to_string()),
            from_objects: vec![INTERNET.to_string()],
            to_objects: vec!["ghost:0:9>missing".to_string()],
        });

        let graph = filter_firewalls(&landscape_stub(), &model, "", &HashSet::new());
        // Only the sentinel survives; nothing dangles.
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
    }
}
