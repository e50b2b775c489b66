// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Group and type filtering shared by the view projections
//!
//! The central primitive is [`group_closure`]: a fixed-point breadth-first
//! expansion of a group's node set across edges, treated as undirected.
//! Composing it with type retention and edge restriction is the backbone of
//! the landscape and data-services views; the credentials view uses its own
//! custom group filter over the same machinery.

use crate::types::{Edge, EdgeKind, GraphData, Node, NodeKind};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{HashMap, HashSet, VecDeque};

/// Nodes reachable from the selected group by any number of edge hops
///
/// An empty group selects everything. Expansion runs to a fixed point: for a
/// line graph `A-B-C` with only `A` in the group, all three nodes survive.
#[must_use]
pub fn group_closure(data: &GraphData, group: &str) -> Vec<Node> {
    if group.is_empty() {
        return data.nodes.clone();
    }

    let mut adjacency: UnGraph<usize, ()> = UnGraph::new_undirected();
    let mut by_id: HashMap<&str, NodeIndex> = HashMap::new();
    for (pos, node) in data.nodes.iter().enumerate() {
        by_id.insert(node.id.as_str(), adjacency.add_node(pos));
    }
    for edge in &data.edges {
        if let (Some(&a), Some(&b)) = (
            by_id.get(edge.source.id()),
            by_id.get(edge.target.id()),
        ) {
            adjacency.add_edge(a, b, ());
        }
    }

    let mut included: HashSet<NodeIndex> = HashSet::new();
    let mut queue: VecDeque<NodeIndex> = VecDeque::new();
    for node in &data.nodes {
        if node.group.as_deref() == Some(group) {
            let idx = by_id[node.id.as_str()];
            if included.insert(idx) {
                queue.push_back(idx);
            }
        }
    }

    while let Some(idx) = queue.pop_front() {
        for neighbor in adjacency.neighbors(idx) {
            if included.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    data.nodes
        .iter()
        .filter(|node| included.contains(&by_id[node.id.as_str()]))
        .cloned()
        .collect()
}

/// Retain nodes whose kind is in the selection; an empty selection keeps all
#[must_use]
pub fn filter_by_types(nodes: Vec<Node>, types: &HashSet<NodeKind>) -> Vec<Node> {
    if types.is_empty() {
        return nodes;
    }
    nodes
        .into_iter()
        .filter(|node| types.contains(&node.kind))
        .collect()
}

/// Keep only edges whose both endpoints survived filtering
#[must_use]
pub fn restrict_edges(edges: &[Edge], node_ids: &HashSet<&str>) -> Vec<Edge> {
    edges
        .iter()
        .filter(|edge| {
            node_ids.contains(edge.source.id()) && node_ids.contains(edge.target.id())
        })
        .cloned()
        .collect()
}

/// True if an edge between the two identifiers already exists (directed)
#[must_use]
pub fn edge_exists(edges: &[Edge], source: &str, target: &str) -> bool {
    edges
        .iter()
        .any(|edge| edge.source.id() == source && edge.target.id() == target)
}

/// Group closure, type retention and edge restriction in one pass
///
/// This is the shared backbone of the landscape view; virtual-edge synthesis
/// on top of the survivors is each view's own business.
#[must_use]
pub fn filter_graph_common(
    data: &GraphData,
    selected_group: &str,
    selected_types: &HashSet<NodeKind>,
) -> GraphData {
    let nodes = filter_by_types(group_closure(data, selected_group), selected_types);
    let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let edges = restrict_edges(&data.edges, &node_ids);

    GraphData { nodes, edges }
}

/// Strict group filter: the group's nodes plus their direct neighbors only
///
/// Unlike [`group_closure`] this expands exactly one hop, which is what the
/// data-services view wants when a group is selected.
#[must_use]
pub fn filter_strict_by_group(
    data: &GraphData,
    selected_group: &str,
    selected_types: &HashSet<NodeKind>,
) -> GraphData {
    if selected_group.is_empty() {
        return data.clone();
    }

    let group_ids: HashSet<&str> = data
        .nodes
        .iter()
        .filter(|n| n.group.as_deref() == Some(selected_group))
        .map(|n| n.id.as_str())
        .collect();

    let mut combined: HashSet<&str> = group_ids.clone();
    for edge in &data.edges {
        if group_ids.contains(edge.source.id()) {
            combined.insert(edge.target.id());
        }
        if group_ids.contains(edge.target.id()) {
            combined.insert(edge.source.id());
        }
    }

    let nodes: Vec<Node> = data
        .nodes
        .iter()
        .filter(|n| combined.contains(n.id.as_str()))
        .cloned()
        .collect();
    let nodes = filter_by_types(nodes, selected_types);
    let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let edges = restrict_edges(&data.edges, &node_ids);

    GraphData { nodes, edges }
}

/// Group filter for the credentials view
///
/// Keeps software/lock/key/computer nodes of the selected group, pulls in
/// out-of-group credential nodes linked to the group's software and users
/// linked to those credentials, then restricts edges to survivors.
#[must_use]
pub fn filter_credentials_custom(data: &GraphData, selected_group: &str) -> GraphData {
    if selected_group.is_empty() {
        return data.clone();
    }

    let mut nodes: Vec<Node> = Vec::new();
    let mut node_ids: HashSet<String> = HashSet::new();
    let mut edges: Vec<Edge> = Vec::new();

    let push_node = |nodes: &mut Vec<Node>, ids: &mut HashSet<String>, node: &Node| {
        if ids.insert(node.id.clone()) {
            nodes.push(node.clone());
        }
    };

    let group_nodes: Vec<&Node> = data
        .nodes
        .iter()
        .filter(|n| n.group.as_deref() == Some(selected_group))
        .collect();

    for node in &group_nodes {
        if matches!(
            node.kind,
            NodeKind::Software | NodeKind::Lock | NodeKind::Key | NodeKind::Computer
        ) {
            push_node(&mut nodes, &mut node_ids, node);
        }
    }

    // Credentials living outside the group still apply to its software.
    let software_in_group: HashSet<&str> = group_nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Software)
        .map(|n| n.id.as_str())
        .collect();

    for edge in &data.edges {
        if edge.kind == EdgeKind::CredentialSoftware
            && software_in_group.contains(edge.target.id())
        {
            let source_id = edge.source.id();
            if let Some(cred) = data
                .nodes
                .iter()
                .find(|n| n.id == source_id && matches!(n.kind, NodeKind::Lock | NodeKind::Key))
            {
                push_node(&mut nodes, &mut node_ids, cred);
                if !edge_exists(&edges, edge.source.id(), edge.target.id()) {
                    edges.push(edge.clone());
                }
            }
        }
    }

    // Users holding the surviving credentials come along too.
    let credential_ids: HashSet<String> = nodes
        .iter()
        .filter(|n| matches!(n.kind, NodeKind::Lock | NodeKind::Key))
        .map(|n| n.id.clone())
        .collect();

    for edge in &data.edges {
        let involves_credential = match edge.kind {
            EdgeKind::CredentialUser | EdgeKind::UserKey => {
                credential_ids.contains(edge.source.id())
            }
            EdgeKind::UserLock => credential_ids.contains(edge.target.id()),
            _ => false,
        };
        if !involves_credential {
            continue;
        }
        let user_id = match edge.kind {
            EdgeKind::UserLock => edge.source.id(),
            _ => edge.target.id(),
        };
        if let Some(user) = data
            .nodes
            .iter()
            .find(|n| n.id == user_id && n.kind == NodeKind::User)
        {
            push_node(&mut nodes, &mut node_ids, user);
            if !edge_exists(&edges, edge.source.id(), edge.target.id()) {
                edges.push(edge.clone());
            }
        }
    }

    for edge in &data.edges {
        if node_ids.contains(edge.source.id()) && node_ids.contains(edge.target.id())
            && !edge_exists(&edges, edge.source.id(), edge.target.id())
        {
            edges.push(edge.clone());
        }
    }

    // Dedup by edge id, keeping first occurrence.
    let mut seen: HashSet<String> = HashSet::new();
    edges.retain(|edge| seen.insert(edge.id.clone()));

    GraphData { nodes, edges }
}

/// Distinct group keys of a graph, excluding the built-in pseudo groups
#[must_use]
pub fn available_groups(data: &GraphData) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    for node in &data.nodes {
        if let Some(group) = &node.group {
            if group != "default" && group != "users" && !groups.contains(group) {
                groups.push(group.clone());
            }
        }
    }
    groups
}

/// Distinct node kinds present in a node list
#[must_use]
pub fn available_types(nodes: &[Node]) -> Vec<NodeKind> {
    let mut kinds: Vec<NodeKind> = Vec::new();
    for node in nodes {
        if !kinds.contains(&node.kind) {
            kinds.push(node.kind);
        }
    }
    kinds
}

/// Traversal direction for [`connected_nodes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Edges pointing at the selected node
    Incoming,
    /// Edges leaving the selected node
    Outgoing,
}

/// Neighbors of a node, optionally restricted by edge kind and node kinds
#[must_use]
pub fn connected_nodes<'a>(
    edges: &[Edge],
    nodes: &'a [Node],
    node_id: &str,
    direction: Direction,
    edge_kind: Option<EdgeKind>,
    kind_filter: Option<&[NodeKind]>,
) -> Vec<&'a Node> {
    let neighbors: Vec<&str> = edges
        .iter()
        .filter(|edge| {
            let matches_direction = match direction {
                Direction::Incoming => edge.target.id() == node_id,
                Direction::Outgoing => edge.source.id() == node_id,
            };
            matches_direction && edge_kind.map_or(true, |kind| edge.kind == kind)
        })
        .map(|edge| match direction {
            Direction::Incoming => edge.source.id(),
            Direction::Outgoing => edge.target.id(),
        })
        .collect();

    nodes
        .iter()
        .filter(|node| neighbors.contains(&node.id.as_str()))
        .filter(|node| kind_filter.map_or(true, |kinds| kinds.contains(&node.kind)))
        .collect()
}
