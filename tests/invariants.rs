// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Invariant tests for the landgraph derivation pipeline
//!
//! These tests verify critical invariants:
//! 1. Closure - every edge endpoint appears in the node list, after every
//!    filter and after every propagation
//! 2. Normalizer determinism - inclusion decisions never drift between
//!    call sites
//! 3. Rename consistency - a rename leaves model and derived graph in
//!    agreement, and renaming to the same identifier changes nothing

use landgraph::build::{build_landscape, BuildOptions};
use landgraph::filter::group_closure;
use landgraph::normalize::{count_relevant, software_relevant};
use landgraph::propagate::{
    propagate_network_change, rename_computer, rename_computer_in_model, NetworkChange,
    ViewPolicy,
};
use landgraph::types::{
    Edge, EdgeKind, GraphData, Model, Node, NodeKind, Software,
};
use landgraph::views::{self, ViewMode};
use std::collections::HashSet;

// =============================================================================
// Test Helpers
// =============================================================================

fn fixture_model() -> Model {
    serde_json::from_value(serde_json::json!({
        "computers": {
            "alice:0:1": {
                "idn": "alice:0:1",
                "network_idn": [1],
                "installed_software": {
                    "alice:0:1>cpe:/a:microsoft:office:2019#0": {
                        "idn": "alice:0:1>cpe:/a:microsoft:office:2019#0",
                        "computer_idn": "alice:0:1",
                        "cpe_idn": "cpe:/a:microsoft:office:2019",
                        "person_index": 0,
                        "person_group_id": "clerk",
                        "provides_user_services": ["Office"]
                    },
                    "alice:0:1>cpe:/a:mozilla:firefox:102#0": {
                        "idn": "alice:0:1>cpe:/a:mozilla:firefox:102#0",
                        "computer_idn": "alice:0:1",
                        "cpe_idn": "cpe:/a:mozilla:firefox:102",
                        "person_index": 0,
                        "person_group_id": "clerk",
                        "provides_user_services": ["Browser"],
                        "provides_network_services": ["HTTP"]
                    }
                }
            },
            "None:0:0": {
                "idn": "None:0:0",
                "network_idn": [2],
                "provides_network_services": ["SMTP"],
                "installed_software": {
                    "None:0:0>cpe:/a:microsoft:exchange_server:2016#0": {
                        "idn": "None:0:0>cpe:/a:microsoft:exchange_server:2016#0",
                        "computer_idn": "None:0:0",
                        "cpe_idn": "cpe:/a:microsoft:exchange_server:2016",
                        "person_index": 1,
                        "provides_network_services": ["SMTP"]
                    }
                }
            }
        },
        "credentials": {
            "admin.root": {
                "idn": "admin.root",
                "has_root": true,
                "stored_at": ["alice:0:1"],
                "linked_software": ["alice:0:1>cpe:/a:microsoft:office:2019#0"]
            },
            "svc.backup": {
                "idn": "svc.backup",
                "has_root": false,
                "stored_at": ["None:0:0"]
            },
            "user.pass": {
                "idn": "user.pass",
                "has_root": false,
                "stored_at": ["alice:0:1"],
                "linked_employees": [["clerk", 0]]
            }
        },
        "firewall_rules": {
            "inbound": {
                "idn": "inbound",
                "from_objects": ["INTERNET"],
                "to_objects": ["None:0:0>cpe:/a:microsoft:exchange_server:2016#0"]
            },
            "outbound": {
                "idn": "outbound",
                "from_objects": ["alice:0:1>cpe:/a:mozilla:firefox:102#0"],
                "to_objects": ["INTERNET"]
            }
        },
        "data": {
            "Emails:corp#1": {
                "idn": "Emails:corp#1",
                "data_definition_idn": "Emails:corp",
                "person_indexes": [0],
                "person_groups": ["clerk"],
                "linked_software": ["cpe:/a:microsoft:office:2019#0"]
            }
        },
        "employee_groups": {
            "office": { "clerk": {} }
        }
    }))
    .expect("fixture model parses")
}

fn assert_closed(graph: &GraphData, context: &str) {
    let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    for edge in &graph.edges {
        assert!(
            ids.contains(edge.source.id()),
            "{context}: edge {} has dangling source {}",
            edge.id,
            edge.source.id()
        );
        assert!(
            ids.contains(edge.target.id()),
            "{context}: edge {} has dangling target {}",
            edge.id,
            edge.target.id()
        );
    }
}

// =============================================================================
// Closure Invariant
// =============================================================================

#[test]
fn every_view_produces_a_closed_graph() {
    let model = fixture_model();
    let landscape = build_landscape(&model, BuildOptions::default());
    assert_closed(&landscape, "canonical landscape");

    let modes = [
        ViewMode::Landscape,
        ViewMode::Firewalls,
        ViewMode::Dataservices,
        ViewMode::Credentials,
    ];
    let groups = ["", "network.internal.1", "network.internal.2", "internet"];
    let type_selections: [&[NodeKind]; 4] = [
        &[],
        &[NodeKind::Computer, NodeKind::Software],
        &[NodeKind::Software, NodeKind::Service, NodeKind::UserService],
        &[NodeKind::User, NodeKind::Software],
    ];

    for mode in modes {
        for group in groups {
            for selection in type_selections {
                let types: HashSet<NodeKind> = selection.iter().copied().collect();
                let view = views::derive(mode, &model, &landscape, group, &types);
                assert_closed(
                    &view,
                    &format!("{} group={group:?} types={selection:?}", mode.code()),
                );
            }
        }
    }
}

#[test]
fn propagation_preserves_closure() {
    let model = fixture_model();
    let landscape = build_landscape(&model, BuildOptions::default());

    let change = NetworkChange {
        group: "network.internal.7".to_string(),
        network_ids: vec![7],
        label: "moved".to_string(),
    };
    let propagated =
        propagate_network_change(&landscape, "alice:0:1", &change, ViewPolicy::landscape());
    assert_closed(&propagated, "after network change");

    let (_, renamed) = rename_computer(&model, &landscape, "alice:0:1", "bob:0:1");
    assert_closed(&renamed, "after rename");
}

// =============================================================================
// Normalizer Determinism
// =============================================================================

#[test]
fn relevance_decisions_match_across_call_sites() {
    let model = fixture_model();
    let landscape = build_landscape(&model, BuildOptions::default());

    for (comp_id, comp) in &model.computers {
        // What the summary counts...
        let counted = count_relevant(comp.installed_software.values());
        // ...is what the builder emitted software nodes for.
        let built = landscape
            .nodes
            .iter()
            .filter(|n| {
                n.kind == NodeKind::Software
                    && n.meta.computer_idn.as_deref() == Some(comp_id.as_str())
            })
            .count();
        assert_eq!(
            counted, built,
            "relevance count drifted for {comp_id}: policy says {counted}, builder emitted {built}"
        );
    }
}

#[test]
fn relevance_is_stable_over_repeated_evaluation() {
    let samples = [
        Software {
            person_index: Some(0),
            provides_user_services: vec!["Office".to_string()],
            ..Software::default()
        },
        Software {
            person_index: Some(0),
            provides_network_services: vec!["HTTP".to_string()],
            accepts_credentials: vec!["cred".to_string()],
            ..Software::default()
        },
        Software {
            person_index: Some(0),
            ..Software::default()
        },
        Software {
            person_index: Some(2),
            provides_network_services: vec!["SMTP".to_string()],
            ..Software::default()
        },
        Software {
            person_index: None,
            ..Software::default()
        },
    ];

    for sample in &samples {
        let first = software_relevant(sample);
        for _ in 0..100 {
            assert_eq!(software_relevant(sample), first);
        }
    }
}

// =============================================================================
// Rename Consistency
// =============================================================================

#[test]
fn rename_to_self_changes_nothing() {
    let model = fixture_model();
    let landscape = build_landscape(&model, BuildOptions::default());

    let (same_model, same_graph) = rename_computer(&model, &landscape, "alice:0:1", "alice:0:1");
    assert_eq!(model, same_model);
    assert_eq!(landscape, same_graph);
}

#[test]
fn rename_completeness_across_the_model() {
    let mut model = fixture_model();
    // Another computer referencing the renamed one by prefix.
    let referencing: Software = serde_json::from_value(serde_json::json!({
        "idn": "alice:0:1>swRef",
        "computer_idn": "alice:0:1",
        "provides_user_services": ["alice:0:1>usRef"]
    }))
    .unwrap();
    model
        .computers
        .get_mut("None:0:0")
        .unwrap()
        .installed_software
        .insert("alice:0:1>swRef".to_string(), referencing);

    let renamed = rename_computer_in_model(&model, "alice:0:1", "carol:0:1");

    let comp = renamed.computers.get("carol:0:1").expect("renamed computer");
    assert_eq!(comp.idn.as_deref(), Some("carol:0:1"));

    let sw = comp
        .installed_software
        .get("carol:0:1>cpe:/a:microsoft:office:2019#0")
        .expect("software key renamed");
    assert_eq!(sw.computer_idn.as_deref(), Some("carol:0:1"));

    let server = renamed.computers.get("None:0:0").unwrap();
    let sw_ref = server
        .installed_software
        .get("carol:0:1>swRef")
        .expect("cross-computer reference renamed");
    assert_eq!(
        sw_ref.provides_user_services,
        vec!["carol:0:1>usRef".to_string()]
    );

    let cred = renamed.credentials.get("admin.root").unwrap();
    assert_eq!(cred.stored_at, vec!["carol:0:1".to_string()]);
    assert_eq!(
        cred.linked_software,
        vec!["carol:0:1>cpe:/a:microsoft:office:2019#0".to_string()]
    );

    let rule = renamed.firewall_rules.get("outbound").unwrap();
    assert_eq!(
        rule.from_objects,
        vec!["carol:0:1>cpe:/a:mozilla:firefox:102#0".to_string()]
    );
}

#[test]
fn rename_keeps_model_and_graph_in_agreement() {
    let model = fixture_model();
    let landscape = build_landscape(&model, BuildOptions::default());

    let (renamed_model, renamed_graph) =
        rename_computer(&model, &landscape, "alice:0:1", "dave:0:1");

    // Rebuilding from the renamed model reproduces the renamed graph's
    // node identifiers.
    let rebuilt = build_landscape(&renamed_model, BuildOptions::default());
    let rebuilt_ids: HashSet<&str> = rebuilt.nodes.iter().map(|n| n.id.as_str()).collect();
    let renamed_ids: HashSet<&str> = renamed_graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(rebuilt_ids, renamed_ids);
}

// =============================================================================
// View Examples
// =============================================================================

#[test]
fn credential_examples_classify_correctly() {
    let model = fixture_model();
    let landscape = build_landscape(&model, BuildOptions::default());
    let view = views::derive(
        ViewMode::Credentials,
        &model,
        &landscape,
        "",
        &HashSet::new(),
    );

    // admin + root with workstation-linked software: a lock.
    assert_eq!(view.node("admin.root").expect("admin.root").kind, NodeKind::Lock);
    // svc.-prefixed without root: a key, no employees required.
    assert_eq!(view.node("svc.backup").expect("svc.backup").kind, NodeKind::Key);
    // plain credential with an index-0 employee: a key.
    assert_eq!(view.node("user.pass").expect("user.pass").kind, NodeKind::Key);
}

#[test]
fn firewall_examples_point_the_right_way() {
    let model = fixture_model();
    let landscape = build_landscape(&model, BuildOptions::default());
    let view = views::derive(
        ViewMode::Firewalls,
        &model,
        &landscape,
        "",
        &HashSet::new(),
    );

    let exchange_sw = "cpe:/a:microsoft:exchange_server:2016#0";
    assert!(view.edges.iter().any(|e| {
        e.kind == EdgeKind::Internet
            && e.source.id() == "Internet"
            && e.target.id() == exchange_sw
    }));
    assert!(view.edges.iter().any(|e| {
        e.kind == EdgeKind::ComputerSoftware
            && e.source.id() == "None:0:0"
            && e.target.id() == exchange_sw
    }));
    // The inbound flow never points back at the sentinel.
    assert!(!view
        .edges
        .iter()
        .any(|e| e.source.id() == exchange_sw && e.target.id() == "Internet"));

    let firefox_sw = "cpe:/a:mozilla:firefox:102#0";
    assert!(view.edges.iter().any(|e| {
        e.kind == EdgeKind::Internet
            && e.source.id() == firefox_sw
            && e.target.id() == "Internet"
    }));
}

// =============================================================================
// Serialization Fidelity
// =============================================================================

#[test]
fn edge_endpoints_survive_in_both_representations() {
    let model = fixture_model();
    let landscape = build_landscape(&model, BuildOptions::default());

    // Bare-identifier form round-trips.
    let json = serde_json::to_string(&landscape).unwrap();
    let back: GraphData = serde_json::from_str(&json).unwrap();
    assert_eq!(landscape, back);

    // Resolved form carries the same identifiers and round-trips too.
    let resolved = landscape.clone().resolve_edges();
    for (bare, rich) in landscape.edges.iter().zip(resolved.edges.iter()) {
        assert_eq!(bare.source.id(), rich.source.id());
        assert_eq!(bare.target.id(), rich.target.id());
    }
    let json = serde_json::to_string(&resolved).unwrap();
    let back: GraphData = serde_json::from_str(&json).unwrap();
    assert_eq!(resolved, back);

    // Simplifying collapses back to bare identifiers.
    let simplified = back.simplify_edges();
    assert_eq!(landscape.edges, simplified.edges);
}

#[test]
fn group_closure_walks_the_whole_component() {
    let graph = GraphData {
        nodes: vec![
            Node::new("A", "A", NodeKind::Computer).with_group("g"),
            Node::new("B", "B", NodeKind::Software),
            Node::new("C", "C", NodeKind::Service),
        ],
        edges: vec![
            Edge::new("edge-A-B", "A", "B", EdgeKind::ComputerSoftware),
            Edge::new("edge-B-C", "B", "C", EdgeKind::SoftwareService),
        ],
    };

    let closure = group_closure(&graph, "g");
    assert_eq!(closure.len(), 3, "closure expands through B to C");
}
