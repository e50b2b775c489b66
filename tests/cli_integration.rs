// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for the landgraph CLI commands

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Run landgraph with the given arguments against a temp data directory
fn landgraph(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("landgraph").expect("binary builds");
    cmd.env("LANDGRAPH_DATA_DIR", data_dir.path());
    cmd.env("NO_COLOR", "1");
    cmd
}

/// A small but complete model fixture
fn fixture_json() -> &'static str {
    r#"{
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
            "svc.backup": {
                "idn": "svc.backup",
                "has_root": false,
                "stored_at": ["alice:0:1"],
                "linked_software": ["alice:0:1>cpe:/a:microsoft:office:2019#0"]
            }
        },
        "firewall_rules": {
            "inbound": {
                "idn": "inbound",
                "from_objects": ["INTERNET"],
                "to_objects": ["None:0:0>cpe:/a:microsoft:exchange_server:2016#0"]
            }
        },
        "employee_groups": { "office": { "clerk": {} } }
    }"#
}

fn write_fixture(data_dir: &TempDir) -> std::path::PathBuf {
    let model_path = data_dir.path().join("input-model.json");
    std::fs::write(&model_path, fixture_json()).unwrap();
    model_path
}

#[test]
fn load_builds_and_saves_the_workspace() {
    let data_dir = TempDir::new().unwrap();
    let model_path = write_fixture(&data_dir);

    landgraph(&data_dir)
        .args(["load", model_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 computers"))
        .stdout(predicate::str::contains("Workspace saved"));

    assert!(data_dir.path().join("model.json").exists());
    assert!(data_dir.path().join("graph.json").exists());
}

#[test]
fn views_derive_from_the_stored_workspace() {
    let data_dir = TempDir::new().unwrap();
    let model_path = write_fixture(&data_dir);

    landgraph(&data_dir)
        .args(["load", model_path.to_str().unwrap()])
        .assert()
        .success();

    // Landscape view carries the workstation chain.
    landgraph(&data_dir)
        .args(["view", "landscape"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice:0:1"))
        .stdout(predicate::str::contains("user-clerk"));

    // Firewalls view carries the sentinel.
    landgraph(&data_dir)
        .args(["view", "firewalls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Internet\""));

    // Credentials view carries the service-account key.
    landgraph(&data_dir)
        .args(["view", "credentials"])
        .assert()
        .success()
        .stdout(predicate::str::contains("svc.backup"));

    // Unknown view is rejected.
    landgraph(&data_dir)
        .args(["view", "nonsense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown view"));
}

#[test]
fn rename_rewrites_the_stored_model() {
    let data_dir = TempDir::new().unwrap();
    let model_path = write_fixture(&data_dir);

    landgraph(&data_dir)
        .args(["load", model_path.to_str().unwrap()])
        .assert()
        .success();

    landgraph(&data_dir)
        .args(["rename", "alice:0:1", "bob:0:1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed alice:0:1 -> bob:0:1"))
        .stdout(predicate::str::contains("1 credential(s) updated"));

    let stored = std::fs::read_to_string(data_dir.path().join("model.json")).unwrap();
    assert!(stored.contains("bob:0:1"));
    assert!(!stored.contains("alice:0:1"));

    // Renaming an unknown computer fails.
    landgraph(&data_dir)
        .args(["rename", "ghost:0:9", "other:0:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Computer not found"));
}

#[test]
fn set_network_moves_the_computer() {
    let data_dir = TempDir::new().unwrap();
    let model_path = write_fixture(&data_dir);

    landgraph(&data_dir)
        .args(["load", model_path.to_str().unwrap()])
        .assert()
        .success();

    landgraph(&data_dir)
        .args(["set-network", "alice:0:1", "--networks", "3", "--label", "Alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("network.internal.3"));

    let stored = std::fs::read_to_string(data_dir.path().join("graph.json")).unwrap();
    assert!(stored.contains("network.internal.3"));
}

#[test]
fn validate_reports_dangling_references() {
    let data_dir = TempDir::new().unwrap();
    let model_path = write_fixture(&data_dir);

    landgraph(&data_dir)
        .args(["validate", model_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("no structural violations"));

    let broken = fixture_json().replace("\"stored_at\": [\"alice:0:1\"]", "\"stored_at\": [\"ghost\"]");
    let broken_path = data_dir.path().join("broken.json");
    std::fs::write(&broken_path, broken).unwrap();

    landgraph(&data_dir)
        .args(["validate", broken_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn export_and_info_commands() {
    let data_dir = TempDir::new().unwrap();
    let model_path = write_fixture(&data_dir);

    landgraph(&data_dir)
        .args(["load", model_path.to_str().unwrap()])
        .assert()
        .success();

    landgraph(&data_dir)
        .args(["export", "--format", "dot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("digraph landscape"));

    landgraph(&data_dir)
        .args(["groups"])
        .assert()
        .success()
        .stdout(predicate::str::contains("network.internal.1"));

    landgraph(&data_dir)
        .args(["types"])
        .assert()
        .success()
        .stdout(predicate::str::contains("computer"))
        .stdout(predicate::str::contains("software"));
}

#[test]
fn empty_workspace_is_not_an_error() {
    let data_dir = TempDir::new().unwrap();

    landgraph(&data_dir)
        .args(["view", "landscape"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Workspace is empty"));

    landgraph(&data_dir)
        .args(["groups"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No groups"));
}
