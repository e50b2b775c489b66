// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Benchmarks for the build + filter pipeline

use criterion::{criterion_group, criterion_main, Criterion};
use landgraph::build::{build_landscape, BuildOptions};
use landgraph::types::{Computer, Model, NodeKind, Software};
use landgraph::views::landscape::filter_landscape;
use std::collections::HashSet;
use std::hint::black_box;

/// A synthetic model with `n` workstations across four networks
fn synthetic_model(n: usize) -> Model {
    let mut model = Model::default();
    for i in 0..n {
        let comp_id = format!("user{i}:0:{}", i % 4 + 1);
        let mut comp = Computer {
            idn: Some(comp_id.clone()),
            network_idn: vec![(i % 4 + 1) as i64],
            ..Computer::default()
        };
        let sw_id = format!("{comp_id}>cpe:/a:microsoft:office:2019#0");
        comp.installed_software.insert(
            sw_id.clone(),
            Software {
                idn: Some(sw_id),
                computer_idn: Some(comp_id.clone()),
                cpe_idn: Some("cpe:/a:microsoft:office:2019".to_string()),
                person_index: Some(0),
                person_group_id: Some(format!("role{}", i % 8)),
                provides_user_services: vec!["Office".to_string()],
                provides_network_services: vec!["HTTP".to_string()],
                ..Software::default()
            },
        );
        model.computers.insert(comp_id, comp);
    }
    model
}

fn bench_build(c: &mut Criterion) {
    let model = synthetic_model(200);
    c.bench_function("build_landscape_200", |b| {
        b.iter(|| build_landscape(black_box(&model), BuildOptions::default()));
    });
}

fn bench_filter(c: &mut Criterion) {
    let model = synthetic_model(200);
    let graph = build_landscape(&model, BuildOptions::default());
    let types: HashSet<NodeKind> = [NodeKind::User, NodeKind::Software].into();

    c.bench_function("filter_landscape_group", |b| {
        b.iter(|| filter_landscape(black_box(&graph), "network.internal.1", &types));
    });
}

criterion_group!(benches, bench_build, bench_filter);
criterion_main!(benches);
