// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! View projections over the landscape model
//!
//! Four independent transformations, each with its own inclusion rules,
//! grouping key and virtual-edge synthesis. The landscape view refines the
//! canonical graph; firewalls, data-services and credentials derive their
//! node sets from the raw model directly.

pub mod credentials;
pub mod dataservices;
pub mod firewalls;
pub mod landscape;

use crate::types::{GraphData, Model, Node, NodeKind};
use std::collections::{HashMap, HashSet};

/// The four graph projections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Computers, users, software and services
    Landscape,
    /// Firewall rules and internet exposure
    Firewalls,
    /// Data assets and the software touching them
    Dataservices,
    /// Credentials as keys and locks
    Credentials,
}

impl ViewMode {
    /// Short code as used on the CLI
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Firewalls => "firewalls",
            Self::Dataservices => "dataservices",
            Self::Credentials => "credentials",
        }
    }

    /// Parse a view mode from its short code
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "landscape" => Some(Self::Landscape),
            "firewalls" => Some(Self::Firewalls),
            "dataservices" | "data-services" => Some(Self::Dataservices),
            "credentials" => Some(Self::Credentials),
            _ => None,
        }
    }
}

/// Derive the projection for the given view mode
///
/// `landscape` is the canonical graph produced by the builder; model-driven
/// views ignore it apart from the readiness guard.
#[must_use]
pub fn derive(
    mode: ViewMode,
    model: &Model,
    landscape: &GraphData,
    selected_group: &str,
    selected_types: &HashSet<NodeKind>,
) -> GraphData {
    match mode {
        ViewMode::Landscape => {
            landscape::filter_landscape(landscape, selected_group, selected_types)
        }
        ViewMode::Firewalls => {
            firewalls::filter_firewalls(landscape, model, selected_group, selected_types)
        }
        ViewMode::Dataservices => {
            dataservices::filter_dataservices(model, selected_group, selected_types)
        }
        ViewMode::Credentials => {
            credentials::filter_credentials(model, selected_group, selected_types)
        }
    }
}

/// Order-preserving node accumulator with identifier deduplication
#[derive(Debug, Default)]
pub(crate) struct NodeBag {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl NodeBag {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert unless a node with the same id is already present
    pub(crate) fn add(&mut self, node: Node) {
        if !self.index.contains_key(&node.id) {
            self.index.insert(node.id.clone(), self.nodes.len());
            self.nodes.push(node);
        }
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}
