// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Landgraph library - graph projections for IT landscape models
//!
//! This crate derives visualization graphs ("landscape", "firewalls",
//! "data-services", "credentials") from a declarative model of an IT
//! landscape, and propagates identifier/attribute edits consistently
//! across the model and every derived structure.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod build;
pub mod commands;
pub mod config;
pub mod filter;
pub mod graph;
pub mod history;
pub mod ident;
pub mod loader;
pub mod normalize;
pub mod propagate;
pub mod views;

/// Core data types matching the landscape model schema
pub mod types {
    use serde::{Deserialize, Deserializer, Serialize};
    use std::collections::BTreeMap;

    /// Sentinel endpoint used by firewall rules for the public internet
    pub const INTERNET: &str = "INTERNET";

    /// Group key for nodes without any network assignment
    pub const NO_NETWORK: &str = "no-network";

    // =========================================================================
    // Raw Model Records
    // =========================================================================

    /// A software entry installed on exactly one computer
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Software {
        /// Structural identifier (`computer>software#variant`)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub idn: Option<String>,
        /// Human-readable name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        /// Identifier of the owning computer
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub computer_idn: Option<String>,
        /// CPE-like vendor:product:version string
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub cpe_idn: Option<String>,
        /// Version string, if known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub version: Option<String>,
        /// 0 marks end-user workstation software; anything else is server-side
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub person_index: Option<i64>,
        /// Role of the person using this software, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub person_group_id: Option<String>,
        /// User-facing services this software provides
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub provides_user_services: Vec<String>,
        /// Network services this software advertises
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub provides_network_services: Vec<String>,
        /// Credentials accepted for authentication
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub accepts_credentials: Vec<String>,
        /// Identifiers of combined installations
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub installed_combination: Vec<String>,
        /// Other software on the same computer this entry depends on
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub local_dependencies: Vec<String>,
    }

    /// A computer (workstation or server) in the landscape
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Computer {
        /// Structural identifier (`name:personIndex:networkId`, servers `None:x:y`)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub idn: Option<String>,
        /// Display label override
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub label: Option<String>,
        /// Human-readable name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        /// Network segments this computer belongs to (scalar accepted on input)
        #[serde(default, deserialize_with = "one_or_many")]
        pub network_idn: Vec<i64>,
        /// Consumed hardware quota
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub used_hardware_quota: Option<f64>,
        /// Installed software keyed by structural identifier
        #[serde(default)]
        pub installed_software: BTreeMap<String, Software>,
        /// Data assets hosted on this computer
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub data: Vec<String>,
        /// Credentials stored on this computer
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub stored_credentials: Vec<String>,
        /// Network services the computer itself advertises
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub provides_network_services: Vec<String>,
    }

    /// A credential (password, key, service account)
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Credential {
        /// Credential identifier
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub idn: Option<String>,
        /// Grants root/administrative access
        #[serde(default)]
        pub has_root: bool,
        /// Computers this credential is stored on
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub stored_at: Vec<String>,
        /// Software identifiers this credential unlocks
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub linked_software: Vec<String>,
        /// (role, person index) pairs of employees holding this credential
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub linked_employees: Vec<(String, i64)>,
    }

    impl Credential {
        /// True if any linked employee has person index 0
        #[must_use]
        pub fn has_employee_zero(&self) -> bool {
            self.linked_employees.iter().any(|(_, idx)| *idx == 0)
        }
    }

    /// A data asset hosted somewhere in the landscape
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct DataAsset {
        /// Asset identifier
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub idn: Option<String>,
        /// Identifier of the data definition this asset instantiates
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub data_definition_idn: Option<String>,
        /// Person indexes with access; containing 0 gates end-user relevance
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub person_indexes: Vec<i64>,
        /// Person groups (roles) with access
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub person_groups: Vec<String>,
        /// Software identifiers that read or write this asset
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub linked_software: Vec<String>,
        /// Software identifier of the principal owner
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub principal_software: Option<String>,
    }

    /// A firewall rule between endpoints (software, computer, or `INTERNET`)
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct FirewallRule {
        /// Rule identifier
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub idn: Option<String>,
        /// Source endpoints
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub from_objects: Vec<String>,
        /// Destination endpoints
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub to_objects: Vec<String>,
    }

    /// A declared data collection referencing services by name
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct DataCollection {
        /// Collection identifier
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub idn: Option<String>,
        /// Service names this collection consumes
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub services: Vec<String>,
    }

    /// The complete raw landscape model
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Model {
        /// Computers keyed by structural identifier
        #[serde(default)]
        pub computers: BTreeMap<String, Computer>,
        /// Credentials keyed by identifier
        #[serde(default)]
        pub credentials: BTreeMap<String, Credential>,
        /// Data assets keyed by identifier
        #[serde(default)]
        pub data: BTreeMap<String, DataAsset>,
        /// Firewall rules keyed by identifier
        #[serde(default)]
        pub firewall_rules: BTreeMap<String, FirewallRule>,
        /// Employee groups: group name -> role -> declaration
        #[serde(default)]
        pub employee_groups: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
        /// Network segments keyed by identifier
        #[serde(default)]
        pub network_segments: BTreeMap<String, serde_json::Value>,
        /// Declared data collections
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub data_collections: Vec<DataCollection>,
        /// Service names exposed to the internet
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub provided_external_services: Vec<String>,
    }

    impl Model {
        /// A model with no computers is not ready for derivation
        #[must_use]
        pub fn is_ready(&self) -> bool {
            !self.computers.is_empty()
        }
    }

    /// Accept a scalar where the model sometimes writes a one-element list
    fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(i64),
            Many(Vec<i64>),
        }

        Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
            None => Vec::new(),
            Some(OneOrMany::One(id)) => vec![id],
            Some(OneOrMany::Many(ids)) => ids,
        })
    }

    // =========================================================================
    // Derived Graph
    // =========================================================================

    /// Node classification in the derived graph
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum NodeKind {
        /// A computer (workstation or server)
        Computer,
        /// An installed software binary
        Software,
        /// An employee role
        User,
        /// A network service endpoint
        Service,
        /// A user-facing service
        UserService,
        /// A data asset projection
        Dataservice,
        /// A non-root credential
        Key,
        /// A root/administrative credential
        Lock,
        /// The internet sentinel
        Internet,
    }

    impl NodeKind {
        /// Short code as used in serialized graphs and CLI filters
        #[must_use]
        pub fn code(&self) -> &'static str {
            match self {
                Self::Computer => "computer",
                Self::Software => "software",
                Self::User => "user",
                Self::Service => "service",
                Self::UserService => "user-service",
                Self::Dataservice => "dataservice",
                Self::Key => "key",
                Self::Lock => "lock",
                Self::Internet => "internet",
            }
        }

        /// Parse a node kind from its short code
        #[must_use]
        pub fn parse(code: &str) -> Option<Self> {
            match code {
                "computer" => Some(Self::Computer),
                "software" => Some(Self::Software),
                "user" => Some(Self::User),
                "service" => Some(Self::Service),
                "user-service" => Some(Self::UserService),
                "dataservice" => Some(Self::Dataservice),
                "key" => Some(Self::Key),
                "lock" => Some(Self::Lock),
                "internet" => Some(Self::Internet),
                _ => None,
            }
        }
    }

    /// Edge classification in the derived graph
    ///
    /// Kinds with a `-virtual` suffix are synthesized by view filters from
    /// implied structural relationships rather than present in the model.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum EdgeKind {
        /// Computer hosts software
        ComputerSoftware,
        /// User role works at a computer
        UserComputer,
        /// Software advertises a network service
        SoftwareService,
        /// Software provides a user-facing service
        SoftwareUserService,
        /// Server computer advertises a service directly
        ComputerService,
        /// Traffic to or from the internet sentinel
        Internet,
        /// Server-to-server firewall flow
        SoftwareSoftware,
        /// Credential stored at a computer
        CredentialComputer,
        /// Credential unlocks software
        CredentialSoftware,
        /// Credential held by a user
        CredentialUser,
        /// Non-root credential to its holder
        UserKey,
        /// Holder to a root credential
        UserLock,
        /// Data asset linked to software
        DataserviceSoftware,
        /// Data asset to its principal software
        DataservicePrincipal,
        /// User group accessing a data asset
        UserDataservice,
        /// Synthesized user-to-software relation (same computer)
        UserSoftwareVirtual,
        /// Synthesized software-to-service/user-service relation
        SoftwareSubVirtual,
        /// Synthesized user-to-user-service relation
        UserUserServiceVirtual,
        /// Synthesized computer-to-user-service relation
        ComputerUserServiceVirtual,
        /// Synthesized computer-to-service relation
        ComputerServiceVirtual,
        /// Synthesized computer-to-software relation
        ComputerSoftwareVirtual,
    }

    /// Back-references from a derived node to its originating records
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct NodeMeta {
        /// Owning computer identifier
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub computer_idn: Option<String>,
        /// Network segments carried for group recomputation
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub network_ids: Option<Vec<i64>>,
        /// Person index of the originating software
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub person_index: Option<i64>,
        /// CPE string of the originating software
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub cpe: Option<String>,
        /// Version of the originating software
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub version: Option<String>,
        /// User role derived from the software identifier
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub user_id: Option<String>,
        /// Styling/filter marker for credential nodes
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub credential_group: Option<String>,
        /// Data asset identifiers hosted by a computer node
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub data: Option<Vec<String>>,
        /// Originating computer record
        #[serde(
            rename = "originalComputer",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        pub origin_computer: Option<Computer>,
        /// Originating software record
        #[serde(
            rename = "originalSoftware",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        pub origin_software: Option<Software>,
        /// Originating credential record
        #[serde(
            rename = "originalCredential",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        pub origin_credential: Option<Credential>,
        /// Originating data asset record
        #[serde(
            rename = "originalDataservice",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        pub origin_data: Option<DataAsset>,
        /// Originating user role
        #[serde(
            rename = "originalUser",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        pub origin_user: Option<String>,
    }

    /// A node in a derived graph projection
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Node {
        /// Node identifier (structural, per the model convention)
        pub id: String,
        /// Display label
        pub label: String,
        /// Node classification
        #[serde(rename = "type")]
        pub kind: NodeKind,
        /// Group key (network partition, `no-network`, or `internet`)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub group: Option<String>,
        /// Untruncated identifier or name
        #[serde(
            rename = "fullName",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        pub full_name: Option<String>,
        /// Layout seed x coordinate
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub x: Option<f64>,
        /// Layout seed y coordinate
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub y: Option<f64>,
        /// Back-references to originating records
        #[serde(default)]
        pub meta: NodeMeta,
    }

    impl Node {
        /// Create a node with the given identity and no metadata
        #[must_use]
        pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
            let id = id.into();
            Self {
                full_name: Some(id.clone()),
                id,
                label: label.into(),
                kind,
                group: None,
                x: None,
                y: None,
                meta: NodeMeta::default(),
            }
        }

        /// Set the group key
        #[must_use]
        pub fn with_group(mut self, group: impl Into<String>) -> Self {
            self.group = Some(group.into());
            self
        }
    }

    /// An edge endpoint: a bare identifier or a resolved node reference
    ///
    /// Both forms must survive serialization unchanged; which one appears
    /// depends on the pipeline stage that produced the edge.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum EdgeEndpoint {
        /// Bare node identifier
        Id(String),
        /// Resolved node reference
        Resolved(Box<Node>),
    }

    impl EdgeEndpoint {
        /// The node identifier regardless of representation
        #[must_use]
        pub fn id(&self) -> &str {
            match self {
                Self::Id(id) => id,
                Self::Resolved(node) => &node.id,
            }
        }
    }

    impl From<&str> for EdgeEndpoint {
        fn from(id: &str) -> Self {
            Self::Id(id.to_string())
        }
    }

    impl From<String> for EdgeEndpoint {
        fn from(id: String) -> Self {
            Self::Id(id)
        }
    }

    /// An edge in a derived graph projection
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Edge {
        /// Edge identifier
        pub id: String,
        /// Source endpoint
        pub source: EdgeEndpoint,
        /// Target endpoint
        pub target: EdgeEndpoint,
        /// Edge classification
        #[serde(rename = "type")]
        pub kind: EdgeKind,
        /// Optional display label
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub label: Option<String>,
    }

    impl Edge {
        /// Create an edge between two endpoints
        #[must_use]
        pub fn new(
            id: impl Into<String>,
            source: impl Into<EdgeEndpoint>,
            target: impl Into<EdgeEndpoint>,
            kind: EdgeKind,
        ) -> Self {
            Self {
                id: id.into(),
                source: source.into(),
                target: target.into(),
                kind,
                label: None,
            }
        }
    }

    /// A derived graph projection: the node/edge lists handed to renderers
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct GraphData {
        /// All nodes of the projection
        #[serde(default)]
        pub nodes: Vec<Node>,
        /// All edges of the projection
        #[serde(default)]
        pub edges: Vec<Edge>,
    }

    impl GraphData {
        /// An empty projection (the "not ready" result)
        #[must_use]
        pub fn empty() -> Self {
            Self::default()
        }

        /// True if the projection carries no nodes
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.nodes.is_empty()
        }

        /// Look up a node by identifier
        #[must_use]
        pub fn node(&self, id: &str) -> Option<&Node> {
            self.nodes.iter().find(|n| n.id == id)
        }

        /// Replace every resolved endpoint with its bare identifier
        #[must_use]
        pub fn simplify_edges(mut self) -> Self {
            for edge in &mut self.edges {
                let source = edge.source.id().to_string();
                let target = edge.target.id().to_string();
                edge.source = EdgeEndpoint::Id(source);
                edge.target = EdgeEndpoint::Id(target);
            }
            self
        }

        /// Replace every bare endpoint with a resolved node reference,
        /// dropping edges whose endpoints are not present
        #[must_use]
        pub fn resolve_edges(self) -> Self {
            let nodes = self.nodes;
            let edges = self
                .edges
                .into_iter()
                .filter_map(|mut edge| {
                    let source = nodes.iter().find(|n| n.id == edge.source.id())?;
                    let target = nodes.iter().find(|n| n.id == edge.target.id())?;
                    edge.source = EdgeEndpoint::Resolved(Box::new(source.clone()));
                    edge.target = EdgeEndpoint::Resolved(Box::new(target.clone()));
                    Some(edge)
                })
                .collect();
            Self { nodes, edges }
        }
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
