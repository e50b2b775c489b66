// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Model loading and structural validation
//!
//! Parsing is strict about shape (a non-object `computers` is a parse
//! error); semantic problems - dangling references, prefix mismatches - are
//! collected into a violation list instead of failing the load. Derivation
//! passes skip such entries silently; `landgraph validate` surfaces the full
//! list.

use crate::types::{Model, INTERNET};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors reading a model file
#[derive(Debug, Error)]
pub enum ModelError {
    /// The file could not be read
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid model JSON
    #[error("failed to parse model JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A semantic violation found by [`validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A credential's `stored_at` references a missing computer
    DanglingStoredAt {
        /// Credential identifier
        credential: String,
        /// Missing computer identifier
        computer: String,
    },
    /// A credential's `linked_software` computer prefix is unknown
    DanglingLinkedSoftware {
        /// Credential identifier
        credential: String,
        /// Unresolvable software identifier
        software: String,
    },
    /// An installed-software key does not carry its computer's prefix
    SoftwareKeyPrefixMismatch {
        /// Computer identifier
        computer: String,
        /// Offending software key
        software: String,
    },
    /// A firewall rule endpoint resolves to nothing
    UnknownFirewallEndpoint {
        /// Rule identifier
        rule: String,
        /// Unresolvable endpoint
        endpoint: String,
    },
    /// A data asset links software installed nowhere
    DataAssetUnknownSoftware {
        /// Asset identifier
        asset: String,
        /// Unresolvable software reference
        software: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingStoredAt {
                credential,
                computer,
            } => write!(
                f,
                "credential {credential}: stored_at references missing computer {computer}"
            ),
            Self::DanglingLinkedSoftware {
                credential,
                software,
            } => write!(
                f,
                "credential {credential}: linked_software {software} has no owning computer"
            ),
            Self::SoftwareKeyPrefixMismatch { computer, software } => write!(
                f,
                "computer {computer}: software key {software} is not prefixed by its computer"
            ),
            Self::UnknownFirewallEndpoint { rule, endpoint } => {
                write!(f, "firewall rule {rule}: unknown endpoint {endpoint}")
            }
            Self::DataAssetUnknownSoftware { asset, software } => {
                write!(f, "data asset {asset}: linked software {software} is not installed anywhere")
            }
        }
    }
}

/// Read and parse a model file
pub fn read_model(path: &Path) -> Result<Model, ModelError> {
    let content = std::fs::read_to_string(path)?;
    let model: Model = serde_json::from_str(&content)?;
    Ok(model)
}

/// Collect every structural violation in the model
///
/// An empty result means every cross-reference resolves. Violations do not
/// prevent derivation; the affected entries are simply skipped there.
#[must_use]
pub fn validate(model: &Model) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (comp_id, comp) in &model.computers {
        for sw_id in comp.installed_software.keys() {
            // Keys reference their owner by `>`/`#` prefix; entries that
            // reference *another* computer are legal, entries with no known
            // prefix at all are not.
            let owner = sw_id
                .split_once('>')
                .map_or_else(|| sw_id.split_once('#').map(|(owner, _)| owner), |(owner, _)| Some(owner));
            match owner {
                Some(owner) if model.computers.contains_key(owner) => {}
                _ => violations.push(Violation::SoftwareKeyPrefixMismatch {
                    computer: comp_id.clone(),
                    software: sw_id.clone(),
                }),
            }
        }
    }

    for (cred_id, cred) in &model.credentials {
        for comp_id in &cred.stored_at {
            if !model.computers.contains_key(comp_id) {
                violations.push(Violation::DanglingStoredAt {
                    credential: cred_id.clone(),
                    computer: comp_id.clone(),
                });
            }
        }
        for sw_id in &cred.linked_software {
            let owner = sw_id.split('>').next().unwrap_or_default();
            if !model.computers.contains_key(owner) {
                violations.push(Violation::DanglingLinkedSoftware {
                    credential: cred_id.clone(),
                    software: sw_id.clone(),
                });
            }
        }
    }

    for (rule_id, rule) in &model.firewall_rules {
        for endpoint in rule.from_objects.iter().chain(rule.to_objects.iter()) {
            if endpoint == INTERNET {
                continue;
            }
            let resolves = if let Some((comp_id, _)) = endpoint.split_once('>') {
                model
                    .computers
                    .get(comp_id)
                    .is_some_and(|comp| comp.installed_software.contains_key(endpoint))
            } else {
                model.computers.contains_key(endpoint)
            };
            if !resolves {
                violations.push(Violation::UnknownFirewallEndpoint {
                    rule: rule_id.clone(),
                    endpoint: endpoint.clone(),
                });
            }
        }
    }

    for (asset_id, asset) in &model.data {
        for sw_ref in &asset.linked_software {
            let cpe = crate::ident::strip_variant(sw_ref);
            let installed_somewhere = model.computers.values().any(|comp| {
                comp.installed_software
                    .values()
                    .any(|sw| sw.cpe_idn.as_deref() == Some(cpe))
            });
            if !installed_somewhere {
                violations.push(Violation::DataAssetUnknownSoftware {
                    asset: asset_id.clone(),
                    software: sw_ref.clone(),
                });
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Computer, Credential, FirewallRule, Software};
    use std::collections::BTreeMap;

    fn valid_model() -> Model {
        let mut comp = Computer {
            idn: Some("compA".to_string()),
            ..Computer::default()
        };
        comp.installed_software.insert(
            "compA>sw1".to_string(),
            Software {
                cpe_idn: Some("cpe:/a:acme:tool:1".to_string()),
                person_index: Some(0),
                provides_user_services: vec!["Tool".to_string()],
                ..Software::default()
            },
        );

        let mut computers = BTreeMap::new();
        computers.insert("compA".to_string(), comp);

        let mut credentials = BTreeMap::new();
        credentials.insert(
            "cred1".to_string(),
            Credential {
                stored_at: vec!["compA".to_string()],
                linked_software: vec!["compA>sw1".to_string()],
                ..Credential::default()
            },
        );

        let mut firewall_rules = BTreeMap::new();
        firewall_rules.insert(
            "rule1".to_string(),
            FirewallRule {
                from_objects: vec![INTERNET.to_string()],
                to_objects: vec!["compA>sw1".to_string()],
                ..FirewallRule::default()
            },
        );

        Model {
            computers,
            credentials,
            firewall_rules,
            ..Model::default()
        }
    }

    #[test]
    fn valid_model_has_no_violations() {
        assert!(validate(&valid_model()).is_empty());
    }

    #[test]
    fn dangling_references_are_reported() {
        let mut model = valid_model();
        model
            .credentials
            .get_mut("cred1")
            .unwrap()
            .stored_at
            .push("ghost".to_string());
        model.firewall_rules.get_mut("rule1").unwrap().to_objects
            .push("ghost>sw".to_string());

        let violations = validate(&model);
        assert!(violations.iter().any(|v| matches!(
            v,
            Violation::DanglingStoredAt { computer, .. } if computer == "ghost"
        )));
        assert!(violations.iter().any(|v| matches!(
            v,
            Violation::UnknownFirewallEndpoint { endpoint, .. } if endpoint == "ghost>sw"
        )));
    }

    #[test]
    fn prefix_mismatch_is_reported() {
        let mut model = valid_model();
        model
            .computers
            .get_mut("compA")
            .unwrap()
            .installed_software
            .insert("unprefixed".to_string(), Software::default());

        let violations = validate(&model);
        assert!(violations.iter().any(|v| matches!(
            v,
            Violation::SoftwareKeyPrefixMismatch { software, .. } if software == "unprefixed"
        )));
    }

    #[test]
    fn parse_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{\"computers\": []}").unwrap();
        assert!(matches!(read_model(&path), Err(ModelError::Parse(_))));

        std::fs::write(&path, "{\"computers\": {}}").unwrap();
        let model = read_model(&path).unwrap();
        assert!(!model.is_ready());
    }
}
