// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Identifier codec for structural entity identifiers
//!
//! Entity identifiers in the landscape model encode ownership by string
//! structure: `computer>software#variant` for installed software,
//! `name:personIndex:networkId` for computers (`None:x:y` for servers),
//! `<service>-<softwareId>` for service bindings and `user-<role>` for
//! employee roles. This module is the single place that parses, builds and
//! rewrites those identifiers; every rename operation goes through
//! [`replace_structural`] so an unrelated substring that merely contains an
//! old identifier is never corrupted.

use crate::types::NO_NETWORK;

/// A parsed composite identifier (`computer>software#variant`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeId {
    /// Owning computer identifier
    pub computer: String,
    /// Software part, if present
    pub software: Option<String>,
    /// Variant suffix, if present
    pub variant: Option<String>,
}

impl CompositeId {
    /// Split an identifier on `>` then `#`
    ///
    /// An identifier without either separator parses as a bare computer id;
    /// the raw string is always recoverable, nothing fails here.
    #[must_use]
    pub fn parse(id: &str) -> Self {
        if let Some((computer, rest)) = id.split_once('>') {
            match rest.split_once('#') {
                Some((software, variant)) => Self {
                    computer: computer.to_string(),
                    software: Some(software.to_string()),
                    variant: Some(variant.to_string()),
                },
                None => Self {
                    computer: computer.to_string(),
                    software: Some(rest.to_string()),
                    variant: None,
                },
            }
        } else if let Some((computer, variant)) = id.split_once('#') {
            Self {
                computer: computer.to_string(),
                software: None,
                variant: Some(variant.to_string()),
            }
        } else {
            Self {
                computer: id.to_string(),
                software: None,
                variant: None,
            }
        }
    }

    /// Build a composite identifier from computer and software parts
    #[must_use]
    pub fn build(computer: &str, software: &str) -> String {
        format!("{computer}>{software}")
    }
}

/// A parsed computer structural key (`name:personIndex:networkId`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputerKey {
    /// Name prefix (may itself contain `:` separators)
    pub name: String,
    /// Person index segment
    pub person_index: String,
    /// Network identifier segment
    pub network_id: String,
}

impl ComputerKey {
    /// Parse a computer identifier; fewer than three segments leaves the
    /// whole string in `name` with empty index fields
    #[must_use]
    pub fn parse(id: &str) -> Self {
        let mut parts: Vec<&str> = id.split(':').collect();
        if parts.len() < 3 {
            return Self {
                name: id.to_string(),
                person_index: String::new(),
                network_id: String::new(),
            };
        }
        let network_id = parts.pop().unwrap_or_default().to_string();
        let person_index = parts.pop().unwrap_or_default().to_string();
        Self {
            name: parts.join(":"),
            person_index,
            network_id,
        }
    }

    /// Rebuild the structural key
    #[must_use]
    pub fn build(name: &str, person_index: &str, network_id: &str) -> String {
        format!("{name}:{person_index}:{network_id}")
    }

    /// Servers use the `None:x:y` form
    #[must_use]
    pub fn is_server(&self) -> bool {
        self.name == "None"
    }
}

/// First two `:` segments of a computer identifier, used to key user nodes
#[must_use]
pub fn short_user_id(computer_id: &str) -> String {
    computer_id.split(':').take(2).collect::<Vec<_>>().join(":")
}

/// Display form of a computer identifier (`None:0:0` becomes `server.0.0`)
#[must_use]
pub fn format_server_id(raw: &str) -> String {
    if let Some(rest) = raw.strip_prefix("None:") {
        return format!("server.{}", rest.replace(':', "."));
    }
    raw.replace(':', ".")
}

/// Display label for a computer node (`None` prefix becomes `server`)
#[must_use]
pub fn computer_label(id: &str) -> String {
    let relabeled = id
        .strip_prefix("None")
        .map_or_else(|| id.to_string(), |rest| format!("server{rest}"));
    relabeled.replace(':', ".")
}

/// Group key for a set of network segment identifiers
#[must_use]
pub fn network_group(network_ids: &[i64]) -> String {
    if network_ids.is_empty() {
        return NO_NETWORK.to_string();
    }
    let joined = network_ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("_");
    format!("network.internal.{joined}")
}

/// User role encoded in a workstation software identifier, if any
#[must_use]
pub fn user_id_from_software_id(software_id: &str) -> Option<String> {
    if software_id.starts_with("None") {
        return None;
    }
    let prefix = software_id.split('>').next().unwrap_or_default();
    if prefix.is_empty() {
        None
    } else {
        Some(prefix.to_string())
    }
}

/// Software identifier embedded in a user-service identifier, if any
#[must_use]
pub fn software_id_from_user_service_id(user_service_id: &str) -> Option<String> {
    let (_, rest) = user_service_id.split_once('>')?;
    let software = rest.split('#').next().unwrap_or_default();
    if software.is_empty() {
        None
    } else {
        Some(software.to_string())
    }
}

/// Identifier with its `#variant` suffix removed
#[must_use]
pub fn strip_variant(id: &str) -> &str {
    id.split('#').next().unwrap_or(id)
}

/// Vendor/product/version extracted from a CPE-like string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpeParts {
    /// Vendor segment (`Unknown` if absent)
    pub vendor: String,
    /// Product segment (`Unknown` if absent)
    pub product: String,
    /// Version segment (`N/A` if absent)
    pub version: String,
}

/// Fixed-position parse of a CPE-like string, after stripping a
/// `None:x:y>`-style prefix
#[must_use]
pub fn parse_cpe(cpe_string: &str) -> CpeParts {
    let cpe = cpe_string.split('>').nth(1).unwrap_or(cpe_string);
    let parts: Vec<&str> = cpe.split(':').collect();
    let pick = |idx: usize, fallback: &str| -> String {
        match parts.get(idx) {
            Some(part) if !part.is_empty() => (*part).to_string(),
            _ => fallback.to_string(),
        }
    };
    CpeParts {
        vendor: pick(2, "Unknown"),
        product: pick(3, "Unknown"),
        version: pick(4, "N/A"),
    }
}

/// Structural boundary characters that may precede an embedded identifier
fn boundary_before(byte: u8) -> bool {
    matches!(byte, b'-' | b'>' | b'#' | b'@')
}

/// Structural boundary characters that may follow an embedded identifier
fn boundary_after(byte: u8) -> bool {
    matches!(byte, b'-' | b'>' | b'#' | b'@')
}

/// Replace `old` with `new` wherever it occurs structurally in `value`
///
/// An occurrence is structural when it sits at the start of the string or
/// after a separator introduced by identifier composition (`-`, `>`, `#`,
/// `@`), and ends at the end of the string or before such a separator.
/// Matching is literal, so identifiers containing regex metacharacters need
/// no escaping, and `comp` never rewrites the inside of `composite`.
#[must_use]
pub fn replace_structural(value: &str, old: &str, new: &str) -> String {
    if old.is_empty() || value.is_empty() {
        return value.to_string();
    }

    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    let mut pos = 0;

    while let Some(found) = value[pos..].find(old) {
        let start = pos + found;
        let end = start + old.len();
        let before_ok = start == 0 || boundary_before(bytes[start - 1]);
        let after_ok = end == value.len() || boundary_after(bytes[end]);

        if before_ok && after_ok {
            out.push_str(&value[pos..start]);
            out.push_str(new);
            pos = end;
        } else {
            // Skip one character and keep scanning past this occurrence.
            let step = value[start..].chars().next().map_or(1, char::len_utf8);
            out.push_str(&value[pos..start + step]);
            pos = start + step;
        }
    }

    out.push_str(&value[pos..]);
    out
}
