// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Model normalization: software relevance policy and catalog labels
//!
//! [`software_relevant`] is the single source of truth for "does this
//! software matter to any view". The graph builder, the summary listing and
//! every view that counts relevant software evaluate exactly this function,
//! so inclusion decisions can never drift between call sites.

use crate::types::Software;

/// Decide whether a software entry is relevant to any view
///
/// The policy is deterministic and short-circuiting; the order of the checks
/// is part of the contract:
///
/// 1. Workstation software (`person_index == 0`):
///    a. include if it provides user services;
///    b. otherwise exclude if it advertises no network services;
///    c. include if it accepts credentials;
///    d. include if it is part of an installed combination;
///    e. otherwise exclude.
/// 2. Server software: include iff it advertises network services.
#[must_use]
pub fn software_relevant(sw: &Software) -> bool {
    if sw.person_index == Some(0) {
        if !sw.provides_user_services.is_empty() {
            return true;
        }
        if sw.provides_network_services.is_empty() {
            return false;
        }
        if !sw.accepts_credentials.is_empty() {
            return true;
        }
        if !sw.installed_combination.is_empty() {
            return true;
        }
        return false;
    }
    !sw.provides_network_services.is_empty()
}

/// Count the relevant software entries of a computer's installed set
#[must_use]
pub fn count_relevant<'a, I>(software: I) -> usize
where
    I: IntoIterator<Item = &'a Software>,
{
    software.into_iter().filter(|sw| software_relevant(sw)).count()
}

/// Does the software advertise at least one real network service?
///
/// Bare numbers and `*connection*` pseudo-services do not count.
#[must_use]
pub fn provides_valid_network_service(sw: &Software) -> bool {
    sw.provides_network_services.iter().any(|srv| {
        let norm = srv.trim().to_lowercase();
        !norm.is_empty() && norm.parse::<f64>().is_err() && !norm.contains("connection")
    })
}

/// Stable human label for a software binary
///
/// Catalog binaries are special-cased by normalized name/CPE substring so the
/// same product always renders under the same label regardless of which
/// identifier variant the model carries. Whole-string checks run first, then
/// the extracted last path segment, then raw CPE fallbacks.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn binary_label(sw: &Software) -> String {
    let name = sw.name.as_deref().map(str::trim).unwrap_or_default();
    let cpe = sw.cpe_idn.as_deref().unwrap_or_default();
    let idn = sw.idn.as_deref().unwrap_or_default();
    let source = if !name.is_empty() {
        name
    } else if !cpe.is_empty() {
        cpe
    } else {
        idn
    };

    let norm_full = source.to_lowercase();

    if norm_full.contains("windows_server_2016") || norm_full.contains("windows server") {
        return "Windows Server 2016".to_string();
    }
    if norm_full.contains("exchange_server") || norm_full.contains("exchange server") {
        return "Exchange Server".to_string();
    }
    if norm_full.contains("sql_server:2019") || norm_full.contains("sql server 2019") {
        return "SQL Server 2019".to_string();
    }
    if norm_full.contains("internet_banking_server") || norm_full.contains("internet banking") {
        return "Internet Banking Server".to_string();
    }

    let extracted = source
        .rsplit([':', '/'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(source);
    let extracted = extracted.split('#').next().unwrap_or(extracted).to_string();
    let norm = extracted.replace('_', " ").to_lowercase();

    if norm.contains("sql server 2019")
        || (norm.contains("sql server") && norm.contains("2019"))
    {
        return "SQL Server 2019".to_string();
    }
    if norm.contains("internet banking") {
        return "Internet Banking Server".to_string();
    }
    if norm.contains("exchange server") {
        return "Exchange Server".to_string();
    }
    if norm.contains("windows server") {
        return "Windows Server 2016".to_string();
    }
    if norm.contains("iis") {
        return "IIS".to_string();
    }
    if norm.contains(".net") {
        return ".NET Framework".to_string();
    }
    if norm.contains("active directory") {
        return "Microsoft Active Directory".to_string();
    }
    if norm.contains("remote administration tools") {
        return "Remote Administration Tools".to_string();
    }
    if norm.contains("visual studio 2019") {
        return "Visual Studio 2019".to_string();
    }
    if norm.contains("windows 10") {
        return "Windows 10".to_string();
    }
    if norm.contains("windows 11") {
        return "Windows 11".to_string();
    }
    if norm.contains("internet connection") {
        return "Internet Connection".to_string();
    }

    if cpe.contains("remote_administration_tools") {
        return "Remote Administration Tools".to_string();
    }
    if cpe.contains("visual_studio_2019") {
        return "Visual Studio 2019".to_string();
    }
    if cpe.contains("fin_app_server") {
        return "Financial App Server".to_string();
    }
    if cpe.contains("windows_10") {
        return "Windows 10".to_string();
    }
    if cpe.contains("windows_11") {
        return "Windows 11".to_string();
    }
    if cpe.contains("microsoft:office") {
        return "Office".to_string();
    }
    if cpe.contains("microsoft:outlook") {
        return "Outlook".to_string();
    }
    if cpe.contains("mozilla:firefox") {
        return "Firefox".to_string();
    }
    if cpe.contains("fin_app_client") {
        return "Financial App Client".to_string();
    }
    if cpe.contains("internet_banking_server") {
        return "Internet Banking Server".to_string();
    }
    if cpe.contains("exchange_server") {
        return "Exchange Server".to_string();
    }
    if cpe.contains("windows_server_2016") {
        return "Windows Server 2016".to_string();
    }
    if cpe.contains("sql_server:2019") {
        return "SQL Server 2019".to_string();
    }
    if cpe.contains("microsoft:active_directory") {
        return "Microsoft Active Directory".to_string();
    }
    if cpe.contains("Internet_connection") {
        return "Internet Connection".to_string();
    }

    if extracted.is_empty() {
        source.to_string()
    } else {
        extracted
    }
}

/// Friendly user-service label for a binary label
#[must_use]
pub fn customer_label(binary_label: &str) -> &str {
    match binary_label {
        "Outlook" => "EmailClient",
        "Firefox" => "Browser",
        "Financial App Client" => "Finance",
        "Remote Administration Tools" => "Admin",
        "Visual Studio 2019" => "Dev:Windows",
        "SQL Server 2019" => "Database",
        "Internet Banking Server" => "Banking",
        "Exchange Server" => "EmailServer",
        "Windows Server 2016" => "Server:Windows",
        "Financial App Server" => "FinApp",
        other => other,
    }
}

/// Display label for a data asset identifier
#[must_use]
pub fn dataservice_label(ds_id: &str) -> String {
    let extracted = ds_id.split('#').next().unwrap_or(ds_id);
    let lower = extracted.to_lowercase();
    if lower.contains("emails") {
        return "Emails".to_string();
    }
    if lower.contains("financialdata:banking") {
        return "FinancialData:banking".to_string();
    }
    if lower.contains("sourcecode:internet_banking") {
        return "SourceCode:internet_banking".to_string();
    }
    extracted.to_string()
}

/// Operating-system-only software carries no visualization value
///
/// CPE class `o` entries without user services are excluded unless they are a
/// recognized server product. Windows Server 2016 is exempt.
#[must_use]
pub fn is_unwanted_operating_system(sw: &Software) -> bool {
    let cpe = sw.cpe_idn.as_deref().unwrap_or_default();
    let label = binary_label(sw).to_lowercase();

    if label.contains("windows server 2016") {
        return false;
    }

    let is_os = cpe.starts_with("cpe:/o:");
    let is_known_server =
        label.contains("server") || label.contains("exchange") || label.contains("banking");
    let has_user_services = !sw.provides_user_services.is_empty();

    is_os && !has_user_services && !is_known_server
}
