// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for persistent data (model, derived graph)
    pub data_dir: std::path::PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Include operating-system-only software in the landscape
    pub show_operating_systems: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: directories::ProjectDirs::from("org", "hyperpolymath", "landgraph")
                .map(|d| d.data_dir().to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("~/.local/share/landgraph")),
            log_level: "info".to_string(),
            show_operating_systems: false,
        }
    }
}

/// Load configuration from disk or use defaults
pub fn load() -> Result<Config> {
    Ok(Config::default())
}
