// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Validate command - reports structural violations in a model

use crate::graph::{data_dir, Workspace};
use crate::loader::{read_model, validate};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// Run the validate command
///
/// Validates the given model file, or the stored workspace model when no
/// path is provided.
pub fn run(path: Option<PathBuf>) -> Result<()> {
    let model = match path {
        Some(path) => read_model(&path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?,
        None => {
            let dir = data_dir()?;
            Workspace::load(&dir)
                .with_context(|| format!("Failed to load workspace from {}", dir.display()))?
                .model
        }
    };

    if !model.is_ready() {
        println!("Model is empty (not ready); nothing to validate.");
        return Ok(());
    }

    let violations = validate(&model);
    if violations.is_empty() {
        println!("{} no structural violations", "ok:".green().bold());
        return Ok(());
    }

    for violation in &violations {
        eprintln!("  {violation}");
    }
    anyhow::bail!("{} structural violation(s) found", violations.len());
}
