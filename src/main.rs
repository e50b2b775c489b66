// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Landgraph CLI - graph projections for IT landscape models

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use landgraph::commands;

#[derive(Parser)]
#[command(name = "landgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,

    /// Data directory override
    #[arg(long, env = "LANDGRAPH_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::BoolishValueParser::new())]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a model file and build the landscape graph
    Load {
        /// Path to the model JSON file
        path: std::path::PathBuf,

        /// Include operating-system-only software
        #[arg(long)]
        show_operating_systems: bool,
    },

    /// Derive a graph projection (landscape, firewalls, dataservices, credentials)
    View {
        /// View mode
        mode: String,

        /// Restrict to a group (network partition)
        #[arg(short, long)]
        group: Option<String>,

        /// Restrict to node types (comma-separated)
        #[arg(short, long)]
        types: Option<String>,

        /// Output format (json, dot)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Rename a computer across the model and derived graph
    Rename {
        /// Current computer identifier
        old_id: String,

        /// New computer identifier
        new_id: String,
    },

    /// Move a computer to different network segments
    SetNetwork {
        /// Computer identifier
        computer: String,

        /// Network segment identifiers (comma-separated)
        #[arg(short, long)]
        networks: String,

        /// New display label for the computer
        #[arg(short, long)]
        label: Option<String>,

        /// View whose propagation policy applies
        #[arg(long, default_value = "landscape")]
        view: String,
    },

    /// Check a model for structural violations
    Validate {
        /// Model file (defaults to the stored workspace model)
        path: Option<std::path::PathBuf>,
    },

    /// List groups in the stored landscape graph
    Groups,

    /// List node types in the stored landscape graph
    Types,

    /// Export the landscape graph to various formats
    Export {
        /// Output format (dot, json)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(dir) = &cli.data_dir {
        std::env::set_var("LANDGRAPH_DATA_DIR", dir);
    }
    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    // Execute command
    match cli.command {
        Commands::Load {
            path,
            show_operating_systems,
        } => commands::load::run(path, show_operating_systems),
        Commands::View {
            mode,
            group,
            types,
            format,
            output,
        } => commands::view::run(&mode, group, types, &format, output),
        Commands::Rename { old_id, new_id } => commands::rename::run(&old_id, &new_id),
        Commands::SetNetwork {
            computer,
            networks,
            label,
            view,
        } => commands::network::run(&computer, &networks, label, &view),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Groups => commands::info::groups(),
        Commands::Types => commands::info::types(),
        Commands::Export { format, output } => commands::export::run(&format, output),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "landgraph",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
