//! RepSync CLI
//!
//! Command-line tools for exercising and debugging the sync
//! reconciler.
//!
//! # Commands
//!
//! - `replay` - Apply a JSON file of operations and print the partition
//! - `inspect-log` - Replay operations and dump the change log
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// RepSync command-line tools.
#[derive(Parser)]
#[command(name = "repsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a JSON file of operations and print the partition
    Replay {
        /// Path to the operations file (array or {"operations": [...]})
        #[arg(short, long)]
        operations: PathBuf,

        /// Caller user id
        #[arg(short, long, default_value = "local-user")]
        user: String,

        /// Caller tenant id
        #[arg(short, long, default_value = "local-tenant")]
        tenant: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Replay operations and dump the change log they produce
    InspectLog {
        /// Path to the operations file
        #[arg(short, long)]
        operations: PathBuf,

        /// Caller user id
        #[arg(short, long, default_value = "local-user")]
        user: String,

        /// Caller tenant id
        #[arg(short, long, default_value = "local-tenant")]
        tenant: String,

        /// Maximum number of entries to dump
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Replay {
            operations,
            user,
            tenant,
            format,
        } => {
            commands::replay::run(&operations, &user, &tenant, &format)?;
        }
        Commands::InspectLog {
            operations,
            user,
            tenant,
            limit,
            format,
        } => {
            commands::inspect_log::run(&operations, &user, &tenant, limit, &format)?;
        }
        Commands::Version => {
            println!("RepSync CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
