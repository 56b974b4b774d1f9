// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # omics-wes
//!
//! GA4GH Workflow Execution Service facade over AWS HealthOmics.
//!
//! ## Commands
//!
//! - `omics-wes serve` - Run the WES HTTP listener
//! - `omics-wes scopes` - Print the storage scope grants for configured locations
//! - `omics-wes config show|validate|policy` - Configuration management
//!
//! Configuration is read from `--config`, then `OMICS_WES_*` environment
//! variables (a `.env` file in the working directory is loaded first), then
//! command-line flags.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use omics_wes::commands::{self, ConfigCommand, ScopesArgs, ServeArgs};

/// GA4GH WES facade for AWS HealthOmics
#[derive(Parser)]
#[command(name = "omics-wes")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (YAML or JSON)
    #[arg(
        short,
        long,
        global = true,
        env = "OMICS_WES_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "OMICS_WES_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the WES API
    #[command(name = "serve")]
    Serve(ServeArgs),

    /// Print IAM resource scopes for storage locations
    #[command(name = "scopes")]
    Scopes(ScopesArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is normal outside local development
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Serve(args) => commands::serve::handle_command(args, cli.config).await,
        Commands::Scopes(args) => commands::scopes::handle_command(args, cli.config),
        Commands::Config { command } => commands::config::handle_command(command, cli.config),
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
