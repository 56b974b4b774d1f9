// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, policy

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use omics_wes_core::domain::config::{ConfigOverrides, FacadeConfig, ENV_CONFIG_PATH};
use omics_wes_core::domain::policy::ServiceRolePolicy;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Print as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration
    Validate {
        /// Path to config file (default: --config / OMICS_WES_CONFIG_PATH)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Print the IAM policy document for the HealthOmics execution role
    Policy {
        /// AWS account that owns the sequence and reference stores
        #[arg(long, env = "OMICS_WES_ACCOUNT_ID")]
        account_id: Option<String>,

        /// Region of the stores and workflow logs
        #[arg(long)]
        region: Option<String>,
    },
}

pub fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { yaml } => show(config_override, yaml),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Policy { account_id, region } => policy(config_override, account_id, region),
    }
}

fn load(path: Option<PathBuf>) -> Result<FacadeConfig> {
    super::load_config(path, ConfigOverrides::default())
}

fn show(config_override: Option<PathBuf>, as_yaml: bool) -> Result<()> {
    let source = config_override
        .clone()
        .or_else(|| std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from));
    let config = load(config_override)?;

    if as_yaml {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    match &source {
        Some(path) => println!("  Source: {}", path.display()),
        None => println!("  Source: {}", "(defaults + environment)".dimmed()),
    }
    println!();

    println!("{}", "Backend:".bold());
    println!("  Kind: {:?}", config.backend);
    println!("  Role ARN: {}", or_unset(&config.role_arn));
    println!("  Region: {}", config.region.as_deref().unwrap_or("(default chain)"));
    match config.backend_timeout() {
        Some(timeout) => println!("  Timeout: {}s", timeout.as_secs()),
        None => println!("  Timeout: {}", "(none)".dimmed()),
    }
    println!();

    println!("{}", "Storage:".bold());
    println!("  Output: {}", or_unset(&config.output_uri));
    for uri in &config.source_uris {
        println!("  Source: {}", uri);
    }
    println!();

    println!("{}", "Listener:".bold());
    println!("  Address: {}", config.listen_address());
    println!(
        "  Base path: {}",
        if config.base_path.is_empty() { "/" } else { config.base_path.as_str() }
    );

    Ok(())
}

fn or_unset(value: &str) -> String {
    if value.is_empty() {
        "(not set)".dimmed().to_string()
    } else {
        value.to_string()
    }
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = load(config_path)?;

    match config.validate() {
        Ok(()) => {
            println!("{}", "✓ Configuration is valid".green());
            Ok(())
        }
        Err(err) => {
            println!("{} {}", "✗".red(), err);
            Err(err).context("Configuration validation failed")
        }
    }
}

fn policy(
    config_path: Option<PathBuf>,
    account_id: Option<String>,
    region: Option<String>,
) -> Result<()> {
    let config = load(config_path)?;

    let account_id = account_id
        .or_else(|| config.account_id.clone())
        .context("An account id is required (--account-id, OMICS_WES_ACCOUNT_ID or account_id in config)")?;
    let region = region
        .or_else(|| config.region.clone())
        .context("A region is required (--region, OMICS_WES_REGION or region in config)")?;

    if config.output_uri.is_empty() {
        anyhow::bail!("output_uri must be configured to render the policy");
    }

    let document = ServiceRolePolicy::new(config.partition.clone(), region, account_id)
        .build(&config.output_uri, &config.source_uris)
        .context("Failed to build execution role policy")?;

    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
