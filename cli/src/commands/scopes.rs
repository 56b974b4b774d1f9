// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `scopes` command: print the IAM resource patterns for storage locations.
//!
//! With no locations on the command line, the configured output and source
//! locations are used.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use omics_wes_core::domain::config::ConfigOverrides;
use omics_wes_core::domain::scope::{ScopeDeriver, ScopeGrant};

#[derive(Args, Debug, Default)]
pub struct ScopesArgs {
    /// Storage locations, e.g. s3://bucket/prefix/
    #[arg(value_name = "URI")]
    pub uris: Vec<String>,

    /// ARN partition (aws, aws-cn, aws-us-gov)
    #[arg(long)]
    pub partition: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn handle_command(args: ScopesArgs, config_path: Option<PathBuf>) -> Result<()> {
    let (uris, partition) = if args.uris.is_empty() {
        let config = super::load_config(config_path, ConfigOverrides::default())?;
        let mut uris = Vec::new();
        if !config.output_uri.is_empty() {
            uris.push(config.output_uri.clone());
        }
        uris.extend(config.source_uris.iter().cloned());
        (uris, args.partition.unwrap_or(config.partition))
    } else {
        (
            args.uris,
            args.partition
                .unwrap_or_else(|| omics_wes_core::domain::scope::DEFAULT_PARTITION.to_string()),
        )
    };

    if uris.is_empty() {
        anyhow::bail!("No storage locations given and none configured");
    }

    let grants = ScopeDeriver::new(partition)
        .derive(&uris)
        .context("Failed to derive storage scopes")?;

    if args.json {
        let rendered: Vec<_> = uris
            .iter()
            .zip(&grants)
            .map(|(uri, grant)| {
                serde_json::json!({
                    "uri": uri,
                    "list_resource": grant.list_resource,
                    "access_resource": grant.access_resource,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        print_table(&uris, &grants);
    }

    Ok(())
}

fn print_table(uris: &[String], grants: &[ScopeGrant]) {
    for (uri, grant) in uris.iter().zip(grants) {
        println!("{}", uri.bold());
        println!("  list:   {}", grant.list_resource);
        println!("  access: {}", grant.access_resource.green());
    }
}
