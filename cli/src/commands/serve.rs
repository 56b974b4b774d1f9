// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `serve` command: validate configuration, build the backend, run the listener.

use anyhow::{Context, Result};
use clap::Args;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use omics_wes_core::domain::config::{BackendKind, ConfigOverrides};
use omics_wes_core::infrastructure::build_backend;

use crate::server;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Execution role ARN passed to every started run
    #[arg(long, value_name = "ARN")]
    pub role_arn: Option<String>,

    /// Base output location, e.g. s3://bucket/prefix
    #[arg(long, value_name = "URI")]
    pub output_uri: Option<String>,

    /// Input location the execution role may read (repeatable)
    #[arg(long = "source-uri", value_name = "URI")]
    pub source_uris: Vec<String>,

    /// AWS region of the HealthOmics endpoint
    #[arg(long)]
    pub region: Option<String>,

    /// Workflow backend (omics, in-memory)
    #[arg(long, value_name = "KIND")]
    pub backend: Option<BackendKind>,

    /// Upper bound on a single backend call, in seconds
    #[arg(long, value_name = "SECS")]
    pub backend_timeout_secs: Option<u64>,

    /// Listener host
    #[arg(long, env = "OMICS_WES_HOST")]
    pub host: Option<String>,

    /// Listener port
    #[arg(long, env = "OMICS_WES_PORT")]
    pub port: Option<u16>,

    /// Prefix for WES routes, e.g. /ga4gh/wes/v1
    #[arg(long, value_name = "PATH")]
    pub base_path: Option<String>,

    /// Expose Prometheus metrics on this port
    #[arg(long, env = "OMICS_WES_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

impl ServeArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            role_arn: self.role_arn.clone(),
            output_uri: self.output_uri.clone(),
            source_uris: self.source_uris.clone(),
            region: self.region.clone(),
            backend: self.backend,
            backend_timeout_secs: self.backend_timeout_secs,
            bind_address: self.host.clone(),
            port: self.port,
            base_path: self.base_path.clone(),
        }
    }
}

pub async fn handle_command(args: ServeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_path, args.overrides())?;
    config.validate().context("Configuration validation failed")?;

    info!(
        backend = ?config.backend,
        output_uri = %config.output_uri,
        region = config.region.as_deref().unwrap_or("(default chain)"),
        "Configuration loaded"
    );

    if let Some(port) = args.metrics_port {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!("Metrics exporter listening on {}", addr);
    }

    let backend = build_backend(&config).await;
    server::run(Arc::new(config), backend).await
}
