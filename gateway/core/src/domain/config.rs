// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Facade Configuration
//!
//! Loaded once at startup and shared immutably (`Arc<FacadeConfig>`) by every
//! request. Sources, lowest precedence first:
//!
//! 1. YAML or JSON file (`--config` / `OMICS_WES_CONFIG_PATH`)
//! 2. `OMICS_WES_*` environment variables
//! 3. command-line flags, applied by the binary through [`ConfigOverrides`]
//!
//! The file accepts the deployment's `data-locations.json` shape as well:
//! `output_bucket_uri` is an alias for `output_uri`.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Deployment settings for the run handler, backend and listener

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::scope::{ScopeDeriver, ScopeError, DEFAULT_PARTITION};

pub const ENV_CONFIG_PATH: &str = "OMICS_WES_CONFIG_PATH";
pub const ENV_ROLE_ARN: &str = "OMICS_WES_ROLE_ARN";
pub const ENV_OUTPUT_URI: &str = "OMICS_WES_OUTPUT_URI";
pub const ENV_REGION: &str = "OMICS_WES_REGION";
pub const ENV_BACKEND_TIMEOUT_SECS: &str = "OMICS_WES_BACKEND_TIMEOUT_SECS";
pub const ENV_BACKEND: &str = "OMICS_WES_BACKEND";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid value `{value}` for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set")]
    Missing(&'static str),

    #[error(transparent)]
    Scope(#[from] ScopeError),
}

/// Which [`WorkflowBackend`](crate::domain::backend::WorkflowBackend) adapter to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    #[default]
    Omics,
    InMemory,
}

impl std::str::FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "omics" => Ok(Self::Omics),
            "in-memory" | "in_memory" | "memory" => Ok(Self::InMemory),
            _ => Err(ConfigError::InvalidValue {
                key: "backend",
                value: value.to_string(),
                reason: "expected `omics` or `in-memory`".to_string(),
            }),
        }
    }
}

/// Fields of the GA4GH service-info document that vary per deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfoSettings {
    #[serde(default = "default_service_id")]
    pub id: String,

    #[serde(default = "default_service_name")]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_organization_name")]
    pub organization_name: String,

    #[serde(default = "default_organization_url")]
    pub organization_url: String,

    #[serde(default)]
    pub contact_url: Option<String>,

    #[serde(default)]
    pub environment: Option<String>,
}

impl Default for ServiceInfoSettings {
    fn default() -> Self {
        Self {
            id: default_service_id(),
            name: default_service_name(),
            description: None,
            organization_name: default_organization_name(),
            organization_url: default_organization_url(),
            contact_url: None,
            environment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacadeConfig {
    /// Execution role the backend assumes for every started run
    #[serde(default)]
    pub role_arn: String,

    /// Base output location; runs write under `<output_uri>/workflow-output/`
    #[serde(default, alias = "output_bucket_uri")]
    pub output_uri: String,

    /// Input locations the execution role may read
    #[serde(default)]
    pub source_uris: Vec<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default = "default_partition")]
    pub partition: String,

    /// Only needed to render the execution role policy
    #[serde(default)]
    pub account_id: Option<String>,

    #[serde(default)]
    pub backend: BackendKind,

    /// Upper bound on a single backend call
    #[serde(default)]
    pub backend_timeout_secs: Option<u64>,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix every WES route is nested under, e.g. `/ga4gh/wes/v1`
    #[serde(default)]
    pub base_path: String,

    #[serde(default)]
    pub service_info: ServiceInfoSettings,
}

/// Values supplied on the command line; `None` leaves the loaded value alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub role_arn: Option<String>,
    pub output_uri: Option<String>,
    pub source_uris: Vec<String>,
    pub region: Option<String>,
    pub backend: Option<BackendKind>,
    pub backend_timeout_secs: Option<u64>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub base_path: Option<String>,
}

fn default_partition() -> String {
    DEFAULT_PARTITION.to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_service_id() -> String {
    "ai.100monkeys.omics-wes".to_string()
}

fn default_service_name() -> String {
    "HealthOmics WES".to_string()
}

fn default_organization_name() -> String {
    "100monkeys.ai".to_string()
}

fn default_organization_url() -> String {
    "https://100monkeys.ai".to_string()
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            role_arn: String::new(),
            output_uri: String::new(),
            source_uris: Vec::new(),
            region: None,
            partition: default_partition(),
            account_id: None,
            backend: BackendKind::default(),
            backend_timeout_secs: None,
            bind_address: default_bind_address(),
            port: default_port(),
            base_path: String::new(),
            service_info: ServiceInfoSettings::default(),
        }
    }
}

impl FacadeConfig {
    /// Parse a YAML document. JSON is valid YAML, so `data-locations.json`
    /// parses here too.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load from an explicit path, else from `OMICS_WES_CONFIG_PATH`, else
    /// start from defaults. Environment overrides are applied in every case.
    pub fn load(cli_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = cli_path.or_else(|| std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading configuration from {:?}", path);
                Self::from_file(&path)?
            }
            None => {
                tracing::debug!("No configuration file given, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `OMICS_WES_*` overrides from an arbitrary lookup. Blank values
    /// are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(ENV_ROLE_ARN) {
            tracing::debug!("Environment override: {}", ENV_ROLE_ARN);
            self.role_arn = value;
        }
        if let Some(value) = get(ENV_OUTPUT_URI) {
            tracing::debug!("Environment override: {}", ENV_OUTPUT_URI);
            self.output_uri = value;
        }
        if let Some(value) = get(ENV_REGION) {
            self.region = Some(value);
        }
        if let Some(value) = get(ENV_BACKEND) {
            self.backend = value.parse()?;
        }
        if let Some(value) = get(ENV_BACKEND_TIMEOUT_SECS) {
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|err| ConfigError::InvalidValue {
                    key: ENV_BACKEND_TIMEOUT_SECS,
                    value: value.clone(),
                    reason: err.to_string(),
                })?;
            self.backend_timeout_secs = Some(secs);
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(role_arn) = overrides.role_arn {
            self.role_arn = role_arn;
        }
        if let Some(output_uri) = overrides.output_uri {
            self.output_uri = output_uri;
        }
        if !overrides.source_uris.is_empty() {
            self.source_uris = overrides.source_uris;
        }
        if overrides.region.is_some() {
            self.region = overrides.region;
        }
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if overrides.backend_timeout_secs.is_some() {
            self.backend_timeout_secs = overrides.backend_timeout_secs;
        }
        if let Some(bind_address) = overrides.bind_address {
            self.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(base_path) = overrides.base_path {
            self.base_path = base_path;
        }
    }

    /// Reject configurations the facade cannot serve with. Storage locations
    /// are run through scope derivation so a malformed URI fails here rather
    /// than on the first start-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == BackendKind::Omics && self.role_arn.trim().is_empty() {
            return Err(ConfigError::Missing("role_arn"));
        }
        if self.output_uri.trim().is_empty() {
            return Err(ConfigError::Missing("output_uri"));
        }

        let deriver = ScopeDeriver::new(self.partition.clone());
        deriver.derive_one(&self.output_uri)?;
        deriver.derive(&self.source_uris)?;

        if self.backend_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "backend_timeout_secs",
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                key: "base_path",
                value: self.base_path.clone(),
                reason: "must start with `/`".to_string(),
            });
        }

        Ok(())
    }

    pub fn backend_timeout(&self) -> Option<Duration> {
        self.backend_timeout_secs.map(Duration::from_secs)
    }

    /// Output location handed to the backend for every run.
    pub fn run_output_uri(&self) -> String {
        format!("{}/workflow-output/", self.output_uri.trim_end_matches('/'))
    }

    /// `base_path` without a trailing separator; empty when routes sit at the root.
    pub fn normalized_base_path(&self) -> &str {
        self.base_path.trim_end_matches('/')
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
