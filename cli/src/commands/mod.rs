// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the omics-wes CLI

pub mod config;
pub mod scopes;
pub mod serve;

pub use self::config::ConfigCommand;
pub use self::scopes::ScopesArgs;
pub use self::serve::ServeArgs;

use anyhow::{Context, Result};
use std::path::PathBuf;

use omics_wes_core::domain::config::{ConfigOverrides, FacadeConfig};

/// Load file + environment configuration, then apply flag overrides.
pub fn load_config(path: Option<PathBuf>, overrides: ConfigOverrides) -> Result<FacadeConfig> {
    let mut config = FacadeConfig::load(path).context("Failed to load configuration")?;
    config.apply_overrides(overrides);
    Ok(config)
}
