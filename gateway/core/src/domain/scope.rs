// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Storage Scope Derivation
//!
//! Turns configured storage locations (`s3://bucket/prefix/`) into the pair of
//! IAM resource patterns needed to use them: the bucket itself, for
//! `ListBucket`, and the objects under the prefix, for `GetObject`/`PutObject`.
//!
//! Prefix rules:
//!
//! | Location | Object resource |
//! |----------|-----------------|
//! | `s3://bucket` | `arn:aws:s3:::bucket/*` |
//! | `s3://bucket/a/b/` | `arn:aws:s3:::bucket/a/b/*` |
//! | `s3://bucket/a/b` | `arn:aws:s3:::bucket/a/b/*` |
//!
//! A location with no path grants every object in the bucket. A path without
//! a trailing separator is read as a folder of that name, never as a single
//! object key; callers that need exact-key grants must not use this module.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Least-privilege resource patterns for the execution role

use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Default AWS partition for generated ARNs.
pub const DEFAULT_PARTITION: &str = "aws";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("invalid storage location `{uri}`: {reason}")]
    Configuration { uri: String, reason: String },
}

/// Resource patterns granting scoped access to one storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeGrant {
    /// Container-level resource (enumerate)
    pub list_resource: String,
    /// Object-level resource under the addressed prefix (read/write)
    pub access_resource: String,
}

/// Derives [`ScopeGrant`]s for a given partition.
#[derive(Debug, Clone)]
pub struct ScopeDeriver {
    partition: String,
}

impl ScopeDeriver {
    pub fn new(partition: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
        }
    }

    /// One grant per location, in input order. Overlapping locations produce
    /// overlapping grants; nothing is deduplicated.
    pub fn derive<I, S>(&self, uris: I) -> Result<Vec<ScopeGrant>, ScopeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        uris.into_iter()
            .map(|uri| self.derive_one(uri.as_ref()))
            .collect()
    }

    pub fn derive_one(&self, uri: &str) -> Result<ScopeGrant, ScopeError> {
        let parsed = Url::parse(uri).map_err(|err| ScopeError::Configuration {
            uri: uri.to_string(),
            reason: err.to_string(),
        })?;

        let container = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| ScopeError::Configuration {
                uri: uri.to_string(),
                reason: "missing bucket name".to_string(),
            })?;

        let prefix = parsed.path().trim_start_matches('/');
        let object_pattern = if prefix.is_empty() {
            "*".to_string()
        } else if prefix.ends_with('/') {
            format!("{prefix}*")
        } else {
            format!("{prefix}/*")
        };

        Ok(ScopeGrant {
            list_resource: self.s3_arn(container),
            access_resource: self.s3_arn(&format!("{container}/{object_pattern}")),
        })
    }

    fn s3_arn(&self, resource: &str) -> String {
        format!("arn:{}:s3:::{}", self.partition, resource)
    }
}

impl Default for ScopeDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_PARTITION)
    }
}

/// Derive grants in the default partition.
pub fn derive_scope_grants<I, S>(uris: I) -> Result<Vec<ScopeGrant>, ScopeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ScopeDeriver::default().derive(uris)
}
