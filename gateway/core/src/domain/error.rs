// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Facade error taxonomy
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Single error type every run/task operation resolves to

use std::time::Duration;

use thiserror::Error;

use crate::domain::backend::BackendError;

/// Failure of a WES operation.
///
/// Validation failures never reach the backend. Backend failures are carried
/// whole so the translator can reuse the backend's own error name.
#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("backend call exceeded deadline of {0:?}")]
    Timeout(Duration),
}
