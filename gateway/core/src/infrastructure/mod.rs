// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod in_memory;
pub mod omics;

use std::sync::Arc;

use crate::domain::backend::WorkflowBackend;
use crate::domain::config::{BackendKind, FacadeConfig};

pub use in_memory::InMemoryWorkflowBackend;
pub use omics::OmicsWorkflowBackend;

/// Build the backend adapter selected by configuration.
pub async fn build_backend(config: &FacadeConfig) -> Arc<dyn WorkflowBackend> {
    match config.backend {
        BackendKind::Omics => Arc::new(OmicsWorkflowBackend::from_config(config).await),
        BackendKind::InMemory => {
            tracing::warn!("Using in-memory workflow backend; runs are not executed");
            Arc::new(InMemoryWorkflowBackend::new())
        }
    }
}
