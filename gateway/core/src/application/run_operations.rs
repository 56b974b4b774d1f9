// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Run Operations
//!
//! One method per WES call. Each method validates its input, makes exactly
//! one backend call, and shapes the result; nothing is retried or cached.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Translate WES requests into backend calls and back
//! - **Collaborators:**
//!   - Domain: RunRequest, Page, RunStatusView, FacadeConfig
//!   - Infrastructure: any `WorkflowBackend` adapter

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::backend::{BackendError, WorkflowBackend};
use crate::domain::config::FacadeConfig;
use crate::domain::error::FacadeError;
use crate::domain::pagination::{PageQuery, RunListResponse, TaskListResponse};
use crate::domain::run::{
    CancelAck, RunDescriptor, RunHandle, RunRequest, RunStatusView, StartRunParams,
    TaskDescriptor, WorkflowId,
};

/// Run a backend call under an optional deadline. An elapsed deadline
/// abandons the call and surfaces as [`FacadeError::Timeout`].
pub async fn with_deadline<T, F>(deadline: Option<Duration>, call: F) -> Result<T, FacadeError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    match deadline {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result.map_err(FacadeError::from),
            Err(_) => Err(FacadeError::Timeout(limit)),
        },
        None => call.await.map_err(FacadeError::from),
    }
}

pub struct RunOperations {
    backend: Arc<dyn WorkflowBackend>,
    config: Arc<FacadeConfig>,
}

impl RunOperations {
    pub fn new(backend: Arc<dyn WorkflowBackend>, config: Arc<FacadeConfig>) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    /// The configured backend timeout, tightened by a caller-supplied one.
    pub fn effective_deadline(&self, requested: Option<Duration>) -> Option<Duration> {
        match (self.config.backend_timeout(), requested) {
            (Some(configured), Some(requested)) => Some(configured.min(requested)),
            (configured, requested) => configured.or(requested),
        }
    }

    pub async fn list_runs(
        &self,
        query: &PageQuery,
        deadline: Option<Duration>,
    ) -> Result<RunListResponse, FacadeError> {
        let params = query.to_backend_params()?;
        let page = with_deadline(
            self.effective_deadline(deadline),
            self.backend.list_runs(params),
        )
        .await
        .inspect_err(|err| warn!(operation = "list_runs", error = %err, "Backend call failed"))?;

        Ok(RunListResponse::from(page))
    }

    /// Submit a run. A `workflow_url` without a trailing numeric id is
    /// rejected before the backend is contacted.
    pub async fn start_run(
        &self,
        request: RunRequest,
        deadline: Option<Duration>,
    ) -> Result<RunHandle, FacadeError> {
        let workflow_id = WorkflowId::from_workflow_url(request.workflow_url.as_deref().unwrap_or(""))?;

        let params = StartRunParams {
            request_id: Uuid::new_v4().to_string(),
            role_arn: self.config.role_arn.clone(),
            output_uri: self.config.run_output_uri(),
            parameters: request.workflow_params,
            tags: request.tags,
            workflow_id,
        };
        let workflow_id = params.workflow_id.clone();
        let request_id = params.request_id.clone();

        let handle = with_deadline(
            self.effective_deadline(deadline),
            self.backend.start_run(params),
        )
        .await
        .inspect_err(|err| {
            warn!(operation = "start_run", workflow_id = %workflow_id, error = %err, "Backend call failed")
        })?;

        info!(
            run_id = %handle.id,
            workflow_id = %workflow_id,
            request_id = %request_id,
            "Started workflow run"
        );
        Ok(handle)
    }

    pub async fn get_run(
        &self,
        run_id: &str,
        deadline: Option<Duration>,
    ) -> Result<RunDescriptor, FacadeError> {
        with_deadline(self.effective_deadline(deadline), self.backend.get_run(run_id))
            .await
            .inspect_err(|err| warn!(operation = "get_run", run_id, error = %err, "Backend call failed"))
    }

    /// Same backend call as [`get_run`](Self::get_run), projected to WES state.
    pub async fn get_run_status(
        &self,
        run_id: &str,
        deadline: Option<Duration>,
    ) -> Result<RunStatusView, FacadeError> {
        let run = with_deadline(self.effective_deadline(deadline), self.backend.get_run(run_id))
            .await
            .inspect_err(|err| {
                warn!(operation = "get_run_status", run_id, error = %err, "Backend call failed")
            })?;
        Ok(RunStatusView::from(&run))
    }

    /// Request cancellation. The acknowledgement only echoes the run id; it
    /// does not mean the run has stopped.
    pub async fn cancel_run(
        &self,
        run_id: &str,
        deadline: Option<Duration>,
    ) -> Result<CancelAck, FacadeError> {
        with_deadline(self.effective_deadline(deadline), self.backend.cancel_run(run_id))
            .await
            .inspect_err(|err| warn!(operation = "cancel_run", run_id, error = %err, "Backend call failed"))?;

        info!(run_id, "Cancellation requested");
        Ok(CancelAck {
            id: run_id.to_string(),
        })
    }

    pub async fn list_tasks(
        &self,
        run_id: &str,
        query: &PageQuery,
        deadline: Option<Duration>,
    ) -> Result<TaskListResponse, FacadeError> {
        let params = query.to_backend_params()?;
        let page = with_deadline(
            self.effective_deadline(deadline),
            self.backend.list_tasks(run_id, params),
        )
        .await
        .inspect_err(|err| warn!(operation = "list_tasks", run_id, error = %err, "Backend call failed"))?;

        Ok(TaskListResponse::from(page))
    }

    pub async fn get_task(
        &self,
        run_id: &str,
        task_id: &str,
        deadline: Option<Duration>,
    ) -> Result<TaskDescriptor, FacadeError> {
        with_deadline(
            self.effective_deadline(deadline),
            self.backend.get_task(run_id, task_id),
        )
        .await
        .inspect_err(|err| {
            warn!(operation = "get_task", run_id, task_id, error = %err, "Backend call failed")
        })
    }
}
