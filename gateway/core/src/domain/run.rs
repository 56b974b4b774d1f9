// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Run and task value objects
//!
//! Everything here is request-scoped. Run and task descriptors are owned by
//! the backend: the facade forwards them and only ever reads `id`/`taskId`
//! and `status`.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** WES run submission, backend run/task projections, WES state mapping

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::FacadeError;

/// Message returned when `workflow_url` carries no trailing workflow id.
pub const MALFORMED_WORKFLOW_URL: &str =
    "Malformed workflow_url. Should be omics://workflow/[workflow_id]";

static WORKFLOW_ID_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)$").expect("workflow id pattern is a valid regex"));

/// Body of `POST /runs`.
///
/// WES fields the backend has no use for (`workflow_type`,
/// `workflow_engine_parameters`, ...) are accepted and ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub workflow_url: Option<String>,

    #[serde(default)]
    pub workflow_params: Value,

    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Backend workflow identifier: the trailing digits of a `workflow_url`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(String);

impl WorkflowId {
    /// Extract the workflow id from a url such as `omics://workflow/42`.
    ///
    /// Only the trailing run of digits matters; the scheme and the rest of
    /// the path are not inspected.
    pub fn from_workflow_url(url: &str) -> Result<Self, FacadeError> {
        WORKFLOW_ID_SUFFIX
            .captures(url)
            .and_then(|captures| captures.get(1))
            .map(|digits| Self(digits.as_str().to_string()))
            .ok_or_else(|| FacadeError::Validation(MALFORMED_WORKFLOW_URL.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully-resolved backend start call.
#[derive(Debug, Clone, PartialEq)]
pub struct StartRunParams {
    /// Idempotency token for the backend start call
    pub request_id: String,
    pub role_arn: String,
    pub output_uri: String,
    /// `Value::Null` means no parameters were supplied
    pub parameters: Value,
    pub tags: HashMap<String, String>,
    pub workflow_id: WorkflowId,
}

/// Backend response to a start call. Must carry the backend-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunHandle {
    pub id: String,

    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Backend projection of a run, forwarded as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDescriptor {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Backend projection of a task. `task_id` is only unique within its run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    pub task_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// WES run states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Unknown,
    Queued,
    Initializing,
    Running,
    Paused,
    Complete,
    ExecutorError,
    SystemError,
    Canceled,
    Canceling,
    Preempted,
}

impl RunState {
    /// Map a HealthOmics run status onto the WES state machine.
    pub fn from_backend_status(status: Option<&str>) -> Self {
        match status {
            Some("PENDING") => Self::Queued,
            Some("STARTING") => Self::Initializing,
            Some("RUNNING") => Self::Running,
            Some("STOPPING") => Self::Canceling,
            Some("COMPLETED") => Self::Complete,
            Some("CANCELLED") | Some("DELETED") => Self::Canceled,
            Some("FAILED") => Self::ExecutorError,
            _ => Self::Unknown,
        }
    }
}

/// Body of `GET /runs/{run_id}/status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStatusView {
    pub run_id: String,
    pub state: RunState,
}

impl From<&RunDescriptor> for RunStatusView {
    fn from(run: &RunDescriptor) -> Self {
        Self {
            run_id: run.id.clone(),
            state: RunState::from_backend_status(run.status.as_deref()),
        }
    }
}

/// Body of `POST /runs/{run_id}/cancel`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancelAck {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn workflow_id_is_trailing_digits() {
        let id = WorkflowId::from_workflow_url("omics://workflow/42").unwrap();
        assert_eq!(id.as_str(), "42");

        let id = WorkflowId::from_workflow_url("omics://workflow/v2/1234567").unwrap();
        assert_eq!(id.as_str(), "1234567");
    }

    #[test]
    fn workflow_url_without_digits_is_rejected() {
        for url in ["not-a-workflow-url", "omics://workflow/", "omics://workflow/42/", ""] {
            let err = WorkflowId::from_workflow_url(url).unwrap_err();
            assert!(matches!(err, FacadeError::Validation(ref msg) if msg == MALFORMED_WORKFLOW_URL));
        }
    }

    #[test]
    fn descriptor_keeps_unknown_backend_fields() {
        let raw = json!({
            "id": "7001",
            "status": "RUNNING",
            "workflowId": "42",
            "creationTime": "2026-01-02T03:04:05Z"
        });
        let run: RunDescriptor = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(run.status.as_deref(), Some("RUNNING"));
        assert_eq!(serde_json::to_value(&run).unwrap(), raw);
    }

    #[test]
    fn task_descriptor_uses_backend_field_names() {
        let task: TaskDescriptor =
            serde_json::from_value(json!({"taskId": "t-1", "status": "COMPLETED", "cpus": 2}))
                .unwrap();
        assert_eq!(task.task_id, "t-1");
        assert_eq!(task.details["cpus"], json!(2));
    }

    #[test]
    fn backend_status_maps_to_wes_state() {
        let cases = [
            ("PENDING", RunState::Queued),
            ("STARTING", RunState::Initializing),
            ("RUNNING", RunState::Running),
            ("STOPPING", RunState::Canceling),
            ("COMPLETED", RunState::Complete),
            ("CANCELLED", RunState::Canceled),
            ("DELETED", RunState::Canceled),
            ("FAILED", RunState::ExecutorError),
            ("SOMETHING_NEW", RunState::Unknown),
        ];
        for (status, expected) in cases {
            assert_eq!(RunState::from_backend_status(Some(status)), expected, "{status}");
        }
        assert_eq!(RunState::from_backend_status(None), RunState::Unknown);
    }

    #[test]
    fn status_view_serializes_wes_state_names() {
        let run = RunDescriptor {
            id: "7001".into(),
            status: Some("FAILED".into()),
            details: Map::new(),
        };
        let view = RunStatusView::from(&run);
        assert_eq!(
            serde_json::to_value(view).unwrap(),
            json!({"run_id": "7001", "state": "EXECUTOR_ERROR"})
        );
    }
}
