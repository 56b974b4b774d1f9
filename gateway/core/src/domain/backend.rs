// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Workflow Backend Trait - Anti-Corruption Layer for HealthOmics
//!
//! The facade never executes workflows. Every run and task operation is a
//! single call through this trait, implemented by the HealthOmics adapter in
//! production and by an in-memory double for local development and tests.
//!
//! Backend failures are classified into [`BackendErrorKind`] once, at the
//! adapter boundary, so the presentation layer can match exhaustively instead
//! of pattern-matching error names.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::pagination::{BackendPageParams, Page};
use crate::domain::run::{RunDescriptor, RunHandle, StartRunParams, TaskDescriptor};

/// Backend error classes the facade distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendErrorKind {
    AccessDenied,
    Conflict,
    InternalServer,
    RequestTimeout,
    ResourceNotFound,
    ServiceQuotaExceeded,
    Throttling,
    Validation,
    Unrecognized,
}

impl BackendErrorKind {
    const PATTERNS: [(&'static str, BackendErrorKind); 8] = [
        ("AccessDenied", BackendErrorKind::AccessDenied),
        ("Conflict", BackendErrorKind::Conflict),
        ("InternalServer", BackendErrorKind::InternalServer),
        ("RequestTimeout", BackendErrorKind::RequestTimeout),
        ("ResourceNotFound", BackendErrorKind::ResourceNotFound),
        ("ServiceQuotaExceeded", BackendErrorKind::ServiceQuotaExceeded),
        ("Throttling", BackendErrorKind::Throttling),
        ("Validation", BackendErrorKind::Validation),
    ];

    /// Classify a backend error name such as `ResourceNotFoundException`.
    pub fn from_code(code: &str) -> Self {
        Self::PATTERNS
            .iter()
            .find(|(pattern, _)| code.contains(pattern))
            .map(|(_, kind)| *kind)
            .unwrap_or(Self::Unrecognized)
    }
}

/// Failure reported by the workflow backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{}] {message}", .code.as_deref().unwrap_or(BackendError::UNKNOWN_NAME))]
pub struct BackendError {
    pub kind: BackendErrorKind,
    /// Error name as reported by the backend, verbatim
    pub code: Option<String>,
    pub message: String,
}

impl BackendError {
    /// Name used when the backend reports no error code at all.
    pub const UNKNOWN_NAME: &'static str = "UnknownError";

    /// Build an error from the backend's error code and message.
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        let kind = code
            .as_deref()
            .map(BackendErrorKind::from_code)
            .unwrap_or(BackendErrorKind::Unrecognized);
        Self {
            kind,
            code,
            message: message.into(),
        }
    }

    /// Build an error with a known code, e.g. `ResourceNotFoundException`.
    pub fn with_code(code: &str, message: impl Into<String>) -> Self {
        Self::new(Some(code.to_string()), message)
    }

    pub fn name(&self) -> &str {
        self.code.as_deref().unwrap_or(Self::UNKNOWN_NAME)
    }
}

/// Narrow capability interface onto the workflow-orchestration backend.
#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    /// Start a run of a registered workflow
    async fn start_run(&self, params: StartRunParams) -> Result<RunHandle, BackendError>;

    /// Fetch one run by id
    async fn get_run(&self, run_id: &str) -> Result<RunDescriptor, BackendError>;

    /// Request cancellation of a run
    async fn cancel_run(&self, run_id: &str) -> Result<(), BackendError>;

    /// One page of runs
    async fn list_runs(&self, page: BackendPageParams) -> Result<Page<RunDescriptor>, BackendError>;

    /// One page of the tasks belonging to `run_id`
    async fn list_tasks(
        &self,
        run_id: &str,
        page: BackendPageParams,
    ) -> Result<Page<TaskDescriptor>, BackendError>;

    /// Fetch one task of a run
    async fn get_task(&self, run_id: &str, task_id: &str) -> Result<TaskDescriptor, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_healthomics_error_names() {
        let cases = [
            ("AccessDeniedException", BackendErrorKind::AccessDenied),
            ("ConflictException", BackendErrorKind::Conflict),
            ("InternalServerException", BackendErrorKind::InternalServer),
            ("RequestTimeoutException", BackendErrorKind::RequestTimeout),
            ("ResourceNotFoundException", BackendErrorKind::ResourceNotFound),
            ("ServiceQuotaExceededException", BackendErrorKind::ServiceQuotaExceeded),
            ("ThrottlingException", BackendErrorKind::Throttling),
            ("ValidationException", BackendErrorKind::Validation),
            ("ExpiredTokenException", BackendErrorKind::Unrecognized),
        ];
        for (code, kind) in cases {
            assert_eq!(BackendErrorKind::from_code(code), kind, "{code}");
        }
    }

    #[test]
    fn missing_code_is_unrecognized() {
        let err = BackendError::new(None, "connection reset");
        assert_eq!(err.kind, BackendErrorKind::Unrecognized);
        assert_eq!(err.name(), "UnknownError");
        assert_eq!(err.to_string(), "[UnknownError] connection reset");
    }

    #[test]
    fn display_keeps_backend_name_verbatim() {
        let err = BackendError::with_code("ResourceNotFoundException", "run 9 not found");
        assert_eq!(err.to_string(), "[ResourceNotFoundException] run 9 not found");
    }
}
