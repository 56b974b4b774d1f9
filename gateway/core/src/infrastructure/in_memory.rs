// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! In-memory workflow backend for local development and tests.
//!
//! Runs never progress on their own; tests move them with
//! [`InMemoryWorkflowBackend::insert_run`] and
//! [`InMemoryWorkflowBackend::insert_task`]. Page cursors are stringified
//! offsets, which is enough to exercise cursor pass-through.
//!
//! State lives only in process memory. Runs and recorded start calls are
//! bounded by a retention limit (see
//! [`InMemoryWorkflowBackend::with_retention`]); past it the oldest entries,
//! and the tasks of evicted runs, are dropped. Use it for tests and short
//! local sessions, not as a long-lived service.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Map, Value};

use crate::domain::backend::{BackendError, WorkflowBackend};
use crate::domain::pagination::{BackendPageParams, Page};
use crate::domain::run::{RunDescriptor, RunHandle, StartRunParams, TaskDescriptor};

const FIRST_RUN_ID: u64 = 1_000_001;

/// Runs and start calls kept before the oldest are evicted.
pub const DEFAULT_RETENTION: usize = 10_000;

#[derive(Debug, Clone)]
struct StoredTask {
    run_id: String,
    task: TaskDescriptor,
}

#[derive(Default)]
struct State {
    runs: Vec<RunDescriptor>,
    tasks: Vec<StoredTask>,
    start_calls: Vec<StartRunParams>,
}

impl State {
    fn retain_newest(&mut self, limit: usize) {
        if self.runs.len() > limit {
            let evicted: Vec<RunDescriptor> = self.runs.drain(..self.runs.len() - limit).collect();
            self.tasks
                .retain(|stored| !evicted.iter().any(|run| run.id == stored.run_id));
        }
        if self.start_calls.len() > limit {
            self.start_calls.drain(..self.start_calls.len() - limit);
        }
    }
}

#[derive(Clone)]
pub struct InMemoryWorkflowBackend {
    state: Arc<RwLock<State>>,
    failures: Arc<Mutex<VecDeque<BackendError>>>,
    next_id: Arc<AtomicU64>,
    latency: Option<Duration>,
    retention: usize,
    region: String,
    account_id: String,
}

impl InMemoryWorkflowBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            failures: Arc::new(Mutex::new(VecDeque::new())),
            next_id: Arc::new(AtomicU64::new(FIRST_RUN_ID)),
            latency: None,
            retention: DEFAULT_RETENTION,
            region: "us-east-1".to_string(),
            account_id: "000000000000".to_string(),
        }
    }

    /// Delay every call, for exercising deadlines.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Keep at most `limit` runs and start calls. A limit of zero is raised to one.
    pub fn with_retention(mut self, limit: usize) -> Self {
        self.retention = limit.max(1);
        self
    }

    /// Make the next backend call fail with `error`. Queued failures are
    /// consumed in order, one per call.
    pub fn fail_next(&self, error: BackendError) {
        self.failures.lock().push_back(error);
    }

    /// Insert a run, or overwrite the status of an existing one.
    pub fn insert_run(&self, run_id: &str, status: &str) {
        let mut state = self.state.write();
        if let Some(run) = state.runs.iter_mut().find(|run| run.id == run_id) {
            run.status = Some(status.to_string());
            return;
        }
        let run = self.descriptor(run_id, status, Map::new());
        state.runs.push(run);
        state.retain_newest(self.retention);
    }

    pub fn insert_task(&self, run_id: &str, task_id: &str, status: &str) {
        let mut details = Map::new();
        details.insert("name".to_string(), json!(format!("task-{task_id}")));
        details.insert("creationTime".to_string(), json!(Utc::now().to_rfc3339()));
        self.state.write().tasks.push(StoredTask {
            run_id: run_id.to_string(),
            task: TaskDescriptor {
                task_id: task_id.to_string(),
                status: Some(status.to_string()),
                details,
            },
        });
    }

    /// Start calls received so far, oldest first, up to the retention limit.
    pub fn start_calls(&self) -> Vec<StartRunParams> {
        self.state.read().start_calls.clone()
    }

    async fn enter(&self) -> Result<(), BackendError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.failures.lock().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn descriptor(&self, run_id: &str, status: &str, mut details: Map<String, Value>) -> RunDescriptor {
        details.insert(
            "arn".to_string(),
            json!(format!(
                "arn:aws:omics:{}:{}:run/{}",
                self.region, self.account_id, run_id
            )),
        );
        details
            .entry("creationTime")
            .or_insert_with(|| json!(Utc::now().to_rfc3339()));
        RunDescriptor {
            id: run_id.to_string(),
            status: Some(status.to_string()),
            details,
        }
    }

    fn not_found(what: &str, id: &str) -> BackendError {
        BackendError::with_code(
            "ResourceNotFoundException",
            format!("The specified {what} {id} was not found"),
        )
    }
}

impl Default for InMemoryWorkflowBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn paginate<T: Clone>(items: &[T], page: &BackendPageParams) -> Result<Page<T>, BackendError> {
    let offset = match page.starting_token.as_deref() {
        None => 0,
        Some(token) => token.parse::<usize>().map_err(|_| {
            BackendError::with_code("ValidationException", format!("Invalid starting token {token}"))
        })?,
    };
    let size = usize::try_from(page.max_results).unwrap_or(usize::MAX);
    let end = offset.saturating_add(size).min(items.len());
    let slice = items.get(offset..end).unwrap_or_default().to_vec();
    let next_token = (end < items.len()).then(|| end.to_string());
    Ok(Page::new(slice, next_token))
}

#[async_trait]
impl WorkflowBackend for InMemoryWorkflowBackend {
    async fn start_run(&self, params: StartRunParams) -> Result<RunHandle, BackendError> {
        self.enter().await?;

        let run_id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        let mut details = Map::new();
        details.insert("workflowId".to_string(), json!(params.workflow_id.as_str()));
        details.insert("roleArn".to_string(), json!(params.role_arn));
        details.insert("outputUri".to_string(), json!(params.output_uri));
        if !params.tags.is_empty() {
            details.insert("tags".to_string(), json!(params.tags));
        }
        let run = self.descriptor(&run_id, "PENDING", details);

        let handle = RunHandle {
            id: run_id,
            details: Map::from_iter([
                ("arn".to_string(), run.details["arn"].clone()),
                ("status".to_string(), json!("PENDING")),
                ("tags".to_string(), json!(params.tags)),
            ]),
        };

        let mut state = self.state.write();
        state.runs.push(run);
        state.start_calls.push(params);
        state.retain_newest(self.retention);
        Ok(handle)
    }

    async fn get_run(&self, run_id: &str) -> Result<RunDescriptor, BackendError> {
        self.enter().await?;
        self.state
            .read()
            .runs
            .iter()
            .find(|run| run.id == run_id)
            .cloned()
            .ok_or_else(|| Self::not_found("run", run_id))
    }

    async fn cancel_run(&self, run_id: &str) -> Result<(), BackendError> {
        self.enter().await?;
        let mut state = self.state.write();
        let run = state
            .runs
            .iter_mut()
            .find(|run| run.id == run_id)
            .ok_or_else(|| Self::not_found("run", run_id))?;

        match run.status.as_deref() {
            Some("PENDING") | Some("STARTING") | Some("RUNNING") => {
                run.status = Some("STOPPING".to_string());
                Ok(())
            }
            status => Err(BackendError::with_code(
                "ConflictException",
                format!(
                    "Run {run_id} cannot be cancelled in status {}",
                    status.unwrap_or("UNKNOWN")
                ),
            )),
        }
    }

    async fn list_runs(&self, page: BackendPageParams) -> Result<Page<RunDescriptor>, BackendError> {
        self.enter().await?;
        paginate(&self.state.read().runs, &page)
    }

    async fn list_tasks(
        &self,
        run_id: &str,
        page: BackendPageParams,
    ) -> Result<Page<TaskDescriptor>, BackendError> {
        self.enter().await?;
        let state = self.state.read();
        if !state.runs.iter().any(|run| run.id == run_id) {
            return Err(Self::not_found("run", run_id));
        }
        let tasks: Vec<TaskDescriptor> = state
            .tasks
            .iter()
            .filter(|stored| stored.run_id == run_id)
            .map(|stored| stored.task.clone())
            .collect();
        paginate(&tasks, &page)
    }

    async fn get_task(&self, run_id: &str, task_id: &str) -> Result<TaskDescriptor, BackendError> {
        self.enter().await?;
        self.state
            .read()
            .tasks
            .iter()
            .find(|stored| stored.run_id == run_id && stored.task.task_id == task_id)
            .map(|stored| stored.task.clone())
            .ok_or_else(|| Self::not_found("task", task_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::run::WorkflowId;

    fn params(size: u32, token: Option<&str>) -> BackendPageParams {
        BackendPageParams {
            max_results: size,
            starting_token: token.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn pages_follow_cursor_until_exhausted() {
        let backend = InMemoryWorkflowBackend::new();
        for id in 1..=5 {
            backend.insert_run(&id.to_string(), "RUNNING");
        }

        let first = backend.list_runs(params(2, None)).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next_token.as_deref(), Some("2"));

        let last = backend.list_runs(params(2, Some("4"))).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(last.is_last());
    }

    #[tokio::test]
    async fn tasks_are_scoped_to_their_run() {
        let backend = InMemoryWorkflowBackend::new();
        backend.insert_run("1", "RUNNING");
        backend.insert_run("2", "RUNNING");
        backend.insert_task("1", "t-1", "COMPLETED");
        backend.insert_task("2", "t-1", "RUNNING");

        let task = backend.get_task("2", "t-1").await.unwrap();
        assert_eq!(task.status.as_deref(), Some("RUNNING"));
        assert!(backend.get_task("3", "t-1").await.is_err());

        let page = backend.list_tasks("1", params(10, None)).await.unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_once() {
        let backend = InMemoryWorkflowBackend::new();
        backend.insert_run("1", "RUNNING");
        backend.fail_next(BackendError::with_code("ThrottlingException", "slow down"));

        assert!(backend.get_run("1").await.is_err());
        assert!(backend.get_run("1").await.is_ok());
    }

    #[tokio::test]
    async fn finished_runs_cannot_be_cancelled() {
        let backend = InMemoryWorkflowBackend::new();
        backend.insert_run("1", "COMPLETED");
        let err = backend.cancel_run("1").await.unwrap_err();
        assert_eq!(err.name(), "ConflictException");
    }

    fn start_params(workflow: &str) -> StartRunParams {
        StartRunParams {
            request_id: format!("req-{workflow}"),
            role_arn: "arn:aws:iam::000000000000:role/omics".to_string(),
            output_uri: "s3://results/".to_string(),
            parameters: Value::Null,
            tags: Default::default(),
            workflow_id: WorkflowId::from_workflow_url(&format!("omics://workflow/{workflow}"))
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn oldest_runs_and_start_calls_are_evicted_past_retention() {
        let backend = InMemoryWorkflowBackend::new().with_retention(2);
        backend.insert_run("old", "COMPLETED");
        backend.insert_task("old", "t-1", "COMPLETED");

        let mut started = Vec::new();
        for workflow in ["1", "2", "3"] {
            let handle = backend
                .start_run(start_params(workflow))
                .await
                .unwrap();
            started.push(handle.id);
        }

        let page = backend.list_runs(params(10, None)).await.unwrap();
        let ids: Vec<&str> = page.items.iter().map(|run| run.id.as_str()).collect();
        assert_eq!(ids, vec![started[1].as_str(), started[2].as_str()]);

        let calls = backend.start_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].workflow_id.as_str(), "2");

        assert!(backend.get_run("old").await.is_err());
        assert!(backend.get_task("old", "t-1").await.is_err());
    }
}
