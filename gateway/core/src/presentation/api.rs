// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! WES HTTP routes
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/runs` | list runs |
//! | POST | `/runs` | start run |
//! | GET | `/runs/{run_id}` | get run |
//! | GET | `/runs/{run_id}/status` | run state |
//! | POST | `/runs/{run_id}/cancel` | cancel run |
//! | GET | `/runs/{run_id}/tasks` | list tasks |
//! | GET | `/runs/{run_id}/tasks/{task_id}` | get task |
//! | GET | `/service-info` | GA4GH service-info |
//!
//! All of the above sit under the configured base path. `/health` is always
//! served at the root.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::application::RunOperations;
use crate::domain::backend::WorkflowBackend;
use crate::domain::config::FacadeConfig;
use crate::domain::error::FacadeError;
use crate::domain::pagination::{PageQuery, RunListResponse, TaskListResponse};
use crate::domain::run::{
    CancelAck, RunDescriptor, RunHandle, RunRequest, RunStatusView, TaskDescriptor,
};
use crate::domain::service_info::ServiceInfo;
use crate::presentation::observe;

/// Header a caller may use to shorten the backend deadline for one request.
pub const REQUEST_TIMEOUT_HEADER: &str = "x-request-timeout-ms";

pub struct AppState {
    pub operations: RunOperations,
    pub service_info: ServiceInfo,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(backend: Arc<dyn WorkflowBackend>, config: Arc<FacadeConfig>) -> Self {
        let service_info = ServiceInfo::from_settings(&config.service_info);
        Self {
            operations: RunOperations::new(backend, config),
            service_info,
            started_at: Instant::now(),
        }
    }
}

/// Caller-requested deadline from `X-Request-Timeout-Ms`, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestDeadline(pub Option<Duration>);

impl<S> FromRequestParts<S> for RequestDeadline
where
    S: Send + Sync,
{
    type Rejection = FacadeError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(REQUEST_TIMEOUT_HEADER) else {
            return Ok(Self(None));
        };
        raw.to_str()
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|millis| *millis > 0)
            .map(|millis| Self(Some(Duration::from_millis(millis))))
            .ok_or_else(|| {
                FacadeError::Validation(format!(
                    "{REQUEST_TIMEOUT_HEADER} must be a positive number of milliseconds"
                ))
            })
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskPath {
    pub run_id: String,
    pub task_id: String,
}

/// Build the router: WES routes under `base_path`, `/health` at the root,
/// request tracing and metrics on every route.
pub fn app(state: Arc<AppState>) -> Router {
    let base_path = state.operations.config().normalized_base_path().to_string();

    let wes = Router::new()
        .route("/runs", get(list_runs).post(start_run))
        .route("/runs/{run_id}", get(get_run))
        .route("/runs/{run_id}/status", get(get_run_status))
        .route("/runs/{run_id}/cancel", post(cancel_run))
        .route("/runs/{run_id}/tasks", get(list_tasks))
        .route("/runs/{run_id}/tasks/{task_id}", get(get_task))
        .route("/service-info", get(service_info));

    let routes = if base_path.is_empty() {
        wes
    } else {
        Router::new().nest(&base_path, wes)
    };

    routes
        .route("/health", get(health))
        .layer(middleware::from_fn(observe::track_requests))
        .layer(TraceLayer::new_for_http().make_span_with(observe::make_span))
        .with_state(state)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, FacadeError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| FacadeError::Validation(rejection.body_text()))
}

fn page_query(query: Result<Query<PageQuery>, QueryRejection>) -> Result<PageQuery, FacadeError> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| FacadeError::Validation(rejection.body_text()))
}

async fn list_runs(
    State(state): State<Arc<AppState>>,
    RequestDeadline(deadline): RequestDeadline,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<RunListResponse>, FacadeError> {
    let query = page_query(query)?;
    state.operations.list_runs(&query, deadline).await.map(Json)
}

async fn start_run(
    State(state): State<Arc<AppState>>,
    RequestDeadline(deadline): RequestDeadline,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Result<Json<RunHandle>, FacadeError> {
    let request = json_body(payload)?;
    state.operations.start_run(request, deadline).await.map(Json)
}

async fn get_run(
    State(state): State<Arc<AppState>>,
    RequestDeadline(deadline): RequestDeadline,
    Path(run_id): Path<String>,
) -> Result<Json<RunDescriptor>, FacadeError> {
    state.operations.get_run(&run_id, deadline).await.map(Json)
}

async fn get_run_status(
    State(state): State<Arc<AppState>>,
    RequestDeadline(deadline): RequestDeadline,
    Path(run_id): Path<String>,
) -> Result<Json<RunStatusView>, FacadeError> {
    state.operations.get_run_status(&run_id, deadline).await.map(Json)
}

async fn cancel_run(
    State(state): State<Arc<AppState>>,
    RequestDeadline(deadline): RequestDeadline,
    Path(run_id): Path<String>,
) -> Result<Json<CancelAck>, FacadeError> {
    state.operations.cancel_run(&run_id, deadline).await.map(Json)
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    RequestDeadline(deadline): RequestDeadline,
    Path(run_id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<TaskListResponse>, FacadeError> {
    let query = page_query(query)?;
    state
        .operations
        .list_tasks(&run_id, &query, deadline)
        .await
        .map(Json)
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    RequestDeadline(deadline): RequestDeadline,
    Path(TaskPath { run_id, task_id }): Path<TaskPath>,
) -> Result<Json<TaskDescriptor>, FacadeError> {
    state
        .operations
        .get_task(&run_id, &task_id, deadline)
        .await
        .map(Json)
}

async fn service_info(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(state.service_info.clone())
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}
