// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HealthOmics workflow backend
//!
//! Implements [`WorkflowBackend`] over `aws-sdk-omics`. SDK output shapes are
//! flattened into camelCase JSON descriptors so the facade can forward them
//! without depending on SDK types. Errors are classified here, once, from the
//! service error code.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Anti-corruption adapter between the facade and AWS HealthOmics

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_omics::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_omics::types::{RunListItem, TaskListItem};
use aws_sdk_omics::Client as OmicsClient;
use aws_smithy_types::date_time::Format;
use aws_smithy_types::{DateTime, Document, Number};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::domain::backend::{BackendError, WorkflowBackend};
use crate::domain::config::FacadeConfig;
use crate::domain::pagination::{BackendPageParams, Page};
use crate::domain::run::{RunDescriptor, RunHandle, StartRunParams, TaskDescriptor};

pub struct OmicsWorkflowBackend {
    client: OmicsClient,
}

impl OmicsWorkflowBackend {
    pub fn new(client: OmicsClient) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS credential chain, pinned to the
    /// configured region when one is set.
    pub async fn from_config(config: &FacadeConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;
        debug!(region = ?sdk_config.region(), "HealthOmics client configured");
        Self::new(OmicsClient::new(&sdk_config))
    }
}

/// Turn an SDK failure into a [`BackendError`], keeping the service error
/// code verbatim. Client-side timeouts count as `RequestTimeoutException`.
fn classify<E, R>(err: SdkError<E, R>) -> BackendError
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: Debug + 'static,
{
    if matches!(err, SdkError::TimeoutError(_)) {
        return BackendError::with_code(
            "RequestTimeoutException",
            DisplayErrorContext(&err).to_string(),
        );
    }

    let code = err.code().map(str::to_string);
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    BackendError::new(code, message)
}

pub(crate) fn json_to_document(value: &Value) -> Document {
    match value {
        Value::Null => Document::Null,
        Value::Bool(b) => Document::Bool(*b),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Document::Number(Number::PosInt(u))
            } else if let Some(i) = n.as_i64() {
                Document::Number(Number::NegInt(i))
            } else {
                Document::Number(Number::Float(n.as_f64().unwrap_or_default()))
            }
        }
        Value::String(s) => Document::String(s.clone()),
        Value::Array(items) => Document::Array(items.iter().map(json_to_document).collect()),
        Value::Object(map) => Document::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), json_to_document(value)))
                .collect::<HashMap<_, _>>(),
        ),
    }
}

pub(crate) fn document_to_json(document: &Document) -> Value {
    match document {
        Document::Null => Value::Null,
        Document::Bool(b) => Value::Bool(*b),
        Document::Number(Number::PosInt(u)) => Value::from(*u),
        Document::Number(Number::NegInt(i)) => Value::from(*i),
        Document::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Document::String(s) => Value::String(s.clone()),
        Document::Array(items) => Value::Array(items.iter().map(document_to_json).collect()),
        Document::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), document_to_json(value)))
                .collect(),
        ),
    }
}

/// Collects optional SDK fields into a descriptor map, skipping absent ones.
#[derive(Default)]
struct Fields(Map<String, Value>);

impl Fields {
    fn text(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.0.insert(key.to_string(), Value::String(value.to_string()));
        }
        self
    }

    fn int(mut self, key: &str, value: Option<i32>) -> Self {
        if let Some(value) = value {
            self.0.insert(key.to_string(), Value::from(value));
        }
        self
    }

    fn time(mut self, key: &str, value: Option<&DateTime>) -> Self {
        if let Some(formatted) = value.and_then(|dt| dt.fmt(Format::DateTime).ok()) {
            self.0.insert(key.to_string(), Value::String(formatted));
        }
        self
    }

    fn tags(mut self, value: Option<&HashMap<String, String>>) -> Self {
        if let Some(tags) = value {
            let tags = tags
                .iter()
                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                .collect();
            self.0.insert("tags".to_string(), Value::Object(tags));
        }
        self
    }

    fn document(mut self, key: &str, value: Option<&Document>) -> Self {
        if let Some(document) = value {
            self.0.insert(key.to_string(), document_to_json(document));
        }
        self
    }

    fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

fn missing_id(operation: &str) -> BackendError {
    BackendError::new(None, format!("{operation} response did not include an id"))
}

fn max_results(page: &BackendPageParams) -> Result<i32, BackendError> {
    i32::try_from(page.max_results).map_err(|_| {
        BackendError::with_code(
            "ValidationException",
            format!("maxResults {} is out of range", page.max_results),
        )
    })
}

/// A list entry without an id cannot be addressed later, so it fails the
/// whole page rather than shrinking it.
fn run_from_list_item(item: &RunListItem) -> Result<RunDescriptor, BackendError> {
    let id = item.id().ok_or_else(|| missing_id("ListRuns"))?.to_string();
    let details = Fields::default()
        .text("arn", item.arn())
        .text("name", item.name())
        .text("workflowId", item.workflow_id())
        .int("priority", item.priority())
        .int("storageCapacity", item.storage_capacity())
        .time("creationTime", item.creation_time())
        .time("startTime", item.start_time())
        .time("stopTime", item.stop_time())
        .into_map();
    Ok(RunDescriptor {
        id,
        status: item.status().map(|s| s.as_str().to_string()),
        details,
    })
}

fn task_from_list_item(item: &TaskListItem) -> Result<TaskDescriptor, BackendError> {
    let task_id = item
        .task_id()
        .ok_or_else(|| missing_id("ListRunTasks"))?
        .to_string();
    let details = Fields::default()
        .text("name", item.name())
        .int("cpus", item.cpus())
        .int("memory", item.memory())
        .int("gpus", item.gpus())
        .text("instanceType", item.instance_type())
        .time("creationTime", item.creation_time())
        .time("startTime", item.start_time())
        .time("stopTime", item.stop_time())
        .into_map();
    Ok(TaskDescriptor {
        task_id,
        status: item.status().map(|s| s.as_str().to_string()),
        details,
    })
}

#[async_trait]
impl WorkflowBackend for OmicsWorkflowBackend {
    #[instrument(skip(self, params), fields(workflow_id = %params.workflow_id))]
    async fn start_run(&self, params: StartRunParams) -> Result<RunHandle, BackendError> {
        let mut request = self
            .client
            .start_run()
            .workflow_id(params.workflow_id.as_str())
            .role_arn(params.role_arn)
            .output_uri(params.output_uri)
            .request_id(params.request_id);

        if !params.parameters.is_null() {
            request = request.parameters(json_to_document(&params.parameters));
        }
        if !params.tags.is_empty() {
            request = request.set_tags(Some(params.tags));
        }

        let output = request.send().await.map_err(classify)?;
        let id = output.id().ok_or_else(|| missing_id("StartRun"))?.to_string();

        let details = Fields::default()
            .text("arn", output.arn())
            .text("status", output.status().map(|s| s.as_str()))
            .text("uuid", output.uuid())
            .text("runOutputUri", output.run_output_uri())
            .tags(output.tags())
            .into_map();

        Ok(RunHandle { id, details })
    }

    #[instrument(skip(self))]
    async fn get_run(&self, run_id: &str) -> Result<RunDescriptor, BackendError> {
        let output = self
            .client
            .get_run()
            .id(run_id)
            .send()
            .await
            .map_err(classify)?;

        let details = Fields::default()
            .text("arn", output.arn())
            .text("name", output.name())
            .text("workflowId", output.workflow_id())
            .text("workflowType", output.workflow_type().map(|t| t.as_str()))
            .text("runGroupId", output.run_group_id())
            .text("roleArn", output.role_arn())
            .text("outputUri", output.output_uri())
            .text("runOutputUri", output.run_output_uri())
            .text("statusMessage", output.status_message())
            .text("failureReason", output.failure_reason())
            .text("startedBy", output.started_by())
            .text("uuid", output.uuid())
            .text("logLevel", output.log_level().map(|l| l.as_str()))
            .int("priority", output.priority())
            .int("storageCapacity", output.storage_capacity())
            .time("creationTime", output.creation_time())
            .time("startTime", output.start_time())
            .time("stopTime", output.stop_time())
            .document("parameters", output.parameters())
            .tags(output.tags())
            .into_map();

        Ok(RunDescriptor {
            id: output.id().unwrap_or(run_id).to_string(),
            status: output.status().map(|s| s.as_str().to_string()),
            details,
        })
    }

    #[instrument(skip(self))]
    async fn cancel_run(&self, run_id: &str) -> Result<(), BackendError> {
        self.client
            .cancel_run()
            .id(run_id)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_runs(&self, page: BackendPageParams) -> Result<Page<RunDescriptor>, BackendError> {
        let output = self
            .client
            .list_runs()
            .max_results(max_results(&page)?)
            .set_starting_token(page.starting_token)
            .send()
            .await
            .map_err(classify)?;

        let runs = output
            .items()
            .iter()
            .map(run_from_list_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(runs, output.next_token().map(str::to_string)))
    }

    #[instrument(skip(self))]
    async fn list_tasks(
        &self,
        run_id: &str,
        page: BackendPageParams,
    ) -> Result<Page<TaskDescriptor>, BackendError> {
        let output = self
            .client
            .list_run_tasks()
            .id(run_id)
            .max_results(max_results(&page)?)
            .set_starting_token(page.starting_token)
            .send()
            .await
            .map_err(classify)?;

        let tasks = output
            .items()
            .iter()
            .map(task_from_list_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(tasks, output.next_token().map(str::to_string)))
    }

    #[instrument(skip(self))]
    async fn get_task(&self, run_id: &str, task_id: &str) -> Result<TaskDescriptor, BackendError> {
        let output = self
            .client
            .get_run_task()
            .id(run_id)
            .task_id(task_id)
            .send()
            .await
            .map_err(classify)?;

        let details = Fields::default()
            .text("name", output.name())
            .int("cpus", output.cpus())
            .int("memory", output.memory())
            .int("gpus", output.gpus())
            .text("instanceType", output.instance_type())
            .text("statusMessage", output.status_message())
            .text("failureReason", output.failure_reason())
            .text("logStream", output.log_stream())
            .time("creationTime", output.creation_time())
            .time("startTime", output.start_time())
            .time("stopTime", output.stop_time())
            .into_map();

        Ok(TaskDescriptor {
            task_id: output.task_id().unwrap_or(task_id).to_string(),
            status: output.status().map(|s| s.as_str().to_string()),
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backend::BackendErrorKind;
    use aws_sdk_omics::types::{RunStatus, TaskStatus};
    use serde_json::json;

    #[test]
    fn workflow_params_survive_document_conversion() {
        let params = json!({
            "reads": ["s3://in/r1.fq", "s3://in/r2.fq"],
            "threads": 8,
            "offset": -2,
            "ratio": 0.5,
            "dry_run": false,
            "reference": null
        });
        assert_eq!(document_to_json(&json_to_document(&params)), params);
    }

    #[test]
    fn integers_keep_their_sign() {
        assert!(matches!(
            json_to_document(&json!(3)),
            Document::Number(Number::PosInt(3))
        ));
        assert!(matches!(
            json_to_document(&json!(-3)),
            Document::Number(Number::NegInt(-3))
        ));
    }

    #[test]
    fn fields_skip_absent_values() {
        let map = Fields::default()
            .text("name", Some("bwa"))
            .text("arn", None)
            .int("cpus", Some(4))
            .time("creationTime", Some(&DateTime::from_secs(0)))
            .into_map();
        assert_eq!(
            Value::Object(map),
            json!({"name": "bwa", "cpus": 4, "creationTime": "1970-01-01T00:00:00Z"})
        );
    }

    #[test]
    fn list_items_keep_id_and_status() {
        let item = RunListItem::builder()
            .id("4821937")
            .status(RunStatus::Running)
            .name("align")
            .build();
        let run = run_from_list_item(&item).unwrap();
        assert_eq!(run.id, "4821937");
        assert_eq!(run.status.as_deref(), Some("RUNNING"));
        assert_eq!(run.details["name"], json!("align"));

        let item = TaskListItem::builder()
            .task_id("77")
            .status(TaskStatus::Completed)
            .cpus(2)
            .build();
        let task = task_from_list_item(&item).unwrap();
        assert_eq!(task.task_id, "77");
        assert_eq!(task.status.as_deref(), Some("COMPLETED"));
        assert_eq!(task.details["cpus"], json!(2));
    }

    #[test]
    fn list_items_without_an_id_fail_the_page() {
        let err = run_from_list_item(&RunListItem::builder().name("orphan").build()).unwrap_err();
        assert_eq!(err.name(), BackendError::UNKNOWN_NAME);
        assert!(err.message.contains("ListRuns"));

        let err = task_from_list_item(&TaskListItem::builder().build()).unwrap_err();
        assert!(err.message.contains("ListRunTasks"));
    }

    #[test]
    fn max_results_out_of_i32_range_is_a_validation_error() {
        let page = BackendPageParams {
            max_results: 3_000_000_000,
            starting_token: None,
        };
        let err = max_results(&page).unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::Validation);
        assert_eq!(err.name(), "ValidationException");

        assert_eq!(max_results(&BackendPageParams::default()).unwrap(), 10);
    }
}
