// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Pagination adapter
//!
//! WES clients page with `page_size`/`page_token` query parameters, the
//! backend with `maxResults`/`startingToken`. Tokens are opaque in both
//! directions; the only end-of-list signal is an absent token.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Normalize list requests and list responses between WES and the backend

use serde::{Deserialize, Serialize};

use crate::domain::error::FacadeError;
use crate::domain::run::{RunDescriptor, TaskDescriptor};

/// Page size used when the client does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size the backend's signed 32-bit `maxResults` can carry.
pub const MAX_PAGE_SIZE: u32 = i32::MAX as u32;

/// Raw `page_size`/`page_token` query parameters. Blank values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page_size: Option<String>,

    #[serde(default)]
    pub page_token: Option<String>,
}

impl PageQuery {
    pub fn to_backend_params(&self) -> Result<BackendPageParams, FacadeError> {
        BackendPageParams::from_query(self.page_size.as_deref(), self.page_token.as_deref())
    }
}

/// List parameters as the backend expects them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendPageParams {
    pub max_results: u32,
    /// `None` means "first page"; an empty cursor is never forwarded
    pub starting_token: Option<String>,
}

impl BackendPageParams {
    pub fn from_query(
        page_size: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<Self, FacadeError> {
        let max_results = match non_blank(page_size) {
            None => DEFAULT_PAGE_SIZE,
            Some(raw) => match raw.parse::<u32>() {
                Ok(size) if size > 0 && size <= MAX_PAGE_SIZE => size,
                Ok(size) if size > MAX_PAGE_SIZE => {
                    return Err(FacadeError::Validation(format!(
                        "page_size must not exceed {MAX_PAGE_SIZE}, got `{raw}`"
                    )))
                }
                _ => {
                    return Err(FacadeError::Validation(format!(
                        "page_size must be a positive integer, got `{raw}`"
                    )))
                }
            },
        };

        Ok(Self {
            max_results,
            starting_token: non_blank(page_token).map(str::to_string),
        })
    }
}

impl Default for BackendPageParams {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_PAGE_SIZE,
            starting_token: None,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// One page of backend results, in backend order.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// Build a page, treating an empty cursor the same as no cursor.
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self {
            items,
            next_token: next_token.filter(|token| !token.is_empty()),
        }
    }

    /// True only when the backend reported no continuation cursor. A short
    /// page says nothing about whether more items exist.
    pub fn is_last(&self) -> bool {
        self.next_token.is_none()
    }
}

/// Body of `GET /runs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunListResponse {
    pub runs: Vec<RunDescriptor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl From<Page<RunDescriptor>> for RunListResponse {
    fn from(page: Page<RunDescriptor>) -> Self {
        let page = Page::new(page.items, page.next_token);
        Self {
            runs: page.items,
            next_page_token: page.next_token,
        }
    }
}

/// Body of `GET /runs/{run_id}/tasks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskListResponse {
    pub task_logs: Vec<TaskDescriptor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl From<Page<TaskDescriptor>> for TaskListResponse {
    fn from(page: Page<TaskDescriptor>) -> Self {
        let page = Page::new(page.items, page.next_token);
        Self {
            task_logs: page.items,
            next_page_token: page.next_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn run(id: &str) -> RunDescriptor {
        RunDescriptor {
            id: id.to_string(),
            status: Some("RUNNING".into()),
            details: Map::new(),
        }
    }

    #[test]
    fn blank_query_uses_defaults() {
        let params = BackendPageParams::from_query(Some(""), Some("")).unwrap();
        assert_eq!(params.max_results, 10);
        assert_eq!(params.starting_token, None);

        let params = BackendPageParams::from_query(None, None).unwrap();
        assert_eq!(params, BackendPageParams::default());
    }

    #[test]
    fn explicit_query_is_forwarded() {
        let params = BackendPageParams::from_query(Some("5"), Some("tok123")).unwrap();
        assert_eq!(params.max_results, 5);
        assert_eq!(params.starting_token.as_deref(), Some("tok123"));
    }

    #[test]
    fn invalid_page_size_is_a_validation_error() {
        for raw in ["zero", "-3", "0", "1.5"] {
            let err = BackendPageParams::from_query(Some(raw), None).unwrap_err();
            assert!(matches!(err, FacadeError::Validation(_)), "{raw}");
        }
    }

    #[test]
    fn oversized_page_size_is_rejected_before_the_backend() {
        for raw in ["3000000000", "2147483648", "99999999999"] {
            let err = BackendPageParams::from_query(Some(raw), None).unwrap_err();
            assert!(matches!(err, FacadeError::Validation(_)), "{raw}");
        }

        let params = BackendPageParams::from_query(Some("2147483647"), None).unwrap();
        assert_eq!(params.max_results, MAX_PAGE_SIZE);
    }

    #[test]
    fn empty_cursor_means_last_page() {
        let page = Page::new(vec![run("1")], Some(String::new()));
        assert!(page.is_last());

        let page = Page::new(Vec::<RunDescriptor>::new(), Some("more".into()));
        assert!(!page.is_last());
    }

    #[test]
    fn run_list_omits_absent_token() {
        let body = RunListResponse::from(Page {
            items: vec![run("1"), run("2")],
            next_token: Some(String::new()),
        });
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["runs"].as_array().unwrap().len(), 2);
        assert!(value.get("next_page_token").is_none());
    }

    #[test]
    fn task_list_forwards_cursor_untouched() {
        let body = TaskListResponse::from(Page::new(Vec::new(), Some("opaque==".into())));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"task_logs": [], "next_page_token": "opaque=="})
        );
    }
}
