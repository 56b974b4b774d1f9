// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Error translation
//!
//! Every failed WES call, whatever its origin, leaves the facade as an HTTP
//! status plus `{"error": "[<ErrorName>] <message>"}`.
//!
//! | Kind | Status |
//! |------|--------|
//! | AccessDenied | 403 |
//! | Conflict | 409 |
//! | InternalServer | 500 |
//! | RequestTimeout / elapsed deadline | 408 |
//! | ResourceNotFound | 404 |
//! | ServiceQuotaExceeded | 402 |
//! | Throttling | 429 |
//! | Validation / local validation / unrecognized | 400 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::backend::BackendErrorKind;
use crate::domain::error::FacadeError;

/// Error name used for input rejected before any backend call.
pub const VALIDATION_ERROR_NAME: &str = "ValidationException";
/// Error name used when the facade's own deadline elapses.
pub const TIMEOUT_ERROR_NAME: &str = "RequestTimeoutException";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    fn tagged(name: &str, message: &str) -> Self {
        Self {
            error: format!("[{name}] {message}"),
        }
    }
}

pub fn status_for(kind: BackendErrorKind) -> StatusCode {
    match kind {
        BackendErrorKind::AccessDenied => StatusCode::FORBIDDEN,
        BackendErrorKind::Conflict => StatusCode::CONFLICT,
        BackendErrorKind::InternalServer => StatusCode::INTERNAL_SERVER_ERROR,
        BackendErrorKind::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
        BackendErrorKind::ResourceNotFound => StatusCode::NOT_FOUND,
        BackendErrorKind::ServiceQuotaExceeded => StatusCode::PAYMENT_REQUIRED,
        BackendErrorKind::Throttling => StatusCode::TOO_MANY_REQUESTS,
        BackendErrorKind::Validation | BackendErrorKind::Unrecognized => StatusCode::BAD_REQUEST,
    }
}

/// Map a facade error to its HTTP status and WES error body. Total.
pub fn translate(error: &FacadeError) -> (StatusCode, ErrorBody) {
    match error {
        FacadeError::Validation(message) => (
            StatusCode::BAD_REQUEST,
            ErrorBody::tagged(VALIDATION_ERROR_NAME, message),
        ),
        FacadeError::Backend(err) => (
            status_for(err.kind),
            ErrorBody::tagged(err.name(), &err.message),
        ),
        FacadeError::Timeout(limit) => (
            StatusCode::REQUEST_TIMEOUT,
            ErrorBody::tagged(
                TIMEOUT_ERROR_NAME,
                &format!("Backend did not respond within {} ms", limit.as_millis()),
            ),
        ),
    }
}

impl IntoResponse for FacadeError {
    fn into_response(self) -> Response {
        let (status, body) = translate(&self);
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %body.error, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %body.error, "Request rejected");
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backend::BackendError;
    use crate::domain::run::MALFORMED_WORKFLOW_URL;
    use std::time::Duration;

    #[test]
    fn each_backend_code_maps_to_its_status() {
        let cases = [
            ("AccessDeniedException", 403),
            ("ConflictException", 409),
            ("InternalServerException", 500),
            ("RequestTimeoutException", 408),
            ("ResourceNotFoundException", 404),
            ("ServiceQuotaExceededException", 402),
            ("ThrottlingException", 429),
            ("ValidationException", 400),
            ("SomethingElseEntirely", 400),
        ];
        for (code, status) in cases {
            let error = FacadeError::from(BackendError::with_code(code, "details"));
            let (actual, body) = translate(&error);
            assert_eq!(actual.as_u16(), status, "{code}");
            assert_eq!(body.error, format!("[{code}] details"));
        }
    }

    #[test]
    fn local_validation_uses_validation_exception() {
        let (status, body) = translate(&FacadeError::Validation(MALFORMED_WORKFLOW_URL.into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body.error,
            "[ValidationException] Malformed workflow_url. Should be omics://workflow/[workflow_id]"
        );
    }

    #[test]
    fn codeless_backend_error_is_unknown() {
        let (status, body) = translate(&FacadeError::from(BackendError::new(None, "socket closed")));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "[UnknownError] socket closed");
    }

    #[test]
    fn elapsed_deadline_is_request_timeout() {
        let (status, body) = translate(&FacadeError::Timeout(Duration::from_millis(1500)));
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert!(body.error.starts_with("[RequestTimeoutException] "));
        assert!(body.error.contains("1500 ms"));
    }
}
