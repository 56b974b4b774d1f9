// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Request spans and HTTP metrics.
//!
//! The fronting gateway authenticates callers and forwards their identity in
//! a header. It is recorded on the request span and nothing else.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Span;

pub const CALLER_IDENTITY_HEADERS: [&str; 2] = ["x-amzn-caller-identity", "x-forwarded-user"];

pub const REQUESTS_TOTAL: &str = "omics_wes_http_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "omics_wes_http_request_duration_seconds";

/// First caller identity header present on the request.
pub fn caller_identity(headers: &HeaderMap) -> Option<&str> {
    CALLER_IDENTITY_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .find_map(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

fn route_label(req: &Request) -> Option<String> {
    req.extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
}

/// Span factory for `TraceLayer`.
pub fn make_span(req: &Request) -> Span {
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        route = %route_label(req).unwrap_or_else(|| req.uri().path().to_string()),
        caller = caller_identity(req.headers()).unwrap_or("-"),
    )
}

/// Count requests and record latency, labelled by route template rather than
/// concrete path so run ids do not explode label cardinality.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let route = route_label(&req).unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        REQUEST_DURATION_SECONDS,
        "method" => method,
        "route" => route
    )
    .record(started.elapsed().as_secs_f64());

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn prefers_gateway_identity_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-user", HeaderValue::from_static("alice"));
        assert_eq!(caller_identity(&headers), Some("alice"));

        headers.insert(
            "x-amzn-caller-identity",
            HeaderValue::from_static("arn:aws:iam::1:user/bob"),
        );
        assert_eq!(caller_identity(&headers), Some("arn:aws:iam::1:user/bob"));
    }

    #[test]
    fn absent_identity_is_none() {
        assert_eq!(caller_identity(&HeaderMap::new()), None);
    }
}
