//! Prometheus metrics endpoint and HTTP request tracking middleware.
//!
//! This module provides:
//! - A `/metrics` endpoint that returns Prometheus-formatted metrics
//! - Middleware for tracking HTTP request counts and durations
//! - Helpers to record lead submissions and query cache outcomes

use anyhow::Context;
use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Instant;

use crate::AppState;

// Metric names as constants for consistency
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const LEAD_SUBMISSIONS_TOTAL: &str = "lead_submissions_total";
pub const QUERY_CACHE_REQUESTS_TOTAL: &str = "query_cache_requests_total";
pub const QUERY_CACHE_ENTRIES: &str = "query_cache_entries";

/// Install the Prometheus recorder and return a handle for rendering.
///
/// Call once during startup; a second install fails.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    describe_counter!(
        HTTP_REQUESTS_TOTAL,
        "Total number of HTTP requests received"
    );
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );
    describe_counter!(
        LEAD_SUBMISSIONS_TOTAL,
        "Lead form submissions by form and outcome (created/invalid/failed)"
    );
    describe_counter!(
        QUERY_CACHE_REQUESTS_TOTAL,
        "Query cache reads by outcome (hit/miss/joined)"
    );
    describe_gauge!(QUERY_CACHE_ENTRIES, "Number of keys held by the query cache");

    Ok(handle)
}

/// GET /metrics - Returns Prometheus-formatted metrics.
///
/// This endpoint is accessible without authentication.
pub async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    gauge!(QUERY_CACHE_ENTRIES).set(state.queries.len() as f64);

    match state.metrics_handle.as_ref() {
        Some(h) => (StatusCode::OK, h.render()),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Metrics not initialized".to_string(),
        ),
    }
}

/// Middleware to track HTTP request metrics.
///
/// Records:
/// - `http_requests_total` counter with method, path, and status labels
/// - `http_request_duration_seconds` histogram with method and path labels
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();

    // Matched route template keeps record ids out of the label set
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let method = request.method().to_string();

    let response = next.run(request).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);
    histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => method, "path" => path).record(duration);

    response
}

/// Record the outcome of a quote or emergency form submission.
pub fn record_lead_submission(form: &'static str, outcome: &'static str) {
    counter!(LEAD_SUBMISSIONS_TOTAL, "form" => form, "outcome" => outcome).increment(1);
}

/// Record how a query cache read was served.
pub fn record_query_cache(outcome: &'static str) {
    counter!(QUERY_CACHE_REQUESTS_TOTAL, "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        // Prometheus naming conventions
        assert!(HTTP_REQUESTS_TOTAL.ends_with("_total"));
        assert!(LEAD_SUBMISSIONS_TOTAL.ends_with("_total"));
        assert!(QUERY_CACHE_REQUESTS_TOTAL.ends_with("_total"));
        assert!(HTTP_REQUEST_DURATION_SECONDS.ends_with("_seconds"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_lead_submission("quote", "created");
        record_query_cache("hit");
    }
}
