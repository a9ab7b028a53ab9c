//! Prometheus metrics for geopost-service.
//!
//! Exposes post/comment operation collectors and an HTTP handler for the `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder, HistogramVec,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// API request latency by method, matched route pattern and status.
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "geopost_http_request_duration_seconds",
        "API request latency segmented by method, route and status",
        &["method", "route", "status"]
    )
    .expect("failed to register geopost_http_request_duration_seconds");

    /// Post operations segmented by operation and outcome.
    pub static ref POST_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "geopost_post_operations_total",
        "Post operations segmented by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("failed to register geopost_post_operations_total");

    /// Comment operations segmented by operation and outcome.
    pub static ref COMMENT_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "geopost_comment_operations_total",
        "Comment operations segmented by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("failed to register geopost_comment_operations_total");

    /// Replies left out of a thread because their parent was not found.
    pub static ref ORPHAN_REPLIES_DROPPED: IntCounter = register_int_counter!(
        "geopost_orphan_replies_dropped_total",
        "Replies omitted from a comment tree because the parent is not in the post"
    )
    .expect("failed to register geopost_orphan_replies_dropped_total");
}

/// Record the outcome of a service call and hand the result back unchanged.
pub fn observe<T, E>(counter: &IntCounterVec, operation: &str, result: Result<T, E>) -> Result<T, E> {
    let outcome = if result.is_ok() { "success" } else { "error" };
    counter.with_label_values(&[operation, outcome]).inc();
    result
}

/// Record one API request; `route` is the matched pattern, never the raw path.
pub fn observe_request(method: &str, route: &str, status: u16, seconds: f64) {
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, route, &status.to_string()])
        .observe(seconds);
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
