use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all post-scout metrics
const PREFIX: &str = "post_scout";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Search Job Metrics
    pub static ref SEARCHES_STARTED_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_searches_started_total"),
        "Total number of searches started"
    ).expect("Failed to create searches_started_total metric");

    pub static ref SEARCHES_FINISHED_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_searches_finished_total"), "Total number of searches finished"),
        &["outcome"]
    ).expect("Failed to create searches_finished_total metric");

    pub static ref SEARCHES_RUNNING: Gauge = Gauge::new(
        format!("{PREFIX}_searches_running"),
        "Number of searches currently running"
    ).expect("Failed to create searches_running metric");

    pub static ref POST_URLS_FOUND_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_post_urls_found_total"),
        "Total number of qualifying post URLs collected"
    ).expect("Failed to create post_urls_found_total metric");

    pub static ref SEARCH_ENGINE_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_search_engine_errors_total"), "Search engine failures by query phase"),
        &["phase"]
    ).expect("Failed to create search_engine_errors_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(SEARCHES_STARTED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(SEARCHES_FINISHED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(SEARCHES_RUNNING.clone()));
    let _ = REGISTRY.register(Box::new(POST_URLS_FOUND_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(SEARCH_ENGINE_ERRORS_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Collapses search ids out of request paths so they don't become labels.
pub fn categorize_endpoint(path: &str) -> &'static str {
    match path.trim_end_matches('/').split('/').collect::<Vec<_>>().as_slice() {
        [""] => "/",
        ["", "api", "search"] => "/api/search",
        ["", "api", "search", _, "status"] => "/api/search/{id}/status",
        ["", "api", "search", _, "results"] => "/api/search/{id}/results",
        ["", "api", "cleanup"] => "/api/cleanup",
        _ => "other",
    }
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let endpoint = categorize_endpoint(path);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, endpoint])
        .observe(duration.as_secs_f64());
}

pub fn record_search_started() {
    SEARCHES_STARTED_TOTAL.inc();
}

pub fn record_search_finished(outcome: &str) {
    SEARCHES_FINISHED_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_post_url_found() {
    POST_URLS_FOUND_TOTAL.inc();
}

pub fn record_engine_error(phase: &str) {
    SEARCH_ENGINE_ERRORS_TOTAL.with_label_values(&[phase]).inc();
}

/// Counts a search as running for as long as it is alive.
pub struct RunningSearchGuard(());

impl RunningSearchGuard {
    pub fn new() -> Self {
        SEARCHES_RUNNING.inc();
        Self(())
    }
}

impl Default for RunningSearchGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RunningSearchGuard {
    fn drop(&mut self) {
        SEARCHES_RUNNING.dec();
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_else(|_| String::from(""));
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
