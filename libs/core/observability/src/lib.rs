//! Observability utilities for the user service.
//!
//! This crate provides:
//! - A structured [`Logger`] with severity threshold, JSON/text rendering and stream routing
//! - A `tracing` bridge ([`LoggerLayer`]) so `tracing` events flow through the same logger
//! - Redaction of sensitive request-body fields before they are logged
//! - Request instrumentation hooks (request logging, slow-request detection, metrics)
//! - Prometheus metrics recording and export
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, init_tracing, metrics_handler, Logger, LoggerConfig};
//!
//! let logger = Logger::stdio(LoggerConfig::from_env()?);
//! init_tracing(&logger);
//! init_metrics()?;
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod hooks;
pub mod logger;
pub mod redact;

pub use hooks::{
    FailureReport, HookPipeline, LoggingHook, MetricsHook, Outcome, PerformanceHook, RequestHook,
    RequestMeta, instrument,
};
pub use logger::layer::{LoggerLayer, init_tracing};
pub use logger::sink::{CapturedLine, LogSink, MemorySink, StdioSink, Stream};
pub use logger::{LogContext, LogFormat, LogRecord, Logger, LoggerConfig, Severity};
pub use redact::{REDACTED, SENSITIVE_FIELDS, redact};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// Idempotent: later calls return the handle installed by the first one.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;

        info!(context = "Bootstrap", "Prometheus metrics recorder initialized");
        register_metric_descriptions();

        Ok(handle)
    })
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );
    describe_counter!(
        "http_slow_requests_total",
        "Requests that exceeded the slow-request threshold"
    );
}
