//! HTTP request metrics recorded from the hook pipeline.

use super::{Outcome, RequestHook, RequestMeta};
use metrics::{counter, histogram};
use std::time::Duration;

/// `path` label for requests no route matched.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Records:
/// - `http_requests_total` - Counter with method, path, status labels
/// - `http_request_duration_seconds` - Histogram with method, path labels
/// - `http_requests_errors_total` - Counter for 4xx and 5xx responses, labelled by error kind
#[derive(Clone, Copy, Debug, Default)]
pub struct MetricsHook;

fn status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

impl RequestHook for MetricsHook {
    fn after(&self, meta: &RequestMeta, elapsed: Duration, outcome: &Outcome<'_>) {
        let method = meta.method.to_string();
        let path = meta
            .route
            .clone()
            .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());
        let status = outcome.status();

        counter!(
            "http_requests_total",
            "method" => method.clone(),
            "path" => path.clone(),
            "status" => status.as_u16().to_string(),
            "status_class" => status_class(status.as_u16())
        )
        .increment(1);

        histogram!(
            "http_request_duration_seconds",
            "method" => method.clone(),
            "path" => path.clone()
        )
        .record(elapsed.as_secs_f64());

        if status.is_client_error() || status.is_server_error() {
            let kind = match outcome {
                Outcome::Failure(report) => report.kind.clone(),
                Outcome::Success { .. } => "unknown".to_string(),
            };
            counter!(
                "http_requests_errors_total",
                "method" => method,
                "path" => path,
                "status" => status.as_u16().to_string(),
                "kind" => kind
            )
            .increment(1);
        }
    }
}
