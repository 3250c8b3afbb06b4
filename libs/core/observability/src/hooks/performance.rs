use super::{Outcome, RequestHook, RequestMeta};
use crate::logger::{LogContext, Logger};
use serde_json::json;
use std::time::Duration;

pub const PERFORMANCE_CONTEXT: &str = "Performance";

pub const DEFAULT_SLOW_REQUEST_THRESHOLD: Duration = Duration::from_millis(1000);

/// Warns about requests slower than a threshold, whatever their outcome.
pub struct PerformanceHook {
    logger: Logger,
    threshold: Duration,
}

impl PerformanceHook {
    pub fn new(logger: &Logger) -> Self {
        Self::with_threshold(logger, DEFAULT_SLOW_REQUEST_THRESHOLD)
    }

    pub fn with_threshold(logger: &Logger, threshold: Duration) -> Self {
        Self {
            logger: logger.with_context(PERFORMANCE_CONTEXT),
            threshold,
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }
}

impl RequestHook for PerformanceHook {
    fn after(&self, meta: &RequestMeta, elapsed: Duration, _outcome: &Outcome<'_>) {
        if elapsed <= self.threshold {
            return;
        }

        let ms = elapsed.as_millis() as u64;
        metrics::counter!("http_slow_requests_total", "method" => meta.method.to_string())
            .increment(1);

        self.logger.warn(
            &format!("Slow request detected: {} {} - {}ms", meta.method, meta.url, ms),
            LogContext::new()
                .request_id(meta.request_id.as_deref())
                .field("method", meta.method.as_str())
                .field("url", meta.url.as_str())
                .field("executionTime", json!(ms))
                .field("threshold", json!(self.threshold.as_millis() as u64)),
        );
    }
}
