use super::{Outcome, RequestHook, RequestMeta};
use crate::logger::{LogContext, Logger, Severity};
use crate::redact::redact;
use serde_json::{Map, Value, json};
use std::time::Duration;

pub const HTTP_CONTEXT: &str = "HTTP";

/// Logs every request on arrival and on completion.
///
/// Failures are logged at warn level with the trace attached. The exception
/// filter owns the single error-level line for a failed request.
pub struct LoggingHook {
    logger: Logger,
}

impl LoggingHook {
    pub fn new(logger: &Logger) -> Self {
        Self {
            logger: logger.with_context(HTTP_CONTEXT),
        }
    }
}

fn base_metadata(meta: &RequestMeta) -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert("method".into(), json!(meta.method.as_str()));
    metadata.insert("url".into(), json!(meta.url));
    metadata
}

impl RequestHook for LoggingHook {
    fn before(&self, meta: &RequestMeta) {
        let mut metadata = base_metadata(meta);
        metadata.insert("query".into(), Value::Object(meta.query.clone()));
        metadata.insert("body".into(), redact(&meta.body));
        metadata.insert("userAgent".into(), json!(meta.user_agent));
        metadata.insert("ip".into(), json!(meta.ip));

        self.logger.info(
            &format!("Incoming Request: {} {}", meta.method, meta.url),
            LogContext::new()
                .request_id(meta.request_id.as_deref())
                .metadata(metadata),
        );
    }

    fn after(&self, meta: &RequestMeta, elapsed: Duration, outcome: &Outcome<'_>) {
        let ms = elapsed.as_millis() as u64;
        let mut metadata = base_metadata(meta);
        metadata.insert("responseTime".into(), json!(ms));
        metadata.insert("statusCode".into(), json!(outcome.status().as_u16()));
        let context = LogContext::new().request_id(meta.request_id.as_deref());

        match outcome {
            Outcome::Success { .. } => self.logger.info(
                &format!("Request Completed: {} {} - {}ms", meta.method, meta.url, ms),
                context.metadata(metadata),
            ),
            Outcome::Failure(report) => {
                metadata.insert("errorName".into(), json!(report.kind));
                metadata.insert("errorMessage".into(), json!(report.message));
                self.logger.log(
                    Severity::Warn,
                    &format!("Request Failed: {} {} - {}ms", meta.method, meta.url, ms),
                    report.trace.as_deref(),
                    context.metadata(metadata),
                );
            }
        }
    }
}
