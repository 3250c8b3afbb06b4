//! Bridge from `tracing` events into the [`Logger`].
//!
//! Reserved event fields fill the record slots: `context`, `request_id`,
//! `correlation_id`, `user_id` and `trace`. Any other field lands in
//! `metadata`. Without a `context` field the event target is used.

use super::{LogContext, Logger, Severity};
use serde_json::{Map, Value, json};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::{EnvFilter, Layer, prelude::*};

pub struct LoggerLayer {
    logger: Logger,
}

impl LoggerLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    context: Option<String>,
    request_id: Option<String>,
    correlation_id: Option<String>,
    user_id: Option<String>,
    trace: Option<String>,
    metadata: Map<String, Value>,
}

impl EventVisitor {
    fn record_value(&mut self, field: &Field, value: Value) {
        let name = field.name();
        if name.starts_with("log.") {
            return;
        }

        let as_text = |value: Value| match value {
            Value::String(s) => s,
            other => other.to_string(),
        };

        match name {
            "message" => self.message = Some(as_text(value)),
            "context" => self.context = Some(as_text(value)),
            "request_id" => self.request_id = Some(as_text(value)),
            "correlation_id" => self.correlation_id = Some(as_text(value)),
            "user_id" => self.user_id = Some(as_text(value)),
            "trace" => self.trace = Some(as_text(value)),
            _ => {
                self.metadata.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_value(field, json!(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, json!(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, json!(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, json!(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, json!(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, json!(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.record_value(field, json!(value.to_string()));
    }
}

impl<S: Subscriber> Layer<S> for LoggerLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = Severity::from_tracing(event.metadata().level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let mut context = LogContext::named(
            visitor
                .context
                .unwrap_or_else(|| event.metadata().target().to_string()),
        )
        .request_id(visitor.request_id)
        .correlation_id(visitor.correlation_id)
        .user_id(visitor.user_id);
        if !visitor.metadata.is_empty() {
            context = context.metadata(visitor.metadata);
        }

        self.logger.log(
            level,
            visitor.message.as_deref().unwrap_or_default(),
            visitor.trace.as_deref(),
            context,
        );
    }
}

/// Install the global subscriber: [`LoggerLayer`] plus span-trace capture.
///
/// `RUST_LOG` narrows which targets reach the logger; otherwise the logger's
/// threshold is used. Safe to call more than once.
pub fn init_tracing(logger: &Logger) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logger.config().level.filter_directive()));

    let result = tracing_subscriber::registry()
        .with(LoggerLayer::new(logger.clone()))
        .with(tracing_error::ErrorLayer::default())
        .with(filter)
        .try_init();

    match result {
        Ok(_) => tracing::debug!(
            context = "Bootstrap",
            format = %logger.config().format,
            level = %logger.config().level,
            "Tracing initialized"
        ),
        Err(_) => tracing::debug!("Tracing already initialized, skipping re-initialization"),
    }
}
