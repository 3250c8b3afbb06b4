//! The single place where failures become client responses.

use super::{AppError, ErrorEnvelope, Fault, UnknownFault};
use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use core_config::Environment;
use observability::{LogContext, Logger, RequestMeta, redact};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;

pub const EXCEPTION_FILTER_CONTEXT: &str = "ExceptionFilter";

#[derive(Clone, Debug)]
pub struct ExceptionFilter {
    logger: Logger,
    environment: Environment,
}

impl ExceptionFilter {
    pub fn new(logger: &Logger, environment: Environment) -> Self {
        Self {
            logger: logger.with_context(EXCEPTION_FILTER_CONTEXT),
            environment,
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Build the envelope response for `fault` and log exactly one line.
    ///
    /// Server errors log at error level with the real message and stack;
    /// client errors log at warn level.
    pub fn handle(&self, fault: &Fault, meta: &RequestMeta) -> Response {
        let normalized = fault.normalize(self.environment);
        let report = fault.report();
        let status = normalized.status;
        let client_message = normalized.message.joined();

        let envelope = ErrorEnvelope::build(
            normalized,
            meta.url.as_str(),
            meta.method.as_str(),
            meta.request_id.clone(),
        );

        let context = LogContext::new()
            .request_id(meta.request_id.as_deref())
            .field("statusCode", status.as_u16())
            .field("path", meta.url.as_str())
            .field("method", meta.method.as_str())
            .field("query", meta.query.clone())
            .field("body", redact(&meta.body))
            .field("ip", json!(meta.ip))
            .field("userAgent", json!(meta.user_agent));

        if status.is_server_error() {
            self.logger.error(
                &format!("Internal Server Error: {}", report.message),
                report.trace.as_deref(),
                context
                    .field("errorName", report.kind.as_str())
                    .field("errorMessage", report.message.as_str()),
            );
        } else {
            self.logger
                .warn(&format!("Client Error: {client_message}"), context);
        }

        let mut response = (status, Json(envelope)).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

/// Middleware rendering any [`Fault`] produced further in as an [`ErrorEnvelope`].
pub async fn exception_filter(
    State(filter): State<ExceptionFilter>,
    request: Request,
    next: Next,
) -> Response {
    let meta = match request.extensions().get::<Arc<RequestMeta>>() {
        Some(meta) => Arc::clone(meta),
        None => Arc::new(RequestMeta::from_parts(
            request.method(),
            request.uri(),
            request.headers(),
            None,
        )),
    };

    let response = next.run(request).await;

    match response.extensions().get::<Fault>() {
        Some(fault) => filter.handle(fault, &meta),
        None => response,
    }
}

/// Panic handler for `tower_http::catch_panic::CatchPanicLayer::custom`.
///
/// The panic becomes an unknown fault, so the filter answers with a 500 envelope.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    AppError::Unexpected(UnknownFault::from_panic(payload)).into_response()
}
