pub mod envelope;
pub mod fault;
pub mod filter;
pub mod handlers;
pub mod responses;

pub use envelope::ErrorEnvelope;
pub use fault::{ClientFault, ErrorMessage, Fault, Normalized, Payload, UnknownFault};
pub use filter::{ExceptionFilter, exception_filter, handle_panic};

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field name (nested fields as `parent.child`) to violation messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const VALIDATION_FAILED: &str = "Validation failed";
pub const VALIDATION_ERROR_KIND: &str = "ValidationError";

/// Application error type that can be converted to HTTP responses.
///
/// Converting to a response does not render a body: the [`Fault`] is attached
/// to the response extensions and [`exception_filter`] turns it into an
/// [`ErrorEnvelope`]. Routers must be wrapped by the filter (see
/// `server::request_pipeline`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),

    /// Any other recognized HTTP failure.
    #[error("HTTP {status}: {payload:?}")]
    Http { status: StatusCode, payload: Payload },

    #[error("{}", .0.message)]
    Unexpected(UnknownFault),
}

impl AppError {
    /// Wrap an arbitrary error as an unknown fault.
    pub fn unexpected<E: std::error::Error>(error: E) -> Self {
        AppError::Unexpected(UnknownFault::from_error(&error))
    }

    pub fn into_fault(self) -> Fault {
        let client = |status: StatusCode, message: String| -> Fault {
            ClientFault::new(status, message).into()
        };

        match self {
            AppError::BadRequest(msg) => client(StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => client(StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => client(StatusCode::CONFLICT, msg),
            AppError::Validation(fields) => ClientFault::from_payload(
                StatusCode::BAD_REQUEST,
                Payload::Structured(json!({
                    "message": VALIDATION_FAILED,
                    "error": VALIDATION_ERROR_KIND,
                    "details": fields,
                })),
            )
            .into(),
            AppError::Http { status, payload } => ClientFault::from_payload(status, payload).into(),
            AppError::Unexpected(fault) => fault.into(),
        }
    }
}

impl From<DbErr> for AppError {
    fn from(error: DbErr) -> Self {
        AppError::unexpected(error)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::unexpected(error)
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        AppError::unexpected(error)
    }
}

impl From<eyre::Report> for AppError {
    fn from(report: eyre::Report) -> Self {
        AppError::Unexpected(UnknownFault::from_report(&report))
    }
}

impl From<UnknownFault> for AppError {
    fn from(fault: UnknownFault) -> Self {
        AppError::Unexpected(fault)
    }
}

/// Malformed or mistyped bodies are client input errors (400); a missing
/// JSON content type keeps its 415.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection {
            JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::BAD_REQUEST,
        };
        AppError::Http {
            status,
            payload: Payload::Text(rejection.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Http {
            status: rejection.status(),
            payload: Payload::Text(rejection.body_text()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Http {
            status: rejection.status(),
            payload: Payload::Text(rejection.body_text()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let fault = self.into_fault();
        let mut response = fault.status().into_response();
        response.extensions_mut().insert(fault);
        response
    }
}
