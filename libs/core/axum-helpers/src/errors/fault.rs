//! Failure model and normalization.
//!
//! Every failure reaching the top of the request pipeline is a [`Fault`]:
//! either a recognized client fault carrying its own status and payload, or an
//! unknown fault whose internals must not reach the client. [`Fault::normalize`]
//! maps both onto the `(status, message, error, details)` tuple that the
//! envelope is built from.

use axum::http::StatusCode;
use core_config::Environment;
use observability::FailureReport;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use utoipa::ToSchema;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const INTERNAL_ERROR_KIND: &str = "InternalServerError";

/// Client-facing message: one string, or several (e.g. one per violated rule).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    /// Flatten to one line for logs.
    pub fn joined(&self) -> String {
        match self {
            ErrorMessage::Single(message) => message.clone(),
            ErrorMessage::Many(messages) => messages.join(", "),
        }
    }
}

impl From<&str> for ErrorMessage {
    fn from(message: &str) -> Self {
        ErrorMessage::Single(message.to_string())
    }
}

impl From<String> for ErrorMessage {
    fn from(message: String) -> Self {
        ErrorMessage::Single(message)
    }
}

impl From<Vec<String>> for ErrorMessage {
    fn from(messages: Vec<String>) -> Self {
        ErrorMessage::Many(messages)
    }
}

/// Body carried by a recognized HTTP failure.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Text(String),
    /// Object that may carry `message` (string or list), `error` and `details`.
    Structured(Value),
}

/// Kind name derived from a status code: `404` becomes `NotFound`.
pub fn status_kind(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(|reason| reason.split_whitespace().collect::<String>())
        .unwrap_or_else(|| format!("Http{}", status.as_u16()))
}

fn status_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}

/// A recognized failure. Its message and kind are safe to show to clients.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientFault {
    pub status: StatusCode,
    pub message: ErrorMessage,
    pub kind: String,
    pub details: Option<Value>,
}

impl ClientFault {
    pub fn new(status: StatusCode, message: impl Into<ErrorMessage>) -> Self {
        Self {
            status,
            message: message.into(),
            kind: status_kind(status),
            details: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Interpret an HTTP failure payload.
    ///
    /// A text payload becomes the message as is. A structured payload supplies
    /// `message`, `error` and `details` when present and non-empty, falling
    /// back to the status reason and the status kind name.
    pub fn from_payload(status: StatusCode, payload: Payload) -> Self {
        match payload {
            Payload::Text(message) => Self::new(status, message),
            Payload::Structured(value) => {
                let message = match value.get("message") {
                    Some(Value::String(message)) if !message.is_empty() => {
                        ErrorMessage::Single(message.clone())
                    }
                    Some(Value::Array(items)) => ErrorMessage::Many(
                        items
                            .iter()
                            .map(|item| match item {
                                Value::String(s) => s.clone(),
                                other => other.to_string(),
                            })
                            .collect(),
                    ),
                    _ => ErrorMessage::Single(status_reason(status)),
                };
                let kind = value
                    .get("error")
                    .and_then(Value::as_str)
                    .filter(|kind| !kind.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| status_kind(status));

                Self {
                    status,
                    message,
                    kind,
                    details: value.get("details").cloned(),
                }
            }
        }
    }
}

/// An unrecognized failure. Only its kind name leaves the process, plus the
/// raw message and stack in development.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownFault {
    pub kind: Option<String>,
    pub message: String,
    pub stack: Option<String>,
}

/// Last path segment of a type name, without generics: `sea_orm::error::DbErr` becomes `DbErr`.
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

fn capture_backtrace() -> Option<String> {
    let backtrace = Backtrace::force_capture();
    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    }
}

impl UnknownFault {
    pub fn new(kind: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Kind name of the concrete error type, message from `Display`, and a
    /// stack made of the source chain followed by a backtrace of the conversion site.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error,
    {
        let kind = short_type_name::<E>();
        let message = error.to_string();

        let mut stack = format!("{kind}: {message}");
        let mut source = error.source();
        while let Some(cause) = source {
            stack.push_str(&format!("\nCaused by: {cause}"));
            source = cause.source();
        }
        if let Some(backtrace) = capture_backtrace() {
            stack.push('\n');
            stack.push_str(&backtrace);
        }

        Self {
            kind: Some(kind),
            message,
            stack: Some(stack),
        }
    }

    /// `Debug` of an eyre report carries the cause chain and span trace.
    pub fn from_report(report: &eyre::Report) -> Self {
        Self {
            kind: None,
            message: report.to_string(),
            stack: Some(format!("{report:?}")),
        }
    }

    /// Coerce a panic payload. Payloads that are not strings get a placeholder message.
    pub fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with a non-string payload".to_string()
        };

        Self {
            kind: None,
            stack: capture_backtrace().or_else(|| Some(message.clone())),
            message,
        }
    }

    pub fn kind_name(&self) -> &str {
        self.kind.as_deref().unwrap_or(INTERNAL_ERROR_KIND)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Fault {
    Client(ClientFault),
    Unknown(UnknownFault),
}

/// Client-facing shape of a fault.
#[derive(Clone, Debug, PartialEq)]
pub struct Normalized {
    pub status: StatusCode,
    pub message: ErrorMessage,
    pub error: String,
    pub details: Option<Value>,
}

impl Fault {
    pub fn status(&self) -> StatusCode {
        match self {
            Fault::Client(fault) => fault.status,
            Fault::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Pure mapping to the client-facing tuple. Unknown faults always become a
    /// generic 500; their message and stack appear in `details` only in development.
    pub fn normalize(&self, environment: Environment) -> Normalized {
        match self {
            Fault::Client(fault) => Normalized {
                status: fault.status,
                message: fault.message.clone(),
                error: fault.kind.clone(),
                details: fault.details.clone(),
            },
            Fault::Unknown(fault) => Normalized {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: ErrorMessage::from(INTERNAL_ERROR_MESSAGE),
                error: fault.kind_name().to_string(),
                details: environment.is_development().then(|| {
                    json!({
                        "message": fault.message,
                        "stack": fault.stack,
                    })
                }),
            },
        }
    }

    /// Operator-facing summary, with the real message and any stack.
    pub fn report(&self) -> FailureReport {
        match self {
            Fault::Client(fault) => FailureReport {
                status: fault.status,
                kind: fault.kind.clone(),
                message: fault.message.joined(),
                trace: None,
            },
            Fault::Unknown(fault) => FailureReport {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                kind: fault.kind_name().to_string(),
                message: fault.message.clone(),
                trace: fault.stack.clone(),
            },
        }
    }
}

impl From<ClientFault> for Fault {
    fn from(fault: ClientFault) -> Self {
        Fault::Client(fault)
    }
}

impl From<UnknownFault> for Fault {
    fn from(fault: UnknownFault) -> Self {
        Fault::Unknown(fault)
    }
}
