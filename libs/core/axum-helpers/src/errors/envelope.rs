use super::fault::{ErrorMessage, Normalized};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// JSON body of every failed response.
///
/// ```json
/// {
///   "statusCode": 404,
///   "timestamp": "2024-01-01T00:00:00.000Z",
///   "path": "/api/users/0b5e3d2a-5c1e-4d7f-9a55-0a4f2f3c2c11",
///   "method": "GET",
///   "message": "User not found",
///   "error": "NotFound",
///   "requestId": "6f1c2b3a-8d4e-4f6a-9b7c-1d2e3f4a5b6c"
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub timestamp: String,
    /// Request URL as received, including the query string
    pub path: String,
    pub method: String,
    pub message: ErrorMessage,
    /// Error kind name
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorEnvelope {
    /// Stamp a normalized fault with request context and the current time.
    pub fn build(
        normalized: Normalized,
        path: impl Into<String>,
        method: impl Into<String>,
        request_id: Option<String>,
    ) -> Self {
        Self {
            status_code: normalized.status.as_u16(),
            timestamp: observability::logger::timestamp_now(),
            path: path.into(),
            method: method.into(),
            message: normalized.message,
            error: normalized.error,
            details: normalized.details,
            request_id,
        }
    }
}
