use super::{AppError, Payload};
use axum::http::{Method, StatusCode, Uri};

/// Fallback for unmatched routes: 404 `Cannot {METHOD} {path}`.
pub async fn not_found(method: Method, uri: Uri) -> AppError {
    AppError::Http {
        status: StatusCode::NOT_FOUND,
        payload: Payload::Text(format!("Cannot {} {}", method, uri.path())),
    }
}

/// Fallback for a known path hit with an unsupported method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::Http {
        status: StatusCode::METHOD_NOT_ALLOWED,
        payload: Payload::Text(format!("Cannot {} {}", method, uri.path())),
    }
}
