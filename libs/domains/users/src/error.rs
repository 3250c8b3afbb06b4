use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

pub const USER_NOT_FOUND: &str = "User not found";
pub const USER_ALREADY_EXISTS: &str = "User with this email already exists";
pub const INVALID_EMAIL: &str = "Invalid email format";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error(transparent)]
    Database(#[from] DbErr),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => AppError::NotFound(USER_NOT_FOUND.to_string()),
            UserError::DuplicateEmail(_) => AppError::Conflict(USER_ALREADY_EXISTS.to_string()),
            UserError::InvalidEmail(_) => AppError::BadRequest(INVALID_EMAIL.to_string()),
            UserError::Database(e) => AppError::from(e),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
