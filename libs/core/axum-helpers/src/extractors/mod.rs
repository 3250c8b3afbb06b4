//! Custom extractors for Axum handlers.
//!
//! Rejections are [`AppError`](crate::errors::AppError)s, so they reach the
//! client through the same envelope as every other failure.

pub mod uuid_path;
pub mod validated_json;
pub mod validated_query;
mod validation;

pub use uuid_path::UuidPath;
pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;
pub use validation::flatten_errors;
