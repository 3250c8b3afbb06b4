//! # Axum Helpers
//!
//! Building blocks shared by the HTTP services in this workspace.
//!
//! ## Modules
//!
//! - **[`errors`]**: failure model, normalization, error envelope and the exception filter
//! - **[`extractors`]**: validated JSON/query extractors and the UUID path extractor
//! - **[`server`]**: request pipeline, router and docs setup, health, graceful shutdown
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_app, create_router, default_hooks, request_pipeline};
//! use core_config::{app_info, docs::DocsConfig, server::ServerConfig, Environment};
//! use observability::{Logger, LoggerConfig};
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let logger = Logger::stdio(LoggerConfig::default());
//!     let router = create_router::<ApiDoc>(Router::new(), &DocsConfig::default(), app_info!());
//!     let router = request_pipeline(
//!         router,
//!         &logger,
//!         Environment::from_env(),
//!         default_hooks(&logger, std::time::Duration::from_secs(1)),
//!     );
//!     create_app(router, &ServerConfig::default()).await
//! }
//! ```

pub mod errors;
pub mod extractors;
pub mod server;

pub use errors::{
    AppError, ClientFault, ErrorEnvelope, ErrorMessage, ExceptionFilter, Fault, FieldErrors,
    Payload, UnknownFault, exception_filter,
};
pub use extractors::{UuidPath, ValidatedJson, ValidatedQuery};
pub use server::{
    HealthResponse, ShutdownCoordinator, create_app, create_production_app, create_router,
    default_hooks, health_router, request_pipeline, shutdown_signal,
};
