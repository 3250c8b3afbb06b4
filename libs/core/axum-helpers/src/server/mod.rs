//! Server infrastructure module.
//!
//! This module provides:
//! - The request pipeline (request id, CORS, instrumentation, exception filter, panic catcher)
//! - Application setup with OpenAPI documentation
//! - Health endpoint
//! - Graceful shutdown coordination
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, default_hooks, request_pipeline};
//! use core_config::app_info;
//!
//! let router = create_router::<ApiDoc>(api_routes, &docs, app_info!());
//! let router = request_pipeline(router, &logger, environment, default_hooks(&logger, threshold));
//! create_production_app(router, &server_config, Duration::from_secs(30), cleanup).await?;
//! ```

pub mod app;
pub mod health;
pub mod pipeline;
pub mod shutdown;

pub use app::{create_app, create_production_app, create_router};
pub use health::{HealthResponse, health_router};
pub use pipeline::{default_hooks, request_pipeline};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
