use crate::errors::{ExceptionFilter, exception_filter, handle_panic};
use axum::{Router, middleware};
use core_config::Environment;
use observability::{HookPipeline, Logger, LoggingHook, MetricsHook, PerformanceHook, instrument};
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Hooks every service runs: metrics, request logging, slow-request warnings.
pub fn default_hooks(logger: &Logger, slow_request_threshold: Duration) -> HookPipeline {
    HookPipeline::new()
        .with(MetricsHook)
        .with(LoggingHook::new(logger))
        .with(PerformanceHook::with_threshold(logger, slow_request_threshold))
}

/// Wrap `router` in the request pipeline. Outermost first:
///
/// 1. `x-request-id`: kept when sent, generated (UUID v4) otherwise, echoed on the response
/// 2. CORS (any origin)
/// 3. [`instrument`]: request metadata capture and `hooks`
/// 4. [`exception_filter`]: faults become envelopes, one log line each
/// 5. panic catcher: panics become unknown faults
pub fn request_pipeline(
    router: Router,
    logger: &Logger,
    environment: Environment,
    hooks: HookPipeline,
) -> Router {
    let filter = ExceptionFilter::new(logger, environment);

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(filter, exception_filter))
        .layer(middleware::from_fn_with_state(hooks, instrument))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
