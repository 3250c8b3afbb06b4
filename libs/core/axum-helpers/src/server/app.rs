use super::health::health_router;
use super::shutdown::{ShutdownCoordinator, shutdown_signal};
use crate::errors::handlers::{method_not_allowed, not_found};
use axum::Router;
use core_config::AppInfo;
use core_config::docs::DocsConfig;
use core_config::server::ServerConfig;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use utoipa::OpenApi;

/// Starts the Axum server with graceful shutdown.
///
/// # Errors
/// Returns an error if:
/// - The TCP listener fails to bind to the configured address
/// - The server encounters an error during operation
pub async fn create_app(router: Router, server_config: &ServerConfig) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;

    info!(context = "Bootstrap", "Server starting on {}", listener.local_addr()?);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .inspect_err(|e| {
        tracing::error!(context = "Bootstrap", "Server encountered an error: {:?}", e);
    })
}

/// Creates the application router.
///
/// This function sets up:
/// - API routes and `/health` nested under `/api`
/// - OpenAPI documentation when enabled: Swagger UI at the configured path,
///   plus ReDoc, RapiDoc and Scalar
/// - 404 and 405 fallbacks that answer through the error envelope
///
/// The document's title, description and version come from `docs`.
/// Cross-cutting layers are added separately with
/// [`request_pipeline`](super::request_pipeline).
///
/// # Example
/// ```ignore
/// #[derive(OpenApi)]
/// #[openapi(paths(/* your paths */))]
/// struct ApiDoc;
///
/// let api_routes = Router::new().nest("/users", users_router(service));
/// let router = create_router::<ApiDoc>(api_routes, &DocsConfig::default(), app_info!());
/// ```
pub fn create_router<T>(apis: Router, docs: &DocsConfig, app_info: AppInfo) -> Router
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let mut router = Router::new().nest("/api", apis.merge(health_router(app_info)));

    if docs.enabled {
        let mut openapi = T::openapi();
        openapi.info.title = docs.title.clone();
        openapi.info.description = Some(docs.description.clone());
        openapi.info.version = docs.version.clone();

        info!(
            context = "Bootstrap",
            "API documentation available at {}",
            docs.ui_route()
        );

        router = router
            .merge(SwaggerUi::new(docs.ui_route()).url(docs.spec_route(), openapi.clone()))
            .merge(Redoc::with_url("/redoc", openapi.clone()))
            .merge(RapiDoc::new(docs.spec_route()).path("/rapidoc"))
            .merge(Scalar::with_url("/scalar", openapi));
    }

    router
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
}

/// Production server with coordinated shutdown and cleanup.
///
/// In-flight requests drain after SIGINT/SIGTERM, then `cleanup` runs
/// (closing database pools and the like) bounded by `shutdown_timeout`.
///
/// # Example
/// ```ignore
/// let cleanup = async move {
///     db.close().await.ok();
/// };
///
/// create_production_app(router, &config, Duration::from_secs(30), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let coordinator = ShutdownCoordinator::default();
    let signal = coordinator.clone();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!(context = "Bootstrap", "Server starting on {}", listener.local_addr()?);

    let serve_result = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { signal.wait_for_signal().await })
    .await
    .inspect_err(|e| {
        tracing::error!(context = "Bootstrap", "Server encountered an error: {:?}", e);
    });

    info!(
        context = "Bootstrap",
        "Starting cleanup tasks (timeout: {:?})", shutdown_timeout
    );
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!(context = "Bootstrap", "Cleanup completed successfully"),
        Err(_) => tracing::warn!(
            context = "Bootstrap",
            "Cleanup exceeded timeout of {:?}, forcing shutdown",
            shutdown_timeout
        ),
    }

    serve_result
}
