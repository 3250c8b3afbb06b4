//! Users API - REST server

use axum::{Router, routing::get};
use axum_helpers::server::{create_production_app, create_router, default_hooks, request_pipeline};
use core_config::tracing::install_color_eyre;
use domain_users::{PgUserRepository, UserService, handlers};
use migration::Migrator;
use observability::{Logger, init_metrics, init_tracing, metrics_handler};
use std::time::Duration;
use tracing::info;

mod config;
mod openapi;

use config::Config;

const BOOTSTRAP: &str = "Bootstrap";

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    let logger = Logger::stdio(config.logger);
    init_tracing(&logger);
    init_metrics()?;

    info!(
        context = BOOTSTRAP,
        environment = %config.environment,
        "Starting {} v{}", config.app.name, config.app.version
    );

    let db =
        database::postgres::connect_from_config_with_retry(config.database.clone(), None).await?;
    database::postgres::run_migrations::<Migrator>(&db, &config.app.name).await?;

    let users = UserService::new(PgUserRepository::new(db.clone()));
    let api_routes = Router::new().nest("/users", handlers::router(users));

    let router = create_router::<openapi::ApiDoc>(api_routes, &config.docs, config.app.clone())
        .route("/metrics", get(metrics_handler));
    let app = request_pipeline(
        router,
        &logger,
        config.environment,
        default_hooks(&logger, config.slow_request_threshold),
    );

    info!(
        context = BOOTSTRAP,
        "Listening on {}:{}", config.server.host, config.server.port
    );

    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        info!(context = BOOTSTRAP, "Shutting down: closing PostgreSQL connections");
        if let Err(e) = db.close().await {
            tracing::warn!(context = BOOTSTRAP, error = %e, "Failed to close database pool");
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!(context = BOOTSTRAP, "Users API shutdown complete");
    Ok(())
}
