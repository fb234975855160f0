use axum::middleware;
use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use migration::Migrator;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before any fallible operation so startup errors are rendered too
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    observability::init_metrics()
        .map_err(|e| eyre::eyre!("Metrics recorder install failed: {}", e))?;

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    database::postgres::run_migrations::<Migrator>(&db, config.app.name)
        .await
        .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;

    let state = AppState { config, db };

    let api_routes = api::routes(&state);

    // - /health: liveness with app name/version
    // - /ready: database round-trip
    // - /metrics: Prometheus scrape
    let root_routes = health_router(state.config.app.clone())
        .merge(api::ready_router(state.clone()))
        .merge(api::metrics_router());

    // Adds /api prefix, docs viewers and the HTTP middleware stack to both
    let app = axum_helpers::create_router::<openapi::ApiDoc>(
        api_routes,
        root_routes,
        &state.config.environment,
    )?
    .layer(middleware::from_fn(observability::metrics_middleware));

    info!(
        app = state.config.app.name,
        version = state.config.app.version,
        "Starting todo API (30s shutdown timeout)"
    );

    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing database connections");
            match state.db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!(error = %e, "Error closing PostgreSQL"),
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Todo API shutdown complete");
    Ok(())
}
