// src/bin/api_server.rs

use anyhow::Context;
use cars_catalog::infra::logging::init_logging;
use cars_catalog::transport;
use cars_catalog::{Config, HttpCarInfoClient, PostgresStorage};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_logging(config.env)?;

    tracing::info!(env = ?config.env, "starting cars-catalog api");
    tracing::debug!("debug messages are enabled");

    // --- Storage Initialization ---
    let storage = PostgresStorage::connect(&config.storage, config.db_max_connections)
        .await
        .context("failed to init storage")?;
    tracing::info!(max_connections = config.db_max_connections, "storage initialized");

    // --- Car-info Client ---
    let car_info = HttpCarInfoClient::new(&config.help_api, config.help_api_timeout)
        .context("failed to build car-info client")?;

    let app_state = transport::http::AppState {
        storage: Arc::new(storage),
        car_info: Arc::new(car_info),
    };

    // --- API Server Initialization ---
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()));
    let app = transport::http::apply_middleware(app, config.timeout);

    let listener = tokio::net::TcpListener::bind(&config.address)
        .await
        .with_context(|| format!("failed to bind {}", config.address))?;
    tracing::info!(address = %config.address, "server started");
    tracing::info!("Swagger UI available at /swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received SIGINT (Ctrl+C), stopping server");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, stopping server");
        }
    }
}
