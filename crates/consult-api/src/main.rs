//! Consult API Server
//!
//! REST API server for the consulting site back office.
//!
//! Author: hephaex@gmail.com

use anyhow::Context;
use consult_api::{auth::LogDelivery, create_router, state::AppState};
use consult_core::config::{AppConfig, LoggingConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match std::env::var("CONSULT_CONFIG") {
        Ok(path) => AppConfig::from_file(&path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };

    init_tracing(&config.logging);

    if config.auth.is_default_secret() {
        tracing::warn!("JWT_SECRET is not set; using the development secret");
    }

    let store = consult_store::connect(&config.database)
        .await
        .context("failed to open store")?;

    let addr = config.server.bind_addr();
    let state = Arc::new(AppState::new(config, store, Arc::new(LogDelivery))?);
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Consult API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Initialize tracing; `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "consult_api={level},consult_store={level},tower_http={level}",
            level = logging.level
        )
        .into()
    });

    if logging.json_format {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
