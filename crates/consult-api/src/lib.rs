//! Consult API - REST server for the consulting site back office
//!
//! Provides the authentication core (registration, login, token
//! verification, role gate, password reset) and the admin resource routes
//! built on top of it.
//!
//! Author: hephaex@gmail.com

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use consult_core::ServerConfig;
use handlers::health;
use openapi::ApiDoc;
use state::AppState;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build the complete application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server, &state.config.auth.token_header);
    let body_limit = state.config.server.max_body_size;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::prometheus_metrics))
        .nest("/api", routes::api_routes(state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::metrics_middleware,
        ))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured front-end origins
///
/// An empty list or `*` allows any origin. The session token header must be
/// listed explicitly or browsers strip it from cross-origin requests.
fn cors_layer(server: &ServerConfig, token_header: &str) -> CorsLayer {
    let mut allowed_headers = vec![header::CONTENT_TYPE, header::ACCEPT];
    match HeaderName::from_bytes(token_header.as_bytes()) {
        Ok(name) => allowed_headers.push(name),
        Err(e) => tracing::warn!(header = %token_header, error = %e, "Invalid token header name"),
    }

    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(allowed_headers);

    if server.cors_origins.is_empty() || server.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Application state over the memory store, for integration tests
///
/// Uses a cheap Argon2 configuration and an in-memory outbox so tests can
/// read the reset links that would have been delivered.
#[cfg(feature = "test-utils")]
pub fn create_test_state() -> (Arc<AppState>, Arc<auth::OutboxDelivery>) {
    let mut config = consult_core::AppConfig::default();
    config.auth.jwt_secret = format!("test-secret-{}", consult_core::models::new_record_id());

    let store: Arc<dyn consult_store::Store> = Arc::new(consult_store::MemoryStore::new());
    let outbox = Arc::new(auth::OutboxDelivery::new());

    // Each state owns a fresh registry, so registration cannot collide
    let state = AppState::with_password_config(
        config,
        store,
        outbox.clone(),
        auth::PasswordConfig::low_cost(),
    )
    .expect("metrics registry");

    (Arc::new(state), outbox)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_config() {
        let mut server = ServerConfig::default();
        let _ = cors_layer(&server, "x-auth-token");

        server.cors_origins = vec!["http://localhost:5173".to_string(), "bad\norigin".to_string()];
        let _ = cors_layer(&server, "x-auth-token");
    }
}
