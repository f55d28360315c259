//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::auth::middleware::{auth_middleware, require_role};
use crate::handlers::{auth, clients, dashboard, messages, prompts, users};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use consult_core::Role;
use std::sync::Arc;

/// Create the routes nested under `/api`
///
/// Three tiers: public, any signed-in user, and admin. Layers added with
/// `route_layer` run last-added first, so the token check wraps the role gate.
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/forgot-password", post(auth::forgot_password_handler))
        .route("/auth/reset-password", post(auth::reset_password_handler))
        .route("/admin/contact", post(messages::submit_contact));

    // Any valid session token
    let session_routes = Router::new()
        .route("/auth/verify", get(auth::verify_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Back office
    let admin_routes = Router::new()
        .route("/admin/dashboard-stats", get(dashboard::dashboard_stats))
        .route("/admin/users", get(users::list_users))
        .route(
            "/admin/users/:id",
            put(users::update_user).delete(users::delete_user),
        )
        .route(
            "/admin/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/admin/clients/:id",
            put(clients::update_client).delete(clients::delete_client),
        )
        .route("/admin/messages", get(messages::list_messages))
        .route("/admin/messages/:id", delete(messages::delete_message))
        .route(
            "/admin/messages/:id/status",
            put(messages::update_message_status),
        )
        .route(
            "/admin/prompts",
            get(prompts::list_prompts).post(prompts::create_prompt),
        )
        .route(
            "/admin/prompts/:id",
            put(prompts::update_prompt).delete(prompts::delete_prompt),
        )
        .route_layer(middleware::from_fn(require_role(Role::Admin)))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(admin_routes)
}
