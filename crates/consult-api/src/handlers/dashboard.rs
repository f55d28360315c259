//! Admin dashboard counters
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use consult_core::DashboardStats;
use std::sync::Arc;

/// Record counts for the dashboard cards
#[utoipa::path(
    get,
    path = "/api/admin/dashboard-stats",
    tag = "admin",
    responses(
        (status = 200, description = "Record counts", body = DashboardStats),
        (status = 403, description = "Not an admin", body = ApiError),
    ),
    security(("token_auth" = []))
)]
pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let store = &state.store;
    let (messages, clients, prompts, users) = tokio::try_join!(
        store.count_messages(),
        store.count_clients(),
        store.count_prompts(),
        store.count_users(),
    )?;

    Ok(Json(DashboardStats {
        messages,
        clients,
        prompts,
        pricing: 0,
        users,
    }))
}
