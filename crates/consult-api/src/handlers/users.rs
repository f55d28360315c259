//! Admin user management
//!
//! Author: hephaex@gmail.com

use crate::auth::MessageResponse;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use consult_core::{UserPublic, UserUpdate};
use std::sync::Arc;

/// List all users (public view)
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    responses(
        (status = 200, description = "All users", body = [UserPublic]),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 403, description = "Not an admin", body = ApiError),
    ),
    security(("token_auth" = []))
)]
pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let users: Vec<UserPublic> = state
        .store
        .list_users()
        .await?
        .iter()
        .map(|u| u.to_public())
        .collect();
    Ok(Json(users))
}

/// Change a user's role or display name
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "User ID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Updated user", body = UserPublic),
        (status = 400, description = "Nothing to update", body = ApiError),
        (status = 404, description = "User not found", body = ApiError),
    ),
    security(("token_auth" = []))
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<UserUpdate>,
) -> Result<impl IntoResponse, AppError> {
    if update.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    let user = state
        .store
        .update_user(&id, update)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    tracing::info!(user_id = %user.id, role = %user.role, "User updated");
    Ok(Json(user.to_public()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User removed", body = MessageResponse),
        (status = 404, description = "User not found", body = ApiError),
    ),
    security(("token_auth" = []))
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_user(&id).await? {
        return Err(AppError::not_found("User"));
    }

    tracing::info!(user_id = %id, "User deleted");
    Ok(Json(MessageResponse::new("User removed")))
}
