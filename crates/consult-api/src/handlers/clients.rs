//! Admin client records
//!
//! Author: hephaex@gmail.com

use crate::auth::MessageResponse;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use consult_core::ClientInput;
use std::sync::Arc;
use validator::Validate;

/// List clients, newest first
#[utoipa::path(
    get,
    path = "/api/admin/clients",
    tag = "admin",
    responses(
        (status = 200, description = "All clients", body = [Client]),
        (status = 403, description = "Not an admin", body = ApiError),
    ),
    security(("token_auth" = []))
)]
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_clients().await?))
}

/// Create a client
///
/// Client emails are unique; a second client with the same email is a 400.
#[utoipa::path(
    post,
    path = "/api/admin/clients",
    tag = "admin",
    request_body = ClientInput,
    responses(
        (status = 201, description = "Client created", body = Client),
        (status = 400, description = "Invalid input or duplicate email", body = ApiError),
    ),
    security(("token_auth" = []))
)]
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ClientInput>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let client = state.store.create_client(input).await?;

    tracing::info!(client_id = %client.id, "Client created");
    Ok((StatusCode::CREATED, Json(client)))
}

#[utoipa::path(
    put,
    path = "/api/admin/clients/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Client ID")),
    request_body = ClientInput,
    responses(
        (status = 200, description = "Client updated", body = Client),
        (status = 400, description = "Invalid input or duplicate email", body = ApiError),
        (status = 404, description = "Client not found", body = ApiError),
    ),
    security(("token_auth" = []))
)]
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<ClientInput>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let client = state
        .store
        .update_client(&id, input)
        .await?
        .ok_or_else(|| AppError::not_found("Client"))?;
    Ok(Json(client))
}

#[utoipa::path(
    delete,
    path = "/api/admin/clients/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client removed", body = MessageResponse),
        (status = 404, description = "Client not found", body = ApiError),
    ),
    security(("token_auth" = []))
)]
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_client(&id).await? {
        return Err(AppError::not_found("Client"));
    }
    Ok(Json(MessageResponse::new("Client removed")))
}
