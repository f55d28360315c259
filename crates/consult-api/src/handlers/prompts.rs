//! Admin prompt-kit templates
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
use consult_core::PromptInput;
use std::sync::Arc;
use validator::Validate;

#[utoipa::path(
    get,
    path = "/api/admin/prompts",
    tag = "admin",
    responses(
        (status = 200, description = "All prompts, newest first", body = [Prompt]),
    ),
    security(("token_auth" = []))
)]
pub async fn list_prompts(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_prompts().await?))
}

/// Create a prompt template
///
/// Titles are unique. A missing or blank category becomes "General".
#[utoipa::path(
    post,
    path = "/api/admin/prompts",
    tag = "admin",
    request_body = PromptInput,
    responses(
        (status = 201, description = "Prompt created", body = Prompt),
        (status = 400, description = "Invalid input or duplicate title", body = ApiError),
    ),
    security(("token_auth" = []))
)]
pub async fn create_prompt(
    State(state): State<Arc<AppState>>,
    Json(input): Json<PromptInput>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let prompt = state.store.create_prompt(input).await?;

    tracing::info!(prompt_id = %prompt.id, title = %prompt.title, "Prompt created");
    Ok((StatusCode::CREATED, Json(prompt)))
}

#[utoipa::path(
    put,
    path = "/api/admin/prompts/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Prompt ID")),
    request_body = PromptInput,
    responses(
        (status = 200, description = "Prompt updated", body = Prompt),
        (status = 400, description = "Invalid input or duplicate title", body = ApiError),
        (status = 404, description = "Prompt not found", body = ApiError),
    ),
    security(("token_auth" = []))
)]
pub async fn update_prompt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<PromptInput>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;
    let prompt = state
        .store
        .update_prompt(&id, input)
        .await?
        .ok_or_else(|| AppError::not_found("Prompt"))?;
    Ok(Json(prompt))
}

#[utoipa::path(
    delete,
    path = "/api/admin/prompts/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Prompt ID")),
    responses(
        (status = 200, description = "Prompt removed", body = MessageResponse),
        (status = 404, description = "Prompt not found", body = ApiError),
    ),
    security(("token_auth" = []))
)]
pub async fn delete_prompt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_prompt(&id).await? {
        return Err(AppError::not_found("Prompt"));
    }
    Ok(Json(MessageResponse::new("Prompt removed")))
}
