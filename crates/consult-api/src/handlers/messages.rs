//! Contact-form messages
//!
//! Submission is public; reading and triaging is admin-only.
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
use consult_core::{Message, MessageStatus, NewMessage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// Status change body
#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdate {
    pub status: MessageStatus,
}

/// Contact-form acknowledgement
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    pub msg: String,
    pub message: Message,
}

/// Submit the public contact form
///
/// Fields are trimmed before validation: name 1-100 characters, a valid
/// email of at most 255 characters, message 1-1000 characters.
#[utoipa::path(
    post,
    path = "/api/admin/contact",
    tag = "contact",
    request_body = NewMessage,
    responses(
        (status = 201, description = "Message stored", body = ContactResponse),
        (status = 400, description = "Invalid input", body = ApiError),
    )
)]
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewMessage>,
) -> Result<impl IntoResponse, AppError> {
    let input = input.trimmed();
    input.validate()?;

    let message = state.store.create_message(input).await?;
    tracing::info!(message_id = %message.id, "Contact message received");

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            msg: "Message submitted successfully".to_string(),
            message,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/messages",
    tag = "admin",
    responses(
        (status = 200, description = "All messages, newest first", body = [Message]),
    ),
    security(("token_auth" = []))
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store.list_messages().await?))
}

/// Mark a message unread, read or resolved
#[utoipa::path(
    put,
    path = "/api/admin/messages/{id}/status",
    tag = "admin",
    params(("id" = String, Path, description = "Message ID")),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Message updated", body = Message),
        (status = 404, description = "Message not found", body = ApiError),
    ),
    security(("token_auth" = []))
)]
pub async fn update_message_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let message = state
        .store
        .update_message_status(&id, body.status)
        .await?
        .ok_or_else(|| AppError::not_found("Message"))?;

    tracing::debug!(message_id = %message.id, status = message.status.as_str(), "Message status changed");
    Ok(Json(message))
}

#[utoipa::path(
    delete,
    path = "/api/admin/messages/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message removed", body = MessageResponse),
        (status = 404, description = "Message not found", body = ApiError),
    ),
    security(("token_auth" = []))
)]
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_message(&id).await? {
        return Err(AppError::not_found("Message"));
    }
    Ok(Json(MessageResponse::new("Message removed")))
}
