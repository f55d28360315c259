//! Authentication API handlers
//!
//! Registration, login, session verification and the password-reset flow.
//! All logic lives in [`crate::auth::AuthService`]; these functions only
//! unpack requests and shape responses.
//!
//! Author: hephaex@gmail.com

use crate::auth::{
    AuthenticatedUser, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
};
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Extension, Json};
use std::sync::Arc;

/// Register a new user account
///
/// New accounts always get the `user` role. The response carries a session
/// token so the front end can sign the user in immediately.
///
/// # Responses
///
/// * `200 OK` - Account created, returns `{token}`
/// * `400 Bad Request` - Email already registered or invalid input
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = TokenResponse),
        (status = 400, description = "User already exists or invalid input", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError),
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth.register(request).await?;
    Ok(Json(response))
}

/// Login with email and password
///
/// Unknown email and wrong password produce the same 400 response.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Invalid credentials", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth.login(request).await?;
    Ok(Json(response))
}

/// Return the user the session token belongs to
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserPublic),
        (status = 401, description = "Missing, invalid or expired token", body = ApiError),
        (status = 404, description = "User no longer exists", body = ApiError),
    ),
    security(("token_auth" = []))
)]
pub async fn verify_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.auth.current_user(&user.user_id).await?;
    Ok(Json(profile))
}

/// Request a password-reset link
///
/// Always answers 200 with the same message; whether the email is
/// registered is never revealed.
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset requested", body = MessageResponse),
    )
)]
pub async fn forgot_password_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth.forgot_password(request).await?;
    Ok(Json(response))
}

/// Set a new password using a reset token
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Reset token expired, invalid or already used", body = ApiError),
    )
)]
pub async fn reset_password_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth.reset_password(request).await?;
    Ok(Json(response))
}
