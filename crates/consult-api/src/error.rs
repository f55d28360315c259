//! API error handling
//!
//! Every failure leaving a handler or middleware is an [`AppError`], rendered
//! as `{ "code": ..., "msg": ... }` with the matching status code.
//!
//! Author: hephaex@gmail.com

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use consult_core::ConsultError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub msg: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            msg: msg.into(),
        }
    }
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("User already exists")]
    DuplicateEmail,

    /// Shared by "no such user" and "wrong password"
    #[error("Invalid Credentials")]
    InvalidCredentials,

    #[error("No token, authorization denied")]
    MissingToken,

    #[error("Token is not valid")]
    InvalidToken,

    #[error("Token has expired")]
    Expired,

    #[error("Password reset token has expired.")]
    ResetExpired,

    #[error("Invalid or expired token.")]
    ResetInvalid,

    #[error("Access denied. Not an admin.")]
    Forbidden,

    /// Carries the resource name, e.g. "User"
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// Detail is logged, never sent to the client
    #[error("Server error")]
    Internal(String),
}

impl AppError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        Self::Internal(detail.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateEmail
            | AppError::InvalidCredentials
            | AppError::ResetExpired
            | AppError::ResetInvalid
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MissingToken | AppError::InvalidToken | AppError::Expired => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::DuplicateEmail => "DUPLICATE_EMAIL",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::MissingToken => "MISSING_TOKEN",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::Expired => "TOKEN_EXPIRED",
            AppError::ResetExpired => "RESET_TOKEN_EXPIRED",
            AppError::ResetInvalid => "RESET_TOKEN_INVALID",
            AppError::Forbidden => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "SERVER_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Request failed with internal error");
        }

        let status = self.status();
        let body = ApiError::new(self.code(), self.to_string());

        (status, Json(body)).into_response()
    }
}

impl From<ConsultError> for AppError {
    fn from(err: ConsultError) -> Self {
        match err {
            ConsultError::NotFound(resource) => AppError::NotFound(resource),
            ConsultError::Duplicate { field } => {
                AppError::BadRequest(format!("A record with this {field} already exists"))
            }
            ConsultError::ValidationError(msg) => AppError::BadRequest(msg),
            ConsultError::DatabaseError(msg) => AppError::Internal(format!("Database error: {msg}")),
            ConsultError::ConfigError(msg) => {
                AppError::Internal(format!("Configuration error: {msg}"))
            }
            ConsultError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::BadRequest(validation_message(&errors))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// First validation message, taken from the alphabetically first failing field
fn validation_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("Invalid {field}"),
            })
        })
        .unwrap_or_else(|| "Invalid request".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(email(message = "Please include a valid email"))]
        email: String,
        #[validate(length(min = 6))]
        password: String,
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Expired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::ResetExpired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::not_found("User").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::internal("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(AppError::InvalidCredentials.to_string(), "Invalid Credentials");
        assert_eq!(AppError::not_found("Client").to_string(), "Client not found");
        assert_eq!(AppError::internal("db down").to_string(), "Server error");
    }

    #[tokio::test]
    async fn test_internal_detail_not_serialized() {
        let response = AppError::internal("connection refused at 10.0.0.5").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "SERVER_ERROR");
        assert_eq!(error.msg, "Server error");
    }

    #[test]
    fn test_duplicate_becomes_bad_request() {
        let err: AppError = ConsultError::duplicate("title").into();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg.contains("title")));
    }

    #[test]
    fn test_validation_errors_use_field_message() {
        let probe = Probe {
            email: "nope".to_string(),
            password: "123".to_string(),
        };
        let err: AppError = probe.validate().unwrap_err().into();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Please include a valid email"));

        let probe = Probe {
            email: "a@x.com".to_string(),
            password: "123".to_string(),
        };
        let err: AppError = probe.validate().unwrap_err().into();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Invalid password"));
    }
}
