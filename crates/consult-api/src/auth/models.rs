//! Request and response bodies for the authentication endpoints
//!
//! Request types hold plaintext passwords, so they deliberately do not
//! implement `Debug`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// User registration request
#[derive(Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be 6 or more characters"))]
    pub password: String,
}

/// User login request
#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Password-reset issuance request
///
/// A missing email is treated as empty so every JSON object gets the same
/// answer.
#[derive(Clone, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

/// Password-reset redemption request
#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[serde(alias = "newPassword")]
    #[validate(length(min = 6, message = "Password must be 6 or more characters"))]
    pub password: String,
}

/// Session token returned by registration and login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Plain confirmation message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_accepts_camel_case() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"fullName":"Ada","email":"ada@example.com","password":"secret1"}"#,
        )
        .unwrap();
        assert_eq!(req.full_name.as_deref(), Some("Ada"));
        assert!(req.validate().is_ok());

        let req: RegisterRequest =
            serde_json::from_str(r#"{"email":"ada@example.com","password":"12345"}"#).unwrap();
        assert!(req.full_name.is_none());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_reset_request_accepts_new_password_alias() {
        let req: ResetPasswordRequest =
            serde_json::from_str(r#"{"token":"t","newPassword":"secret2"}"#).unwrap();
        assert_eq!(req.password, "secret2");
    }

    #[test]
    fn test_forgot_request_defaults_missing_email() {
        let req: ForgotPasswordRequest = serde_json::from_str("{}").unwrap();
        assert!(req.email.is_empty());
    }
}
