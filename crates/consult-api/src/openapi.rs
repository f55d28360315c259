//! OpenAPI documentation
//!
//! - Swagger UI: `/swagger-ui`
//! - OpenAPI JSON: `/api-docs/openapi.json`

use crate::auth::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest, ResetPasswordRequest,
    TokenResponse,
};
use crate::error::ApiError;
use crate::handlers::health::{HealthResponse, ReadinessChecks, ReadinessResponse};
use crate::handlers::messages::{ContactResponse, StatusUpdate};
use consult_core::{
    Client, ClientInput, DashboardStats, Message, MessageStatus, NewMessage, Prompt, PromptInput,
    Role, UserPublic, UserUpdate,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Session token carried in a custom header
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token_auth",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-auth-token",
                    "Session token returned by /api/auth/register or /api/auth/login",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Consult API",
        description = "Authentication and back-office API for the consulting site"
    ),
    paths(
        crate::handlers::health::health_check,
        crate::handlers::health::readiness_check,
        crate::handlers::auth::register_handler,
        crate::handlers::auth::login_handler,
        crate::handlers::auth::verify_handler,
        crate::handlers::auth::forgot_password_handler,
        crate::handlers::auth::reset_password_handler,
        crate::handlers::dashboard::dashboard_stats,
        crate::handlers::users::list_users,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::clients::list_clients,
        crate::handlers::clients::create_client,
        crate::handlers::clients::update_client,
        crate::handlers::clients::delete_client,
        crate::handlers::messages::submit_contact,
        crate::handlers::messages::list_messages,
        crate::handlers::messages::update_message_status,
        crate::handlers::messages::delete_message,
        crate::handlers::prompts::list_prompts,
        crate::handlers::prompts::create_prompt,
        crate::handlers::prompts::update_prompt,
        crate::handlers::prompts::delete_prompt,
    ),
    components(
        schemas(
            ApiError,
            RegisterRequest,
            LoginRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            TokenResponse,
            MessageResponse,
            Role,
            UserPublic,
            UserUpdate,
            Client,
            ClientInput,
            Message,
            MessageStatus,
            NewMessage,
            StatusUpdate,
            ContactResponse,
            Prompt,
            PromptInput,
            DashboardStats,
            HealthResponse,
            ReadinessResponse,
            ReadinessChecks,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and password reset"),
        (name = "admin", description = "Back-office resources (admin role required)"),
        (name = "contact", description = "Public contact form"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Consult API");
        assert!(spec.to_json().is_ok());
    }

    #[test]
    fn test_auth_paths_registered() {
        let paths = ApiDoc::openapi().paths.paths;
        for path in [
            "/api/auth/register",
            "/api/auth/login",
            "/api/auth/verify",
            "/api/auth/forgot-password",
            "/api/auth/reset-password",
            "/api/admin/users/{id}",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_security_scheme_registered() {
        let components = ApiDoc::openapi().components.unwrap();
        assert!(components.security_schemes.contains_key("token_auth"));
    }
}
