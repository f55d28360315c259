/// Authentication middleware for protecting routes
///
/// Reads the session token from the configured request header (default
/// `x-auth-token`; the `Authorization: Bearer` scheme is not used) and
/// verifies it without touching the database. On success the caller's
/// identity is added to the request extensions as [`AuthenticatedUser`].
///
/// The role travels inside the token, so a demoted admin keeps admin access
/// until the token expires.
use super::jwt::{SessionClaims, TokenError};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use consult_core::Role;
use serde::Serialize;
use std::sync::Arc;

/// Identity taken from a verified session token
///
/// Extract in handlers with `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Role gate for handler-level checks
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl From<SessionClaims> for AuthenticatedUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.user.id,
            role: claims.user.role,
        }
    }
}

/// Authentication middleware that requires a valid session token
///
/// ```ignore
/// let protected = Router::new()
///     .route("/auth/verify", get(verify_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
/// ```
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let header_name = state.config.auth.token_header.as_str();

    let token = request
        .headers()
        .get(header_name)
        .ok_or(AppError::MissingToken)?
        .to_str()
        .map_err(|_| AppError::InvalidToken)?
        .trim();
    if token.is_empty() {
        return Err(AppError::MissingToken);
    }

    let claims = state.tokens.verify_session(token).map_err(|e| match e {
        TokenError::Expired => AppError::Expired,
        other => {
            tracing::debug!(reason = %other, "Rejected session token");
            AppError::InvalidToken
        }
    })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser::from(claims));

    Ok(next.run(request).await)
}

/// Type alias for role middleware future
type RoleMiddlewareFuture =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>;

/// Middleware factory for role-based access control
///
/// Must run after [`auth_middleware`]; layer it first so it ends up inside:
///
/// ```ignore
/// let admin = Router::new()
///     .route("/admin/users", get(list_users))
///     .route_layer(middleware::from_fn(require_role(Role::Admin)))
///     .route_layer(middleware::from_fn_with_state(state, auth_middleware));
/// ```
pub fn require_role(
    required_role: Role,
) -> impl Fn(Request<Body>, Next) -> RoleMiddlewareFuture + Clone {
    move |request: Request<Body>, next: Next| {
        Box::pin(async move {
            let user = request
                .extensions()
                .get::<AuthenticatedUser>()
                .ok_or(AppError::MissingToken)?;

            if let Err(e) = user.require_role(required_role) {
                tracing::warn!(
                    user_id = %user.user_id,
                    role = %user.role,
                    required = %required_role,
                    path = %request.uri().path(),
                    "Access denied"
                );
                return Err(e);
            }

            Ok(next.run(request).await)
        })
    }
}
