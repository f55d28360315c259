//! Authentication service layer
//!
//! Provides the business logic behind registration, login, session lookup
//! and the password-reset flow. Handlers stay thin and call into
//! [`AuthService`].

use super::delivery::{ResetDelivery, ResetNotice};
use super::jwt::{TokenError, TokenService};
use super::models::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest, ResetPasswordRequest,
    TokenResponse,
};
use super::password::HashingService;
use crate::error::AppError;
use crate::middleware::metrics::{ApiMetrics, AuthEvent};
use consult_core::{AuthConfig, NewUser, Role, User, UserPublic};
use consult_store::{unique, Store};
use std::sync::Arc;
use validator::Validate;

/// Response to every password-reset request, whether or not the email exists
pub const RESET_REQUESTED_MSG: &str =
    "If an account with that email exists, a password reset link has been sent.";

pub const RESET_COMPLETED_MSG: &str = "Password has been reset successfully.";

/// Authentication service
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: Arc<TokenService>,
    hasher: HashingService,
    delivery: Arc<dyn ResetDelivery>,
    metrics: Arc<ApiMetrics>,
    auth_config: AuthConfig,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn Store>,
        tokens: Arc<TokenService>,
        hasher: HashingService,
        delivery: Arc<dyn ResetDelivery>,
        metrics: Arc<ApiMetrics>,
        auth_config: AuthConfig,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
            delivery,
            metrics,
            auth_config,
        }
    }

    /// Register a new user and return a session token
    ///
    /// The email lookup before hashing only avoids wasted work; the store's
    /// unique index decides concurrent registrations.
    pub async fn register(&self, request: RegisterRequest) -> Result<TokenResponse, AppError> {
        request.validate()?;

        if self.store.find_user_by_email(&request.email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash(&request.password).await.map_err(AppError::internal)?;

        let user = self
            .store
            .create_user(NewUser {
                full_name: request.full_name.filter(|n| !n.trim().is_empty()),
                email: request.email,
                password_hash,
                role: Role::User,
            })
            .await
            .map_err(|e| {
                if e.is_duplicate_of(unique::USER_EMAIL) {
                    AppError::DuplicateEmail
                } else {
                    AppError::from(e)
                }
            })?;

        let token = self.tokens.issue_session(&user).map_err(AppError::internal)?;

        self.metrics.record_auth(AuthEvent::Register);
        tracing::info!(user_id = %user.id, "User registered");

        Ok(TokenResponse { token })
    }

    /// Authenticate with email and password
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, request: LoginRequest) -> Result<TokenResponse, AppError> {
        request.validate()?;

        let Some(user) = self.store.find_user_by_email(&request.email).await? else {
            return Err(self.login_failed(None));
        };

        let matches = self
            .hasher
            .verify(&request.password, &user.password_hash)
            .await
            .map_err(AppError::internal)?;
        if !matches {
            return Err(self.login_failed(Some(&user)));
        }

        let token = self.tokens.issue_session(&user).map_err(AppError::internal)?;

        self.metrics.record_auth(AuthEvent::LoginSuccess);
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(TokenResponse { token })
    }

    fn login_failed(&self, user: Option<&User>) -> AppError {
        self.metrics.record_auth(AuthEvent::LoginFailure);
        tracing::debug!(user_id = user.map(|u| u.id.as_str()), "Login failed");
        AppError::InvalidCredentials
    }

    /// Public view of the user a session token belongs to
    pub async fn current_user(&self, user_id: &str) -> Result<UserPublic, AppError> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .map(|user| user.to_public())
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// Issue a reset token for `email` if such a user exists
    ///
    /// The response never reveals whether the email is registered. Token and
    /// delivery failures are logged and swallowed for the same reason.
    pub async fn forgot_password(
        &self,
        request: ForgotPasswordRequest,
    ) -> Result<MessageResponse, AppError> {
        let email = request.email.trim();

        if let Some(user) = self.store.find_user_by_email(email).await? {
            self.metrics.record_auth(AuthEvent::ResetRequested);
            if let Err(e) = self.send_reset_link(&user).await {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to deliver reset link");
            }
        }

        Ok(MessageResponse::new(RESET_REQUESTED_MSG))
    }

    async fn send_reset_link(&self, user: &User) -> anyhow::Result<()> {
        let token = self.tokens.issue_reset(user)?;
        let notice = ResetNotice {
            user_id: user.id.clone(),
            email: user.email.clone(),
            link: self.auth_config.reset_link(&token),
            token,
        };
        self.delivery.deliver(notice).await
    }

    /// Redeem a reset token and set a new password
    ///
    /// Each token is good for one successful reset: the store only accepts
    /// the write while the user's reset generation still matches the token.
    pub async fn reset_password(
        &self,
        request: ResetPasswordRequest,
    ) -> Result<MessageResponse, AppError> {
        let claims = self.tokens.verify_reset(&request.token).map_err(|e| match e {
            TokenError::Expired => AppError::ResetExpired,
            _ => AppError::ResetInvalid,
        })?;

        request.validate()?;

        let user = self
            .store
            .find_user_by_id(&claims.id)
            .await?
            .ok_or(AppError::ResetInvalid)?;
        if user.reset_generation != claims.gen {
            return Err(AppError::ResetInvalid);
        }

        let password_hash = self.hasher.hash(&request.password).await.map_err(AppError::internal)?;

        let applied = self
            .store
            .reset_password(&user.id, &password_hash, claims.gen)
            .await?;
        if !applied {
            return Err(AppError::ResetInvalid);
        }

        self.metrics.record_auth(AuthEvent::ResetCompleted);
        tracing::info!(user_id = %user.id, "Password reset completed");

        Ok(MessageResponse::new(RESET_COMPLETED_MSG))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::delivery::OutboxDelivery;
    use crate::auth::jwt::{now_secs, JwtConfig};
    use crate::auth::password::PasswordConfig;
    use consult_store::{MemoryStore, UserStore};

    struct Fixture {
        service: AuthService,
        store: Arc<MemoryStore>,
        tokens: Arc<TokenService>,
        outbox: Arc<OutboxDelivery>,
        metrics: Arc<ApiMetrics>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let tokens = Arc::new(TokenService::new(JwtConfig {
            secret: "service-test-secret".to_string(),
            ..Default::default()
        }));
        let outbox = Arc::new(OutboxDelivery::new());
        let metrics = Arc::new(ApiMetrics::new().unwrap());
        let service = AuthService::new(
            store.clone(),
            tokens.clone(),
            HashingService::new(PasswordConfig::low_cost()),
            outbox.clone(),
            metrics.clone(),
            AuthConfig::default(),
        );
        Fixture {
            service,
            store,
            tokens,
            outbox,
            metrics,
        }
    }

    fn register(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            full_name: None,
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let f = fixture();
        let registered = f.service.register(register("a@x.com", "secret1")).await.unwrap();
        let claims = f.tokens.verify_session(&registered.token).unwrap();
        assert_eq!(claims.user.role, Role::User);

        let logged_in = f.service.login(login("a@x.com", "secret1")).await.unwrap();
        let login_claims = f.tokens.verify_session(&logged_in.token).unwrap();
        assert_eq!(login_claims.user.id, claims.user.id);

        assert_eq!(f.metrics.auth_count(AuthEvent::Register), 1);
        assert_eq!(f.metrics.auth_count(AuthEvent::LoginSuccess), 1);
    }

    #[tokio::test]
    async fn test_register_never_stores_plaintext() {
        let f = fixture();
        f.service.register(register("a@x.com", "secret1")).await.unwrap();

        let user = f.store.find_user_by_email("a@x.com").await.unwrap().unwrap();
        assert_ne!(user.password_hash, "secret1");
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let f = fixture();
        f.service.register(register("a@x.com", "secret1")).await.unwrap();

        let err = f.service.register(register("a@x.com", "other-pass")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let f = fixture();
        f.service.register(register("a@x.com", "secret1")).await.unwrap();

        let wrong_password = f.service.login(login("a@x.com", "wrong1")).await.unwrap_err();
        let unknown_email = f.service.login(login("nobody@x.com", "secret1")).await.unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_email, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(f.metrics.auth_count(AuthEvent::LoginFailure), 2);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let f = fixture();
        let err = f.service.register(register("not-an-email", "secret1")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = f.service.register(register("a@x.com", "12345")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_forgot_password_is_uniform() {
        let f = fixture();
        f.service.register(register("a@x.com", "secret1")).await.unwrap();

        let known = f
            .service
            .forgot_password(ForgotPasswordRequest {
                email: "a@x.com".to_string(),
            })
            .await
            .unwrap();
        let unknown = f
            .service
            .forgot_password(ForgotPasswordRequest {
                email: "ghost@x.com".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(known.msg, unknown.msg);
        assert_eq!(known.msg, RESET_REQUESTED_MSG);

        let notices = f.outbox.notices().await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].email, "a@x.com");
        assert!(notices[0].link.ends_with(&notices[0].token));
    }

    #[tokio::test]
    async fn test_reset_password_single_use() {
        let f = fixture();
        f.service.register(register("a@x.com", "secret1")).await.unwrap();
        f.service
            .forgot_password(ForgotPasswordRequest {
                email: "a@x.com".to_string(),
            })
            .await
            .unwrap();
        let token = f.outbox.latest_for("a@x.com").await.unwrap().token;

        let redeem = |password: &str| ResetPasswordRequest {
            token: token.clone(),
            password: password.to_string(),
        };

        let done = f.service.reset_password(redeem("secret2")).await.unwrap();
        assert_eq!(done.msg, RESET_COMPLETED_MSG);

        assert!(matches!(
            f.service.login(login("a@x.com", "secret1")).await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(f.service.login(login("a@x.com", "secret2")).await.is_ok());

        let replay = f.service.reset_password(redeem("secret3")).await.unwrap_err();
        assert!(matches!(replay, AppError::ResetInvalid));
        assert!(f.service.login(login("a@x.com", "secret2")).await.is_ok());
    }

    #[tokio::test]
    async fn test_reset_password_expired_token() {
        let f = fixture();
        f.service.register(register("a@x.com", "secret1")).await.unwrap();
        let user = f.store.find_user_by_email("a@x.com").await.unwrap().unwrap();

        let token = f
            .tokens
            .issue_reset_at(&user, now_secs().unwrap() - 901)
            .unwrap();
        let err = f
            .service
            .reset_password(ResetPasswordRequest {
                token,
                password: "secret2".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ResetExpired));
    }

    #[tokio::test]
    async fn test_reset_password_rejects_session_token() {
        let f = fixture();
        let session = f.service.register(register("a@x.com", "secret1")).await.unwrap();

        let err = f
            .service
            .reset_password(ResetPasswordRequest {
                token: session.token,
                password: "secret2".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ResetInvalid));
    }

    #[tokio::test]
    async fn test_reset_password_for_deleted_user() {
        let f = fixture();
        f.service.register(register("a@x.com", "secret1")).await.unwrap();
        let user = f.store.find_user_by_email("a@x.com").await.unwrap().unwrap();
        let token = f.tokens.issue_reset(&user).unwrap();
        f.store.delete_user(&user.id).await.unwrap();

        let err = f
            .service
            .reset_password(ResetPasswordRequest {
                token,
                password: "secret2".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ResetInvalid));
    }

    #[tokio::test]
    async fn test_current_user() {
        let f = fixture();
        let session = f.service.register(register("a@x.com", "secret1")).await.unwrap();
        let claims = f.tokens.verify_session(&session.token).unwrap();

        let user = f.service.current_user(&claims.user.id).await.unwrap();
        assert_eq!(user.email, "a@x.com");

        let err = f.service.current_user("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
