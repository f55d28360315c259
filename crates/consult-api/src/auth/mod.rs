//! Authentication and authorization module
//!
//! This module provides the auth core with the following components:
//! - Token issuance and verification (session and password-reset tokens)
//! - Password hashing with Argon2
//! - Middleware for request authentication and the role gate
//! - Authentication service for registration, login and password reset
//! - Out-of-band delivery of reset links

pub mod delivery;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;

pub use delivery::{LogDelivery, OutboxDelivery, ResetDelivery, ResetNotice};
pub use jwt::{JwtConfig, ResetClaims, SessionClaims, TokenError, TokenPurpose, TokenService};
pub use middleware::{auth_middleware, require_role, AuthenticatedUser};
pub use models::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest, ResetPasswordRequest,
    TokenResponse,
};
pub use password::{
    hash_password, hash_password_with_config, verify_password, HashingService, PasswordConfig,
};
pub use service::AuthService;
