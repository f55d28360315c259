//! JWT token issuance and verification
//!
//! Implements the Token Service with HMAC-SHA256 signing. Two token kinds
//! share one secret and are told apart by an explicit `purpose` claim:
//! - Session tokens carry `{ user: { id, role } }` and live one hour
//! - Reset tokens carry `{ id, gen }` and live fifteen minutes
//!
//! Verification for one purpose rejects tokens of the other purpose.

use consult_core::{AuthConfig, Role, User};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Session,
    Reset,
}

/// Identity embedded in a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub role: Role,
}

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user: SessionUser,
    pub purpose: TokenPurpose,
    /// Token issuer
    pub iss: String,
    /// Issued at (Unix epoch seconds)
    pub iat: u64,
    /// Expiration (Unix epoch seconds)
    pub exp: u64,
}

/// Password-reset token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
    /// User ID
    pub id: String,
    /// User's reset generation at issuance; the token is spent once it moves on
    pub gen: u64,
    pub purpose: TokenPurpose,
    pub iss: String,
    pub iat: u64,
    pub exp: u64,
}

trait PurposeBound {
    fn purpose(&self) -> TokenPurpose;
}

impl PurposeBound for SessionClaims {
    fn purpose(&self) -> TokenPurpose {
        self.purpose
    }
}

impl PurposeBound for ResetClaims {
    fn purpose(&self) -> TokenPurpose {
        self.purpose
    }
}

/// Token issuance and verification errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    /// Bad signature, malformed structure, wrong issuer or wrong purpose
    #[error("Invalid token")]
    Invalid,

    #[error("Failed to encode JWT: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),

    #[error("System time error: {0}")]
    Clock(#[from] std::time::SystemTimeError),
}

/// JWT Configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC signing
    pub secret: String,
    /// Token issuer identifier
    pub issuer: String,
    /// Session token lifetime in seconds (default: 3600 = 1 hour)
    pub session_ttl_secs: u64,
    /// Reset token lifetime in seconds (default: 900 = 15 minutes)
    pub reset_ttl_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl From<&AuthConfig> for JwtConfig {
    fn from(auth: &AuthConfig) -> Self {
        Self {
            secret: auth.jwt_secret.clone(),
            issuer: auth.jwt_issuer.clone(),
            session_ttl_secs: auth.session_ttl_secs,
            reset_ttl_secs: auth.reset_ttl_secs,
        }
    }
}

/// Current Unix time in seconds
pub fn now_secs() -> Result<u64, TokenError> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// Issues and verifies session and reset tokens with a single injected secret
pub struct TokenService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    /// Issue a one-hour session token for `user`
    pub fn issue_session(&self, user: &User) -> Result<String, TokenError> {
        self.issue_session_at(user, now_secs()?)
    }

    /// Issue a session token as if issued at `issued_at`
    pub fn issue_session_at(&self, user: &User, issued_at: u64) -> Result<String, TokenError> {
        let claims = SessionClaims {
            user: SessionUser {
                id: user.id.clone(),
                role: user.role,
            },
            purpose: TokenPurpose::Session,
            iss: self.config.issuer.clone(),
            iat: issued_at,
            exp: issued_at + self.config.session_ttl_secs,
        };
        self.sign(&claims)
    }

    /// Issue a fifteen-minute reset token bound to the user's current reset generation
    pub fn issue_reset(&self, user: &User) -> Result<String, TokenError> {
        self.issue_reset_at(user, now_secs()?)
    }

    pub fn issue_reset_at(&self, user: &User, issued_at: u64) -> Result<String, TokenError> {
        let claims = ResetClaims {
            id: user.id.clone(),
            gen: user.reset_generation,
            purpose: TokenPurpose::Reset,
            iss: self.config.issuer.clone(),
            iat: issued_at,
            exp: issued_at + self.config.reset_ttl_secs,
        };
        self.sign(&claims)
    }

    pub fn verify_session(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify(token, TokenPurpose::Session)
    }

    pub fn verify_reset(&self, token: &str) -> Result<ResetClaims, TokenError> {
        self.verify(token, TokenPurpose::Reset)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        Ok(encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding_key,
        )?)
    }

    fn verify<T>(&self, token: &str, expected: TokenPurpose) -> Result<T, TokenError>
    where
        T: DeserializeOwned + PurposeBound,
    {
        let token_data = decode::<T>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        if token_data.claims.purpose() != expected {
            return Err(TokenError::Invalid);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consult_core::NewUser;

    fn service() -> TokenService {
        TokenService::new(JwtConfig {
            secret: "unit-test-secret".to_string(),
            ..Default::default()
        })
    }

    fn user(role: Role) -> User {
        User::new(NewUser {
            full_name: None,
            email: "a@x.com".to_string(),
            password_hash: "hash".to_string(),
            role,
        })
    }

    #[test]
    fn test_session_roundtrip() {
        let tokens = service();
        let user = user(Role::User);

        let token = tokens.issue_session(&user).unwrap();
        let claims = tokens.verify_session(&token).unwrap();

        assert_eq!(claims.user.id, user.id);
        assert_eq!(claims.user.role, Role::User);
        assert_eq!(claims.purpose, TokenPurpose::Session);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.iss, "consult-api");
    }

    #[test]
    fn test_reset_roundtrip_carries_generation() {
        let tokens = service();
        let mut user = user(Role::User);
        user.reset_generation = 4;

        let token = tokens.issue_reset(&user).unwrap();
        let claims = tokens.verify_reset(&token).unwrap();

        assert_eq!(claims.id, user.id);
        assert_eq!(claims.gen, 4);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_session_expires_after_ttl() {
        let tokens = service();
        let user = user(Role::Admin);
        let now = now_secs().unwrap();

        let fresh = tokens.issue_session_at(&user, now - 3590).unwrap();
        assert!(tokens.verify_session(&fresh).is_ok());

        let stale = tokens.issue_session_at(&user, now - 3601).unwrap();
        assert!(matches!(
            tokens.verify_session(&stale),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_reset_expires_after_ttl() {
        let tokens = service();
        let now = now_secs().unwrap();
        let token = tokens.issue_reset_at(&user(Role::User), now - 901).unwrap();

        assert!(matches!(tokens.verify_reset(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_purposes_do_not_cross() {
        let tokens = service();
        let user = user(Role::Admin);

        let session = tokens.issue_session(&user).unwrap();
        let reset = tokens.issue_reset(&user).unwrap();

        assert!(matches!(tokens.verify_reset(&session), Err(TokenError::Invalid)));
        assert!(matches!(tokens.verify_session(&reset), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_purpose_claim_is_checked_even_when_shape_matches() {
        let tokens = service();
        let now = now_secs().unwrap();

        // Session-shaped payload labelled as a reset token
        let forged = SessionClaims {
            user: SessionUser {
                id: "u1".to_string(),
                role: Role::Admin,
            },
            purpose: TokenPurpose::Reset,
            iss: "consult-api".to_string(),
            iat: now,
            exp: now + 60,
        };
        let token = tokens.sign(&forged).unwrap();

        assert!(matches!(tokens.verify_session(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_wrong_secret_and_garbage() {
        let tokens = service();
        let other = TokenService::new(JwtConfig {
            secret: "another-secret".to_string(),
            ..Default::default()
        });

        let token = other.issue_session(&user(Role::User)).unwrap();
        assert!(matches!(tokens.verify_session(&token), Err(TokenError::Invalid)));
        assert!(matches!(
            tokens.verify_session("invalid.token.here"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let tokens = service();
        let other = TokenService::new(JwtConfig {
            secret: "unit-test-secret".to_string(),
            issuer: "someone-else".to_string(),
            ..Default::default()
        });

        let token = other.issue_session(&user(Role::User)).unwrap();
        assert!(matches!(tokens.verify_session(&token), Err(TokenError::Invalid)));
    }
}
