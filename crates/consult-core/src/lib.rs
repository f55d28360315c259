//! Consult Core - Domain records, errors, and configuration
//!
//! This crate defines the shared building blocks of the consulting back office:
//! - Identity records (users and their roles)
//! - Back-office records (clients, contact messages, prompt templates)
//! - Common error types
//! - Configuration management
//!
//! Author: hephaex@gmail.com

pub mod config;
pub mod models;

pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig,
};
pub use models::{
    Client, ClientInput, DashboardStats, Message, MessageStatus, NewMessage, NewUser, Prompt,
    PromptInput, Role, User, UserPublic, UserUpdate,
};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for persistence and domain operations
#[derive(Error, Debug)]
pub enum ConsultError {
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique index rejected the write. `field` names the indexed field.
    #[error("Duplicate value for unique field: {field}")]
    Duplicate { field: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConsultError {
    /// Shorthand for a unique-index violation on `field`
    pub fn duplicate(field: impl Into<String>) -> Self {
        Self::Duplicate {
            field: field.into(),
        }
    }

    /// True when this error is a unique-index violation on `field`
    pub fn is_duplicate_of(&self, field: &str) -> bool {
        matches!(self, Self::Duplicate { field: f } if f == field)
    }
}

impl From<ConfigError> for ConsultError {
    fn from(err: ConfigError) -> Self {
        ConsultError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConsultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_helpers() {
        let err = ConsultError::duplicate("email");
        assert!(err.is_duplicate_of("email"));
        assert!(!err.is_duplicate_of("title"));
        assert_eq!(err.to_string(), "Duplicate value for unique field: email");

        let other = ConsultError::NotFound("user".to_string());
        assert!(!other.is_duplicate_of("email"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: ConsultError = ConfigError::MissingRequired("JWT_SECRET".to_string()).into();
        assert!(matches!(err, ConsultError::ConfigError(msg) if msg.contains("JWT_SECRET")));
    }
}
