//! Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with sensible defaults for development. Everything here is read once at
//! startup; there is no hot reload.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Development-only signing secret used when `JWT_SECRET` is unset
pub const DEV_JWT_SECRET: &str = "development-secret-key-change-in-production";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Document database connection
    pub database: DatabaseConfig,

    /// Token signing and delivery settings
    pub auth: AuthConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    /// Overlay values from a key lookup onto this configuration.
    ///
    /// Split out from `from_env` so tests can feed a map instead of mutating
    /// the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(host) = lookup("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("API_PORT") {
            self.server.port = parse_value("API_PORT", port)?;
        }
        if let Some(size) = lookup("MAX_BODY_SIZE") {
            self.server.max_body_size = parse_value("MAX_BODY_SIZE", size)?;
        }
        // CORS origins from environment variable (comma-separated)
        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Database
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(user) = lookup("SURREALDB_USER") {
            self.database.user = user;
        }
        if let Some(pass) = lookup("SURREALDB_PASS") {
            self.database.pass = pass;
        }
        if let Some(ns) = lookup("SURREALDB_NAMESPACE") {
            self.database.namespace = ns;
        }
        if let Some(db) = lookup("SURREALDB_DATABASE") {
            self.database.database = db;
        }

        // Auth
        if let Some(secret) = lookup("JWT_SECRET") {
            if secret.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "JWT_SECRET".to_string(),
                    value: String::new(),
                });
            }
            self.auth.jwt_secret = secret;
        }
        if let Some(issuer) = lookup("JWT_ISSUER") {
            self.auth.jwt_issuer = issuer;
        }
        if let Some(ttl) = lookup("JWT_SESSION_TTL_SECS") {
            self.auth.session_ttl_secs = parse_value("JWT_SESSION_TTL_SECS", ttl)?;
        }
        if let Some(ttl) = lookup("JWT_RESET_TTL_SECS") {
            self.auth.reset_ttl_secs = parse_value("JWT_RESET_TTL_SECS", ttl)?;
        }
        if let Some(header) = lookup("AUTH_TOKEN_HEADER") {
            self.auth.token_header = header.to_ascii_lowercase();
        }
        if let Some(base) = lookup("RESET_LINK_BASE") {
            self.auth.reset_link_base = base;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("LOG_JSON") {
            self.logging.json_format = parse_value("LOG_JSON", json)?;
        }

        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_body_size: 1024 * 1024, // 1MB
            // Empty by default for security - set via CORS_ORIGINS env var
            cors_origins: vec![],
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Document database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL. `mem://` selects the in-process store, anything else
    /// is treated as a SurrealDB WebSocket endpoint.
    pub url: String,

    /// SurrealDB username
    pub user: String,

    /// SurrealDB password
    pub pass: String,

    /// SurrealDB namespace
    pub namespace: String,

    /// SurrealDB database name
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8000".to_string(),
            user: "root".to_string(),
            pass: "root".to_string(),
            namespace: "consult".to_string(),
            database: "backoffice".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// True when the in-process memory store is selected
    pub fn is_memory(&self) -> bool {
        self.url.starts_with("mem://")
    }
}

/// Token signing and password-reset delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC signing secret shared by session and reset tokens
    pub jwt_secret: String,

    /// Token issuer identifier
    pub jwt_issuer: String,

    /// Session token lifetime (default: 3600 = 1 hour)
    pub session_ttl_secs: u64,

    /// Password-reset token lifetime (default: 900 = 15 minutes)
    pub reset_ttl_secs: u64,

    /// Request header carrying the session token (lowercase)
    pub token_header: String,

    /// Front-end page that redeems reset tokens; the token is appended as `?token=`
    pub reset_link_base: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_issuer: "consult-api".to_string(),
            session_ttl_secs: 3600,
            reset_ttl_secs: 900,
            token_header: "x-auth-token".to_string(),
            reset_link_base: "http://localhost:5173/reset-password".to_string(),
        }
    }
}

impl AuthConfig {
    /// True when the development fallback secret is still in use
    pub fn is_default_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Build the front-end link for a reset token
    pub fn reset_link(&self, token: &str) -> String {
        format!("{}?token={token}", self.reset_link_base)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
