//! Application state management
//!
//! Author: hephaex@gmail.com

use crate::auth::{
    AuthService, HashingService, JwtConfig, PasswordConfig, ResetDelivery, TokenService,
};
use crate::middleware::metrics::ApiMetrics;
use consult_core::config::AppConfig;
use consult_store::Store;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Record persistence
    pub store: Arc<dyn Store>,
    /// Session and reset token signing
    pub tokens: Arc<TokenService>,
    /// Registration, login and password reset
    pub auth: AuthService,
    /// Prometheus registry
    pub metrics: Arc<ApiMetrics>,
    /// Server start time
    pub start_time: Instant,
    /// Ready status
    pub is_ready: AtomicBool,
}

impl AppState {
    /// Create application state with production hashing parameters
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Store>,
        delivery: Arc<dyn ResetDelivery>,
    ) -> Result<Self, prometheus::Error> {
        Self::with_password_config(config, store, delivery, PasswordConfig::default())
    }

    pub fn with_password_config(
        config: AppConfig,
        store: Arc<dyn Store>,
        delivery: Arc<dyn ResetDelivery>,
        password: PasswordConfig,
    ) -> Result<Self, prometheus::Error> {
        let tokens = Arc::new(TokenService::new(JwtConfig::from(&config.auth)));
        let metrics = Arc::new(ApiMetrics::new()?);
        let auth = AuthService::new(
            store.clone(),
            tokens.clone(),
            HashingService::new(password),
            delivery,
            metrics.clone(),
            config.auth.clone(),
        );

        Ok(Self {
            config,
            store,
            tokens,
            auth,
            metrics,
            start_time: Instant::now(),
            is_ready: AtomicBool::new(true),
        })
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check if service is ready
    pub fn is_ready(&self) -> bool {
        self.is_ready.load(Ordering::SeqCst)
    }

    /// Set ready status
    pub fn set_ready(&self, ready: bool) {
        self.is_ready.store(ready, Ordering::SeqCst);
    }
}
