//! Metrics tracking middleware
//!
//! Tracks request latency, counts and status codes, plus authentication
//! events, in a per-process Prometheus registry served at `/metrics`.
//!
//! Author: hephaex@gmail.com

use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Instant;

/// Latency buckets in seconds
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5];

/// Authentication outcomes counted in `consult_auth_events_total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    Register,
    LoginSuccess,
    LoginFailure,
    ResetRequested,
    ResetCompleted,
}

impl AuthEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEvent::Register => "register",
            AuthEvent::LoginSuccess => "login_success",
            AuthEvent::LoginFailure => "login_failure",
            AuthEvent::ResetRequested => "reset_requested",
            AuthEvent::ResetCompleted => "reset_completed",
        }
    }
}

/// Prometheus metrics for the API server
pub struct ApiMetrics {
    registry: Registry,
    http_requests: IntCounterVec,
    http_duration: HistogramVec,
    auth_events: IntCounterVec,
    uptime: IntGauge,
}

impl ApiMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests = IntCounterVec::new(
            Opts::new("consult_http_requests_total", "HTTP requests by endpoint and status"),
            &["method", "endpoint", "status"],
        )?;
        registry.register(Box::new(http_requests.clone()))?;

        let http_duration = HistogramVec::new(
            HistogramOpts::new("consult_http_request_duration_seconds", "HTTP request latency")
                .buckets(LATENCY_BUCKETS.to_vec()),
            &["endpoint"],
        )?;
        registry.register(Box::new(http_duration.clone()))?;

        let auth_events = IntCounterVec::new(
            Opts::new("consult_auth_events_total", "Authentication events by kind"),
            &["event"],
        )?;
        registry.register(Box::new(auth_events.clone()))?;

        let uptime = IntGauge::new("consult_uptime_seconds", "Time since server start")?;
        registry.register(Box::new(uptime.clone()))?;

        Ok(Self {
            registry,
            http_requests,
            http_duration,
            auth_events,
            uptime,
        })
    }

    pub fn record_request(&self, method: &str, endpoint: &str, status: u16, latency_secs: f64) {
        self.http_requests
            .with_label_values(&[method, endpoint, &status.to_string()])
            .inc();
        self.http_duration
            .with_label_values(&[endpoint])
            .observe(latency_secs);
    }

    pub fn record_auth(&self, event: AuthEvent) {
        self.auth_events.with_label_values(&[event.as_str()]).inc();
    }

    pub fn auth_count(&self, event: AuthEvent) -> u64 {
        self.auth_events.with_label_values(&[event.as_str()]).get()
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn encode(&self, uptime_secs: u64) -> Result<String, prometheus::Error> {
        self.uptime.set(i64::try_from(uptime_secs).unwrap_or(i64::MAX));

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Metrics tracking middleware
///
/// Records per request:
/// - Request count by method, normalized endpoint and status
/// - Request latency distribution
pub async fn metrics_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let endpoint = normalize_endpoint(request.uri().path());

    let response = next.run(request).await;

    state.metrics.record_request(
        &method,
        &endpoint,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

/// Normalize endpoint paths for consistent metrics
///
/// Replaces UUID/ID segments with placeholders to group similar endpoints
fn normalize_endpoint(path: &str) -> String {
    path.split('/')
        .map(|seg| if is_uuid(seg) || is_numeric(seg) { ":id" } else { seg })
        .collect::<Vec<_>>()
        .join("/")
}

/// Check if a string looks like a UUID
fn is_uuid(s: &str) -> bool {
    s.len() == 36
        && s.chars().enumerate().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}

/// Check if a string is numeric (likely an ID)
fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
