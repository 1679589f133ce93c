//! Health and readiness endpoints for a long-running verifier process.
//!
//! - `/healthz` — liveness: always 200 while the process is up.
//! - `/readyz` — readiness: delegates to a `ReadinessChecker`, which a
//!   CLI daemon wires to the outcome of its most recent run (unreachable
//!   providers, live `QuotaState` per provider) rather than anything
//!   generic. No checker attached means "always ready", matching a
//!   one-shot `verifier run` invocation that never serves traffic long
//!   enough to need one.
//! - `/metrics` — the `Metrics` registry in Prometheus text exposition
//!   format.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::TextEncoder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use verifier_core::quota::QuotaState;

use crate::metrics::Metrics;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<ProviderStatus>>,
}

/// One provider's standing as of the last observed probe send, not a
/// generic up/down bit — `exhausted` and `reset_at` come straight off
/// the provider's own rate-limit headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub name: String,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_requests: Option<u64>,
    pub exhausted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ProviderStatus {
    /// Build from the provider's name, whether discovery reached it, and
    /// its most recent `QuotaState` (absent if no rate-limit headers have
    /// been observed for it yet).
    pub fn from_quota(name: impl Into<String>, reachable: bool, quota: Option<&QuotaState>) -> Self {
        let remaining_requests = quota.and_then(|q| q.remaining_requests);
        Self {
            name: name.into(),
            reachable,
            remaining_requests,
            exhausted: remaining_requests == Some(0),
            reset_at: quota.map(|q| q.reset_at),
        }
    }
}

/// Implemented by whatever is tracking run state — a CLI daemon keeps one
/// backed by its most recent `VerifyOutcome` and `LimitsObserver`.
pub trait ReadinessChecker: Send + Sync {
    /// Ready means the last run reached at least one provider.
    fn is_ready(&self) -> bool;
    fn provider_statuses(&self) -> Vec<ProviderStatus>;
}

#[derive(Clone)]
pub struct HealthState {
    pub metrics: Arc<Metrics>,
    pub readiness_checker: Option<Arc<dyn ReadinessChecker>>,
}

impl HealthState {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            metrics,
            readiness_checker: None,
        }
    }

    pub fn with_readiness_checker(metrics: Arc<Metrics>, readiness_checker: Arc<dyn ReadinessChecker>) -> Self {
        Self {
            metrics,
            readiness_checker: Some(readiness_checker),
        }
    }
}

pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    Json(HealthResponse { status: "ok".to_string() })
}

async fn readyz(State(state): State<HealthState>) -> Response {
    let Some(checker) = &state.readiness_checker else {
        return (StatusCode::OK, Json(ReadinessResponse { status: "ready".to_string(), providers: None })).into_response();
    };

    let providers = checker.provider_statuses();
    if checker.is_ready() {
        (
            StatusCode::OK,
            Json(ReadinessResponse { status: "ready".to_string(), providers: Some(providers) }),
        )
            .into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse { status: "not_ready".to_string(), providers: Some(providers) }),
        )
            .into_response()
    }
}

async fn metrics_handler(State(state): State<HealthState>) -> Response {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    match encoder.encode_to_string(&metric_families) {
        Ok(body) => (StatusCode::OK, [("Content-Type", "text/plain; version=0.0.4")], body).into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("failed to encode metrics: {err}")).into_response(),
    }
}
