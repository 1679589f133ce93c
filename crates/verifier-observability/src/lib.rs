//! Verifier observability
//!
//! - Prometheus metrics for probe throughput, scheduler concurrency, and
//!   quota observations
//! - OpenTelemetry span attributes for one probe send
//! - Health/readiness/metrics HTTP endpoints
//! - A `tracing`-backed `EventEmitter` implementation

pub mod event_emitter;
pub mod health;
pub mod metrics;
pub mod tracing;

pub use event_emitter::TracingEventEmitter;
pub use health::{HealthState, ProviderStatus, ReadinessChecker, health_router};
pub use metrics::{CircuitBreakerState, Metrics};
