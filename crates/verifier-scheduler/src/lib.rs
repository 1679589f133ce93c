//! Verifier Scheduler
//!
//! Turns a `RunPlan` and a set of `Probe`s into `ProbeOutcome`s: per-provider
//! concurrency limits, retry classification, circuit breaking, and
//! cooperative cancellation. Deliberately knows nothing about which probes
//! exist — it operates purely on the `verifier_core::probe::Probe` data the
//! caller hands it, so `verifier-probes` stays a separate, swappable data
//! source.

pub mod cancellation;
pub mod circuit_breaker;
pub mod retry;
pub mod scheduler;
pub mod task;

pub use cancellation::CancellationToken;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use scheduler::{RunOutcome, Scheduler};
pub use task::{ScheduledTask, TaskState};
