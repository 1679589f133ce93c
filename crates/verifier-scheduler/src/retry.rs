//! Retry classification for transport failures.
//!
//! Mirrors spec.md §4.4 exactly: `RateLimited` sleeps until the observed
//! reset (capped at `max_backoff`) and always re-enqueues; `Server` and
//! `Transport` back off exponentially with jitter up to `max_retries`;
//! `Unauthorized`/`Forbidden`/`NotFound`/`BadResponse` are terminal;
//! `Timeout` counts as one retry attempt against `max_retries`.

use std::time::Duration;

use rand::Rng;
use verifier_core::plan::RetryPolicy;
use verifier_transport::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    Terminal,
}

pub fn classify(
    error: &TransportError,
    retries_used: u32,
    policy: &RetryPolicy,
) -> RetryDecision {
    match error {
        TransportError::RateLimited { retry_after_secs } => {
            if !policy.unlimited_rate_limit_retries && retries_used >= policy.max_retries {
                return RetryDecision::Terminal;
            }
            let wait = retry_after_secs
                .map(Duration::from_secs)
                .unwrap_or(policy.retry_base_delay);
            RetryDecision::RetryAfter(wait.min(policy.retry_max_delay))
        }
        TransportError::Server(_) | TransportError::Transport(_) | TransportError::Timeout(_) => {
            if retries_used >= policy.max_retries {
                return RetryDecision::Terminal;
            }
            RetryDecision::RetryAfter(backoff_with_jitter(retries_used, policy))
        }
        TransportError::Unauthorized(_)
        | TransportError::Forbidden(_)
        | TransportError::NotFound(_)
        | TransportError::BadResponse(_) => RetryDecision::Terminal,
    }
}

fn backoff_with_jitter(retries_used: u32, policy: &RetryPolicy) -> Duration {
    let base = policy.retry_base_delay.as_millis() as u64;
    let exponential = base.saturating_mul(1u64 << retries_used.min(20));
    let capped = exponential.min(policy.retry_max_delay.as_millis() as u64);
    let jitter = rand::rng().random_range(0..=capped / 4 + 1);
    Duration::from_millis(capped.saturating_add(jitter) / 2)
}
