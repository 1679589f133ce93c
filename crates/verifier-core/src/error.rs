//! Error types for the verification core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The run plan failed structural validation before any HTTP call was made.
    #[error("Invalid run plan: {0}")]
    Config(String),

    /// Model listing failed for a provider; the provider is marked unreachable.
    #[error("Discovery failed for provider {provider}: {reason}")]
    Discovery { provider: String, reason: String },

    /// A single probe failed in a non-recoverable way.
    #[error("Probe {probe_id} failed for {model_id}: {reason}")]
    Probe {
        probe_id: String,
        model_id: String,
        reason: String,
    },

    /// A provider's quota observation shows zero remaining with a reset beyond the run deadline.
    #[error("Budget exhausted for provider {0}")]
    BudgetExhausted(String),

    /// The run-wide cancellation token was triggered.
    #[error("Run cancelled")]
    Cancelled,

    /// Persistence failed after a successful run; results are still returned to the caller.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
