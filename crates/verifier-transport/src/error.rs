//! Error taxonomy for the transport layer.
//!
//! Matches spec.md §4.1 exactly: `Transport`, `Timeout`, `Unauthorized`,
//! `Forbidden`, `NotFound`, `RateLimited`, `Server`, `BadResponse`. No
//! variant here implies a retry decision — that judgment belongs to the
//! Scheduler.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("unauthorized (401): {0}")]
    Unauthorized(String),

    #[error("forbidden (403): {0}")]
    Forbidden(String),

    #[error("not found (404): {0}")]
    NotFound(String),

    #[error("rate limited (429){}", retry_after_secs.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("server error ({0})")]
    Server(u16),

    #[error("could not parse response body: {0}")]
    BadResponse(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;
