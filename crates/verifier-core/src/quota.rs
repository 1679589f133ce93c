//! Provider rate-limit and pricing state, as observed from response headers.

use serde::{Deserialize, Serialize};

/// Which rate-limit header family a `QuotaState` was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceDialect {
    Anthropic,
    OpenAi,
    Generic,
}

/// A provider's rate-limit and token-budget snapshot within the current
/// reset window. Long-lived across a run; replaced wholesale on each
/// qualifying observation, never partially mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaState {
    pub requests_per_window: Option<u64>,
    pub tokens_per_window: Option<u64>,
    pub window_size: Option<std::time::Duration>,
    pub remaining_requests: Option<u64>,
    pub remaining_tokens: Option<u64>,
    pub reset_at: chrono::DateTime<chrono::Utc>,
    pub source_dialect: SourceDialect,
}

/// Pricing extracted from a list-models response, normalized to USD per
/// 1K input tokens by the `ConfigSource` before it reaches the Scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub input_usd_per_1k: f64,
    pub output_usd_per_1k: Option<f64>,
}
