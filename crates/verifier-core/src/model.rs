//! `ModelRef`: the stable identity of one model on one provider.

use serde::{Deserialize, Serialize};

/// Uniqueness: `(provider_name, model_id)`. Created at discovery, never
/// mutated; the same ref may recur across runs and accumulate new results.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelRef {
    pub provider_name: String,
    pub model_id: String,
    pub discovered_at: chrono::DateTime<chrono::Utc>,
    /// Populated from `ResultStore::load_latest` when the plan asks for a
    /// comparison; not part of the identity tuple.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verified_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ModelRef {
    pub fn new(provider_name: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            provider_name: provider_name.into(),
            model_id: model_id.into(),
            discovered_at: chrono::Utc::now(),
            last_verified_at: None,
        }
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.provider_name, &self.model_id)
    }
}
