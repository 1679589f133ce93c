//! `RunPlan` and the configuration types it is built from.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::{Error, Result};

/// Opaque provider credential. Never logged or serialized in Debug/Display output.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// One provider endpoint under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSpec {
    pub name: String,
    pub base_url: String,
    pub credential: Credential,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// When empty, the Orchestrator calls the model-list endpoint and accepts
    /// every returned identifier, subject to `model_exclude_patterns`.
    #[serde(default)]
    pub model_allow_list: Vec<String>,
}

impl ProviderSpec {
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config(format!(
                "provider '{}' has an empty base_url",
                self.name
            )));
        }
        Ok(())
    }
}

/// Global and per-provider concurrency caps enforced by the Scheduler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Concurrency {
    pub global_max: usize,
    pub per_provider_max: usize,
}

impl Default for Concurrency {
    fn default() -> Self {
        Self {
            global_max: 16,
            per_provider_max: 4,
        }
    }
}

impl Concurrency {
    pub fn validate(&self) -> Result<()> {
        if self.global_max == 0 || self.per_provider_max == 0 {
            return Err(Error::Config(
                "global_max and per_provider_max must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Retry behavior for transient probe failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    #[serde(with = "duration_millis")]
    pub retry_base_delay: Duration,
    #[serde(with = "duration_millis")]
    pub retry_max_delay: Duration,
    /// Open question from the spec: RateLimited retries normally count against
    /// `max_retries`. Setting this makes them unlimited until `total_timeout`.
    #[serde(default)]
    pub unlimited_rate_limit_retries: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_base_delay: Duration::from_millis(200),
            retry_max_delay: Duration::from_secs(30),
            unlimited_rate_limit_retries: false,
        }
    }
}

/// Per-call and per-run timeout budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(with = "duration_millis")]
    pub connect: Duration,
    #[serde(with = "duration_millis")]
    pub request: Duration,
    #[serde(with = "duration_millis")]
    pub total: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            request: Duration::from_secs(30),
            total: Duration::from_secs(600),
        }
    }
}

/// Restricts which probes run, by tag. `None` means "all probes".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeSelection {
    pub tags: Option<Vec<String>>,
}

impl ProbeSelection {
    pub fn quick() -> Self {
        Self {
            tags: Some(vec!["quick".to_string()]),
        }
    }

    pub fn matches(&self, probe_tags: &[&str]) -> bool {
        match &self.tags {
            None => true,
            Some(wanted) => wanted.iter().any(|t| probe_tags.contains(&t.as_str())),
        }
    }
}

/// Weights for the five scoring dimensions. Must sum to 1.0 within epsilon.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub code_capability: f64,
    pub responsiveness: f64,
    pub reliability: f64,
    pub feature_richness: f64,
    pub value_proposition: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            code_capability: 0.40,
            responsiveness: 0.15,
            reliability: 0.15,
            feature_richness: 0.20,
            value_proposition: 0.10,
        }
    }
}

impl ScoreWeights {
    pub fn validate(&self) -> Result<()> {
        let sum = self.code_capability
            + self.responsiveness
            + self.reliability
            + self.feature_richness
            + self.value_proposition;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(Error::Config(format!(
                "score_weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

/// Reference points the Scorer interpolates against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreReferences {
    #[serde(with = "duration_millis")]
    pub latency_good: Duration,
    #[serde(with = "duration_millis")]
    pub latency_bad: Duration,
    pub cost_expensive_usd_per_1k: f64,
}

impl Default for ScoreReferences {
    fn default() -> Self {
        Self {
            latency_good: Duration::from_millis(250),
            latency_bad: Duration::from_millis(5000),
            cost_expensive_usd_per_1k: 0.06,
        }
    }
}

/// The immutable input to a verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPlan {
    pub providers: Vec<ProviderSpec>,
    #[serde(default)]
    pub concurrency: Concurrency,
    #[serde(default)]
    pub retry_policy: RetryPolicy,
    #[serde(default)]
    pub timeouts: Timeouts,
    #[serde(default)]
    pub probe_selection: ProbeSelection,
    #[serde(default)]
    pub model_exclude_patterns: Vec<String>,
    #[serde(default)]
    pub score_weights: ScoreWeights,
    #[serde(default)]
    pub score_references: ScoreReferences,
    /// When true, the Orchestrator consults `ResultStore::load_latest` per
    /// model and the report renders score deltas against the prior run.
    #[serde(default)]
    pub compare_to_previous: bool,
}

impl RunPlan {
    pub fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(Error::Config("run plan has no providers".to_string()));
        }
        for provider in &self.providers {
            provider.validate()?;
        }
        self.concurrency.validate()?;
        self.score_weights.validate()?;
        Ok(())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (d.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}
