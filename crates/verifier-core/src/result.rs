//! `VerificationResult` and the records it aggregates.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{model::ModelRef, probe::CapabilityVector, quota::Pricing};

/// Derived latency statistics for one model's probe runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatencyProfile {
    pub count: usize,
    #[serde(with = "opt_duration_millis")]
    pub mean: Option<Duration>,
    #[serde(with = "opt_duration_millis")]
    pub p50: Option<Duration>,
    #[serde(with = "opt_duration_millis")]
    pub p95: Option<Duration>,
    #[serde(with = "opt_duration_millis")]
    pub p99: Option<Duration>,
    #[serde(with = "opt_duration_millis")]
    pub min: Option<Duration>,
    #[serde(with = "opt_duration_millis")]
    pub max: Option<Duration>,
    /// Only populated when streaming probes provided token-count deltas.
    pub throughput_tokens_per_sec: Option<f64>,
}

/// Whether the model exists at all and responded to a minimal probe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Availability {
    pub exists: bool,
    pub responsive: bool,
    #[serde(with = "opt_duration_millis")]
    pub latency_sample: Option<Duration>,
}

/// Probe pass-rate summary, excluding Inconclusive/Skipped outcomes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reliability {
    pub successful_probes: usize,
    pub total_probes: usize,
    pub probe_success_rate: f64,
}

/// The five normalized [0, 100] dimension scores.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DimensionScores {
    pub code_capability: f64,
    pub responsiveness: f64,
    pub reliability: f64,
    pub feature_richness: f64,
    pub value_proposition: f64,
}

/// Every intermediate value behind a `DimensionScores`, for auditability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub code_capability_pass_fraction: f64,
    pub code_capability_language_coverage: f64,
    pub responsiveness_p95_ms: Option<f64>,
    pub responsiveness_no_data: bool,
    pub reliability_success_rate: f64,
    pub feature_richness_flags_set: usize,
    pub feature_richness_flags_total: usize,
    pub value_proposition_pricing_known: bool,
    pub value_proposition_input_cost_usd_per_1k: Option<f64>,
    pub weights: crate::plan::ScoreWeights,
}

/// Immutable, emitted once per `ModelRef` in the run plan, even when
/// `ExistsProbe` failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub model_ref: ModelRef,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
    pub availability: Availability,
    pub capability_vector: CapabilityVector,
    pub latency_profile: LatencyProfile,
    pub reliability: Reliability,
    pub pricing: Option<Pricing>,
    pub dimension_scores: DimensionScores,
    pub overall_score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub evidence_digest: String,
}

mod opt_duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        d.map(|d| d.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let millis = Option::<u64>::deserialize(d)?;
        Ok(millis.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_default_is_unreachable() {
        let a = Availability::default();
        assert!(!a.exists);
        assert!(!a.responsive);
        assert!(a.latency_sample.is_none());
    }
}
