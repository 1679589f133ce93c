//! Probe definitions, outcomes, and the capability vector they feed.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::model::ModelRef;

/// The kind of upstream request a probe issues. Drives which `HttpTransport`
/// method the Scheduler calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Chat,
    ChatWithTools,
    ChatStreaming,
    ChatJsonMode,
    ChatStructuredOutput,
    Embedding,
    Moderation,
    ImageGeneration,
    AudioTranscription,
    ReasoningProbe,
    ModelList,
    /// SUPPLEMENT: closes the `batch` capability flag, which spec.md's probe
    /// table never assigns. See SPEC_FULL.md §4.2.
    Batch,
    /// SUPPLEMENT: closes the `reranking` capability flag. See SPEC_FULL.md §4.2.
    Reranking,
}

/// A boolean feature a model may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityFlag {
    ToolUse,
    FunctionCalling,
    Streaming,
    JsonMode,
    StructuredOutput,
    Embeddings,
    Reranking,
    Vision,
    AudioIn,
    AudioOut,
    ImageOut,
    Reasoning,
    ParallelToolUse,
    Batch,
}

impl CapabilityFlag {
    pub const ALL: [CapabilityFlag; 14] = [
        CapabilityFlag::ToolUse,
        CapabilityFlag::FunctionCalling,
        CapabilityFlag::Streaming,
        CapabilityFlag::JsonMode,
        CapabilityFlag::StructuredOutput,
        CapabilityFlag::Embeddings,
        CapabilityFlag::Reranking,
        CapabilityFlag::Vision,
        CapabilityFlag::AudioIn,
        CapabilityFlag::AudioOut,
        CapabilityFlag::ImageOut,
        CapabilityFlag::Reasoning,
        CapabilityFlag::ParallelToolUse,
        CapabilityFlag::Batch,
    ];
}

/// Boolean feature set for one model. A flag is true iff at least one
/// qualifying probe produced `Pass`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityVector {
    flags: std::collections::BTreeSet<CapabilityFlag>,
}

impl CapabilityVector {
    pub fn set(&mut self, flag: CapabilityFlag) {
        self.flags.insert(flag);
    }

    pub fn is_set(&self, flag: CapabilityFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn count(&self) -> usize {
        self.flags.len()
    }

    /// Fraction of all defined flags that are set, for the feature-richness dimension.
    pub fn richness(&self) -> f64 {
        self.count() as f64 / CapabilityFlag::ALL.len() as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = CapabilityFlag> + '_ {
        self.flags.iter().copied()
    }
}

/// Static definition of one capability probe. Pure data plus a pure function
/// pointer for the success predicate — no trait object, no inheritance.
#[derive(Clone)]
pub struct Probe {
    pub id: &'static str,
    pub tags: &'static [&'static str],
    pub request_kind: RequestKind,
    /// Builds the request body for one model. Parameterized only by
    /// `model_id` — probes carry no other per-run state.
    pub request_template: fn(&str) -> serde_json::Value,
    pub timeout: Duration,
    pub sets_capabilities: &'static [CapabilityFlag],
    pub contributes_to_dimensions: &'static [&'static str],
    pub success_predicate: fn(&ProbeResponse) -> PredicateResult,
}

impl std::fmt::Debug for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Probe")
            .field("id", &self.id)
            .field("request_kind", &self.request_kind)
            .finish()
    }
}

/// Everything the success predicate needs, already normalized by the
/// transport layer. Same inputs must always yield the same `PredicateResult`.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: serde_json::Value,
    pub stream_frames_observed: usize,
    pub elapsed: Duration,
    /// Set when the body failed to parse as JSON at all.
    pub parse_failed: bool,
}

/// The verdict a success predicate returns, plus optional evidence for audit.
#[derive(Debug, Clone)]
pub struct PredicateResult {
    pub verdict: Verdict,
    pub evidence: Option<String>,
}

impl PredicateResult {
    pub fn pass() -> Self {
        Self {
            verdict: Verdict::Pass,
            evidence: None,
        }
    }

    pub fn pass_with(evidence: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Pass,
            evidence: Some(evidence.into()),
        }
    }

    pub fn fail() -> Self {
        Self {
            verdict: Verdict::Fail,
            evidence: None,
        }
    }

    pub fn inconclusive() -> Self {
        Self {
            verdict: Verdict::Inconclusive,
            evidence: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Pass,
    Fail,
    Inconclusive,
}

/// Terminal status of one probe's execution against one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Pass,
    Fail,
    Inconclusive,
    Timeout,
    RateLimited,
    TransportError,
    CredentialError,
    Skipped,
    Cancelled,
}

impl ProbeStatus {
    /// Excluded from the reliability denominator per spec.md §4.5.
    pub fn excluded_from_reliability(self) -> bool {
        matches!(self, ProbeStatus::Inconclusive | ProbeStatus::Skipped)
    }
}

/// The result of running one probe against one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub probe_id: String,
    pub model_ref: ModelRef,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
    #[serde(with = "duration_millis")]
    pub latency: Duration,
    pub status: ProbeStatus,
    pub retries_used: u32,
    pub evidence: Option<String>,
    pub observed_headers_digest: Option<String>,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_vector_richness_is_fraction_of_all_flags() {
        let mut v = CapabilityVector::default();
        assert_eq!(v.richness(), 0.0);
        v.set(CapabilityFlag::Streaming);
        v.set(CapabilityFlag::ToolUse);
        assert!((v.richness() - 2.0 / CapabilityFlag::ALL.len() as f64).abs() < 1e-9);
    }

    #[test]
    fn capability_vector_set_is_idempotent() {
        let mut v = CapabilityVector::default();
        v.set(CapabilityFlag::Vision);
        v.set(CapabilityFlag::Vision);
        assert_eq!(v.count(), 1);
    }

    #[test]
    fn inconclusive_and_skipped_excluded_from_reliability() {
        assert!(ProbeStatus::Inconclusive.excluded_from_reliability());
        assert!(ProbeStatus::Skipped.excluded_from_reliability());
        assert!(!ProbeStatus::Pass.excluded_from_reliability());
        assert!(!ProbeStatus::Fail.excluded_from_reliability());
    }
}
