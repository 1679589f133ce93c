//! Verifier Aggregate
//!
//! Collects streamed `ProbeOutcome`s into per-model buckets and, on close,
//! derives latency percentiles, a reliability ratio, and a capability
//! vector. An `Arc<RwLock<HashMap<_, _>>>` accumulator written from many
//! callers, read once at the end to compute aggregate figures — no
//! per-event computation, no cross-worker sharing beyond the one lock.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use verifier_core::model::ModelRef;
use verifier_core::probe::{CapabilityVector, Probe, ProbeOutcome, ProbeStatus};
use verifier_core::result::{Availability, LatencyProfile, Reliability};

/// Everything the Scorer needs for one model, derived from its outcome
/// bundle. The Orchestrator turns this plus a `Scorer::score` call into a
/// `VerificationResult`.
#[derive(Debug, Clone)]
pub struct OutcomeBundle {
    pub model_ref: ModelRef,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
    pub availability: Availability,
    pub capability_vector: CapabilityVector,
    pub latency_profile: LatencyProfile,
    pub reliability: Reliability,
    pub outcomes: Vec<ProbeOutcome>,
}

#[derive(Default)]
struct ModelBucket {
    model_ref: Option<ModelRef>,
    outcomes: Vec<ProbeOutcome>,
}

/// Run-scoped accumulator. `register_model` must be called for every
/// `ModelRef` the Orchestrator discovers, even ones whose `ExistsProbe`
/// is expected to fail, so `finish` can emit a `VerificationResult` for
/// every model per spec.md §4.6's totality invariant.
#[derive(Clone, Default)]
pub struct Aggregator {
    order: Arc<RwLock<Vec<(String, String)>>>,
    buckets: Arc<RwLock<HashMap<(String, String), ModelBucket>>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_model(&self, model_ref: ModelRef) {
        let key = (model_ref.provider_name.clone(), model_ref.model_id.clone());
        let mut buckets = self.buckets.write().unwrap_or_else(|p| p.into_inner());
        if !buckets.contains_key(&key) {
            let mut order = self.order.write().unwrap_or_else(|p| p.into_inner());
            order.push(key.clone());
            buckets.insert(
                key,
                ModelBucket {
                    model_ref: Some(model_ref),
                    outcomes: Vec::new(),
                },
            );
        }
    }

    pub fn record(&self, outcome: ProbeOutcome) {
        let key = (
            outcome.model_ref.provider_name.clone(),
            outcome.model_ref.model_id.clone(),
        );
        let mut buckets = self.buckets.write().unwrap_or_else(|p| p.into_inner());
        let bucket = buckets.entry(key.clone()).or_default();
        if bucket.model_ref.is_none() {
            bucket.model_ref = Some(outcome.model_ref.clone());
            self.order.write().unwrap_or_else(|p| p.into_inner()).push(key);
        }
        bucket.outcomes.push(outcome);
    }

    /// Finalize every registered model into an `OutcomeBundle`, in
    /// registration order. `probes` provides the `sets_capabilities`
    /// lookup the capability vector is built from.
    pub fn finish(&self, probes: &[Probe]) -> Vec<OutcomeBundle> {
        let capability_index: HashMap<&str, &[verifier_core::probe::CapabilityFlag]> =
            probes.iter().map(|p| (p.id, p.sets_capabilities)).collect();

        let order = self.order.read().unwrap_or_else(|p| p.into_inner());
        let buckets = self.buckets.read().unwrap_or_else(|p| p.into_inner());

        order
            .iter()
            .filter_map(|key| buckets.get(key))
            .filter_map(|bucket| bucket.model_ref.clone().map(|model_ref| (model_ref, &bucket.outcomes)))
            .map(|(model_ref, outcomes)| build_bundle(model_ref, outcomes, &capability_index))
            .collect()
    }
}

fn build_bundle(
    model_ref: ModelRef,
    outcomes: &[ProbeOutcome],
    capability_index: &HashMap<&str, &[verifier_core::probe::CapabilityFlag]>,
) -> OutcomeBundle {
    let started_at = outcomes.iter().map(|o| o.started_at).min().unwrap_or_else(chrono::Utc::now);
    let finished_at = outcomes.iter().map(|o| o.finished_at).max().unwrap_or(started_at);

    let exists = outcomes
        .iter()
        .find(|o| o.probe_id == "exists")
        .is_some_and(|o| o.status == ProbeStatus::Pass);
    let responsive_outcome = outcomes.iter().find(|o| o.probe_id == "responsive");
    let responsive = responsive_outcome.is_some_and(|o| o.status == ProbeStatus::Pass);
    let latency_sample = responsive_outcome.map(|o| o.latency);

    let mut capability_vector = CapabilityVector::default();
    for outcome in outcomes.iter().filter(|o| o.status == ProbeStatus::Pass) {
        if let Some(flags) = capability_index.get(outcome.probe_id.as_str()) {
            for flag in flags.iter() {
                capability_vector.set(*flag);
            }
        }
    }

    let latency_profile = latency_profile(outcomes);
    let reliability = reliability(outcomes);

    OutcomeBundle {
        model_ref,
        started_at,
        finished_at,
        availability: Availability {
            exists,
            responsive,
            latency_sample,
        },
        capability_vector,
        latency_profile,
        reliability,
        outcomes: outcomes.to_vec(),
    }
}

fn latency_profile(outcomes: &[ProbeOutcome]) -> LatencyProfile {
    let mut samples: Vec<Duration> = outcomes
        .iter()
        .filter(|o| !matches!(o.status, ProbeStatus::Skipped | ProbeStatus::Cancelled))
        .map(|o| o.latency)
        .collect();
    samples.sort_unstable();

    if samples.is_empty() {
        return LatencyProfile::default();
    }

    let count = samples.len();
    let total: Duration = samples.iter().sum();
    let mean = total / count as u32;

    LatencyProfile {
        count,
        mean: Some(mean),
        p50: Some(nearest_rank(&samples, 0.50)),
        p95: Some(nearest_rank(&samples, 0.95)),
        p99: Some(nearest_rank(&samples, 0.99)),
        min: samples.first().copied(),
        max: samples.last().copied(),
        throughput_tokens_per_sec: None,
    }
}

/// Nearest-rank percentile over a sorted sample list: small N here (one run's
/// probe count per model), so no sketch is warranted.
fn nearest_rank(sorted_samples: &[Duration], percentile: f64) -> Duration {
    let rank = ((percentile * sorted_samples.len() as f64).ceil() as usize)
        .clamp(1, sorted_samples.len());
    sorted_samples[rank - 1]
}

fn reliability(outcomes: &[ProbeOutcome]) -> Reliability {
    let total_probes = outcomes.len();
    let successful_probes = outcomes.iter().filter(|o| o.status == ProbeStatus::Pass).count();
    let eligible = outcomes.iter().filter(|o| !o.status.excluded_from_reliability()).count();
    let probe_success_rate = if eligible == 0 {
        1.0
    } else {
        successful_probes as f64 / eligible as f64
    };

    Reliability {
        successful_probes,
        total_probes,
        probe_success_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verifier_core::probe::{CapabilityFlag, RequestKind};

    fn outcome(model: &ModelRef, probe_id: &str, status: ProbeStatus, latency_ms: u64) -> ProbeOutcome {
        let now = chrono::Utc::now();
        ProbeOutcome {
            probe_id: probe_id.to_string(),
            model_ref: model.clone(),
            started_at: now,
            finished_at: now,
            latency: Duration::from_millis(latency_ms),
            status,
            retries_used: 0,
            evidence: None,
            observed_headers_digest: None,
        }
    }

    fn streaming_probe() -> Probe {
        fn body(_: &str) -> serde_json::Value {
            serde_json::json!({})
        }
        fn predicate(_: &verifier_core::probe::ProbeResponse) -> verifier_core::probe::PredicateResult {
            verifier_core::probe::PredicateResult::pass()
        }
        Probe {
            id: "streaming",
            tags: &["comprehensive"],
            request_kind: RequestKind::ChatStreaming,
            request_template: body,
            timeout: Duration::from_secs(5),
            sets_capabilities: &[CapabilityFlag::Streaming],
            contributes_to_dimensions: &["feature_richness"],
            success_predicate: predicate,
        }
    }

    #[test]
    fn model_with_no_outcomes_still_gets_a_bundle_when_registered() {
        let aggregator = Aggregator::new();
        let model = ModelRef::new("p1", "m1");
        aggregator.register_model(model.clone());

        let bundles = aggregator.finish(&[]);
        assert_eq!(bundles.len(), 1);
        assert!(!bundles[0].availability.exists);
        assert_eq!(bundles[0].reliability.total_probes, 0);
    }

    #[test]
    fn exists_pass_and_streaming_pass_sets_capability_flag() {
        let aggregator = Aggregator::new();
        let model = ModelRef::new("p1", "m1");
        aggregator.register_model(model.clone());
        aggregator.record(outcome(&model, "exists", ProbeStatus::Pass, 10));
        aggregator.record(outcome(&model, "responsive", ProbeStatus::Pass, 20));
        aggregator.record(outcome(&model, "streaming", ProbeStatus::Pass, 30));

        let bundles = aggregator.finish(&[streaming_probe()]);
        assert!(bundles[0].availability.exists);
        assert!(bundles[0].availability.responsive);
        assert!(bundles[0].capability_vector.is_set(CapabilityFlag::Streaming));
    }

    #[test]
    fn reliability_excludes_inconclusive_and_skipped_from_denominator() {
        let aggregator = Aggregator::new();
        let model = ModelRef::new("p1", "m1");
        aggregator.register_model(model.clone());
        aggregator.record(outcome(&model, "exists", ProbeStatus::Pass, 10));
        aggregator.record(outcome(&model, "a", ProbeStatus::Pass, 10));
        aggregator.record(outcome(&model, "b", ProbeStatus::Fail, 10));
        aggregator.record(outcome(&model, "c", ProbeStatus::Inconclusive, 10));
        aggregator.record(outcome(&model, "d", ProbeStatus::Skipped, 10));

        let bundles = aggregator.finish(&[]);
        let reliability = &bundles[0].reliability;
        assert_eq!(reliability.total_probes, 5);
        assert_eq!(reliability.successful_probes, 2);
        assert_eq!(reliability.probe_success_rate, 2.0 / 3.0);
    }

    #[test]
    fn latency_percentiles_use_nearest_rank() {
        let aggregator = Aggregator::new();
        let model = ModelRef::new("p1", "m1");
        aggregator.register_model(model.clone());
        for ms in [10, 20, 30, 40, 50, 60, 70, 80, 90, 100] {
            aggregator.record(outcome(&model, "p", ProbeStatus::Pass, ms));
        }

        let bundles = aggregator.finish(&[]);
        let profile = &bundles[0].latency_profile;
        assert_eq!(profile.count, 10);
        assert_eq!(profile.p50, Some(Duration::from_millis(50)));
        assert_eq!(profile.min, Some(Duration::from_millis(10)));
        assert_eq!(profile.max, Some(Duration::from_millis(100)));
    }

    #[test]
    fn registration_order_is_preserved_in_finish() {
        let aggregator = Aggregator::new();
        let a = ModelRef::new("p1", "a-model");
        let b = ModelRef::new("p1", "b-model");
        aggregator.register_model(b.clone());
        aggregator.register_model(a.clone());

        let bundles = aggregator.finish(&[]);
        assert_eq!(bundles[0].model_ref.model_id, "b-model");
        assert_eq!(bundles[1].model_ref.model_id, "a-model");
    }
}
