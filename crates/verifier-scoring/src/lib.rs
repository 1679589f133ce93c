//! Verifier Scoring
//!
//! Maps one model's outcome bundle to the five weighted `DimensionScores`
//! plus a composite `overall_score`, with a full `ScoreBreakdown` for
//! auditability. Pure functions throughout, clamp-and-interpolate against
//! reference thresholds — no shared state, no I/O.

use verifier_core::plan::{ScoreReferences, ScoreWeights};
use verifier_core::probe::{CapabilityVector, ProbeOutcome, ProbeStatus};
use verifier_core::quota::Pricing;
use verifier_core::result::{DimensionScores, LatencyProfile, Reliability, ScoreBreakdown};

/// Probe ids the Scheduler runs for the code-capability battery share this
/// prefix; one probe per target language (see `verifier-probes::registry`).
const CODE_CAPABILITY_PREFIX: &str = "code_";

pub struct Scorer;

impl Scorer {
    /// Score one model from its outcome bundle and derived aggregates.
    pub fn score(
        outcomes: &[ProbeOutcome],
        capability_vector: &CapabilityVector,
        latency_profile: &LatencyProfile,
        reliability: &Reliability,
        pricing: Option<Pricing>,
        weights: &ScoreWeights,
        references: &ScoreReferences,
    ) -> (DimensionScores, f64, ScoreBreakdown) {
        let (code_capability, pass_fraction, language_coverage) = code_capability_score(outcomes);
        let (responsiveness, p95_ms, no_data) = responsiveness_score(latency_profile, references);
        let reliability_score = 100.0 * reliability.probe_success_rate;
        let feature_richness = 100.0 * capability_vector.richness();
        let (value_proposition, pricing_known, input_cost) = value_proposition_score(pricing, references);

        let dimensions = DimensionScores {
            code_capability,
            responsiveness,
            reliability: reliability_score,
            feature_richness,
            value_proposition,
        };

        let overall = weights.code_capability * dimensions.code_capability
            + weights.responsiveness * dimensions.responsiveness
            + weights.reliability * dimensions.reliability
            + weights.feature_richness * dimensions.feature_richness
            + weights.value_proposition * dimensions.value_proposition;
        let overall = (overall.clamp(0.0, 100.0) * 10.0).round() / 10.0;

        let breakdown = ScoreBreakdown {
            code_capability_pass_fraction: pass_fraction,
            code_capability_language_coverage: language_coverage,
            responsiveness_p95_ms: p95_ms,
            responsiveness_no_data: no_data,
            reliability_success_rate: reliability.probe_success_rate,
            feature_richness_flags_set: capability_vector.count(),
            feature_richness_flags_total: verifier_core::probe::CapabilityFlag::ALL.len(),
            value_proposition_pricing_known: pricing_known,
            value_proposition_input_cost_usd_per_1k: input_cost,
            weights: *weights,
        };

        (dimensions, overall, breakdown)
    }

    /// Tie-break ordering for the ranked report: higher overall score first,
    /// then lower p95 latency, then higher feature count, then lexicographic
    /// model id. Returns `true` if `a` should rank ahead of `b`.
    pub fn ranks_above(
        a_score: f64,
        a_p95_ms: Option<f64>,
        a_feature_count: usize,
        a_model_id: &str,
        b_score: f64,
        b_p95_ms: Option<f64>,
        b_feature_count: usize,
        b_model_id: &str,
    ) -> bool {
        use std::cmp::Ordering;

        if a_score != b_score {
            return a_score > b_score;
        }
        let p95_order = compare_optional_latency(a_p95_ms, b_p95_ms);
        if p95_order != Ordering::Equal {
            return p95_order == Ordering::Less;
        }
        if a_feature_count != b_feature_count {
            return a_feature_count > b_feature_count;
        }
        a_model_id < b_model_id
    }
}

fn compare_optional_latency(a: Option<f64>, b: Option<f64>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

fn code_capability_score(outcomes: &[ProbeOutcome]) -> (f64, f64, f64) {
    let attempted: Vec<&ProbeOutcome> = outcomes
        .iter()
        .filter(|o| o.probe_id.starts_with(CODE_CAPABILITY_PREFIX))
        .collect();
    if attempted.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let passed = attempted.iter().filter(|o| o.status == ProbeStatus::Pass).count();
    let pass_fraction = passed as f64 / attempted.len() as f64;
    // One probe targets one language, so distinct-passing / distinct-attempted
    // collapses to the same ratio as pass_fraction in the current registry.
    let language_coverage = pass_fraction;
    let score = 100.0 * clamp01((pass_fraction + language_coverage) / 2.0);
    (score, pass_fraction, language_coverage)
}

fn responsiveness_score(
    latency_profile: &LatencyProfile,
    references: &ScoreReferences,
) -> (f64, Option<f64>, bool) {
    let Some(p95) = latency_profile.p95 else {
        return (0.0, None, true);
    };
    let p95_ms = p95.as_secs_f64() * 1000.0;
    let good_ms = references.latency_good.as_secs_f64() * 1000.0;
    let bad_ms = references.latency_bad.as_secs_f64() * 1000.0;
    let fraction = 1.0 - (p95_ms - good_ms) / (bad_ms - good_ms);
    (100.0 * clamp01(fraction), Some(p95_ms), false)
}

fn value_proposition_score(
    pricing: Option<Pricing>,
    references: &ScoreReferences,
) -> (f64, bool, Option<f64>) {
    match pricing {
        Some(p) => {
            let fraction = 1.0 - p.input_usd_per_1k / references.cost_expensive_usd_per_1k;
            (100.0 * clamp01(fraction), true, Some(p.input_usd_per_1k))
        }
        None => (50.0, false, None),
    }
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
