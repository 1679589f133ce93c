//! Prometheus metrics for the verification engine
//!
//! - Probe outcome counts (total, pass, fail by provider/model/probe)
//! - Probe latency histograms
//! - In-flight probe gauges (global and per-provider, for the concurrency
//!   cap invariant in spec §8)
//! - Retry and backoff counters
//! - Quota observation counts by rate-limit dialect
//! - Per-provider circuit breaker state

use prometheus::{CounterVec, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry};
use std::sync::Arc;

/// Metrics collector for one verification run (or a long-lived process
/// running many runs — the registry accumulates across runs).
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    /// Total probes attempted, labeled `provider, model, probe_id`.
    pub probes_total: CounterVec,
    /// Probes that reached a terminal `Pass`.
    pub probes_pass: CounterVec,
    /// Probes that reached a terminal `Fail`/`Timeout`/`TransportError`/`CredentialError`.
    pub probes_fail: CounterVec,
    /// Probe latency, labeled `provider, model, probe_id`.
    pub probe_duration_seconds: HistogramVec,

    /// Current in-flight probe count, labeled `provider` (the empty string
    /// label aggregates the global count).
    pub probes_in_flight: GaugeVec,
    /// Retry attempts, labeled `provider, reason` (`rate_limited`, `server`,
    /// `transport`, `timeout`).
    pub retries_total: CounterVec,

    /// Rate-limit/pricing header observations accepted, labeled
    /// `provider, dialect`.
    pub quota_observations_total: CounterVec,

    /// Circuit breaker state, labeled `provider` (0=closed, 1=open, 2=half-open).
    pub circuit_breaker_state: GaugeVec,
    /// Circuit breaker transitions, labeled `provider, from_state, to_state`.
    pub circuit_breaker_transitions: CounterVec,

    /// Overall composite score of the most recent result, labeled `provider, model`.
    pub overall_score: GaugeVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let probes_total = CounterVec::new(
            Opts::new("verifier_probes_total", "Total probes attempted"),
            &["provider", "model", "probe_id"],
        )?;
        let probes_pass = CounterVec::new(
            Opts::new("verifier_probes_pass_total", "Probes that passed"),
            &["provider", "model", "probe_id"],
        )?;
        let probes_fail = CounterVec::new(
            Opts::new("verifier_probes_fail_total", "Probes that failed"),
            &["provider", "model", "probe_id"],
        )?;
        let probe_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "verifier_probe_duration_seconds",
                "Probe round-trip duration in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
            &["provider", "model", "probe_id"],
        )?;

        let probes_in_flight = GaugeVec::new(
            Opts::new("verifier_probes_in_flight", "Probes currently in flight"),
            &["provider"],
        )?;
        let retries_total = CounterVec::new(
            Opts::new("verifier_retries_total", "Probe retry attempts"),
            &["provider", "reason"],
        )?;

        let quota_observations_total = CounterVec::new(
            Opts::new(
                "verifier_quota_observations_total",
                "Rate-limit header observations accepted",
            ),
            &["provider", "dialect"],
        )?;

        let circuit_breaker_state = GaugeVec::new(
            Opts::new(
                "verifier_circuit_breaker_state",
                "Circuit breaker state (0=closed, 1=open, 2=half-open)",
            ),
            &["provider"],
        )?;
        let circuit_breaker_transitions = CounterVec::new(
            Opts::new(
                "verifier_circuit_breaker_transitions_total",
                "Circuit breaker state transitions",
            ),
            &["provider", "from_state", "to_state"],
        )?;

        let overall_score = GaugeVec::new(
            Opts::new(
                "verifier_overall_score",
                "Composite capability score of the most recent result",
            ),
            &["provider", "model"],
        )?;

        registry.register(Box::new(probes_total.clone()))?;
        registry.register(Box::new(probes_pass.clone()))?;
        registry.register(Box::new(probes_fail.clone()))?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;
        registry.register(Box::new(probes_in_flight.clone()))?;
        registry.register(Box::new(retries_total.clone()))?;
        registry.register(Box::new(quota_observations_total.clone()))?;
        registry.register(Box::new(circuit_breaker_state.clone()))?;
        registry.register(Box::new(circuit_breaker_transitions.clone()))?;
        registry.register(Box::new(overall_score.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            probes_total,
            probes_pass,
            probes_fail,
            probe_duration_seconds,
            probes_in_flight,
            retries_total,
            quota_observations_total,
            circuit_breaker_state,
            circuit_breaker_transitions,
            overall_score,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_probe_pass(&self, provider: &str, model: &str, probe_id: &str, duration_secs: f64) {
        self.probes_total
            .with_label_values(&[provider, model, probe_id])
            .inc();
        self.probes_pass
            .with_label_values(&[provider, model, probe_id])
            .inc();
        self.probe_duration_seconds
            .with_label_values(&[provider, model, probe_id])
            .observe(duration_secs);
    }

    pub fn record_probe_fail(&self, provider: &str, model: &str, probe_id: &str, duration_secs: f64) {
        self.probes_total
            .with_label_values(&[provider, model, probe_id])
            .inc();
        self.probes_fail
            .with_label_values(&[provider, model, probe_id])
            .inc();
        self.probe_duration_seconds
            .with_label_values(&[provider, model, probe_id])
            .observe(duration_secs);
    }

    pub fn set_in_flight(&self, provider: &str, count: i64) {
        self.probes_in_flight
            .with_label_values(&[provider])
            .set(count as f64);
    }

    pub fn record_retry(&self, provider: &str, reason: &str) {
        self.retries_total.with_label_values(&[provider, reason]).inc();
    }

    pub fn record_quota_observation(&self, provider: &str, dialect: &str) {
        self.quota_observations_total
            .with_label_values(&[provider, dialect])
            .inc();
    }

    pub fn update_circuit_breaker_state(&self, provider: &str, state: CircuitBreakerState) {
        self.circuit_breaker_state
            .with_label_values(&[provider])
            .set(state as i64 as f64);
    }

    pub fn record_circuit_breaker_transition(
        &self,
        provider: &str,
        from: CircuitBreakerState,
        to: CircuitBreakerState,
    ) {
        self.circuit_breaker_transitions
            .with_label_values(&[provider, from.as_str(), to.as_str()])
            .inc();
    }

    pub fn set_overall_score(&self, provider: &str, model: &str, score: f64) {
        self.overall_score.with_label_values(&[provider, model]).set(score);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("metric registration cannot fail with static, non-duplicate names")
    }
}

/// Circuit breaker state for metrics, mirroring `verifier-scheduler`'s
/// internal `CircuitState` without creating a dependency cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CircuitBreakerState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl CircuitBreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}
