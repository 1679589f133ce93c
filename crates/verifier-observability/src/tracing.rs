//! OpenTelemetry span helpers for one probe send.
//!
//! Note: this is a simplified integration. For production use, consider
//! the full `tracing-opentelemetry` bridge instead of hand-built `KeyValue`s.

use opentelemetry::{
    trace::{Span, Status},
    KeyValue,
};
use opentelemetry_sdk::{
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider as TracerProvider},
    Resource,
};

/// Tracer configuration.
#[derive(Debug, Clone)]
pub struct TracerConfig {
    pub service_name: String,
    pub service_version: String,
    /// Sampling rate (0.0-1.0).
    pub sampling_rate: f64,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            service_name: "verifier".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            sampling_rate: 1.0,
        }
    }
}

/// Build a tracer provider from a [`TracerConfig`].
pub fn init_tracer_provider(config: TracerConfig) -> TracerProvider {
    let resource = Resource::builder()
        .with_attributes(vec![
            KeyValue::new("service.name", config.service_name),
            KeyValue::new("service.version", config.service_version),
        ])
        .build();

    let sampler = if config.sampling_rate >= 1.0 {
        Sampler::AlwaysOn
    } else if config.sampling_rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(config.sampling_rate)
    };

    TracerProvider::builder()
        .with_resource(resource)
        .with_id_generator(RandomIdGenerator::default())
        .with_sampler(sampler)
        .build()
}

/// Span attributes for one probe send, attached the way
/// `#[tracing::instrument]` wraps `HttpTransport::send`.
#[derive(Debug, Clone, Default)]
pub struct ProbeSpanAttributes {
    pub run_id: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub probe_id: Option<String>,
}

impl ProbeSpanAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_probe_id(mut self, probe_id: impl Into<String>) -> Self {
        self.probe_id = Some(probe_id.into());
        self
    }

    pub fn to_key_values(&self) -> Vec<KeyValue> {
        let mut kvs = Vec::new();
        if let Some(ref run_id) = self.run_id {
            kvs.push(KeyValue::new("verifier.run_id", run_id.clone()));
        }
        if let Some(ref provider) = self.provider {
            kvs.push(KeyValue::new("verifier.provider", provider.clone()));
        }
        if let Some(ref model) = self.model {
            kvs.push(KeyValue::new("verifier.model", model.clone()));
        }
        if let Some(ref probe_id) = self.probe_id {
            kvs.push(KeyValue::new("verifier.probe_id", probe_id.clone()));
        }
        kvs
    }
}

/// Record retry-count and latency attributes once a probe reaches a
/// terminal outcome.
pub fn record_probe_outcome(span: &mut impl Span, retries_used: u32, latency_ms: u64) {
    span.set_attribute(KeyValue::new("verifier.retries_used", retries_used as i64));
    span.set_attribute(KeyValue::new("verifier.latency_ms", latency_ms as i64));
}

/// Mark a span as failed with an error.
pub fn record_error(span: &mut impl Span, error: &str) {
    span.set_status(Status::error(error.to_string()));
    span.set_attribute(KeyValue::new("error", true));
    span.set_attribute(KeyValue::new("error.message", error.to_string()));
}

/// Mark a span as successful.
pub fn record_success(span: &mut impl Span) {
    span.set_status(Status::Ok);
}
