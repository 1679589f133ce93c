//! `TracingEventEmitter` — the default `EventEmitter`: log and count, never fail the run.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use verifier_core::{Event, EventEmitter, Result};

use crate::metrics::Metrics;

/// Publishes every [`Event`] via `tracing::info!` and increments a
/// Prometheus counter on the shared [`Metrics`] registry. Satisfies the
/// "fire-and-forget, failures are logged but never abort a run" contract
/// by construction: `publish` never returns `Err`.
pub struct TracingEventEmitter {
    metrics: Arc<Metrics>,
}

impl TracingEventEmitter {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl EventEmitter for TracingEventEmitter {
    async fn publish(&self, event: Event) -> Result<()> {
        match &event {
            Event::RunStarted { run_id, provider_count } => {
                info!(run_id, provider_count, "run started");
            }
            Event::ProviderUnreachable { run_id, provider, reason } => {
                info!(run_id, provider, reason, "provider unreachable");
                self.metrics.record_probe_fail(provider, "*", "discovery", 0.0);
            }
            Event::RunCompleted { run_id, model_count, cancelled } => {
                info!(run_id, model_count, cancelled, "run completed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_never_fails() {
        let emitter = TracingEventEmitter::new(Arc::new(Metrics::new().unwrap()));
        let result = emitter
            .publish(Event::RunStarted {
                run_id: "run-1".to_string(),
                provider_count: 2,
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn provider_unreachable_increments_failure_metric() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let emitter = TracingEventEmitter::new(metrics.clone());
        emitter
            .publish(Event::ProviderUnreachable {
                run_id: "run-1".to_string(),
                provider: "p1".to_string(),
                reason: "500 on list-models".to_string(),
            })
            .await
            .unwrap();

        let gathered = metrics.registry().gather();
        let fail = gathered
            .iter()
            .find(|m| m.get_name() == "verifier_probes_fail_total")
            .unwrap();
        assert_eq!(fail.get_metric()[0].get_counter().value(), 1.0);
    }
}
