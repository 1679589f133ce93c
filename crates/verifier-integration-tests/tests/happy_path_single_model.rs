//! A single reachable provider with one model that passes every quick probe
//! should produce exactly one `VerificationResult` with a score in [0, 100]
//! and no unreachable providers.

mod support;

use std::sync::Arc;

use verifier_core::ResultStore;
use verifier_observability::{Metrics, TracingEventEmitter};
use verifier_orchestrator::Orchestrator;
use verifier_store_sqlite::SqliteResultStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn single_provider_single_model_yields_one_scored_result() {
    let server = MockServer::start().await;
    support::mount_healthy_chat(&server).await;

    let plan = support::quick_plan("openai-compat", &server.uri());

    let store = Arc::new(SqliteResultStore::in_memory().await.unwrap());
    let emitter = Arc::new(TracingEventEmitter::new(Arc::new(Metrics::new().unwrap())));
    let orchestrator = Orchestrator::new(store.clone(), emitter);

    let outcome = orchestrator.verify(plan, "run-happy-path".to_string()).await.unwrap();

    assert!(outcome.unreachable_providers.is_empty());
    assert!(!outcome.cancelled);
    assert_eq!(outcome.results.len(), 1);

    let result = &outcome.results[0];
    assert_eq!(result.model_ref.provider_name, "openai-compat");
    assert_eq!(result.model_ref.model_id, "probe-model");
    assert!(result.availability.exists);
    assert!(result.availability.responsive);
    assert!((0.0..=100.0).contains(&result.overall_score));
    assert_eq!(result.reliability.total_probes, result.reliability.successful_probes);

    let stored = store
        .load_latest(&verifier_core::model::ModelRef::new("openai-compat", "probe-model"))
        .await
        .unwrap();
    assert!(stored.is_some(), "orchestrator persists the run it just completed");
}

#[tokio::test]
async fn mount_healthy_chat_covers_streaming_probe_too() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n\ndata: [DONE]\n\n",
        ))
        .mount(&server)
        .await;

    let plan = support::quick_plan("openai-compat", &server.uri());
    let store = Arc::new(SqliteResultStore::in_memory().await.unwrap());
    let emitter = Arc::new(TracingEventEmitter::new(Arc::new(Metrics::new().unwrap())));
    let orchestrator = Orchestrator::new(store, emitter);

    let outcome = orchestrator.verify(plan, "run-streaming".to_string()).await.unwrap();
    assert_eq!(outcome.results.len(), 1);
}
