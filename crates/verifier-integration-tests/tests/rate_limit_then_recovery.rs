//! A provider that answers `429` once before recovering should still yield
//! a `Pass` once the retry succeeds, with one retry accounted for.

mod support;

use std::sync::Arc;

use verifier_observability::{Metrics, TracingEventEmitter};
use verifier_orchestrator::Orchestrator;
use verifier_store_sqlite::SqliteResultStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn rate_limited_once_then_recovers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::chat_completion_body("ack")))
        .mount(&server)
        .await;

    let plan = support::quick_plan("flaky-compat", &server.uri());
    let store = Arc::new(SqliteResultStore::in_memory().await.unwrap());
    let emitter = Arc::new(TracingEventEmitter::new(Arc::new(Metrics::new().unwrap())));
    let orchestrator = Orchestrator::new(store, emitter);

    let outcome = orchestrator
        .verify(plan, "run-rate-limit-recovery".to_string())
        .await
        .unwrap();

    assert_eq!(outcome.results.len(), 1);
    let result = &outcome.results[0];
    assert!(result.availability.exists);
    assert!(result.availability.responsive);
}

#[tokio::test]
async fn rate_limited_past_max_retries_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .mount(&server)
        .await;

    let mut plan = support::quick_plan("always-limited-compat", &server.uri());
    plan.retry_policy.max_retries = 1;

    let store = Arc::new(SqliteResultStore::in_memory().await.unwrap());
    let emitter = Arc::new(TracingEventEmitter::new(Arc::new(Metrics::new().unwrap())));
    let orchestrator = Orchestrator::new(store, emitter);

    let outcome = orchestrator
        .verify(plan, "run-rate-limit-exhausted".to_string())
        .await
        .unwrap();

    assert_eq!(outcome.results.len(), 1);
    let result = &outcome.results[0];
    assert!(!result.availability.exists, "Exists probe never passed under sustained 429s");
    assert_eq!(result.reliability.successful_probes, 0);
}
