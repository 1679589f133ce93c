//! A model that answers chat probes normally but never returns `tool_calls`
//! must not have `ToolUse`/`FunctionCalling` set in its capability vector —
//! capability soundness: a flag is set only on positive evidence, never
//! assumed from a passing `Exists`/`Responsive` gate.

mod support;

use std::sync::Arc;

use verifier_core::probe::CapabilityFlag;
use verifier_observability::{Metrics, TracingEventEmitter};
use verifier_orchestrator::Orchestrator;
use verifier_store_sqlite::SqliteResultStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn non_tool_capable_model_has_no_tool_use_flag() {
    let server = MockServer::start().await;

    // Every chat completion, tool request included, answers with plain text
    // and no `tool_calls` — this provider never demonstrates tool use.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::chat_completion_body(
            "I can't call tools, but here's an answer.",
        )))
        .mount(&server)
        .await;

    let plan = support::comprehensive_plan("no-tools-compat", &server.uri());
    let store = Arc::new(SqliteResultStore::in_memory().await.unwrap());
    let emitter = Arc::new(TracingEventEmitter::new(Arc::new(Metrics::new().unwrap())));
    let orchestrator = Orchestrator::new(store, emitter);

    let outcome = orchestrator
        .verify(plan, "run-tool-use-gating".to_string())
        .await
        .unwrap();

    assert_eq!(outcome.results.len(), 1);
    let result = &outcome.results[0];
    assert!(result.availability.exists);
    assert!(!result.capability_vector.is_set(CapabilityFlag::ToolUse));
    assert!(!result.capability_vector.is_set(CapabilityFlag::FunctionCalling));
    assert!(!result.capability_vector.is_set(CapabilityFlag::ParallelToolUse));

    // The run still produces a complete result — an unsupported capability
    // is a `Fail` outcome folded into the score, not a run-aborting error.
    assert!((0.0..=100.0).contains(&result.overall_score));
}

#[tokio::test]
async fn tool_capable_model_sets_tool_use_flag() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-tools",
            "object": "chat.completion",
            "model": "probe-model",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "get_weather", "arguments": "{\"location\":\"Boston\"}"},
                    }],
                },
                "finish_reason": "tool_calls",
            }],
        })))
        .mount(&server)
        .await;

    let plan = support::comprehensive_plan("tools-compat", &server.uri());
    let store = Arc::new(SqliteResultStore::in_memory().await.unwrap());
    let emitter = Arc::new(TracingEventEmitter::new(Arc::new(Metrics::new().unwrap())));
    let orchestrator = Orchestrator::new(store, emitter);

    let outcome = orchestrator
        .verify(plan, "run-tool-use-present".to_string())
        .await
        .unwrap();

    let result = &outcome.results[0];
    assert!(result.capability_vector.is_set(CapabilityFlag::ToolUse));
    assert!(result.capability_vector.is_set(CapabilityFlag::FunctionCalling));
}
