//! Shared fixtures for the end-to-end scenario tests.

use std::collections::HashMap;
use std::time::Duration;

use verifier_core::plan::{
    Concurrency, Credential, ProbeSelection, ProviderSpec, RetryPolicy, RunPlan, Timeouts,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A `RunPlan` with one provider pointed at `base_url`, quick-tagged probes
/// only, and tight timeouts so the scenario tests run fast.
pub fn quick_plan(provider_name: &str, base_url: &str) -> RunPlan {
    RunPlan {
        providers: vec![ProviderSpec {
            name: provider_name.to_string(),
            base_url: base_url.to_string(),
            credential: Credential::new("sk-test"),
            headers: HashMap::new(),
            model_allow_list: vec!["probe-model".to_string()],
        }],
        concurrency: Concurrency {
            global_max: 8,
            per_provider_max: 4,
        },
        retry_policy: RetryPolicy {
            max_retries: 2,
            retry_base_delay: Duration::from_millis(5),
            retry_max_delay: Duration::from_millis(20),
            unlimited_rate_limit_retries: false,
        },
        timeouts: Timeouts {
            connect: Duration::from_secs(5),
            request: Duration::from_secs(5),
            total: Duration::from_secs(30),
        },
        probe_selection: ProbeSelection::quick(),
        model_exclude_patterns: vec![],
        score_weights: Default::default(),
        score_references: Default::default(),
        compare_to_previous: false,
    }
}

/// A `RunPlan` running every probe (`comprehensive`), not just the quick gate.
pub fn comprehensive_plan(provider_name: &str, base_url: &str) -> RunPlan {
    RunPlan {
        probe_selection: ProbeSelection { tags: None },
        ..quick_plan(provider_name, base_url)
    }
}

pub fn chat_completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "probe-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop",
        }],
    })
}

pub async fn mount_healthy_chat(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body("ack")))
        .mount(server)
        .await;
}
