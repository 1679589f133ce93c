//! The worker pool that turns a `RunPlan` and a list of `ScheduledTask`s
//! into `ProbeOutcome`s.
//!
//! One `HttpTransport` and one `CircuitBreaker` per provider, a global
//! semaphore plus a per-provider semaphore bounding in-flight requests,
//! and a single `mpsc` channel workers push finished outcomes onto so the
//! caller can observe progress before the whole run completes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::{mpsc, Semaphore};
use verifier_core::plan::{ProviderSpec, RetryPolicy, RunPlan};
use verifier_core::probe::{ProbeOutcome, ProbeResponse, ProbeStatus, RequestKind};
use verifier_transport::client::TransportConfig;
use verifier_transport::openai::HttpTransport;
use verifier_transport::TransportError;
use verifier_limits::LimitsObserver;

use crate::cancellation::CancellationToken;
use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::retry::{self, RetryDecision};
use crate::task::ScheduledTask;

/// Everything the Scheduler needs that outlives any single task, shared
/// across worker futures via `Arc`.
struct SchedulerState {
    transports: HashMap<String, HttpTransport>,
    breakers: DashMap<String, CircuitBreaker>,
    global_permits: Semaphore,
    provider_permits: HashMap<String, Semaphore>,
    limits: LimitsObserver,
    retry_policy: RetryPolicy,
    cancellation: CancellationToken,
}

pub struct Scheduler {
    state: Arc<SchedulerState>,
}

/// One finished task, including retries spent and whether the run was
/// cancelled before it could complete.
#[derive(Debug)]
pub struct RunOutcome {
    pub outcomes: Vec<ProbeOutcome>,
    pub cancelled: bool,
}

impl Scheduler {
    pub fn new(plan: &RunPlan, cancellation: CancellationToken) -> verifier_transport::Result<Self> {
        let transport_config = TransportConfig {
            request_timeout: plan.timeouts.request,
            connect_timeout: plan.timeouts.connect,
            ..TransportConfig::default()
        };

        let mut transports = HashMap::with_capacity(plan.providers.len());
        let mut provider_permits = HashMap::with_capacity(plan.providers.len());
        let breakers = DashMap::with_capacity(plan.providers.len());
        for provider in &plan.providers {
            transports.insert(
                provider.name.clone(),
                Self::build_transport(provider, &transport_config)?,
            );
            provider_permits.insert(
                provider.name.clone(),
                Semaphore::new(plan.concurrency.per_provider_max),
            );
            breakers.insert(provider.name.clone(), CircuitBreaker::new(CircuitBreakerConfig::default()));
        }

        Ok(Self {
            state: Arc::new(SchedulerState {
                transports,
                breakers,
                global_permits: Semaphore::new(plan.concurrency.global_max),
                provider_permits,
                limits: LimitsObserver::new(),
                retry_policy: plan.retry_policy.clone(),
                cancellation,
            }),
        })
    }

    fn build_transport(
        provider: &ProviderSpec,
        config: &TransportConfig,
    ) -> verifier_transport::Result<HttpTransport> {
        let headers = provider
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        HttpTransport::new(&provider.base_url, provider.credential.expose(), headers, config)
    }

    pub fn limits(&self) -> &LimitsObserver {
        &self.state.limits
    }

    /// Run every task to completion (or until cancelled), bounded by the
    /// global and per-provider concurrency caps. Tasks for different
    /// providers run concurrently; tasks for the same provider are gated by
    /// that provider's semaphore and circuit breaker.
    pub async fn run(&self, tasks: Vec<ScheduledTask>) -> RunOutcome {
        let (tx, mut rx) = mpsc::channel(tasks.len().max(1));

        for task in tasks {
            let state = Arc::clone(&self.state);
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = execute_task(&state, task).await;
                let _ = tx.send(outcome).await;
            });
        }
        drop(tx);

        let mut outcomes = Vec::new();
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }

        RunOutcome {
            outcomes,
            cancelled: self.state.cancellation.is_cancelled(),
        }
    }
}

async fn execute_task(state: &Arc<SchedulerState>, task: ScheduledTask) -> ProbeOutcome {
    let started_at = chrono::Utc::now();
    let started = Instant::now();
    let provider_name = task.provider.name.clone();

    let _global_permit = state.global_permits.acquire().await.expect("semaphore never closed");
    let provider_semaphore = state
        .provider_permits
        .get(&provider_name)
        .expect("every provider in the plan has a semaphore");
    let _provider_permit = provider_semaphore.acquire().await.expect("semaphore never closed");

    if state.cancellation.is_cancelled() {
        return finish(&task, started_at, started.elapsed(), ProbeStatus::Cancelled, 0, None, None);
    }

    let breaker = state
        .breakers
        .get(&provider_name)
        .expect("every provider in the plan has a circuit breaker");
    if !breaker.allow_request() {
        return finish(&task, started_at, started.elapsed(), ProbeStatus::Skipped, 0, None, None);
    }
    drop(breaker);

    let transport = state
        .transports
        .get(&provider_name)
        .expect("every provider in the plan has a transport");

    let mut retries_used = 0u32;
    loop {
        let attempt = run_probe_once(transport, &task, state.cancellation.is_cancelled()).await;

        match attempt {
            Ok((response, headers_digest)) => {
                state
                    .breakers
                    .get(&provider_name)
                    .expect("provider breaker present")
                    .record_success();
                let verdict = (task.probe.success_predicate)(&response);
                let status = match verdict.verdict {
                    verifier_core::probe::Verdict::Pass => ProbeStatus::Pass,
                    verifier_core::probe::Verdict::Fail => ProbeStatus::Fail,
                    verifier_core::probe::Verdict::Inconclusive => ProbeStatus::Inconclusive,
                };
                return finish(
                    &task,
                    started_at,
                    started.elapsed(),
                    status,
                    retries_used,
                    verdict.evidence,
                    headers_digest,
                );
            }
            Err(error) => {
                state
                    .breakers
                    .get(&provider_name)
                    .expect("provider breaker present")
                    .record_failure();

                let status = match &error {
                    TransportError::Timeout(_) => ProbeStatus::Timeout,
                    TransportError::RateLimited { .. } => ProbeStatus::RateLimited,
                    TransportError::Unauthorized(_) | TransportError::Forbidden(_) => {
                        ProbeStatus::CredentialError
                    }
                    _ => ProbeStatus::TransportError,
                };

                match retry::classify(&error, retries_used, &state.retry_policy) {
                    RetryDecision::Terminal => {
                        return finish(
                            &task,
                            started_at,
                            started.elapsed(),
                            status,
                            retries_used,
                            Some(error.to_string()),
                            None,
                        );
                    }
                    RetryDecision::RetryAfter(wait) => {
                        retries_used += 1;
                        tokio::select! {
                            _ = tokio::time::sleep(wait) => {}
                            _ = state.cancellation.cancelled() => {
                                return finish(
                                    &task,
                                    started_at,
                                    started.elapsed(),
                                    ProbeStatus::Cancelled,
                                    retries_used,
                                    None,
                                    None,
                                );
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Issue one attempt at the task's probe and, on success, record the
/// response's headers with the `LimitsObserver` and fold them into a
/// `ProbeResponse` the success predicate can judge.
async fn run_probe_once(
    transport: &HttpTransport,
    task: &ScheduledTask,
    already_cancelled: bool,
) -> Result<(ProbeResponse, Option<String>), TransportError> {
    if already_cancelled {
        return Err(TransportError::BadResponse("run cancelled".to_string()));
    }

    let body = (task.probe.request_template)(&task.model_ref.model_id);

    match task.probe.request_kind {
        RequestKind::ChatStreaming => {
            let result = transport
                .chat_completions_stream(body, task.probe.timeout)
                .await?;
            let response = ProbeResponse {
                status: result.status,
                body: serde_json::Value::Null,
                stream_frames_observed: result.stream_outcome.frames_observed,
                elapsed: result.stream_outcome.elapsed,
                parse_failed: false,
            };
            Ok((response, Some(result.headers.digest())))
        }
        RequestKind::ModelList => {
            let result = transport.list_models().await?;
            Ok((to_probe_response(&result), Some(result.headers.digest())))
        }
        RequestKind::Embedding => {
            let result = transport.embeddings(body).await?;
            Ok((to_probe_response(&result), Some(result.headers.digest())))
        }
        RequestKind::Moderation => {
            let result = transport.moderations(body).await?;
            Ok((to_probe_response(&result), Some(result.headers.digest())))
        }
        RequestKind::ImageGeneration => {
            let result = transport.image_generations(body).await?;
            Ok((to_probe_response(&result), Some(result.headers.digest())))
        }
        RequestKind::AudioTranscription => {
            let result = transport.audio_transcriptions(body).await?;
            Ok((to_probe_response(&result), Some(result.headers.digest())))
        }
        RequestKind::Batch => {
            let result = transport
                .send(verifier_transport::openai::TransportRequest::post("/batches", body))
                .await?;
            Ok((to_probe_response(&result), Some(result.headers.digest())))
        }
        RequestKind::Reranking => {
            let result = transport
                .send(verifier_transport::openai::TransportRequest::post("/rerank", body))
                .await?;
            Ok((to_probe_response(&result), Some(result.headers.digest())))
        }
        RequestKind::Chat
        | RequestKind::ChatWithTools
        | RequestKind::ChatJsonMode
        | RequestKind::ChatStructuredOutput
        | RequestKind::ReasoningProbe => {
            let result = transport.chat_completions(body).await?;
            Ok((to_probe_response(&result), Some(result.headers.digest())))
        }
    }
}

fn to_probe_response(response: &verifier_transport::openai::TransportResponse) -> ProbeResponse {
    ProbeResponse {
        status: response.status,
        body: response.body.clone(),
        stream_frames_observed: 0,
        elapsed: response.elapsed,
        parse_failed: false,
    }
}

#[allow(clippy::too_many_arguments)]
fn finish(
    task: &ScheduledTask,
    started_at: chrono::DateTime<chrono::Utc>,
    latency: Duration,
    status: ProbeStatus,
    retries_used: u32,
    evidence: Option<String>,
    observed_headers_digest: Option<String>,
) -> ProbeOutcome {
    ProbeOutcome {
        probe_id: task.probe.id.to_string(),
        model_ref: task.model_ref.clone(),
        started_at,
        finished_at: chrono::Utc::now(),
        latency,
        status,
        retries_used,
        evidence,
        observed_headers_digest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;
    use verifier_core::model::ModelRef;
    use verifier_core::plan::{Concurrency, Credential, ProviderSpec as Provider, RetryPolicy as Retry, RunPlan as Plan, Timeouts};
    use verifier_core::probe::Probe;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn always_pass(_: &ProbeResponse) -> verifier_core::probe::PredicateResult {
        verifier_core::probe::PredicateResult::pass()
    }

    fn empty_body(_: &str) -> serde_json::Value {
        serde_json::json!({"model": "m"})
    }

    fn plan(base_url: &str) -> Plan {
        Plan {
            providers: vec![Provider {
                name: "mock".to_string(),
                base_url: base_url.to_string(),
                credential: Credential::new("sk-test"),
                headers: StdHashMap::new(),
                model_allow_list: vec![],
            }],
            concurrency: Concurrency {
                global_max: 4,
                per_provider_max: 2,
            },
            retry_policy: Retry {
                max_retries: 1,
                retry_base_delay: Duration::from_millis(1),
                retry_max_delay: Duration::from_millis(5),
                unlimited_rate_limit_retries: false,
            },
            timeouts: Timeouts::default(),
            probe_selection: Default::default(),
            model_exclude_patterns: vec![],
            score_weights: Default::default(),
            score_references: Default::default(),
            compare_to_previous: false,
        }
    }

    #[tokio::test]
    async fn successful_chat_probe_yields_pass() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let scheduler = Scheduler::new(&plan(&server.uri()), CancellationToken::new()).unwrap();
        let probe = Probe {
            id: "responsive",
            tags: &["quick"],
            request_kind: RequestKind::Chat,
            request_template: empty_body,
            timeout: Duration::from_secs(5),
            sets_capabilities: &[],
            contributes_to_dimensions: &["responsiveness"],
            success_predicate: always_pass,
        };
        let task = ScheduledTask {
            provider: plan(&server.uri()).providers[0].clone(),
            model_ref: ModelRef::new("mock", "m"),
            probe,
        };

        let result = scheduler.run(vec![task]).await;
        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(result.outcomes[0].status, ProbeStatus::Pass);
        assert!(!result.cancelled);
    }

    #[tokio::test]
    async fn server_error_exhausts_retries_then_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let scheduler = Scheduler::new(&plan(&server.uri()), CancellationToken::new()).unwrap();
        let probe = Probe {
            id: "responsive",
            tags: &["quick"],
            request_kind: RequestKind::Chat,
            request_template: empty_body,
            timeout: Duration::from_secs(5),
            sets_capabilities: &[],
            contributes_to_dimensions: &["responsiveness"],
            success_predicate: always_pass,
        };
        let task = ScheduledTask {
            provider: plan(&server.uri()).providers[0].clone(),
            model_ref: ModelRef::new("mock", "m"),
            probe,
        };

        let result = scheduler.run(vec![task]).await;
        assert_eq!(result.outcomes[0].status, ProbeStatus::TransportError);
        assert_eq!(result.outcomes[0].retries_used, 1);
    }

    #[tokio::test]
    async fn cancellation_before_dispatch_marks_task_cancelled() {
        let server = MockServer::start().await;
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let scheduler = Scheduler::new(&plan(&server.uri()), cancellation).unwrap();
        let probe = Probe {
            id: "responsive",
            tags: &["quick"],
            request_kind: RequestKind::Chat,
            request_template: empty_body,
            timeout: Duration::from_secs(5),
            sets_capabilities: &[],
            contributes_to_dimensions: &["responsiveness"],
            success_predicate: always_pass,
        };
        let task = ScheduledTask {
            provider: plan(&server.uri()).providers[0].clone(),
            model_ref: ModelRef::new("mock", "m"),
            probe,
        };

        let result = scheduler.run(vec![task]).await;
        assert_eq!(result.outcomes[0].status, ProbeStatus::Cancelled);
        assert!(result.cancelled);
    }
}
