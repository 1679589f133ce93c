//! Verifier Orchestrator
//!
//! Wires the rest of the engine together for one run: discover models per
//! provider, enforce the Exists→Responsive gate, hand the surviving
//! (model, probe) pairs to the Scheduler, fold outcomes through the
//! Aggregator, score each model, and persist + publish the result.
//!
//! The Orchestrator is constructed once with its long-lived collaborators
//! (`ResultStore`, `EventEmitter`) and takes the per-call input (`RunPlan`)
//! as a method argument, rather than rebuilding its dependencies per run.

mod discovery;

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use verifier_aggregate::Aggregator;
use verifier_core::event::Event;
use verifier_core::model::ModelRef;
use verifier_core::plan::{ProviderSpec, RunPlan};
use verifier_core::probe::{ProbeOutcome, ProbeStatus};
use verifier_core::quota::Pricing;
use verifier_core::result::VerificationResult;
use verifier_core::{Error, EventEmitter, Result, ResultStore};
use verifier_limits::LimitsObserver;
use verifier_probes::ProbeSet;
use verifier_scheduler::{CancellationToken, RunOutcome, ScheduledTask, Scheduler};
use verifier_scoring::Scorer;

/// Everything a finished (or cancelled) run produces. Only config errors
/// (pre-run) are returned as `Err`; a post-run store failure is carried in
/// `store_error` instead, since the caller still wants the in-memory
/// results even when persistence failed — see spec.md §4.8's error
/// propagation rule and `ResultStore::save_run`'s doc comment.
#[derive(Debug)]
pub struct VerifyOutcome {
    pub results: Vec<VerificationResult>,
    pub cancelled: bool,
    pub unreachable_providers: Vec<String>,
    pub store_error: Option<Error>,
}

pub struct Orchestrator {
    result_store: Arc<dyn ResultStore>,
    event_emitter: Arc<dyn EventEmitter>,
}

impl Orchestrator {
    pub fn new(result_store: Arc<dyn ResultStore>, event_emitter: Arc<dyn EventEmitter>) -> Self {
        Self {
            result_store,
            event_emitter,
        }
    }

    pub async fn verify(&self, plan: RunPlan, run_id: String) -> Result<VerifyOutcome> {
        plan.validate()?;

        self.emit(Event::RunStarted {
            run_id: run_id.clone(),
            provider_count: plan.providers.len(),
        })
        .await;

        let cancellation = CancellationToken::new();
        let aggregator = Aggregator::new();
        let mut unreachable_providers = Vec::new();
        let mut model_providers: HashMap<(String, String), ProviderSpec> = HashMap::new();
        let mut pricing_map: HashMap<(String, String), Pricing> = HashMap::new();

        for provider in &plan.providers {
            match discovery::discover(provider, &plan.timeouts, &plan.model_exclude_patterns).await {
                discovery::DiscoveryOutcome::Unreachable { reason } => {
                    unreachable_providers.push(provider.name.clone());
                    self.emit(Event::ProviderUnreachable {
                        run_id: run_id.clone(),
                        provider: provider.name.clone(),
                        reason,
                    })
                    .await;
                }
                discovery::DiscoveryOutcome::Reachable {
                    model_ids,
                    list_models_body,
                } => {
                    for model_id in model_ids {
                        let model_ref = ModelRef::new(provider.name.clone(), model_id.clone());
                        aggregator.register_model(model_ref.clone());
                        model_providers.insert(model_ref.key_owned(), provider.clone());
                        if let Some(body) = &list_models_body {
                            if let Some(pricing) = verifier_limits::pricing::detect_pricing(body, &model_id) {
                                pricing_map.insert(model_ref.key_owned(), pricing);
                            }
                        }
                    }
                }
            }
        }

        let probes = ProbeSet::ordered(&plan.probe_selection);
        let exists_probe = probes[0].clone();
        let rest_probes = &probes[1..];

        let model_refs: Vec<ModelRef> = model_providers
            .keys()
            .map(|(provider_name, model_id)| ModelRef::new(provider_name.clone(), model_id.clone()))
            .collect();

        if model_refs.is_empty() {
            let bundles = aggregator.finish(&probes);
            let results = self.score_bundles(bundles, &pricing_map, &plan);
            self.emit(Event::RunCompleted {
                run_id: run_id.clone(),
                model_count: results.len(),
                cancelled: false,
            })
            .await;
            let store_error = self.persist(&run_id, &results).await;
            return Ok(VerifyOutcome {
                results,
                cancelled: false,
                unreachable_providers,
                store_error,
            });
        }

        let scheduler = Scheduler::new(&plan, cancellation.clone())
            .map_err(|err| Error::Config(format!("failed to initialize provider transports: {err}")))?;

        let exists_tasks: Vec<ScheduledTask> = model_refs
            .iter()
            .map(|model_ref| ScheduledTask {
                provider: model_providers[&model_ref.key_owned()].clone(),
                model_ref: model_ref.clone(),
                probe: exists_probe.clone(),
            })
            .collect();

        let exists_run = run_with_deadline(&scheduler, exists_tasks, plan.timeouts.total, &cancellation).await;
        let mut exists_passed: HashSet<(String, String)> = HashSet::new();
        for outcome in exists_run.outcomes {
            if outcome.status == ProbeStatus::Pass {
                exists_passed.insert(outcome.model_ref.key_owned());
            }
            aggregator.record(outcome);
        }

        let mut rest_tasks = Vec::new();
        for model_ref in &model_refs {
            let key = model_ref.key_owned();
            let provider = &model_providers[&key];
            if !exists_passed.contains(&key) {
                for probe in rest_probes {
                    aggregator.record(skip_outcome(model_ref, probe.id, "exists probe did not pass"));
                }
                continue;
            }
            if budget_exhausted(scheduler.limits(), &provider.name, plan.timeouts.total) {
                for probe in rest_probes {
                    aggregator.record(skip_outcome(model_ref, probe.id, "provider budget exhausted"));
                }
                continue;
            }
            for probe in rest_probes {
                rest_tasks.push(ScheduledTask {
                    provider: provider.clone(),
                    model_ref: model_ref.clone(),
                    probe: probe.clone(),
                });
            }
        }

        let rest_run = run_with_deadline(&scheduler, rest_tasks, plan.timeouts.total, &cancellation).await;
        for outcome in rest_run.outcomes {
            aggregator.record(outcome);
        }

        let cancelled = cancellation.is_cancelled();
        let bundles = aggregator.finish(&probes);
        let results = self.score_bundles(bundles, &pricing_map, &plan);

        self.emit(Event::RunCompleted {
            run_id: run_id.clone(),
            model_count: results.len(),
            cancelled,
        })
        .await;

        let store_error = self.persist(&run_id, &results).await;

        Ok(VerifyOutcome {
            results,
            cancelled,
            unreachable_providers,
            store_error,
        })
    }

    fn score_bundles(
        &self,
        bundles: Vec<verifier_aggregate::OutcomeBundle>,
        pricing_map: &HashMap<(String, String), Pricing>,
        plan: &RunPlan,
    ) -> Vec<VerificationResult> {
        bundles
            .into_iter()
            .map(|bundle| {
                let key = (bundle.model_ref.provider_name.clone(), bundle.model_ref.model_id.clone());
                let pricing = pricing_map.get(&key).copied();
                let (dimension_scores, overall_score, score_breakdown) = Scorer::score(
                    &bundle.outcomes,
                    &bundle.capability_vector,
                    &bundle.latency_profile,
                    &bundle.reliability,
                    pricing,
                    &plan.score_weights,
                    &plan.score_references,
                );
                VerificationResult {
                    model_ref: bundle.model_ref,
                    started_at: bundle.started_at,
                    finished_at: bundle.finished_at,
                    availability: bundle.availability,
                    capability_vector: bundle.capability_vector,
                    latency_profile: bundle.latency_profile,
                    reliability: bundle.reliability,
                    pricing,
                    dimension_scores,
                    overall_score,
                    score_breakdown,
                    evidence_digest: evidence_digest(&bundle.outcomes),
                }
            })
            .collect()
    }

    async fn persist(&self, run_id: &str, results: &[VerificationResult]) -> Option<Error> {
        match self.result_store.save_run(run_id, results).await {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(run_id, error = %err, "failed to persist run results");
                Some(err)
            }
        }
    }

    async fn emit(&self, event: Event) {
        if let Err(err) = self.event_emitter.publish(event).await {
            tracing::warn!(error = %err, "failed to publish run event");
        }
    }
}

async fn run_with_deadline(
    scheduler: &Scheduler,
    tasks: Vec<ScheduledTask>,
    deadline: Duration,
    cancellation: &CancellationToken,
) -> RunOutcome {
    if tasks.is_empty() {
        return RunOutcome {
            outcomes: Vec::new(),
            cancelled: cancellation.is_cancelled(),
        };
    }

    let watcher_cancel = cancellation.clone();
    let timeout_handle = tokio::spawn(async move {
        tokio::time::sleep(deadline).await;
        watcher_cancel.cancel();
    });

    let outcome = scheduler.run(tasks).await;
    timeout_handle.abort();
    outcome
}

fn budget_exhausted(limits: &LimitsObserver, provider: &str, total_timeout: Duration) -> bool {
    let Some(quota) = limits.get(provider) else {
        return false;
    };
    let Ok(timeout_chrono) = chrono::Duration::from_std(total_timeout) else {
        return false;
    };
    quota.remaining_requests == Some(0) && quota.reset_at > chrono::Utc::now() + timeout_chrono
}

fn skip_outcome(model_ref: &ModelRef, probe_id: &str, reason: &str) -> ProbeOutcome {
    let now = chrono::Utc::now();
    ProbeOutcome {
        probe_id: probe_id.to_string(),
        model_ref: model_ref.clone(),
        started_at: now,
        finished_at: now,
        latency: Duration::ZERO,
        status: ProbeStatus::Skipped,
        retries_used: 0,
        evidence: Some(reason.to_string()),
        observed_headers_digest: None,
    }
}

/// Order-independent digest over one model's outcomes, stored on the
/// `VerificationResult` so two runs against an unchanged provider can be
/// compared without re-reading every probe body. Same construction as
/// `verifier_transport::headers::Headers::digest`.
fn evidence_digest(outcomes: &[ProbeOutcome]) -> String {
    let mut entries: Vec<String> = outcomes
        .iter()
        .map(|o| {
            format!(
                "{}:{:?}:{}",
                o.probe_id,
                o.status,
                o.observed_headers_digest.as_deref().unwrap_or("")
            )
        })
        .collect();
    entries.sort_unstable();

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for entry in entries {
        entry.hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}

trait ModelRefKey {
    fn key_owned(&self) -> (String, String);
}

impl ModelRefKey for ModelRef {
    fn key_owned(&self) -> (String, String) {
        (self.provider_name.clone(), self.model_id.clone())
    }
}
