//! Verifier Report
//!
//! Renders the two artifacts a finished run produces: a human-readable
//! summary and a deterministic JSON snapshot. The human-readable layout
//! uses a section-header/separator style built into a `String` instead of
//! emitted through `tracing`, since a report is an artifact, not a log
//! line.

use std::fmt::Write as _;

use serde::Serialize;
use verifier_core::plan::Concurrency;
use verifier_core::probe::CapabilityFlag;
use verifier_core::quota::QuotaState;
use verifier_core::result::VerificationResult;
use verifier_scoring::Scorer;

/// Run-level metadata the report header renders. Not part of `RunPlan`
/// itself — assembled by the Orchestrator once the run starts.
#[derive(Debug, Clone)]
pub struct RunHeader {
    pub run_id: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
    pub concurrency: Concurrency,
    pub probe_set_identity: String,
    pub cancelled: bool,
}

pub struct ReportBuilder;

impl ReportBuilder {
    /// Ranked table, per-model capability checklists, per-provider quota
    /// summary, and a run header. Deterministic given identical inputs,
    /// modulo the timestamps the run itself contributes.
    pub fn human_readable(
        header: &RunHeader,
        results: &[VerificationResult],
        quota: &[(String, QuotaState)],
    ) -> String {
        let mut out = String::new();
        write_header(&mut out, header);
        write_ranked_table(&mut out, results);
        write_capability_checklists(&mut out, results);
        write_quota_summary(&mut out, quota);
        out
    }

    /// A JSON document mirroring the internal result records. Serializing
    /// the typed structs directly (rather than through a generic `Value`)
    /// keeps field order identical to each struct's declaration, which is
    /// what makes two runs with identical outcomes diff to nothing but
    /// timestamps.
    pub fn machine_readable(
        header: &RunHeader,
        results: &[VerificationResult],
    ) -> serde_json::Result<String> {
        let snapshot = MachineReport {
            run_id: &header.run_id,
            started_at: header.started_at,
            finished_at: header.finished_at,
            cancelled: header.cancelled,
            concurrency: header.concurrency,
            probe_set_identity: &header.probe_set_identity,
            results,
        };
        serde_json::to_string_pretty(&snapshot)
    }
}

#[derive(Serialize)]
struct MachineReport<'a> {
    run_id: &'a str,
    started_at: chrono::DateTime<chrono::Utc>,
    finished_at: chrono::DateTime<chrono::Utc>,
    cancelled: bool,
    concurrency: Concurrency,
    probe_set_identity: &'a str,
    results: &'a [VerificationResult],
}

fn write_header(out: &mut String, header: &RunHeader) {
    let _ = writeln!(out, "═══════════════════════════════════════════════════════════");
    let _ = writeln!(out, "              Capability Verification Report");
    let _ = writeln!(out, "═══════════════════════════════════════════════════════════");
    let _ = writeln!(out, "Run:          {}", header.run_id);
    let _ = writeln!(out, "Started:      {}", header.started_at.to_rfc3339());
    let _ = writeln!(out, "Finished:     {}", header.finished_at.to_rfc3339());
    let _ = writeln!(
        out,
        "Concurrency:  global_max={}, per_provider_max={}",
        header.concurrency.global_max, header.concurrency.per_provider_max
    );
    let _ = writeln!(out, "Probe set:    {}", header.probe_set_identity);
    if header.cancelled {
        let _ = writeln!(out, "Status:       CANCELLED (partial results)");
    }
    let _ = writeln!(out);
}

fn write_ranked_table(out: &mut String, results: &[VerificationResult]) {
    let mut ranked: Vec<&VerificationResult> = results.iter().collect();
    ranked.sort_by(|a, b| {
        let a_above_b = Scorer::ranks_above(
            a.overall_score,
            a.score_breakdown.responsiveness_p95_ms,
            a.capability_vector.count(),
            &a.model_ref.model_id,
            b.overall_score,
            b.score_breakdown.responsiveness_p95_ms,
            b.capability_vector.count(),
            &b.model_ref.model_id,
        );
        if a_above_b {
            std::cmp::Ordering::Less
        } else {
            std::cmp::Ordering::Greater
        }
    });

    let _ = writeln!(out, "───────────────────────────────────────────────────────────");
    let _ = writeln!(out, "Rank  Score  Provider        Model");
    let _ = writeln!(out, "───────────────────────────────────────────────────────────");
    for (rank, result) in ranked.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<5} {:<6.1} {:<15} {}",
            rank + 1,
            result.overall_score,
            result.model_ref.provider_name,
            result.model_ref.model_id,
        );
    }
    let _ = writeln!(out);
}

fn write_capability_checklists(out: &mut String, results: &[VerificationResult]) {
    let _ = writeln!(out, "───────────────────────────────────────────────────────────");
    let _ = writeln!(out, "              Capability Checklists");
    let _ = writeln!(out, "───────────────────────────────────────────────────────────");
    for result in results {
        let _ = writeln!(out, "{} / {}", result.model_ref.provider_name, result.model_ref.model_id);
        if !result.availability.exists {
            let _ = writeln!(out, "  (model not reachable)");
            let _ = writeln!(out);
            continue;
        }
        for flag in CapabilityFlag::ALL {
            let mark = if result.capability_vector.is_set(flag) { "x" } else { " " };
            let _ = writeln!(out, "  [{mark}] {flag:?}");
        }
        let _ = writeln!(out);
    }
}

fn write_quota_summary(out: &mut String, quota: &[(String, QuotaState)]) {
    let _ = writeln!(out, "───────────────────────────────────────────────────────────");
    let _ = writeln!(out, "              Provider Quota Summary");
    let _ = writeln!(out, "───────────────────────────────────────────────────────────");
    if quota.is_empty() {
        let _ = writeln!(out, "No rate-limit headers observed.");
        return;
    }
    let mut sorted: Vec<&(String, QuotaState)> = quota.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    for (provider, state) in sorted {
        let _ = writeln!(out, "{provider} ({:?} dialect)", state.source_dialect);
        if let Some(remaining) = state.remaining_requests {
            let _ = writeln!(out, "  remaining requests: {remaining}");
        }
        if let Some(remaining) = state.remaining_tokens {
            let _ = writeln!(out, "  remaining tokens:   {remaining}");
        }
        let _ = writeln!(out, "  reset at:           {}", state.reset_at.to_rfc3339());
    }
}
