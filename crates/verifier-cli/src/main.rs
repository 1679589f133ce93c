//! Verifier CLI
//!
//! Command-line entry point for running a capability verification pass
//! against one or more OpenAI-compatible providers and inspecting past
//! results. Argument parsing and file-format choices live here, outside
//! the verification engine itself — `verifier-orchestrator` only ever
//! sees a parsed `RunPlan`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use verifier_config_file::FileConfigSource;
use verifier_core::{ConfigSource, ResultStore};
use verifier_observability::TracingEventEmitter;
use verifier_orchestrator::Orchestrator;
use verifier_report::{ReportBuilder, RunHeader};
use verifier_store_sqlite::SqliteResultStore;

#[derive(Parser)]
#[command(name = "verifier")]
#[command(about = "Black-box capability verifier for OpenAI-compatible chat endpoints", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a verification pass against the providers in a run-plan file.
    Run {
        /// Path to a YAML or TOML run-plan file.
        #[arg(long, default_value = "~/.verifier/plan.yaml")]
        plan: PathBuf,
        /// Path to the SQLite database results are persisted to.
        #[arg(long, default_value = "~/.verifier/results.db")]
        store: PathBuf,
        /// Emit the deterministic JSON report instead of the human-readable table.
        #[arg(long)]
        json: bool,
    },
    /// Print the most recently stored result for one provider/model pair.
    Show {
        #[arg(long, default_value = "~/.verifier/results.db")]
        store: PathBuf,
        #[arg(long)]
        provider: String,
        #[arg(long)]
        model: String,
    },
    /// List every (provider, model) pair with at least one stored result.
    Models {
        #[arg(long, default_value = "~/.verifier/results.db")]
        store: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { plan, store, json } => run(plan, store, json).await,
        Commands::Show { store, provider, model } => show(store, provider, model).await,
        Commands::Models { store } => models(store).await,
    }
}

async fn run(plan_path: PathBuf, store_path: PathBuf, json: bool) -> anyhow::Result<()> {
    let source = FileConfigSource::new(plan_path)?;
    let plan = source.load().await?;

    let metrics = Arc::new(verifier_observability::Metrics::new()?);
    let result_store = Arc::new(SqliteResultStore::new(store_path).await?);
    let event_emitter = Arc::new(TracingEventEmitter::new(metrics));

    let orchestrator = Orchestrator::new(result_store, event_emitter);
    let run_id = uuid::Uuid::new_v4().to_string();
    let started_at = chrono::Utc::now();

    info!(run_id, "starting verification run");
    let outcome = orchestrator.verify(plan.clone(), run_id.clone()).await?;
    let finished_at = chrono::Utc::now();

    if let Some(err) = &outcome.store_error {
        tracing::warn!(error = %err, "run results could not be persisted");
    }
    for provider in &outcome.unreachable_providers {
        tracing::warn!(provider, "provider was unreachable during discovery");
    }

    let header = RunHeader {
        run_id,
        started_at,
        finished_at,
        concurrency: plan.concurrency,
        probe_set_identity: probe_set_identity(&plan),
        cancelled: outcome.cancelled,
    };

    if json {
        println!("{}", ReportBuilder::machine_readable(&header, &outcome.results)?);
    } else {
        println!("{}", ReportBuilder::human_readable(&header, &outcome.results, &[]));
    }

    Ok(())
}

async fn show(store_path: PathBuf, provider: String, model: String) -> anyhow::Result<()> {
    let store = SqliteResultStore::new(store_path).await?;
    let model_ref = verifier_core::model::ModelRef::new(provider, model);
    match store.load_latest(&model_ref).await? {
        Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
        None => println!("no stored result for {}/{}", model_ref.provider_name, model_ref.model_id),
    }
    Ok(())
}

async fn models(store_path: PathBuf) -> anyhow::Result<()> {
    let store = SqliteResultStore::new(store_path).await?;
    for model_ref in store.list_models().await? {
        println!("{}/{}", model_ref.provider_name, model_ref.model_id);
    }
    Ok(())
}

fn probe_set_identity(plan: &verifier_core::plan::RunPlan) -> String {
    match &plan.probe_selection.tags {
        None => "comprehensive".to_string(),
        Some(tags) => tags.join(","),
    }
}
