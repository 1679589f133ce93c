//! `FileConfigSource` — YAML/TOML-backed `ConfigSource` implementation.

use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use futures::Stream;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use regex::Regex;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use verifier_core::{ConfigSource, Error, Result, RunPlan};

/// A reload notification emitted by [`FileConfigSource::watch`].
#[derive(Debug, Clone)]
pub struct PlanChange {
    pub version: u32,
    pub observed_at: chrono::DateTime<chrono::Utc>,
}

/// Loads a [`RunPlan`] from a YAML (default) or TOML (by extension) file.
///
/// `${ENV_VAR}` references anywhere in the file text are substituted from
/// the process environment before parsing; an unset variable is a
/// structural config error, not a silent empty string.
pub struct FileConfigSource {
    plan_path: PathBuf,
    version: Arc<AtomicU32>,
}

impl FileConfigSource {
    /// # Errors
    /// - `Error::Config` if the path does not exist after tilde expansion.
    pub fn new(plan_path: impl Into<PathBuf>) -> Result<Self> {
        let plan_path = expand_tilde(plan_path.into())?;
        if !plan_path.exists() {
            return Err(Error::Config(format!(
                "run plan file not found: {}",
                plan_path.display()
            )));
        }
        Ok(Self {
            plan_path,
            version: Arc::new(AtomicU32::new(1)),
        })
    }

    fn read_and_interpolate(&self) -> Result<String> {
        let raw = std::fs::read_to_string(&self.plan_path).map_err(|e| {
            error!("failed to read run plan file: {e}");
            Error::Io(e)
        })?;
        interpolate_env(&raw)
    }

    fn parse(&self, text: &str) -> Result<RunPlan> {
        let is_toml = self
            .plan_path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        if is_toml {
            toml::from_str(text).map_err(|e| Error::Config(format!("invalid TOML run plan: {e}")))
        } else {
            serde_yaml::from_str(text)
                .map_err(|e| Error::Config(format!("invalid YAML run plan: {e}")))
        }
    }

    /// Watch the plan file for modifications, emitting a [`PlanChange`] per
    /// event. Callers re-invoke [`ConfigSource::load`] to pick up the new
    /// plan; this stream carries no payload beyond the fact that something
    /// changed, mirroring the ambient hot-reload behavior of a file-backed
    /// config source without asserting anything about validity.
    pub fn watch(&self) -> Result<Pin<Box<dyn Stream<Item = Result<PlanChange>> + Send>>> {
        let (tx, rx) = mpsc::channel(16);
        let plan_path = self.plan_path.clone();
        let version = self.version.clone();

        tokio::task::spawn_blocking(move || {
            let (notify_tx, notify_rx) = std::sync::mpsc::channel();
            let mut watcher = match RecommendedWatcher::new(
                move |res: std::result::Result<Event, notify::Error>| {
                    if let Err(e) = notify_tx.send(res) {
                        error!("failed to forward file watch event: {e}");
                    }
                },
                notify::Config::default(),
            ) {
                Ok(w) => w,
                Err(e) => {
                    error!("failed to create file watcher: {e}");
                    return;
                }
            };

            if let Err(e) = watcher.watch(&plan_path, RecursiveMode::NonRecursive) {
                error!("failed to watch run plan file: {e}");
                return;
            }
            info!("watching run plan file for changes: {plan_path:?}");

            while let Ok(event_result) = notify_rx.recv() {
                match event_result {
                    Ok(event) if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) => {
                        let change = PlanChange {
                            version: version.fetch_add(1, Ordering::SeqCst) + 1,
                            observed_at: chrono::Utc::now(),
                        };
                        if tx.blocking_send(Ok(change)).is_err() {
                            debug!("run plan watch stream closed, stopping watcher");
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("file watch error: {e}");
                        if tx
                            .blocking_send(Err(Error::Internal(format!("file watch error: {e}"))))
                            .is_err()
                        {
                            break;
                        }
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(Box::pin(stream))
    }
}

#[async_trait]
impl ConfigSource for FileConfigSource {
    async fn load(&self) -> Result<RunPlan> {
        let text = self.read_and_interpolate()?;
        let plan = self.parse(&text)?;
        plan.validate()?;
        Ok(plan)
    }
}

fn interpolate_env(text: &str) -> Result<String> {
    let pattern = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex is valid");
    let mut missing = Vec::new();
    let interpolated = pattern.replace_all(text, |caps: &regex::Captures| {
        let name = &caps[1];
        match std::env::var(name) {
            Ok(value) => value,
            Err(_) => {
                missing.push(name.to_string());
                String::new()
            }
        }
    });
    if !missing.is_empty() {
        return Err(Error::Config(format!(
            "run plan references undefined environment variable(s): {}",
            missing.join(", ")
        )));
    }
    Ok(interpolated.into_owned())
}

fn expand_tilde(path: PathBuf) -> Result<PathBuf> {
    if path.starts_with("~") {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("could not determine home directory".to_string()))?;
        Ok(home.join(path.strip_prefix("~").expect("checked by starts_with")))
    } else {
        Ok(path)
    }
}
