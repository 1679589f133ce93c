//! File-based `ConfigSource` for single-host verifier deployments.
//!
//! Reads a `RunPlan` from a YAML (or TOML) file on disk, interpolating
//! `${ENV_VAR}` references against the process environment before parsing.
//!
//! ```no_run
//! # use verifier_config_file::FileConfigSource;
//! # use verifier_core::ConfigSource;
//! # async fn example() -> verifier_core::Result<()> {
//! let source = FileConfigSource::new("~/.verifier/plan.yaml")?;
//! let plan = source.load().await?;
//! # Ok(())
//! # }
//! ```

mod file_source;

pub use file_source::{FileConfigSource, PlanChange};
