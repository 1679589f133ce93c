//! `ConfigSource`: the contract the core depends on for run-plan loading.
//!
//! The core never reads files or environment variables directly — it asks
//! a `ConfigSource` for a validated `RunPlan`. CLI argument parsing and the
//! on-disk/YAML format are adapter concerns (see `verifier-config-file`).

use async_trait::async_trait;

use crate::{plan::RunPlan, Result};

#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Load and validate a run plan.
    ///
    /// # Errors
    /// - `Error::Config` if the plan is structurally invalid.
    async fn load(&self) -> Result<RunPlan>;
}
