//! `ResultStore`: the persistence contract the core writes finished runs to.
//!
//! Encryption at rest, schema migrations, and the choice of backing engine
//! are adapter concerns — any store that implements this trait is acceptable.

use async_trait::async_trait;

use crate::{model::ModelRef, result::VerificationResult, Result};

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist every result produced by one run.
    ///
    /// # Errors
    /// - `Error::Store` for write failures. The in-memory results are still
    ///   returned to the caller regardless of this error.
    async fn save_run(&self, run_id: &str, results: &[VerificationResult]) -> Result<()>;

    /// Load the most recent stored result for one model, if any.
    ///
    /// # Errors
    /// - `Error::Store` for read failures.
    async fn load_latest(&self, model_ref: &ModelRef) -> Result<Option<VerificationResult>>;

    /// List every `ModelRef` the store has ever seen a result for.
    ///
    /// # Errors
    /// - `Error::Store` for read failures.
    async fn list_models(&self) -> Result<Vec<ModelRef>>;
}
