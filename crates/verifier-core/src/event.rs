//! `EventEmitter`: fire-and-forget notification of run lifecycle events.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    RunStarted { run_id: String, provider_count: usize },
    ProviderUnreachable { run_id: String, provider: String, reason: String },
    RunCompleted { run_id: String, model_count: usize, cancelled: bool },
}

#[async_trait]
pub trait EventEmitter: Send + Sync {
    /// Publish an event. Failures are logged by the implementation and must
    /// never abort the run that produced them.
    async fn publish(&self, event: Event) -> Result<()>;
}
