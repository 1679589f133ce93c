//! The `ProbeTask` state machine and the work item type the Scheduler
//! consumes.
//!
//! `TaskState` follows the same atomic `#[repr(u8)]`/`From<u8>` idiom as
//! `circuit_breaker::CircuitState` — a task's state is observable from
//! outside the worker driving it (for progress reporting) without a lock.

use std::sync::atomic::{AtomicU8, Ordering};

use verifier_core::plan::ProviderSpec;
use verifier_core::probe::Probe;
use verifier_core::ModelRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskState {
    Queued = 0,
    Running = 1,
    Done = 2,
    Failed = 3,
    Cancelled = 4,
}

impl From<u8> for TaskState {
    fn from(value: u8) -> Self {
        match value {
            0 => TaskState::Queued,
            1 => TaskState::Running,
            2 => TaskState::Done,
            3 => TaskState::Failed,
            4 => TaskState::Cancelled,
            _ => TaskState::Queued,
        }
    }
}

#[derive(Debug)]
pub struct TaskStateCell(AtomicU8);

impl Default for TaskStateCell {
    fn default() -> Self {
        Self(AtomicU8::new(TaskState::Queued as u8))
    }
}

impl TaskStateCell {
    pub fn get(&self) -> TaskState {
        TaskState::from(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: TaskState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// One probe, against one model, on one provider — the Scheduler's unit of
/// work.
#[derive(Clone)]
pub struct ScheduledTask {
    pub provider: ProviderSpec,
    pub model_ref: ModelRef,
    pub probe: Probe,
}
