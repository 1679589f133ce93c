//! Verifier Core Types and Traits
//!
//! Shared data model and collaborator contracts for the capability
//! verification engine:
//!
//! - [`plan`]: `RunPlan` and the configuration it carries
//! - [`model`]: `ModelRef`, the stable identity of one model on one provider
//! - [`probe`]: `Probe`, `ProbeOutcome`, `CapabilityVector`
//! - [`quota`]: `QuotaState`, pricing
//! - [`result`]: `VerificationResult` and its component records
//! - [`config_source`], [`result_store`], [`event`]: contracts for the
//!   collaborators the core depends on but does not implement

pub mod config_source;
pub mod error;
pub mod event;
pub mod model;
pub mod plan;
pub mod probe;
pub mod quota;
pub mod result;
pub mod result_store;

pub use config_source::ConfigSource;
pub use error::{Error, Result};
pub use event::{Event, EventEmitter};
pub use model::ModelRef;
pub use plan::RunPlan;
pub use result_store::ResultStore;
