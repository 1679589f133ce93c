//! The closed probe registry: request bodies, success predicates, and the
//! deterministic ordering rule that gates a model's probe set on
//! `Exists`/`Responsive`.

pub mod predicates;
pub mod registry;
pub mod requests;

pub use registry::ProbeSet;
