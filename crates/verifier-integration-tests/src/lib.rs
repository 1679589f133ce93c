//! End-to-end tests for the verification engine
//!
//! Each test in `tests/` drives `verifier_orchestrator::Orchestrator::verify`
//! against one or more `wiremock` servers standing in for OpenAI-compatible
//! providers. There is no production code in this crate — it exists purely
//! as an integration test harness exercising the other crates' public APIs
//! the way a real deployment would.
