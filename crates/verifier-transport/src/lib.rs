//! Verifier Transport
//!
//! A typed client for the OpenAI-compatible surface the verification engine
//! probes: chat completions (sync + streamed), model listing, embeddings,
//! moderations, audio transcription, and image generation. Captures every
//! response header so `verifier-limits` can extract rate-limit signals.
//!
//! Retries are deliberately absent from this layer — they live in
//! `verifier-scheduler`, which is the only component allowed to decide
//! whether a failed send is worth repeating.

pub mod client;
pub mod error;
pub mod headers;
pub mod openai;
pub mod sse;

pub use error::{Result, TransportError};
pub use openai::{HttpTransport, TransportRequest, TransportResponse};
