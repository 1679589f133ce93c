//! Typed client for the OpenAI-compatible surface a probed provider exposes.
//!
//! One `HttpTransport` per `ProviderSpec`. Every method returns the raw
//! status, body, and captured headers — `verifier-probes` decides what a
//! given response means, and `verifier-limits` reads the headers off
//! `TransportResponse::headers`. This module never inspects payload
//! semantics beyond what is needed to route the request (e.g. whether a
//! chat request asked for `stream: true`).

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;

use crate::client::{create_client, TransportConfig};
use crate::error::{Result, TransportError};
use crate::headers::Headers;
use crate::sse::{drain_sse_stream, StreamOutcome};

/// A request aimed at one endpoint of a provider's surface.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: reqwest::Method,
    pub path: String,
    pub body: Option<Value>,
    pub extra_headers: Vec<(String, String)>,
}

impl TransportRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: reqwest::Method::GET,
            path: path.into(),
            body: None,
            extra_headers: Vec::new(),
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: reqwest::Method::POST,
            path: path.into(),
            body: Some(body),
            extra_headers: Vec::new(),
        }
    }
}

/// A completed, non-streamed exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
    pub headers: Headers,
    pub elapsed: Duration,
}

/// The result of sending a request whose body requested `stream: true`.
#[derive(Debug, Clone)]
pub struct TransportStreamResponse {
    pub status: u16,
    pub headers: Headers,
    pub stream_outcome: StreamOutcome,
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
    credential: String,
    default_headers: Vec<(String, String)>,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        credential: impl Into<String>,
        default_headers: Vec<(String, String)>,
        config: &TransportConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            base_url: base_url.into(),
            credential: credential.into(),
            default_headers,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn build(&self, request: &TransportRequest) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path))
            .bearer_auth(&self.credential);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        for (name, value) in &request.extra_headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        builder
    }

    fn map_error_status(status: u16, body: &str) -> TransportError {
        match status {
            401 => TransportError::Unauthorized(body.to_string()),
            403 => TransportError::Forbidden(body.to_string()),
            404 => TransportError::NotFound(body.to_string()),
            429 => TransportError::RateLimited {
                retry_after_secs: None,
            },
            500..=599 => TransportError::Server(status),
            _ => TransportError::BadResponse(format!("unexpected status {status}: {body}")),
        }
    }

    /// Send a request and collect the full body. Used for every endpoint
    /// except a chat-completions call with `stream: true`.
    pub async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let started = Instant::now();
        let response = self
            .build(&request)
            .send()
            .await
            .map_err(TransportError::Transport)?;

        let status = response.status().as_u16();
        let headers = Headers::from_reqwest(response.headers());
        let retry_after = headers.retry_after_seconds();
        let text = response.text().await.map_err(TransportError::Transport)?;

        if !(200..300).contains(&status) {
            return Err(if status == 429 {
                TransportError::RateLimited {
                    retry_after_secs: retry_after,
                }
            } else {
                Self::map_error_status(status, &text)
            });
        }

        let body = serde_json::from_str(&text)
            .map_err(|err| TransportError::BadResponse(err.to_string()))?;

        Ok(TransportResponse {
            status,
            body,
            headers,
            elapsed: started.elapsed(),
        })
    }

    /// Send a request whose body requested `stream: true` and drain the SSE
    /// body, counting frames rather than collecting content.
    pub async fn send_stream(
        &self,
        request: TransportRequest,
        deadline: Duration,
    ) -> Result<TransportStreamResponse> {
        let response = self
            .build(&request)
            .send()
            .await
            .map_err(TransportError::Transport)?;

        let status = response.status().as_u16();
        let headers = Headers::from_reqwest(response.headers());

        if !(200..300).contains(&status) {
            let retry_after = headers.retry_after_seconds();
            let text = response.text().await.unwrap_or_default();
            return Err(if status == 429 {
                TransportError::RateLimited {
                    retry_after_secs: retry_after,
                }
            } else {
                Self::map_error_status(status, &text)
            });
        }

        let stream_outcome = drain_sse_stream(response, deadline).await?;

        Ok(TransportStreamResponse {
            status,
            headers,
            stream_outcome,
        })
    }

    pub async fn list_models(&self) -> Result<TransportResponse> {
        self.send(TransportRequest::get("/models")).await
    }

    pub async fn chat_completions(&self, body: Value) -> Result<TransportResponse> {
        self.send(TransportRequest::post("/chat/completions", body))
            .await
    }

    pub async fn chat_completions_stream(
        &self,
        mut body: Value,
        deadline: Duration,
    ) -> Result<TransportStreamResponse> {
        if let Value::Object(map) = &mut body {
            map.insert("stream".to_string(), Value::Bool(true));
        }
        self.send_stream(TransportRequest::post("/chat/completions", body), deadline)
            .await
    }

    pub async fn embeddings(&self, body: Value) -> Result<TransportResponse> {
        self.send(TransportRequest::post("/embeddings", body)).await
    }

    pub async fn moderations(&self, body: Value) -> Result<TransportResponse> {
        self.send(TransportRequest::post("/moderations", body)).await
    }

    pub async fn image_generations(&self, body: Value) -> Result<TransportResponse> {
        self.send(TransportRequest::post("/images/generations", body))
            .await
    }

    pub async fn audio_transcriptions(&self, body: Value) -> Result<TransportResponse> {
        self.send(TransportRequest::post("/audio/transcriptions", body))
            .await
    }
}
