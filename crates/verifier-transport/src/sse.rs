//! Server-sent-event frame counting for streaming probes.
//!
//! A `Streaming` probe only needs to know whether frames arrived and how
//! many, not their content — so this module drains the event-source stream
//! into a count rather than collecting `ParsedStreamData` the way the
//! teacher's `async_stream_parser` does for passthrough metrics. We still
//! lean on `eventsource_stream::EventStream` to turn the raw byte stream
//! into SSE frames.

use eventsource_stream::Eventsource;
use futures::StreamExt;
use std::time::{Duration, Instant};

use crate::error::{Result, TransportError};

/// Outcome of draining a streamed response.
#[derive(Debug, Clone)]
pub struct StreamOutcome {
    pub frames_observed: usize,
    pub elapsed: Duration,
    /// Set when the stream ended before a frame carrying `[DONE]` or a
    /// terminal `stop`/`finish_reason` arrived — a mid-stream disconnect.
    pub disconnected_early: bool,
}

/// Drain an SSE body, counting frames until completion, a deadline, or a
/// `[DONE]` sentinel.
///
/// Per SPEC_FULL.md's resolution of the mid-stream-disconnect Open Question:
/// a disconnect after `min_frames_for_pass` frames have already arrived is
/// not itself a failure — the caller's success predicate decides pass/fail,
/// this just reports what was observed.
pub async fn drain_sse_stream(
    response: reqwest::Response,
    deadline: Duration,
) -> Result<StreamOutcome> {
    let started = Instant::now();
    let mut stream = response.bytes_stream().eventsource();
    let mut frames_observed = 0usize;
    let mut disconnected_early = true;

    loop {
        if started.elapsed() >= deadline {
            return Err(TransportError::Timeout(deadline));
        }
        let next = tokio::time::timeout(
            deadline.saturating_sub(started.elapsed()),
            stream.next(),
        )
        .await
        .map_err(|_| TransportError::Timeout(deadline))?;

        match next {
            Some(Ok(event)) => {
                frames_observed += 1;
                if event.data.trim() == "[DONE]" {
                    disconnected_early = false;
                    break;
                }
                if is_terminal_frame(&event.data) {
                    disconnected_early = false;
                    break;
                }
            }
            Some(Err(err)) => {
                return Err(TransportError::BadResponse(err.to_string()));
            }
            None => break,
        }
    }

    Ok(StreamOutcome {
        frames_observed,
        elapsed: started.elapsed(),
        disconnected_early,
    })
}

fn is_terminal_frame(data: &str) -> bool {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(data) else {
        return false;
    };
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("finish_reason"))
        .map(|reason| !reason.is_null())
        .unwrap_or(false)
}
