//! Run-scoped registry of the freshest `QuotaState` per provider.
//!
//! Keyed by provider name in a `DashMap` rather than behind a single
//! `Mutex<HashMap<_>>`, so many workers can record observations for
//! different providers with no contention.

use chrono::Utc;
use dashmap::DashMap;
use verifier_core::quota::QuotaState;
use verifier_transport::headers::Headers;

use crate::dialect;

#[derive(Debug, Default)]
pub struct LimitsObserver {
    state: DashMap<String, QuotaState>,
}

impl LimitsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one response's headers for `provider`. A no-op if no
    /// recognized rate-limit dialect is present.
    pub fn observe(&self, provider: &str, headers: &Headers) {
        let Some(candidate) = dialect::detect(headers, Utc::now()) else {
            return;
        };
        self.merge(provider, candidate);
    }

    fn merge(&self, provider: &str, candidate: QuotaState) {
        match self.state.get(provider) {
            None => {
                drop(self.state.insert(provider.to_string(), candidate));
            }
            Some(existing) => {
                let should_replace =
                    candidate.reset_at >= existing.reset_at || candidate.window_size != existing.window_size;
                drop(existing);
                if should_replace {
                    self.state.insert(provider.to_string(), candidate);
                }
            }
        }
    }

    pub fn get(&self, provider: &str) -> Option<QuotaState> {
        self.state.get(provider).map(|entry| entry.clone())
    }

    pub fn providers(&self) -> Vec<String> {
        self.state.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;
    use std::time::Duration;
    use verifier_core::quota::SourceDialect;

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                reqwest::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                value.parse().unwrap(),
            );
        }
        Headers::from_reqwest(&map)
    }

    #[test]
    fn observe_is_a_no_op_without_recognized_headers() {
        let observer = LimitsObserver::new();
        observer.observe("openai", &headers(&[("content-type", "application/json")]));
        assert!(observer.get("openai").is_none());
    }

    #[test]
    fn later_reset_at_replaces_stored_state() {
        let observer = LimitsObserver::new();
        observer.observe(
            "openai",
            &headers(&[
                ("x-ratelimit-limit-requests", "100"),
                ("x-ratelimit-remaining-requests", "50"),
                ("x-ratelimit-reset-requests", "10s"),
            ]),
        );
        observer.observe(
            "openai",
            &headers(&[
                ("x-ratelimit-limit-requests", "100"),
                ("x-ratelimit-remaining-requests", "40"),
                ("x-ratelimit-reset-requests", "20s"),
            ]),
        );
        let state = observer.get("openai").unwrap();
        assert_eq!(state.remaining_requests, Some(40));
        assert_eq!(state.source_dialect, SourceDialect::OpenAi);
    }

    #[test]
    fn observation_with_earlier_reset_at_and_unchanged_window_is_dropped() {
        use verifier_core::quota::SourceDialect as Dialect;

        let observer = LimitsObserver::new();
        let now = Utc::now();
        let window = Duration::from_secs(20);

        observer.merge(
            "openai",
            QuotaState {
                requests_per_window: Some(100),
                tokens_per_window: None,
                window_size: Some(window),
                remaining_requests: Some(40),
                remaining_tokens: None,
                reset_at: now + chrono::Duration::seconds(20),
                source_dialect: Dialect::OpenAi,
            },
        );
        observer.merge(
            "openai",
            QuotaState {
                requests_per_window: Some(100),
                tokens_per_window: None,
                window_size: Some(window),
                remaining_requests: Some(90),
                remaining_tokens: None,
                reset_at: now + chrono::Duration::seconds(10),
                source_dialect: Dialect::OpenAi,
            },
        );

        let state = observer.get("openai").unwrap();
        assert_eq!(
            state.remaining_requests,
            Some(40),
            "candidate with earlier reset_at and unchanged window must not replace the stored state"
        );
    }
}
