//! Shared HTTP client construction.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::error::{Result, TransportError};

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout. Independent of any per-model deadline the
    /// Scheduler enforces — see spec.md §5.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 32,
            user_agent: format!("verifier/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Build a pooled, rustls-backed client.
///
/// `pool_idle_timeout` is set below the ~60-120s window most
/// OpenAI-compatible providers use to close idle connections server-side;
/// without it, the pool hands back connections the server already dropped
/// and every probe after the first one on that host times out.
pub fn create_client(config: &TransportConfig) -> Result<Client> {
    ClientBuilder::new()
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(&config.user_agent)
        .use_rustls_tls()
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .map_err(TransportError::Transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_bounds() {
        let config = TransportConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.pool_max_idle_per_host, 32);
        assert!(config.user_agent.starts_with("verifier/"));
    }

    #[test]
    fn create_client_succeeds_with_default_config() {
        let config = TransportConfig::default();
        assert!(create_client(&config).is_ok());
    }
}
