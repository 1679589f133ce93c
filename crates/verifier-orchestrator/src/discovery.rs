//! Model discovery: resolving a `ProviderSpec` into the concrete model ids
//! the run will probe.
//!
//! An explicit `model_allow_list` skips the network call entirely;
//! otherwise the `/models` endpoint is queried and every returned id is
//! accepted, subject to `model_exclude_patterns`. A failed list-models
//! call marks the provider unreachable without aborting the run — log
//! and continue toward a single misbehaving upstream, not a hard stop.

use verifier_core::plan::{ProviderSpec, Timeouts};
use verifier_transport::client::TransportConfig;
use verifier_transport::openai::HttpTransport;

/// One provider's resolved model list, or the reason it could not be resolved.
pub enum DiscoveryOutcome {
    Reachable {
        model_ids: Vec<String>,
        list_models_body: Option<serde_json::Value>,
    },
    Unreachable {
        reason: String,
    },
}

pub async fn discover(
    provider: &ProviderSpec,
    timeouts: &Timeouts,
    exclude_patterns: &[String],
) -> DiscoveryOutcome {
    if !provider.model_allow_list.is_empty() {
        let model_ids = provider
            .model_allow_list
            .iter()
            .filter(|id| !matches_any(id, exclude_patterns))
            .cloned()
            .collect();
        return DiscoveryOutcome::Reachable {
            model_ids,
            list_models_body: None,
        };
    }

    let config = TransportConfig {
        request_timeout: timeouts.request,
        connect_timeout: timeouts.connect,
        ..TransportConfig::default()
    };
    let headers = provider
        .headers
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let transport = match HttpTransport::new(&provider.base_url, provider.credential.expose(), headers, &config) {
        Ok(t) => t,
        Err(err) => return DiscoveryOutcome::Unreachable { reason: err.to_string() },
    };

    match transport.list_models().await {
        Ok(response) => {
            let model_ids = extract_model_ids(&response.body)
                .into_iter()
                .filter(|id| !matches_any(id, exclude_patterns))
                .collect();
            DiscoveryOutcome::Reachable {
                model_ids,
                list_models_body: Some(response.body),
            }
        }
        Err(err) => DiscoveryOutcome::Unreachable { reason: err.to_string() },
    }
}

fn extract_model_ids(body: &serde_json::Value) -> Vec<String> {
    body.get("data")
        .and_then(|data| data.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("id").and_then(|id| id.as_str()).map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

fn matches_any(id: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| glob_match(pattern, id))
}

/// Single-wildcard glob match (`*` only) — the only syntax
/// `model_exclude_patterns` needs per spec.md §4.8.
fn glob_match(pattern: &str, text: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == text;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let mut pos = 0usize;
    let last = parts.len() - 1;

    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            if i == last {
                return true;
            }
            continue;
        }
        if i == 0 {
            if !text[pos..].starts_with(part) {
                return false;
            }
            pos += part.len();
        } else if i == last {
            return text[pos..].ends_with(part);
        } else {
            match text[pos..].find(part) {
                Some(idx) => pos += idx + part.len(),
                None => return false,
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_with_no_wildcard_requires_exact_match() {
        assert!(glob_match("gpt-4", "gpt-4"));
        assert!(!glob_match("gpt-4", "gpt-4-mini"));
    }

    #[test]
    fn glob_suffix_wildcard_matches_prefix() {
        assert!(glob_match("gpt-4*", "gpt-4-mini"));
        assert!(!glob_match("gpt-4*", "claude-3"));
    }

    #[test]
    fn glob_prefix_wildcard_matches_suffix() {
        assert!(glob_match("*-preview", "gpt-4-preview"));
        assert!(!glob_match("*-preview", "gpt-4-stable"));
    }

    #[test]
    fn glob_both_sides_wildcard_matches_substring() {
        assert!(glob_match("*embedding*", "text-embedding-3-large"));
        assert!(!glob_match("*embedding*", "gpt-4"));
    }

    #[test]
    fn extract_model_ids_reads_data_array() {
        let body = serde_json::json!({"data": [{"id": "a"}, {"id": "b"}]});
        assert_eq!(extract_model_ids(&body), vec!["a".to_string(), "b".to_string()]);
    }
}
