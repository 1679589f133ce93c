//! Case-folded response header capture.
//!
//! The LimitsObserver needs the full header set off every response, so the
//! transport never filters or drops anything here — it just normalizes case
//! so dialect-matching logic never has to.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Headers(HashMap<String, String>);

impl Headers {
    pub fn from_reqwest(map: &reqwest::header::HeaderMap) -> Self {
        let mut inner = HashMap::with_capacity(map.len());
        for (name, value) in map.iter() {
            if let Ok(value) = value.to_str() {
                inner.insert(name.as_str().to_ascii_lowercase(), value.to_string());
            }
        }
        Self(inner)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// A short, order-independent digest used as `ProbeOutcome::observed_headers_digest`.
    pub fn digest(&self) -> String {
        let mut keys: Vec<&str> = self.0.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        use std::hash::{Hash, Hasher};
        for key in keys {
            key.hash(&mut hasher);
            self.0[key].hash(&mut hasher);
        }
        format!("{:016x}", hasher.finish())
    }

    /// Seconds until retry, read off `retry-after` in either of its two
    /// legal forms: a bare integer, or an RFC 7231 HTTP-date. A date already
    /// in the past collapses to zero rather than `None` — the provider is
    /// still telling us to wait, just for no time at all.
    pub fn retry_after_seconds(&self) -> Option<u64> {
        let raw = self.get("retry-after")?.trim();
        if let Ok(seconds) = raw.parse::<u64>() {
            return Some(seconds);
        }
        let target = chrono::DateTime::parse_from_rfc2822(raw).ok()?;
        let remaining = target.signed_duration_since(chrono::Utc::now()).num_seconds();
        Some(remaining.max(0) as u64)
    }
}
