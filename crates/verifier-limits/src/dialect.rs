//! Dialect recognition: turns a response's headers into a candidate
//! `QuotaState`, per spec.md §4.3's priority-ordered rules.

use std::time::Duration;

use chrono::{DateTime, Utc};
use verifier_core::quota::{QuotaState, SourceDialect};
use verifier_transport::headers::Headers;

/// Inspect a response's headers and build the freshest `QuotaState` they
/// describe, or `None` if no recognized dialect's headers are present.
pub fn detect(headers: &Headers, now: DateTime<Utc>) -> Option<QuotaState> {
    if has_prefix(headers, "anthropic-ratelimit-") {
        return Some(detect_anthropic(headers, now));
    }
    if has_openai_shape(headers) {
        return Some(detect_openai(headers, now));
    }
    if has_prefix(headers, "x-rate-limit-") {
        return Some(detect_generic(headers, now));
    }
    None
}

fn has_prefix(headers: &Headers, prefix: &str) -> bool {
    headers.iter().any(|(name, _)| name.starts_with(prefix))
}

fn has_openai_shape(headers: &Headers) -> bool {
    headers.iter().any(|(name, _)| {
        name.starts_with("x-ratelimit-") && (name.ends_with("-requests") || name.ends_with("-tokens"))
    })
}

fn detect_anthropic(headers: &Headers, now: DateTime<Utc>) -> QuotaState {
    QuotaState {
        requests_per_window: parse_u64(headers, "anthropic-ratelimit-requests-limit"),
        tokens_per_window: parse_u64(headers, "anthropic-ratelimit-tokens-limit"),
        window_size: None,
        remaining_requests: parse_u64(headers, "anthropic-ratelimit-requests-remaining"),
        remaining_tokens: parse_u64(headers, "anthropic-ratelimit-tokens-remaining"),
        reset_at: parse_rfc3339(headers, "anthropic-ratelimit-requests-reset")
            .or_else(|| parse_rfc3339(headers, "anthropic-ratelimit-tokens-reset"))
            .unwrap_or(now),
        source_dialect: SourceDialect::Anthropic,
    }
}

fn detect_openai(headers: &Headers, now: DateTime<Utc>) -> QuotaState {
    let reset_requests = parse_go_duration(headers, "x-ratelimit-reset-requests");
    let reset_tokens = parse_go_duration(headers, "x-ratelimit-reset-tokens");
    let window = reset_requests.or(reset_tokens);
    let reset_at = window.map(|d| now + d).unwrap_or(now);

    QuotaState {
        requests_per_window: parse_u64(headers, "x-ratelimit-limit-requests"),
        tokens_per_window: parse_u64(headers, "x-ratelimit-limit-tokens"),
        window_size: window,
        remaining_requests: parse_u64(headers, "x-ratelimit-remaining-requests"),
        remaining_tokens: parse_u64(headers, "x-ratelimit-remaining-tokens"),
        reset_at,
        source_dialect: SourceDialect::OpenAi,
    }
}

fn detect_generic(headers: &Headers, now: DateTime<Utc>) -> QuotaState {
    let reset_at = headers
        .get("x-rate-limit-reset")
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|epoch| DateTime::<Utc>::from_timestamp(epoch, 0))
        .unwrap_or(now);

    QuotaState {
        requests_per_window: parse_u64(headers, "x-rate-limit-limit"),
        tokens_per_window: None,
        window_size: None,
        remaining_requests: parse_u64(headers, "x-rate-limit-remaining"),
        remaining_tokens: None,
        reset_at,
        source_dialect: SourceDialect::Generic,
    }
}

fn parse_u64(headers: &Headers, name: &str) -> Option<u64> {
    headers.get(name).and_then(|v| v.trim().parse().ok())
}

fn parse_rfc3339(headers: &Headers, name: &str) -> Option<DateTime<Utc>> {
    headers
        .get(name)
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses OpenAI's Go-`time.Duration`-style reset headers: sequences of
/// `<number><unit>` pairs such as `"1s"`, `"6m0s"`, `"250ms"`.
fn parse_go_duration(headers: &Headers, name: &str) -> Option<Duration> {
    let raw = headers.get(name)?;
    let mut total = Duration::ZERO;
    let mut chars = raw.char_indices().peekable();
    let mut number_start = 0usize;

    while let Some(&(idx, c)) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            chars.next();
            continue;
        }
        if idx == number_start {
            return None;
        }
        let number: f64 = raw[number_start..idx].parse().ok()?;
        let unit_start = idx;
        while let Some(&(_, uc)) = chars.peek() {
            if uc.is_ascii_digit() || uc == '.' {
                break;
            }
            chars.next();
        }
        let unit_end = chars.peek().map(|&(i, _)| i).unwrap_or(raw.len());
        let unit = &raw[unit_start..unit_end];
        total += match unit {
            "ms" => Duration::from_secs_f64(number / 1000.0),
            "s" => Duration::from_secs_f64(number),
            "m" => Duration::from_secs_f64(number * 60.0),
            "h" => Duration::from_secs_f64(number * 3600.0),
            _ => return None,
        };
        number_start = unit_end;
    }

    if total.is_zero() && raw.trim() != "0s" && raw.trim() != "0" {
        None
    } else {
        Some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;

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
    fn anthropic_prefix_wins_priority() {
        let h = headers(&[
            ("anthropic-ratelimit-requests-limit", "50"),
            ("x-ratelimit-limit-requests", "100"),
        ]);
        let state = detect(&h, Utc::now()).unwrap();
        assert_eq!(state.source_dialect, SourceDialect::Anthropic);
        assert_eq!(state.requests_per_window, Some(50));
    }

    #[test]
    fn openai_shape_requires_requests_or_tokens_suffix() {
        let h = headers(&[
            ("x-ratelimit-limit-requests", "100"),
            ("x-ratelimit-remaining-requests", "99"),
            ("x-ratelimit-reset-requests", "6m0s"),
        ]);
        let state = detect(&h, Utc::now()).unwrap();
        assert_eq!(state.source_dialect, SourceDialect::OpenAi);
        assert_eq!(state.remaining_requests, Some(99));
        assert_eq!(state.window_size, Some(Duration::from_secs(360)));
    }

    #[test]
    fn generic_dialect_is_lowest_priority() {
        let h = headers(&[("x-rate-limit-limit", "10"), ("x-rate-limit-remaining", "5")]);
        let state = detect(&h, Utc::now()).unwrap();
        assert_eq!(state.source_dialect, SourceDialect::Generic);
    }

    #[test]
    fn no_recognized_headers_yields_none() {
        let h = headers(&[("content-type", "application/json")]);
        assert!(detect(&h, Utc::now()).is_none());
    }

    #[test]
    fn go_duration_parses_minutes_and_seconds() {
        assert_eq!(
            parse_go_duration(&headers(&[("x-ratelimit-reset-requests", "1m30s")]), "x-ratelimit-reset-requests"),
            Some(Duration::from_secs(90))
        );
        assert_eq!(
            parse_go_duration(&headers(&[("x-ratelimit-reset-requests", "250ms")]), "x-ratelimit-reset-requests"),
            Some(Duration::from_millis(250))
        );
    }
}
