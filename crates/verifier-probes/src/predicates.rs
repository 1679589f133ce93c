//! Pure success predicates. Each takes only a `ProbeResponse` and returns
//! the same `PredicateResult` for the same input every time — no network,
//! no clock, no RNG.

use verifier_core::probe::{PredicateResult, ProbeResponse};

fn assistant_text(body: &serde_json::Value) -> Option<&str> {
    body.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
}

fn tool_calls(body: &serde_json::Value) -> Vec<&serde_json::Value> {
    body.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("tool_calls"))
        .and_then(|calls| calls.as_array())
        .map(|calls| calls.iter().collect())
        .unwrap_or_default()
}

pub fn exists(response: &ProbeResponse) -> PredicateResult {
    if response.status == 200 && !response.parse_failed {
        PredicateResult::pass()
    } else {
        PredicateResult::fail()
    }
}

pub fn responsive(response: &ProbeResponse) -> PredicateResult {
    if response.status != 200 {
        return PredicateResult::fail();
    }
    match assistant_text(&response.body) {
        Some(text) if !text.trim().is_empty() => PredicateResult::pass(),
        _ => PredicateResult::fail(),
    }
}

pub fn streaming(response: &ProbeResponse) -> PredicateResult {
    if response.status == 200 && response.stream_frames_observed >= 2 {
        PredicateResult::pass_with(format!("{} frames observed", response.stream_frames_observed))
    } else {
        PredicateResult::fail()
    }
}

pub fn tool_use(response: &ProbeResponse) -> PredicateResult {
    if response.status != 200 {
        return PredicateResult::fail();
    }
    let calls = tool_calls(&response.body);
    let matched = calls.iter().any(|call| {
        call.get("function")
            .and_then(|f| f.get("name"))
            .and_then(|n| n.as_str())
            == Some("get_weather")
    });
    if matched {
        PredicateResult::pass()
    } else {
        PredicateResult::fail()
    }
}

pub fn parallel_tool_use(response: &ProbeResponse) -> PredicateResult {
    if response.status != 200 {
        return PredicateResult::fail();
    }
    let calls = tool_calls(&response.body);
    if calls.len() >= 2 {
        PredicateResult::pass_with(format!("{} tool calls", calls.len()))
    } else {
        PredicateResult::fail()
    }
}

pub fn json_mode(response: &ProbeResponse) -> PredicateResult {
    if response.status != 200 {
        return PredicateResult::fail();
    }
    match assistant_text(&response.body) {
        Some(text) => match serde_json::from_str::<serde_json::Value>(text) {
            Ok(serde_json::Value::Object(_)) => PredicateResult::pass(),
            _ => PredicateResult::fail(),
        },
        None => PredicateResult::fail(),
    }
}

pub fn structured_output(response: &ProbeResponse) -> PredicateResult {
    if response.status != 200 {
        return PredicateResult::fail();
    }
    let Some(text) = assistant_text(&response.body) else {
        return PredicateResult::fail();
    };
    let Ok(serde_json::Value::Object(obj)) = serde_json::from_str::<serde_json::Value>(text) else {
        return PredicateResult::fail();
    };
    if obj.contains_key("name") && obj.contains_key("age") {
        PredicateResult::pass()
    } else {
        PredicateResult::fail()
    }
}

pub fn embeddings(response: &ProbeResponse) -> PredicateResult {
    if response.status != 200 {
        return PredicateResult::fail();
    }
    let dims = response
        .body
        .get("data")
        .and_then(|d| d.as_array())
        .and_then(|items| items.first())
        .and_then(|item| item.get("embedding"))
        .and_then(|v| v.as_array())
        .map(|v| v.len())
        .unwrap_or(0);
    if dims > 0 {
        PredicateResult::pass_with(format!("{dims} dimensions"))
    } else {
        PredicateResult::fail()
    }
}

pub fn reranking(response: &ProbeResponse) -> PredicateResult {
    if response.status != 200 {
        return PredicateResult::fail();
    }
    let has_results = response
        .body
        .get("results")
        .and_then(|r| r.as_array())
        .map(|r| !r.is_empty())
        .unwrap_or(false);
    if has_results {
        PredicateResult::pass()
    } else {
        PredicateResult::fail()
    }
}

pub fn moderation(response: &ProbeResponse) -> PredicateResult {
    if response.status != 200 {
        return PredicateResult::fail();
    }
    let has_categories = response
        .body
        .get("results")
        .and_then(|r| r.as_array())
        .and_then(|r| r.first())
        .and_then(|r| r.get("categories"))
        .map(|c| c.is_object())
        .unwrap_or(false);
    if has_categories {
        PredicateResult::pass()
    } else {
        PredicateResult::fail()
    }
}

pub fn vision(response: &ProbeResponse) -> PredicateResult {
    if response.status != 200 {
        return PredicateResult::fail();
    }
    match assistant_text(&response.body) {
        Some(text) if !text.trim().is_empty() => PredicateResult::pass(),
        _ => PredicateResult::fail(),
    }
}

pub fn audio_transcription(response: &ProbeResponse) -> PredicateResult {
    if response.status != 200 {
        return PredicateResult::fail();
    }
    let text = response.body.get("text").and_then(|t| t.as_str());
    match text {
        Some(t) if !t.trim().is_empty() => PredicateResult::pass(),
        _ => PredicateResult::fail(),
    }
}

pub fn image_generation(response: &ProbeResponse) -> PredicateResult {
    if response.status != 200 {
        return PredicateResult::fail();
    }
    let has_payload = response
        .body
        .get("data")
        .and_then(|d| d.as_array())
        .and_then(|items| items.first())
        .map(|item| item.get("url").is_some() || item.get("b64_json").is_some())
        .unwrap_or(false);
    if has_payload {
        PredicateResult::pass()
    } else {
        PredicateResult::fail()
    }
}

pub fn reasoning(response: &ProbeResponse) -> PredicateResult {
    if response.status != 200 {
        return PredicateResult::fail();
    }
    let Some(text) = assistant_text(&response.body) else {
        return PredicateResult::fail();
    };
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits == "50" {
        PredicateResult::pass()
    } else {
        PredicateResult::fail()
    }
}

/// Structural only: a fenced code block whose braces/brackets balance and
/// which contains a function- or class-like construct. Never judges
/// correctness, per spec.md §4.2.
pub fn code_capability(response: &ProbeResponse) -> PredicateResult {
    if response.status != 200 {
        return PredicateResult::fail();
    }
    let Some(text) = assistant_text(&response.body) else {
        return PredicateResult::fail();
    };
    let Some(code) = extract_fenced_code(text) else {
        return PredicateResult::fail();
    };
    if !braces_balanced(&code) {
        return PredicateResult::fail();
    }
    let looks_like_a_definition = ["fn ", "def ", "function ", "class ", "func "]
        .iter()
        .any(|kw| code.contains(kw));
    if looks_like_a_definition {
        PredicateResult::pass()
    } else {
        PredicateResult::fail()
    }
}

fn extract_fenced_code(text: &str) -> Option<String> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    let lang_line_end = after_fence.find('\n').unwrap_or(0);
    let body_start = lang_line_end + 1;
    let end = after_fence[body_start..].find("```")?;
    Some(after_fence[body_start..body_start + end].to_string())
}

fn braces_balanced(code: &str) -> bool {
    let mut depth = 0i32;
    for c in code.chars() {
        match c {
            '{' | '(' | '[' => depth += 1,
            '}' | ')' | ']' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

pub fn batch(response: &ProbeResponse) -> PredicateResult {
    if response.status == 200 || response.status == 202 {
        let has_job_id = response.body.get("id").is_some();
        if has_job_id {
            return PredicateResult::pass();
        }
    }
    PredicateResult::fail()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn response(status: u16, body: serde_json::Value) -> ProbeResponse {
        ProbeResponse {
            status,
            body,
            stream_frames_observed: 0,
            elapsed: Duration::from_millis(10),
            parse_failed: false,
        }
    }

    #[test]
    fn code_capability_accepts_balanced_function() {
        let body = serde_json::json!({
            "choices": [{"message": {"content": "```python\ndef add(a, b):\n    return a + b\n```"}}]
        });
        assert_eq!(code_capability(&response(200, body)).verdict, verifier_core::probe::Verdict::Pass);
    }

    #[test]
    fn code_capability_rejects_unbalanced_braces() {
        let body = serde_json::json!({
            "choices": [{"message": {"content": "```js\nfunction f() { return 1;\n```"}}]
        });
        assert_eq!(code_capability(&response(200, body)).verdict, verifier_core::probe::Verdict::Fail);
    }

    #[test]
    fn tool_use_matches_on_function_name() {
        let body = serde_json::json!({
            "choices": [{"message": {"tool_calls": [{"function": {"name": "get_weather"}}]}}]
        });
        assert_eq!(tool_use(&response(200, body)).verdict, verifier_core::probe::Verdict::Pass);
    }

    #[test]
    fn parallel_tool_use_requires_two_calls() {
        let body = serde_json::json!({
            "choices": [{"message": {"tool_calls": [{"function": {"name": "get_weather"}}]}}]
        });
        assert_eq!(parallel_tool_use(&response(200, body)).verdict, verifier_core::probe::Verdict::Fail);
    }

    #[test]
    fn reasoning_exact_match_passes() {
        let body = serde_json::json!({"choices": [{"message": {"content": "50"}}]});
        assert_eq!(reasoning(&response(200, body)).verdict, verifier_core::probe::Verdict::Pass);
    }

    #[test]
    fn reasoning_wrong_answer_fails() {
        let body = serde_json::json!({"choices": [{"message": {"content": "52"}}]});
        assert_eq!(reasoning(&response(200, body)).verdict, verifier_core::probe::Verdict::Fail);
    }
}
