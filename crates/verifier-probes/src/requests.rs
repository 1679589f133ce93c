//! Request bodies for each probe in the registry.
//!
//! Every builder takes only the `model_id` being probed — probes are
//! deliberately stateless beyond that, so the same `Probe` value runs
//! against every model a provider advertises.

use serde_json::{json, Value};

const TINY_WAV_BASE64: &str = "UklGRiQAAABXQVZFZm10IBAAAAABAAEAQB8AAEAfAAABAAgAZGF0YQAAAAA=";

pub fn exists_chat(model_id: &str) -> Value {
    json!({
        "model": model_id,
        "messages": [{"role": "user", "content": "ping"}],
        "max_tokens": 1,
    })
}

pub fn responsive_chat(model_id: &str) -> Value {
    json!({
        "model": model_id,
        "messages": [{"role": "user", "content": "Say the word 'ack' and nothing else."}],
        "max_tokens": 16,
    })
}

pub fn streaming_chat(model_id: &str) -> Value {
    json!({
        "model": model_id,
        "messages": [{"role": "user", "content": "Count from one to five."}],
        "max_tokens": 64,
    })
}

pub fn tool_use_chat(model_id: &str) -> Value {
    json!({
        "model": model_id,
        "messages": [{"role": "user", "content": "What is the weather in Boston? Use the tool."}],
        "tools": [{
            "type": "function",
            "function": {
                "name": "get_weather",
                "description": "Get the current weather for a location",
                "parameters": {
                    "type": "object",
                    "properties": {"location": {"type": "string"}},
                    "required": ["location"],
                },
            },
        }],
        "tool_choice": "required",
        "max_tokens": 128,
    })
}

pub fn parallel_tool_use_chat(model_id: &str) -> Value {
    json!({
        "model": model_id,
        "messages": [{
            "role": "user",
            "content": "What is the weather in Boston and in Tokyo? Call the tool once per city.",
        }],
        "tools": [{
            "type": "function",
            "function": {
                "name": "get_weather",
                "description": "Get the current weather for a location",
                "parameters": {
                    "type": "object",
                    "properties": {"location": {"type": "string"}},
                    "required": ["location"],
                },
            },
        }],
        "tool_choice": "required",
        "max_tokens": 256,
    })
}

pub fn json_mode_chat(model_id: &str) -> Value {
    json!({
        "model": model_id,
        "messages": [{
            "role": "user",
            "content": "Return a JSON object with a single key \"ok\" set to true.",
        }],
        "response_format": {"type": "json_object"},
        "max_tokens": 64,
    })
}

pub fn structured_output_chat(model_id: &str) -> Value {
    json!({
        "model": model_id,
        "messages": [{
            "role": "user",
            "content": "Describe a person named Ada, age 36.",
        }],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": "person",
                "schema": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "age": {"type": "integer"},
                    },
                    "required": ["name", "age"],
                    "additionalProperties": false,
                },
            },
        },
        "max_tokens": 128,
    })
}

pub fn embeddings(model_id: &str) -> Value {
    json!({
        "model": model_id,
        "input": "the quick brown fox jumps over the lazy dog",
    })
}

pub fn reranking(model_id: &str) -> Value {
    json!({
        "model": model_id,
        "query": "what is the capital of France?",
        "documents": ["Paris is the capital of France.", "Berlin is the capital of Germany."],
    })
}

pub fn moderation(model_id: &str) -> Value {
    json!({
        "model": model_id,
        "input": "I want to bake a cake this weekend.",
    })
}

pub fn vision_chat(model_id: &str) -> Value {
    json!({
        "model": model_id,
        "messages": [{
            "role": "user",
            "content": [
                {"type": "text", "text": "What color is the square in this image? Answer in one word."},
                {"type": "image_url", "image_url": {"url": "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNk+A8AAQUBAScY42YAAAAASUVORK5CYII="}},
            ],
        }],
        "max_tokens": 32,
    })
}

pub fn audio_transcription(model_id: &str) -> Value {
    json!({
        "model": model_id,
        "file": TINY_WAV_BASE64,
        "response_format": "json",
    })
}

pub fn image_generation(model_id: &str) -> Value {
    json!({
        "model": model_id,
        "prompt": "a single red circle on a white background",
        "n": 1,
        "size": "256x256",
    })
}

pub fn reasoning_chat(model_id: &str) -> Value {
    json!({
        "model": model_id,
        "messages": [{
            "role": "user",
            "content": "If a train travels 60 miles in 1.5 hours, then 40 miles in 0.5 hours, \
                what is its average speed in miles per hour over the whole trip? \
                Reply with only the final number.",
        }],
        "max_tokens": 256,
    })
}

pub fn code_capability_chat(model_id: &str, language: &str, task: &str) -> Value {
    json!({
        "model": model_id,
        "messages": [{
            "role": "user",
            "content": format!(
                "Write a {language} function that {task}. \
                Reply with only a single fenced code block, no prose.",
            ),
        }],
        "max_tokens": 512,
    })
}

pub fn batch_submit(model_id: &str) -> Value {
    json!({
        "model": model_id,
        "endpoint": "/v1/chat/completions",
        "completion_window": "24h",
    })
}
