//! Pricing detection: a complementary pass over list-model response bodies.
//!
//! Per spec.md §4.3, this only reads a `pricing` sub-object already present
//! on the body — it never calls out to a separate pricing endpoint, and it
//! never infers pricing when the field is absent. The ConfigSource is
//! responsible for normalizing whatever unit a provider reports into
//! USD/1K input tokens before a `ProviderSpec` reaches the engine; this
//! pass just extracts what's already there.

use verifier_core::quota::Pricing;

/// Look up one model's `pricing` sub-object within a `/models` list body.
pub fn detect_pricing(list_models_body: &serde_json::Value, model_id: &str) -> Option<Pricing> {
    let entries = list_models_body.get("data")?.as_array()?;
    let entry = entries
        .iter()
        .find(|entry| entry.get("id").and_then(|id| id.as_str()) == Some(model_id))?;
    let pricing = entry.get("pricing")?;

    let input_usd_per_1k = pricing.get("input_usd_per_1k")?.as_f64()?;
    let output_usd_per_1k = pricing.get("output_usd_per_1k").and_then(|v| v.as_f64());

    Some(Pricing {
        input_usd_per_1k,
        output_usd_per_1k,
    })
}
