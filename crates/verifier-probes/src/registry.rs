//! The closed probe registry.
//!
//! Every probe the engine knows how to run is declared here, once, as a
//! `const`. Nothing in the Scheduler or Orchestrator constructs a `Probe`
//! value dynamically — if a provider needs a new test, it is added to
//! this table, an enumerated, closed set of request-shape constants.

use std::time::Duration;

use verifier_core::probe::{CapabilityFlag, Probe, RequestKind};

use crate::{predicates, requests};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const STREAM_TIMEOUT: Duration = Duration::from_secs(45);

pub const EXISTS: Probe = Probe {
    id: "exists",
    tags: &["quick", "comprehensive"],
    request_kind: RequestKind::Chat,
    request_template: requests::exists_chat,
    timeout: DEFAULT_TIMEOUT,
    sets_capabilities: &[],
    contributes_to_dimensions: &["code_capability"],
    success_predicate: predicates::exists,
};

pub const RESPONSIVE: Probe = Probe {
    id: "responsive",
    tags: &["quick", "comprehensive"],
    request_kind: RequestKind::Chat,
    request_template: requests::responsive_chat,
    timeout: DEFAULT_TIMEOUT,
    sets_capabilities: &[],
    contributes_to_dimensions: &["responsiveness"],
    success_predicate: predicates::responsive,
};

pub const STREAMING: Probe = Probe {
    id: "streaming",
    tags: &["quick", "comprehensive"],
    request_kind: RequestKind::ChatStreaming,
    request_template: requests::streaming_chat,
    timeout: STREAM_TIMEOUT,
    sets_capabilities: &[CapabilityFlag::Streaming],
    contributes_to_dimensions: &["feature_richness"],
    success_predicate: predicates::streaming,
};

pub const TOOL_USE: Probe = Probe {
    id: "tool_use",
    tags: &["comprehensive"],
    request_kind: RequestKind::ChatWithTools,
    request_template: requests::tool_use_chat,
    timeout: DEFAULT_TIMEOUT,
    sets_capabilities: &[CapabilityFlag::ToolUse, CapabilityFlag::FunctionCalling],
    contributes_to_dimensions: &["feature_richness"],
    success_predicate: predicates::tool_use,
};

pub const PARALLEL_TOOL_USE: Probe = Probe {
    id: "parallel_tool_use",
    tags: &["comprehensive"],
    request_kind: RequestKind::ChatWithTools,
    request_template: requests::parallel_tool_use_chat,
    timeout: DEFAULT_TIMEOUT,
    sets_capabilities: &[CapabilityFlag::ParallelToolUse],
    contributes_to_dimensions: &["feature_richness"],
    success_predicate: predicates::parallel_tool_use,
};

pub const JSON_MODE: Probe = Probe {
    id: "json_mode",
    tags: &["comprehensive"],
    request_kind: RequestKind::ChatJsonMode,
    request_template: requests::json_mode_chat,
    timeout: DEFAULT_TIMEOUT,
    sets_capabilities: &[CapabilityFlag::JsonMode],
    contributes_to_dimensions: &["feature_richness"],
    success_predicate: predicates::json_mode,
};

pub const STRUCTURED_OUTPUT: Probe = Probe {
    id: "structured_output",
    tags: &["comprehensive"],
    request_kind: RequestKind::ChatStructuredOutput,
    request_template: requests::structured_output_chat,
    timeout: DEFAULT_TIMEOUT,
    sets_capabilities: &[CapabilityFlag::StructuredOutput],
    contributes_to_dimensions: &["feature_richness"],
    success_predicate: predicates::structured_output,
};

pub const EMBEDDINGS: Probe = Probe {
    id: "embeddings",
    tags: &["comprehensive"],
    request_kind: RequestKind::Embedding,
    request_template: requests::embeddings,
    timeout: DEFAULT_TIMEOUT,
    sets_capabilities: &[CapabilityFlag::Embeddings],
    contributes_to_dimensions: &["feature_richness"],
    success_predicate: predicates::embeddings,
};

pub const MODERATION: Probe = Probe {
    id: "moderation",
    tags: &["comprehensive"],
    request_kind: RequestKind::Moderation,
    request_template: requests::moderation,
    timeout: DEFAULT_TIMEOUT,
    sets_capabilities: &[],
    contributes_to_dimensions: &["feature_richness"],
    success_predicate: predicates::moderation,
};

pub const VISION: Probe = Probe {
    id: "vision",
    tags: &["comprehensive"],
    request_kind: RequestKind::Chat,
    request_template: requests::vision_chat,
    timeout: DEFAULT_TIMEOUT,
    sets_capabilities: &[CapabilityFlag::Vision],
    contributes_to_dimensions: &["feature_richness"],
    success_predicate: predicates::vision,
};

pub const AUDIO_TRANSCRIPTION: Probe = Probe {
    id: "audio_transcription",
    tags: &["comprehensive"],
    request_kind: RequestKind::AudioTranscription,
    request_template: requests::audio_transcription,
    timeout: DEFAULT_TIMEOUT,
    sets_capabilities: &[CapabilityFlag::AudioIn],
    contributes_to_dimensions: &["feature_richness"],
    success_predicate: predicates::audio_transcription,
};

pub const IMAGE_GENERATION: Probe = Probe {
    id: "image_generation",
    tags: &["comprehensive"],
    request_kind: RequestKind::ImageGeneration,
    request_template: requests::image_generation,
    timeout: DEFAULT_TIMEOUT,
    sets_capabilities: &[CapabilityFlag::ImageOut],
    contributes_to_dimensions: &["feature_richness"],
    success_predicate: predicates::image_generation,
};

pub const REASONING: Probe = Probe {
    id: "reasoning",
    tags: &["comprehensive"],
    request_kind: RequestKind::ReasoningProbe,
    request_template: requests::reasoning_chat,
    timeout: DEFAULT_TIMEOUT,
    sets_capabilities: &[CapabilityFlag::Reasoning],
    contributes_to_dimensions: &["code_capability"],
    success_predicate: predicates::reasoning,
};

/// SUPPLEMENT: see SPEC_FULL.md §4.2. Closes the `batch` capability flag
/// that spec.md declares but never assigns.
pub const BATCH: Probe = Probe {
    id: "batch",
    tags: &["comprehensive"],
    request_kind: RequestKind::Batch,
    request_template: requests::batch_submit,
    timeout: DEFAULT_TIMEOUT,
    sets_capabilities: &[CapabilityFlag::Batch],
    contributes_to_dimensions: &["feature_richness"],
    success_predicate: predicates::batch,
};

/// SUPPLEMENT: see SPEC_FULL.md §4.2. Closes the `reranking` capability flag.
pub const RERANKING: Probe = Probe {
    id: "reranking",
    tags: &["comprehensive"],
    request_kind: RequestKind::Reranking,
    request_template: requests::reranking,
    timeout: DEFAULT_TIMEOUT,
    sets_capabilities: &[CapabilityFlag::Reranking],
    contributes_to_dimensions: &["feature_richness"],
    success_predicate: predicates::reranking,
};

struct CodeTask {
    id: &'static str,
    request_template: fn(&str) -> serde_json::Value,
}

fn code_python(model_id: &str) -> serde_json::Value {
    requests::code_capability_chat(model_id, "Python", "returns the nth Fibonacci number")
}

fn code_javascript(model_id: &str) -> serde_json::Value {
    requests::code_capability_chat(model_id, "JavaScript", "reverses a string")
}

fn code_rust(model_id: &str) -> serde_json::Value {
    requests::code_capability_chat(model_id, "Rust", "checks whether a number is prime")
}

fn code_go(model_id: &str) -> serde_json::Value {
    requests::code_capability_chat(model_id, "Go", "sums a slice of integers")
}

const CODE_TASKS: &[CodeTask] = &[
    CodeTask { id: "code_python", request_template: code_python },
    CodeTask { id: "code_javascript", request_template: code_javascript },
    CodeTask { id: "code_rust", request_template: code_rust },
    CodeTask { id: "code_go", request_template: code_go },
];

fn code_capability_probes() -> Vec<Probe> {
    CODE_TASKS
        .iter()
        .map(|task| Probe {
            id: task.id,
            tags: &["comprehensive"],
            request_kind: RequestKind::Chat,
            request_template: task.request_template,
            timeout: DEFAULT_TIMEOUT,
            sets_capabilities: &[],
            contributes_to_dimensions: &["code_capability"],
            success_predicate: predicates::code_capability,
        })
        .collect()
}

/// The ordered probe set for one model in one run. `Exists` and
/// `Responsive` always run first and gate everything else, per spec.md
/// §4.2's ordering rule.
pub struct ProbeSet;

impl ProbeSet {
    /// All probes the registry knows, in the stable order the Scheduler
    /// executes them: Exists, Responsive, then every other probe matching
    /// `selection`, deterministically ordered by declaration.
    pub fn ordered(selection: &verifier_core::plan::ProbeSelection) -> Vec<Probe> {
        let mut probes = vec![EXISTS, RESPONSIVE];
        let rest: Vec<Probe> = Self::all_non_gating()
            .into_iter()
            .filter(|p| selection.matches(p.tags))
            .collect();
        probes.extend(rest);
        probes
    }

    fn all_non_gating() -> Vec<Probe> {
        let mut probes = vec![
            STREAMING,
            TOOL_USE,
            PARALLEL_TOOL_USE,
            JSON_MODE,
            STRUCTURED_OUTPUT,
            EMBEDDINGS,
            MODERATION,
            VISION,
            AUDIO_TRANSCRIPTION,
            IMAGE_GENERATION,
            REASONING,
            BATCH,
            RERANKING,
        ];
        probes.extend(code_capability_probes());
        probes
    }
}
