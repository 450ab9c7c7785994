//! Provider detection from the lexical shape of an API key.
//!
//! Signatures are tried in order and the first match wins. Families that
//! share a prefix (`sk-or-v1-`, `sk-proj-`, `sk-`) are listed most specific
//! first.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{DetectionResult, Provider};

struct KeySignature {
    provider: Provider,
    regex: Regex,
    default_model: Option<&'static str>,
}

impl KeySignature {
    fn new(provider: Provider, pattern: &str, default_model: Option<&'static str>) -> Self {
        Self {
            provider,
            regex: Regex::new(pattern).expect("key signature pattern is valid"),
            default_model,
        }
    }
}

static SIGNATURES: LazyLock<Vec<KeySignature>> = LazyLock::new(|| {
    vec![
        KeySignature::new(
            Provider::Groq,
            r"^gsk_[A-Za-z0-9]{48,}$",
            Some("llama-3.3-70b-versatile"),
        ),
        KeySignature::new(
            Provider::Berget,
            r"^sk_ber_[A-Za-z0-9_-]{20,}$",
            Some("meta-llama/Llama-3.3-70B-Instruct"),
        ),
        KeySignature::new(Provider::OpenRouter, r"^sk-or-v1-[0-9a-fA-F]{64}$", None),
        KeySignature::new(
            Provider::OpenAi,
            r"^sk-proj-[A-Za-z0-9_-]{40,}$",
            Some("gpt-4o"),
        ),
        // Generic OpenAI key, after every other sk- family
        KeySignature::new(Provider::OpenAi, r"^sk-[A-Za-z0-9_-]{32,}$", Some("gpt-4o")),
    ]
});

/// Infers the provider an API key belongs to. Total: any input yields a
/// result, `None` meaning unknown or empty.
pub fn detect_provider(candidate_key: &str) -> Option<DetectionResult> {
    let key = candidate_key.trim();
    if key.is_empty() {
        return None;
    }
    SIGNATURES
        .iter()
        .find(|sig| sig.regex.is_match(key))
        .map(|sig| DetectionResult {
            provider_name: sig.provider.display_name().to_string(),
            default_model: sig.default_model.map(str::to_string),
        })
}

/// Text for the detection hint under a key field.
pub fn detection_message(detection: &DetectionResult) -> String {
    match &detection.default_model {
        Some(model) => format!(
            "{} API key detected and auto-selected ({})",
            detection.provider_name, model
        ),
        None => format!(
            "{} API key detected and auto-selected",
            detection.provider_name
        ),
    }
}
