//! Provider detection: a structural probe over transcript JSON.

use serde_json::Value;

use super::types::Provider;

const MISTRAL_MODEL_PREFIXES: &[&str] = &[
    "mistral",
    "codestral",
    "ministral",
    "pixtral",
    "open-mistral",
    "open-mixtral",
    "magistral",
    "devstral",
];

const OPENAI_MODEL_PREFIXES: &[&str] = &["gpt-", "chatgpt", "o1", "o3", "o4"];

/// Classify transcript bytes. Malformed or unfamiliar content is `Unknown`.
pub fn detect(bytes: &[u8]) -> Provider {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => detect_value(&value),
        Err(_) => Provider::Unknown,
    }
}

pub(crate) fn detect_value(value: &Value) -> Provider {
    match value {
        Value::Array(items) => {
            if !items.is_empty() && items.iter().all(is_gemini_content) {
                Provider::Gemini
            } else if items.iter().all(is_role_message) {
                Provider::OpenAi
            } else {
                Provider::Unknown
            }
        }
        Value::Object(map) => {
            if let Some(contents) = map.get("contents").and_then(|v| v.as_array()) {
                if contents.iter().all(is_gemini_content) {
                    return Provider::Gemini;
                }
                return Provider::Unknown;
            }
            let Some(messages) = map.get("messages").and_then(|v| v.as_array()) else {
                return Provider::Unknown;
            };
            if !messages.iter().all(is_role_message) {
                return Provider::Unknown;
            }
            if messages.iter().any(|m| m.get("prefix").is_some_and(Value::is_boolean)) {
                return Provider::Mistral;
            }
            let model = map
                .get("model")
                .and_then(|v| v.as_str())
                .map(|m| m.trim().to_lowercase());
            match model {
                Some(m) if has_prefix(&m, MISTRAL_MODEL_PREFIXES) => Provider::Mistral,
                Some(m) if has_prefix(&m, OPENAI_MODEL_PREFIXES) => Provider::OpenAi,
                _ => Provider::OpenAiCompatible,
            }
        }
        _ => Provider::Unknown,
    }
}

fn has_prefix(model: &str, prefixes: &[&str]) -> bool {
    // Hosted names often carry an org prefix ("mistralai/mistral-large").
    let bare = model.rsplit('/').next().unwrap_or(model);
    prefixes.iter().any(|p| bare.starts_with(p))
}

fn is_role_message(value: &Value) -> bool {
    value.get("role").is_some_and(Value::is_string)
}

fn is_gemini_content(value: &Value) -> bool {
    value.get("parts").is_some_and(Value::is_array)
}
