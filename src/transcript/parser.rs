//! Transcript reading: flattening provider messages into a bounded display view.

use serde_json::Value;

use super::types::{Family, Provider, RenderLimits, Rendered, RenderedMessage};

const ELLIPSIS: char = '…';

/// Message extraction for one schema family
pub trait TranscriptFormat {
    /// Every message in the transcript, oldest first. `None` when the value
    /// does not have this family's shape.
    fn messages(&self, value: &Value) -> Option<Vec<RenderedMessage>>;
}

/// OpenAI chat completion messages (also used by compatible servers and Mistral)
pub struct OpenAiFormat;

/// Gemini `contents` with `parts`
pub struct GeminiFormat;

impl Family {
    pub fn format(self) -> &'static dyn TranscriptFormat {
        match self {
            Family::OpenAi => &OpenAiFormat,
            Family::Gemini => &GeminiFormat,
        }
    }
}

/// Truncate a string to max_chars, adding an ellipsis if truncated
pub fn truncate(input: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return input.to_string();
    }
    match input.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut out = input[..cut].to_string();
            out.push(ELLIPSIS);
            out
        }
        None => input.to_string(),
    }
}

/// Normalize role names to standard values
pub fn normalize_role(role: &str) -> String {
    let lower = role.trim().to_lowercase();
    match lower.as_str() {
        "model" => "assistant".to_string(),
        "function" => "tool".to_string(),
        _ => lower,
    }
}

/// Render transcript bytes that were tagged with `provider`
pub fn render(bytes: &[u8], provider: Provider, limits: RenderLimits) -> Rendered {
    let Some(family) = provider.family() else {
        return Rendered::unrecognized();
    };
    let value: Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(%provider, error = %err, "transcript bytes no longer parse");
            return Rendered::unrecognized();
        }
    };
    let Some(messages) = family.format().messages(&value) else {
        return Rendered::unrecognized();
    };
    window(messages, limits)
}

fn window(messages: Vec<RenderedMessage>, limits: RenderLimits) -> Rendered {
    let total = messages.len();
    let skip = if limits.max_messages == 0 {
        0
    } else {
        total.saturating_sub(limits.max_messages)
    };
    let messages = messages
        .into_iter()
        .skip(skip)
        .map(|m| RenderedMessage {
            content: truncate(&m.content, limits.max_chars),
            role: m.role,
        })
        .collect();
    Rendered {
        messages,
        total,
        unrecognized: false,
    }
}

impl TranscriptFormat for OpenAiFormat {
    fn messages(&self, value: &Value) -> Option<Vec<RenderedMessage>> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(map) => map.get("messages")?.as_array()?,
            _ => return None,
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let role = item.get("role").and_then(|v| v.as_str())?;
            out.push(RenderedMessage {
                role: normalize_role(role),
                content: openai_content(item),
            });
        }
        Some(out)
    }
}

fn openai_content(message: &Value) -> String {
    let mut parts = Vec::new();
    match message.get("content") {
        Some(Value::String(text)) => parts.push(text.clone()),
        Some(Value::Array(blocks)) => parts.extend(blocks.iter().map(openai_block)),
        Some(Value::Null) | None => {}
        Some(other) => parts.push(other.to_string()),
    }
    if let Some(calls) = message.get("tool_calls").and_then(|v| v.as_array()) {
        for call in calls {
            let name = call
                .pointer("/function/name")
                .or_else(|| call.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or("tool");
            parts.push(format!("[tool call: {name}]"));
        }
    }
    parts.join("\n")
}

fn openai_block(block: &Value) -> String {
    if let Some(text) = block.as_str() {
        return text.to_string();
    }
    let kind = block.get("type").and_then(|v| v.as_str()).unwrap_or("");
    match kind {
        "text" | "input_text" | "output_text" | "" => match block.get("text") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Object(inner)) => inner
                .get("value")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            _ => "[block]".to_string(),
        },
        "image_url" | "input_image" | "image" => "[image]".to_string(),
        "input_audio" | "audio" => "[audio]".to_string(),
        "file" | "input_file" => "[file]".to_string(),
        other => format!("[{other}]"),
    }
}

impl TranscriptFormat for GeminiFormat {
    fn messages(&self, value: &Value) -> Option<Vec<RenderedMessage>> {
        let (contents, system) = match value {
            Value::Array(items) => (items, None),
            Value::Object(map) => (
                map.get("contents")?.as_array()?,
                map.get("systemInstruction")
                    .or_else(|| map.get("system_instruction")),
            ),
            _ => return None,
        };
        let mut out = Vec::with_capacity(contents.len() + 1);
        if let Some(system) = system {
            out.push(RenderedMessage {
                role: "system".to_string(),
                content: gemini_parts(system),
            });
        }
        for content in contents {
            content.get("parts")?.as_array()?;
            let role = content
                .get("role")
                .and_then(|v| v.as_str())
                .map(normalize_role)
                .unwrap_or_else(|| "user".to_string());
            out.push(RenderedMessage {
                role,
                content: gemini_parts(content),
            });
        }
        Some(out)
    }
}

fn gemini_parts(content: &Value) -> String {
    let Some(parts) = content.get("parts").and_then(|v| v.as_array()) else {
        return content.as_str().unwrap_or_default().to_string();
    };
    parts.iter().map(gemini_part).collect::<Vec<_>>().join("\n")
}

fn gemini_part(part: &Value) -> String {
    if let Some(text) = part.get("text").and_then(|v| v.as_str()) {
        return text.to_string();
    }
    if let Some(data) = part.get("inlineData").or_else(|| part.get("inline_data")) {
        let mime = data
            .get("mimeType")
            .or_else(|| data.get("mime_type"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        return format!("[data: {mime}]");
    }
    if let Some(file) = part.get("fileData").or_else(|| part.get("file_data")) {
        let uri = file
            .get("fileUri")
            .or_else(|| file.get("file_uri"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        return format!("[file: {uri}]");
    }
    if let Some(call) = part.get("functionCall").or_else(|| part.get("function_call")) {
        let name = call.get("name").and_then(|v| v.as_str()).unwrap_or("function");
        return format!("[function call: {name}]");
    }
    if let Some(resp) = part
        .get("functionResponse")
        .or_else(|| part.get("function_response"))
    {
        let name = resp.get("name").and_then(|v| v.as_str()).unwrap_or("function");
        return format!("[function response: {name}]");
    }
    "[part]".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::detect;

    fn render_str(raw: &str, limits: RenderLimits) -> Rendered {
        render(raw.as_bytes(), detect(raw.as_bytes()), limits)
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate("hello world", 5), "hello…");
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("héllo wörld", 7), "héllo w…");
        assert_eq!(truncate("anything", 0), "anything");
    }

    #[test]
    fn keeps_last_messages_and_truncates() {
        let raw = r#"[
            {"role":"system","content":"be brief"},
            {"role":"user","content":"one"},
            {"role":"assistant","content":"two"},
            {"role":"user","content":"three"},
            {"role":"assistant","content":"hello world"}
        ]"#;
        let rendered = render_str(raw, RenderLimits::new(2, 5));
        assert!(!rendered.unrecognized);
        assert_eq!(rendered.total, 5);
        assert_eq!(rendered.omitted(), 3);
        assert_eq!(
            rendered.messages,
            vec![
                RenderedMessage {
                    role: "user".to_string(),
                    content: "three".to_string(),
                },
                RenderedMessage {
                    role: "assistant".to_string(),
                    content: "hello…".to_string(),
                },
            ]
        );
    }

    #[test]
    fn unbounded_limits_keep_everything() {
        let raw = r#"[{"role":"user","content":"a"},{"role":"assistant","content":"b"}]"#;
        let rendered = render_str(raw, RenderLimits::UNBOUNDED);
        assert_eq!(rendered.messages.len(), 2);
        assert_eq!(rendered.omitted(), 0);
    }

    #[test]
    fn unknown_yields_signal_not_error() {
        let rendered = render_str(r#"{"foo":1}"#, RenderLimits::new(10, 100));
        assert!(rendered.unrecognized);
        assert!(rendered.messages.is_empty());
    }

    #[test]
    fn known_tag_with_broken_bytes_is_unrecognized() {
        let rendered = render(b"{not json", Provider::OpenAi, RenderLimits::UNBOUNDED);
        assert!(rendered.unrecognized);
    }

    #[test]
    fn openai_structured_blocks_flatten_with_placeholders() {
        let raw = r#"{"model":"gpt-4o","messages":[
            {"role":"user","content":[
                {"type":"text","text":"what is this?"},
                {"type":"image_url","image_url":{"url":"data:..."}}
            ]},
            {"role":"assistant","content":null,"tool_calls":[
                {"id":"call_1","type":"function","function":{"name":"lookup","arguments":"{}"}}
            ]},
            {"role":"tool","tool_call_id":"call_1","content":"42"}
        ]}"#;
        let rendered = render_str(raw, RenderLimits::UNBOUNDED);
        let contents: Vec<_> = rendered.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["what is this?\n[image]", "[tool call: lookup]", "42"]);
        assert_eq!(rendered.messages[2].role, "tool");
    }

    #[test]
    fn gemini_parts_and_roles() {
        let raw = r#"{
            "systemInstruction":{"parts":[{"text":"You are terse."}]},
            "contents":[
                {"role":"user","parts":[
                    {"text":"describe"},
                    {"inlineData":{"mimeType":"image/png","data":"AAAA"}}
                ]},
                {"role":"model","parts":[{"functionCall":{"name":"search","args":{}}}]},
                {"role":"function","parts":[{"functionResponse":{"name":"search","response":{}}}]},
                {"role":"model","parts":[{"text":"A cat."},{"executableCode":{}}]}
            ]
        }"#;
        let rendered = render_str(raw, RenderLimits::UNBOUNDED);
        let pairs: Vec<_> = rendered
            .messages
            .iter()
            .map(|m| (m.role.as_str(), m.content.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("system", "You are terse."),
                ("user", "describe\n[data: image/png]"),
                ("assistant", "[function call: search]"),
                ("tool", "[function response: search]"),
                ("assistant", "A cat.\n[part]"),
            ]
        );
    }

    #[test]
    fn gemini_family_rejects_openai_shape() {
        let value: Value = serde_json::from_str(r#"[{"role":"user","content":"hi"}]"#).unwrap();
        assert!(GeminiFormat.messages(&value).is_none());
        assert!(OpenAiFormat.messages(&value).is_some());
    }
}
