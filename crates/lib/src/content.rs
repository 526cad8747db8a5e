//! Resolution of the `content` field of an inbound IM message.
//!
//! The platform usually delivers `message.content` as a JSON-encoded object
//! with a `text` field, but it can also be a plain string. Resolution is a
//! single parse attempt with a raw-string fallback, kept separate from the
//! dispatcher so it can be tested on its own.

use serde_json::Value;

/// Outcome of resolving message content to displayable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageText {
    /// Text from the JSON `text` field, or the raw content itself when the
    /// content is not valid JSON.
    Text(String),
    /// Content was present but carried no usable text. Keeps the raw content
    /// for logging.
    NoTextField { raw: String },
}

/// Resolve `content` to text. A JSON object with a non-empty string `text`
/// field wins; any other valid JSON has no text; invalid JSON falls back to
/// the raw string.
pub fn resolve_message_text(content: &str) -> MessageText {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => match map.get("text").and_then(Value::as_str) {
            Some(text) if !text.is_empty() => MessageText::Text(text.to_string()),
            _ => MessageText::NoTextField {
                raw: content.to_string(),
            },
        },
        Ok(_) => MessageText::NoTextField {
            raw: content.to_string(),
        },
        Err(_) if content.is_empty() => MessageText::NoTextField { raw: String::new() },
        Err(_) => MessageText::Text(content.to_string()),
    }
}
