//! Typed event payloads and callback response shapes.
//!
//! Nested fields are optional so a missing field is a typed case rather than
//! a deserialization failure; the handlers decide what absence means.

use serde::{Deserialize, Serialize};

/// Event name for card interactions requiring a toast acknowledgment.
pub const CARD_ACTION_TRIGGER: &str = "card.action.trigger";
/// Event name for URL preview metadata requests.
pub const URL_PREVIEW_GET: &str = "url.preview.get";
/// Event name for inbound IM messages.
pub const IM_MESSAGE_RECEIVE: &str = "im.message.receive_v1";

/// Common event header (subset of the v2 event schema).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventHeader {
    #[serde(default)]
    pub event_id: Option<String>,
    pub event_type: String,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub tenant_key: Option<String>,
}

/// A user's interaction with an interactive card element. The action payload
/// is logged as-is; no field of it is interpreted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardActionEvent {
    pub header: EventHeader,
    #[serde(default)]
    pub event: serde_json::Value,
}

/// A request for preview metadata for a URL mentioned in a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlPreviewEvent {
    pub header: EventHeader,
    #[serde(default)]
    pub event: serde_json::Value,
}

/// An inbound IM message addressed to the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReceiveEvent {
    pub header: EventHeader,
    #[serde(default)]
    pub event: Option<MessageEventBody>,
}

impl MessageReceiveEvent {
    /// The raw message content, when the nested path is fully present.
    pub fn content(&self) -> Option<&str> {
        self.event.as_ref()?.message.as_ref()?.content.as_deref()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageEventBody {
    #[serde(default)]
    pub sender: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<ReceivedMessage>,
}

/// The message body. `content` is usually a JSON-encoded string with a `text`
/// field but can be a plain string; see [`crate::content`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceivedMessage {
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Toast acknowledgment returned for `card.action.trigger`. Shape dictated by
/// the platform's callback-response schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastResponse {
    pub toast: Toast,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

impl ToastResponse {
    /// Info-severity toast with the given content.
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            toast: Toast {
                kind: "info".to_string(),
                content: content.into(),
            },
        }
    }
}

/// Inline preview metadata returned for `url.preview.get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlPreviewResponse {
    pub inline: InlinePreview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlinePreview {
    pub title: String,
}

impl UrlPreviewResponse {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            inline: InlinePreview {
                title: title.into(),
            },
        }
    }
}
