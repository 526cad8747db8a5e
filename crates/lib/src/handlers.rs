//! Default bot callbacks for the three subscribed event types, and the
//! dispatcher wiring that binds them under their platform names.

use crate::content::{self, MessageText};
use crate::event::{
    CardActionEvent, EventDispatcher, MessageReceiveEvent, ToastResponse, UrlPreviewEvent,
    UrlPreviewResponse, CARD_ACTION_TRIGGER, IM_MESSAGE_RECEIVE, URL_PREVIEW_GET,
};
use anyhow::{Context, Result};

const CARD_ACK_TOAST: &str = "card action received";
const URL_PREVIEW_TITLE: &str = "link preview";

/// Acknowledge a card interaction with a fixed info toast.
///
/// The full event is logged for observability. There is no failure branch:
/// card interactions expect a meaningful acknowledgment, so an error while
/// serializing the event propagates instead of being swallowed.
pub fn acknowledge_card_action(event: &CardActionEvent) -> Result<ToastResponse> {
    let serialized = serde_json::to_string(event).context("serializing card action event")?;
    log::info!("card action event: {}", serialized);
    Ok(ToastResponse::info(CARD_ACK_TOAST))
}

/// Return a fixed placeholder title for a URL preview request.
///
/// Stub contract: no preview data is fetched.
pub fn stub_url_preview(event: &UrlPreviewEvent) -> Result<UrlPreviewResponse> {
    let serialized = serde_json::to_string(event).context("serializing url preview event")?;
    log::info!("url preview event: {}", serialized);
    Ok(UrlPreviewResponse::with_title(URL_PREVIEW_TITLE))
}

/// Log the text of an inbound IM message.
///
/// Missing or empty content is tolerated and logged, not an error. Errors
/// returned here are swallowed at the dispatcher boundary so the shared
/// receive loop stays up.
pub fn log_received_message(event: &MessageReceiveEvent) -> Result<()> {
    let serialized = serde_json::to_string(event).context("serializing message event")?;
    log::info!("im event: {}", serialized);

    let content = event.content().unwrap_or("");
    if content.is_empty() {
        log::info!("received im event with no content");
        return Ok(());
    }

    match content::resolve_message_text(content) {
        MessageText::Text(text) => log::info!("received text: {}", text),
        MessageText::NoTextField { raw } => {
            log::info!("received message, but no text field: {}", raw)
        }
    }
    Ok(())
}

/// Dispatcher with the three default handlers bound to their platform event
/// type names.
pub fn default_dispatcher() -> EventDispatcher {
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register_card_action(CARD_ACTION_TRIGGER, acknowledge_card_action);
    dispatcher.register_url_preview(URL_PREVIEW_GET, stub_url_preview);
    dispatcher.register_message(IM_MESSAGE_RECEIVE, log_received_message);
    dispatcher
}
