//! Event dispatcher: a plain map from event-type name to handler.
//!
//! Three handler shapes exist. Card-action and url-preview handlers return a
//! callback response and their errors propagate to the caller. The message
//! handler is fire-and-forget: its errors, including payload decode errors,
//! are logged at this boundary and never rethrown, so one bad message cannot
//! take down the shared receive loop.

use crate::event::model::{
    CardActionEvent, MessageReceiveEvent, ToastResponse, UrlPreviewEvent, UrlPreviewResponse,
};
use anyhow::Result;
use std::collections::HashMap;

pub type CardActionHandler =
    Box<dyn Fn(&CardActionEvent) -> Result<ToastResponse> + Send + Sync>;
pub type UrlPreviewHandler =
    Box<dyn Fn(&UrlPreviewEvent) -> Result<UrlPreviewResponse> + Send + Sync>;
pub type MessageHandler = Box<dyn Fn(&MessageReceiveEvent) -> Result<()> + Send + Sync>;

enum Handler {
    CardAction(CardActionHandler),
    UrlPreview(UrlPreviewHandler),
    Message(MessageHandler),
}

/// Result of dispatching one event.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The handler produced a callback response to return to the platform.
    Response(serde_json::Value),
    /// The event was handled; nothing to send back.
    Ack,
    /// No handler is registered for this event type.
    Unhandled,
}

/// Dispatch failures surfaced to the caller. Message-handler failures never
/// appear here.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("malformed {event_type} payload: {source}")]
    Payload {
        event_type: String,
        source: serde_json::Error,
    },
    #[error("{event_type} handler failed: {error:#}")]
    Handler {
        event_type: String,
        error: anyhow::Error,
    },
}

/// Registry of event-type names to handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<String, Handler>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a card-action handler under `event_type`. Handler errors
    /// propagate out of [`EventDispatcher::dispatch`].
    pub fn register_card_action<F>(&mut self, event_type: &str, handler: F)
    where
        F: Fn(&CardActionEvent) -> Result<ToastResponse> + Send + Sync + 'static,
    {
        self.handlers
            .insert(event_type.to_string(), Handler::CardAction(Box::new(handler)));
    }

    /// Register a url-preview handler under `event_type`. Handler errors
    /// propagate out of [`EventDispatcher::dispatch`].
    pub fn register_url_preview<F>(&mut self, event_type: &str, handler: F)
    where
        F: Fn(&UrlPreviewEvent) -> Result<UrlPreviewResponse> + Send + Sync + 'static,
    {
        self.handlers
            .insert(event_type.to_string(), Handler::UrlPreview(Box::new(handler)));
    }

    /// Register a fire-and-forget message handler under `event_type`. Its
    /// errors are logged and swallowed at the dispatch boundary.
    pub fn register_message<F>(&mut self, event_type: &str, handler: F)
    where
        F: Fn(&MessageReceiveEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.handlers
            .insert(event_type.to_string(), Handler::Message(Box::new(handler)));
    }

    /// Registered event-type names.
    pub fn event_types(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    /// Dispatch one raw event payload by type.
    pub fn dispatch(&self, event_type: &str, raw: &str) -> Result<DispatchOutcome, DispatchError> {
        match self.handlers.get(event_type) {
            None => {
                log::debug!("no handler registered for event type {}", event_type);
                Ok(DispatchOutcome::Unhandled)
            }
            Some(Handler::CardAction(handler)) => {
                let event: CardActionEvent = parse(event_type, raw)?;
                let resp = handler(&event).map_err(|error| DispatchError::Handler {
                    event_type: event_type.to_string(),
                    error,
                })?;
                Ok(DispatchOutcome::Response(to_response_value(
                    event_type, &resp,
                )?))
            }
            Some(Handler::UrlPreview(handler)) => {
                let event: UrlPreviewEvent = parse(event_type, raw)?;
                let resp = handler(&event).map_err(|error| DispatchError::Handler {
                    event_type: event_type.to_string(),
                    error,
                })?;
                Ok(DispatchOutcome::Response(to_response_value(
                    event_type, &resp,
                )?))
            }
            Some(Handler::Message(handler)) => {
                match parse::<MessageReceiveEvent>(event_type, raw) {
                    Ok(event) => {
                        if let Err(e) = handler(&event) {
                            log::error!("error handling {} event: {:#}", event_type, e);
                        }
                    }
                    Err(e) => log::error!("{}", e),
                }
                Ok(DispatchOutcome::Ack)
            }
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(event_type: &str, raw: &str) -> Result<T, DispatchError> {
    serde_json::from_str(raw).map_err(|source| DispatchError::Payload {
        event_type: event_type.to_string(),
        source,
    })
}

fn to_response_value<T: serde::Serialize>(
    event_type: &str,
    resp: &T,
) -> Result<serde_json::Value, DispatchError> {
    serde_json::to_value(resp).map_err(|e| DispatchError::Handler {
        event_type: event_type.to_string(),
        error: anyhow::Error::new(e).context("serializing callback response"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::model::{CARD_ACTION_TRIGGER, IM_MESSAGE_RECEIVE, URL_PREVIEW_GET};
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn card_payload() -> &'static str {
        r#"{"header": {"event_id": "e1", "event_type": "card.action.trigger"}, "event": {"action": {"tag": "button"}}}"#
    }

    #[test]
    fn card_action_returns_response_value() {
        let mut d = EventDispatcher::new();
        d.register_card_action(CARD_ACTION_TRIGGER, |_| Ok(ToastResponse::info("ok")));
        let outcome = d.dispatch(CARD_ACTION_TRIGGER, card_payload()).expect("dispatch");
        match outcome {
            DispatchOutcome::Response(v) => {
                assert_eq!(v["toast"]["type"], "info");
                assert_eq!(v["toast"]["content"], "ok");
            }
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[test]
    fn url_preview_returns_response_value() {
        let mut d = EventDispatcher::new();
        d.register_url_preview(URL_PREVIEW_GET, |_| {
            Ok(UrlPreviewResponse::with_title("a title"))
        });
        let payload = r#"{"header": {"event_type": "url.preview.get"}, "event": {"url": "https://example.com"}}"#;
        let outcome = d.dispatch(URL_PREVIEW_GET, payload).expect("dispatch");
        match outcome {
            DispatchOutcome::Response(v) => assert_eq!(v["inline"]["title"], "a title"),
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[test]
    fn unknown_event_type_is_unhandled() {
        let d = EventDispatcher::new();
        let outcome = d.dispatch("some.other.event", "{}").expect("dispatch");
        assert!(matches!(outcome, DispatchOutcome::Unhandled));
    }

    #[test]
    fn card_action_handler_error_propagates() {
        let mut d = EventDispatcher::new();
        d.register_card_action(CARD_ACTION_TRIGGER, |_| Err(anyhow!("boom")));
        let err = d.dispatch(CARD_ACTION_TRIGGER, card_payload()).unwrap_err();
        assert!(matches!(err, DispatchError::Handler { .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn card_action_malformed_payload_is_an_error() {
        let mut d = EventDispatcher::new();
        d.register_card_action(CARD_ACTION_TRIGGER, |_| Ok(ToastResponse::info("ok")));
        let err = d.dispatch(CARD_ACTION_TRIGGER, "not json").unwrap_err();
        assert!(matches!(err, DispatchError::Payload { .. }));
    }

    #[test]
    fn message_handler_error_is_swallowed() {
        let mut d = EventDispatcher::new();
        d.register_message(IM_MESSAGE_RECEIVE, |_| Err(anyhow!("handler trouble")));
        let payload = r#"{"header": {"event_type": "im.message.receive_v1"}}"#;
        let outcome = d.dispatch(IM_MESSAGE_RECEIVE, payload).expect("must not propagate");
        assert!(matches!(outcome, DispatchOutcome::Ack));
    }

    #[test]
    fn message_malformed_payload_is_swallowed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let mut d = EventDispatcher::new();
        d.register_message(IM_MESSAGE_RECEIVE, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let outcome = d.dispatch(IM_MESSAGE_RECEIVE, "not json").expect("must not propagate");
        assert!(matches!(outcome, DispatchOutcome::Ack));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn re_registering_replaces_the_handler() {
        let mut d = EventDispatcher::new();
        d.register_card_action(CARD_ACTION_TRIGGER, |_| Ok(ToastResponse::info("first")));
        d.register_card_action(CARD_ACTION_TRIGGER, |_| Ok(ToastResponse::info("second")));
        let outcome = d.dispatch(CARD_ACTION_TRIGGER, card_payload()).expect("dispatch");
        match outcome {
            DispatchOutcome::Response(v) => assert_eq!(v["toast"]["content"], "second"),
            other => panic!("expected response, got {:?}", other),
        }
    }
}
