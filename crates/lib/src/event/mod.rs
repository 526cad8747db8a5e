//! Platform events: wire model and dispatcher.
//!
//! Event-type names and payload shapes belong to the chat platform's event
//! schema; this crate binds handler functions against them and does not
//! define them.

mod dispatcher;
mod model;

pub use dispatcher::{DispatchError, DispatchOutcome, EventDispatcher};
pub use model::{
    CardActionEvent, EventHeader, InlinePreview, MessageEventBody, MessageReceiveEvent,
    ReceivedMessage, Toast, ToastResponse, UrlPreviewEvent, UrlPreviewResponse,
    CARD_ACTION_TRIGGER, IM_MESSAGE_RECEIVE, URL_PREVIEW_GET,
};
