//! Larkbridge core library — configuration, event model, dispatcher,
//! default handlers, and the WebSocket event-push client used by the CLI.

pub mod config;
pub mod content;
pub mod event;
pub mod handlers;
pub mod ws;
