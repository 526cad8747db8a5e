//! WebSocket event-push client: resolve the endpoint with app credentials,
//! connect, and serve the dispatcher until the connection drops.
//!
//! No reconnect or backoff: the caller decides what a dropped connection
//! means. Handlers are expected to be fast and side-effect-light; slow work
//! would block the shared receive loop.

use crate::config::AppConfig;
use crate::event::{DispatchOutcome, EventDispatcher};
use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_tungstenite::tungstenite::Message;

const OPEN_API_BASE: &str = "https://open.feishu.cn";

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// One inbound frame on the event-push connection.
#[derive(Debug, Deserialize)]
struct EventFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    event_id: Option<String>,
    #[serde(default)]
    event_type: Option<String>,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

/// Callback response frame sent back for events that expect one.
#[derive(Debug, Serialize)]
struct ResponseFrame<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    event_id: &'a str,
    payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct EndpointResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<EndpointData>,
}

#[derive(Debug, Deserialize)]
struct EndpointData {
    url: String,
}

/// Long-lived event-push client. Owns the dispatcher and the HTTP client used
/// to resolve the WebSocket endpoint.
pub struct WsClient {
    app_id: String,
    app_secret: String,
    dispatcher: EventDispatcher,
    http: reqwest::Client,
}

impl WsClient {
    pub fn new(config: &AppConfig, dispatcher: EventDispatcher) -> Self {
        Self {
            app_id: config.app_id.clone(),
            app_secret: config.app_secret.clone(),
            dispatcher,
            http: reqwest::Client::new(),
        }
    }

    /// Connect and serve events until the connection drops. Never returns Ok
    /// under normal operation.
    pub async fn start(&self) -> Result<()> {
        let endpoint = self.fetch_endpoint().await?;
        let (ws, _) = tokio_tungstenite::connect_async(&endpoint)
            .await
            .context("connecting to event push endpoint")?;
        log::info!(
            "event push connection established; serving {} event types",
            self.dispatcher.event_types().len()
        );
        self.run_event_loop(ws).await
    }

    /// Resolve the WebSocket endpoint for this app from the open-platform API.
    async fn fetch_endpoint(&self) -> Result<String> {
        let url = format!("{}/callback/ws/endpoint", open_api_base());
        let body = serde_json::json!({ "AppID": self.app_id, "AppSecret": self.app_secret });
        let res = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("requesting ws endpoint")?;
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            bail!("ws endpoint request failed: {} {}", status, text);
        }
        let data: EndpointResponse = res.json().await.context("parsing ws endpoint response")?;
        if data.code != 0 {
            bail!(
                "ws endpoint request rejected: code {} {}",
                data.code,
                data.msg.unwrap_or_default()
            );
        }
        data.data
            .map(|d| d.url)
            .context("ws endpoint response carried no url")
    }

    async fn run_event_loop(&self, mut ws: WsStream) -> Result<()> {
        while let Some(frame) = ws.next().await {
            let msg = frame.context("event push connection error")?;
            match msg {
                Message::Text(text) => {
                    if let Some(reply) = self.handle_text_frame(&text) {
                        ws.send(Message::Text(reply))
                            .await
                            .context("sending callback response")?;
                    }
                }
                Message::Ping(data) => {
                    ws.send(Message::Pong(data)).await.context("sending pong")?;
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        bail!("event push connection closed")
    }

    /// Decode one text frame and dispatch it. Returns the serialized response
    /// frame when the handler produced a callback response.
    fn handle_text_frame(&self, text: &str) -> Option<String> {
        let frame: EventFrame = match serde_json::from_str(text) {
            Ok(f) => f,
            Err(e) => {
                log::debug!("ignoring undecodable frame: {}", e);
                return None;
            }
        };
        if frame.kind != "event" {
            log::debug!("ignoring frame of type {}", frame.kind);
            return None;
        }
        let event_type = match frame.event_type {
            Some(t) => t,
            None => {
                log::debug!("ignoring event frame without an event type");
                return None;
            }
        };
        let payload = frame
            .payload
            .map(|v| v.to_string())
            .unwrap_or_else(|| "{}".to_string());

        match self.dispatcher.dispatch(&event_type, &payload) {
            Ok(DispatchOutcome::Response(value)) => {
                let event_id = frame.event_id.unwrap_or_default();
                let reply = ResponseFrame {
                    kind: "response",
                    event_id: &event_id,
                    payload: value,
                };
                match serde_json::to_string(&reply) {
                    Ok(s) => Some(s),
                    Err(e) => {
                        log::error!("failed to serialize response frame: {}", e);
                        None
                    }
                }
            }
            Ok(DispatchOutcome::Ack) => None,
            Ok(DispatchOutcome::Unhandled) => None,
            Err(e) => {
                // Dispatcher-level recovery: log and move to the next frame.
                log::error!("dispatch failed: {}", e);
                None
            }
        }
    }
}

/// Resolve the open-platform API base URL (for tests or custom endpoints).
pub fn open_api_base() -> String {
    base_or_default(std::env::var("LARK_OPEN_API_BASE").ok())
}

fn base_or_default(override_base: Option<String>) -> String {
    override_base.unwrap_or_else(|| OPEN_API_BASE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::default_dispatcher;

    fn client() -> WsClient {
        let config = AppConfig {
            app_id: "cli_test".to_string(),
            app_secret: "secret".to_string(),
        };
        WsClient::new(&config, default_dispatcher())
    }

    #[test]
    fn card_action_frame_yields_response_frame() {
        let frame = serde_json::json!({
            "type": "event",
            "event_id": "e1",
            "event_type": "card.action.trigger",
            "payload": {
                "header": {"event_id": "e1", "event_type": "card.action.trigger"},
                "event": {"action": {"tag": "button"}}
            }
        });
        let reply = client()
            .handle_text_frame(&frame.to_string())
            .expect("response frame");
        let reply: serde_json::Value = serde_json::from_str(&reply).expect("json");
        assert_eq!(reply["type"], "response");
        assert_eq!(reply["event_id"], "e1");
        assert_eq!(reply["payload"]["toast"]["type"], "info");
    }

    #[test]
    fn message_frame_yields_no_reply() {
        let frame = serde_json::json!({
            "type": "event",
            "event_id": "e2",
            "event_type": "im.message.receive_v1",
            "payload": {
                "header": {"event_type": "im.message.receive_v1"},
                "event": {"message": {"content": "{\"text\": \"hi\"}"}}
            }
        });
        assert!(client().handle_text_frame(&frame.to_string()).is_none());
    }

    #[test]
    fn non_event_frames_are_ignored() {
        let c = client();
        assert!(c.handle_text_frame("not json").is_none());
        assert!(c
            .handle_text_frame(r#"{"type": "pong", "event_id": "x"}"#)
            .is_none());
        assert!(c
            .handle_text_frame(r#"{"type": "event", "event_id": "x"}"#)
            .is_none());
    }

    #[test]
    fn unknown_event_type_yields_no_reply() {
        let frame = serde_json::json!({
            "type": "event",
            "event_type": "some.other.event",
            "payload": {}
        });
        assert!(client().handle_text_frame(&frame.to_string()).is_none());
    }

    #[test]
    fn open_api_base_default_and_override() {
        assert_eq!(base_or_default(None), OPEN_API_BASE);
        assert_eq!(
            base_or_default(Some("http://127.0.0.1:9000".to_string())),
            "http://127.0.0.1:9000"
        );
    }
}
