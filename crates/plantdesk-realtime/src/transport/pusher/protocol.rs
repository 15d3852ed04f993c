//! Pusher Channels protocol (version 7) frames.
//!
//! Every frame is a JSON object with an `event` name, an optional `channel`,
//! and `data`. For application events `data` is itself a JSON-encoded string.

use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use plantdesk_core::config::RealtimeConfig;
use plantdesk_core::error::AppError;
use plantdesk_core::result::AppResult;

use crate::transport::TransportEvent;

/// Protocol revision sent in the connection URL.
pub const PROTOCOL_VERSION: u8 = 7;

/// Client name sent in the connection URL.
const CLIENT_NAME: &str = "plantdesk-rs";

/// A decoded server frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Handshake completed.
    ConnectionEstablished {
        /// Socket identifier assigned by the broker.
        socket_id: String,
        /// Broker-suggested inactivity timeout in seconds.
        activity_timeout: Option<u64>,
    },
    /// A subscription was accepted.
    SubscriptionSucceeded {
        /// Channel name.
        channel: String,
    },
    /// Broker ping; must be answered with a pong.
    Ping,
    /// Answer to our ping.
    Pong,
    /// Protocol error.
    Error {
        /// Pusher error code (4000-4299), when present.
        code: Option<u16>,
        /// Error message.
        message: String,
    },
    /// Application event on a channel.
    Event(TransportEvent),
    /// Any other `pusher:`/`pusher_internal:` frame.
    Other(String),
}

/// How a protocol error code should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// 4000-4099: do not reconnect with the same settings.
    Fatal,
    /// 4100-4299 or unknown: reconnect.
    Reconnect,
    /// Informational, keep the connection.
    Ignore,
}

impl ErrorAction {
    /// Classify a Pusher error code.
    pub fn for_code(code: Option<u16>) -> Self {
        match code {
            Some(4000..=4099) => Self::Fatal,
            Some(4100..=4299) => Self::Reconnect,
            Some(_) => Self::Ignore,
            None => Self::Reconnect,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct EstablishedData {
    socket_id: String,
    #[serde(default)]
    activity_timeout: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorData {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}

/// Payload as a string: string data is taken verbatim, anything else re-encoded.
fn data_string(data: Value) -> String {
    match data {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Payload as a JSON value: string data is parsed when it holds JSON.
fn data_value(data: Value) -> Value {
    match data {
        Value::String(s) => serde_json::from_str(&s).unwrap_or(Value::String(s)),
        other => other,
    }
}

/// Decodes one text frame.
pub fn decode(text: &str) -> AppResult<Inbound> {
    let frame: RawFrame = serde_json::from_str(text)?;

    let inbound = match frame.event.as_str() {
        "pusher:connection_established" => {
            let data: EstablishedData = serde_json::from_value(data_value(frame.data))?;
            Inbound::ConnectionEstablished {
                socket_id: data.socket_id,
                activity_timeout: data.activity_timeout,
            }
        }
        "pusher_internal:subscription_succeeded" => Inbound::SubscriptionSucceeded {
            channel: frame.channel.unwrap_or_default(),
        },
        "pusher:ping" => Inbound::Ping,
        "pusher:pong" => Inbound::Pong,
        "pusher:error" => {
            let data: ErrorData = serde_json::from_value(data_value(frame.data)).unwrap_or_default();
            Inbound::Error {
                code: data.code,
                message: data.message.unwrap_or_else(|| "unknown error".to_string()),
            }
        }
        name if name.starts_with("pusher:") || name.starts_with("pusher_internal:") => {
            Inbound::Other(name.to_string())
        }
        _ => match frame.channel {
            Some(channel) => Inbound::Event(TransportEvent {
                channel,
                event: frame.event,
                data: data_string(frame.data),
            }),
            None => Inbound::Other(frame.event),
        },
    };

    Ok(inbound)
}

/// `pusher:subscribe` frame for a public channel.
pub fn subscribe_frame(channel: &str) -> String {
    json!({ "event": "pusher:subscribe", "data": { "channel": channel } }).to_string()
}

/// `pusher:unsubscribe` frame.
pub fn unsubscribe_frame(channel: &str) -> String {
    json!({ "event": "pusher:unsubscribe", "data": { "channel": channel } }).to_string()
}

/// `pusher:ping` frame.
pub fn ping_frame() -> String {
    json!({ "event": "pusher:ping", "data": {} }).to_string()
}

/// `pusher:pong` frame.
pub fn pong_frame() -> String {
    json!({ "event": "pusher:pong", "data": {} }).to_string()
}

/// Builds the WebSocket URL for the configured app key and cluster.
pub fn build_url(config: &RealtimeConfig) -> AppResult<Url> {
    if config.app_key.trim().is_empty() {
        return Err(AppError::configuration("realtime.app_key is not set"));
    }

    let scheme = if config.use_tls { "wss" } else { "ws" };
    let port = config
        .port
        .unwrap_or(if config.use_tls { 443 } else { 80 });
    let raw = format!(
        "{scheme}://{}:{port}/app/{}",
        config.resolved_host(),
        config.app_key.trim()
    );

    let mut url = Url::parse(&raw)
        .map_err(|e| AppError::configuration(format!("Invalid realtime URL '{raw}': {e}")))?;
    url.query_pairs_mut()
        .append_pair("protocol", &PROTOCOL_VERSION.to_string())
        .append_pair("client", CLIENT_NAME)
        .append_pair("version", env!("CARGO_PKG_VERSION"))
        .append_pair("flash", "false");
    Ok(url)
}
