//! JSON event envelope spoken over the websocket.
//!
//! Every text frame is `{ "event": <name>, "data": <payload> }`. Inbound the
//! client understands `previous_messages` and `message`; outbound it emits
//! `auth` (once, when the auth-object mode is configured) and `message` with
//! the raw input string as payload.

#[cfg(test)]
#[path = "wire_test.rs"]
mod wire_test;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::types::{Backlog, Message};
use crate::error::ClientError;

pub const EVENT_AUTH: &str = "auth";
pub const EVENT_PREVIOUS_MESSAGES: &str = "previous_messages";
pub const EVENT_MESSAGE: &str = "message";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Decoded inbound event.
#[derive(Clone, Debug, PartialEq)]
pub enum ServerEvent {
    Backlog(Backlog),
    Message(Message),
}

/// Decode one inbound text frame.
///
/// Returns `Ok(None)` for well-formed envelopes naming an event this client
/// does not handle.
///
/// # Errors
///
/// Returns [`ClientError::InvalidJson`] when the frame or its payload does
/// not match the expected shape.
pub fn decode_server_event(text: &str) -> Result<Option<ServerEvent>, ClientError> {
    let envelope: Envelope = serde_json::from_str(text)?;
    match envelope.event.as_str() {
        EVENT_PREVIOUS_MESSAGES => Ok(Some(ServerEvent::Backlog(serde_json::from_value(envelope.data)?))),
        EVENT_MESSAGE => Ok(Some(ServerEvent::Message(serde_json::from_value(envelope.data)?))),
        _ => Ok(None),
    }
}

/// Encode an outbound chat line. The payload is the raw string, untouched.
///
/// # Errors
///
/// Returns [`ClientError::InvalidJson`] if serialization fails.
pub fn encode_message(text: &str) -> Result<String, ClientError> {
    encode(EVENT_MESSAGE, Value::String(text.to_owned()))
}

/// Encode the handshake frame used by [`crate::config::AuthField::AuthObject`].
///
/// # Errors
///
/// Returns [`ClientError::InvalidJson`] if serialization fails.
pub fn encode_auth(token: &str) -> Result<String, ClientError> {
    encode(EVENT_AUTH, json!({ "token": token }))
}

fn encode(event: &str, data: Value) -> Result<String, ClientError> {
    let envelope = Envelope { event: event.to_owned(), data };
    Ok(serde_json::to_string(&envelope)?)
}
