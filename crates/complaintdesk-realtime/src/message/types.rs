//! Inbound and outbound event definitions.
//!
//! Every frame is a JSON text frame of the form `{"event": name, "data": payload}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RealtimeError;

/// `typing` payload. Only `room` is interpreted; everything else is echoed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingPayload {
    /// Target room.
    pub room: String,
    /// Any other fields supplied by the client.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `newMessage` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessagePayload {
    /// Target room.
    pub room: String,
    /// Message body forwarded to room members as-is.
    pub message: Value,
}

/// Events sent by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum InboundEvent {
    /// Join the room with this identifier.
    JoinRoom(String),
    /// Typing indicator for a room.
    Typing(TypingPayload),
    /// A message posted to a room.
    NewMessage(NewMessagePayload),
}

impl InboundEvent {
    /// Decode a text frame.
    pub fn parse(frame: &str) -> Result<Self, RealtimeError> {
        serde_json::from_str(frame).map_err(|e| RealtimeError::MalformedEvent(e.to_string()))
    }

    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom(_) => "joinRoom",
            Self::Typing(_) => "typing",
            Self::NewMessage(_) => "newMessage",
        }
    }
}

/// Events sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum OutboundEvent {
    /// Ordered list of online user ids.
    OnlineUsers(Vec<String>),
    /// Echoed typing payload.
    Typing(TypingPayload),
    /// The inner `message` of a `newMessage` event.
    NewMessage(Value),
}

impl OutboundEvent {
    /// Encode as a text frame.
    pub fn to_frame(&self) -> Result<String, RealtimeError> {
        serde_json::to_string(self).map_err(|e| RealtimeError::MalformedEvent(e.to_string()))
    }
}
