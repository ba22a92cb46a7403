//! Chat wire protocol: method calls, replies, and server events.
//!
//! JSON frames over the websocket. Only the methods and events the bot
//! uses are modelled; unknown event payloads are carried as opaque
//! `serde_json::Value`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

use pingbot_core::{ChatEvent, MessageFragment};

/// Method names the bot sends.
pub(crate) mod method {
    /// Authenticate the freshly opened socket.
    pub(crate) const AUTH: &str = "auth";
    /// Send a chat message.
    pub(crate) const MSG: &str = "msg";
}

/// Event names the server pushes.
pub(crate) mod event {
    /// A user joined the channel.
    pub(crate) const USER_JOIN: &str = "UserJoin";
    /// A chat message was posted.
    pub(crate) const CHAT_MESSAGE: &str = "ChatMessage";
}

/// Method id reserved for the auth handshake; ordinary calls start at 1.
pub(crate) const AUTH_METHOD_ID: u64 = 0;

// ── Wire Types ───────────────────────────────────────────────

/// Raw frame as received/sent over the socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum Packet {
    /// An outbound remote call.
    Method {
        /// Method name.
        method: String,
        /// Positional arguments.
        arguments: Vec<Value>,
        /// Correlation id echoed by the reply.
        id: u64,
    },
    /// Server response to a method call.
    Reply {
        /// Error detail; `null` on success.
        #[serde(default)]
        error: Option<Value>,
        /// Method-specific result data.
        #[serde(default)]
        data: Option<Value>,
        /// Correlation id of the originating method.
        id: u64,
    },
    /// Server push event.
    Event {
        /// Event name.
        event: String,
        /// Event payload.
        #[serde(default)]
        data: Option<Value>,
    },
}

/// `UserJoin` event payload.
#[derive(Debug, Deserialize)]
struct UserJoinPayload {
    username: String,
}

/// `ChatMessage` event payload.
#[derive(Debug, Deserialize)]
struct ChatMessagePayload {
    user_name: String,
    message: MessageBody,
}

/// Nested body of a `ChatMessage` event.
#[derive(Debug, Deserialize)]
struct MessageBody {
    message: Vec<MessageFragment>,
}

// ── Frame Builders ───────────────────────────────────────────

/// Build the `auth` method frame.
///
/// The argument order (channel id, user id, auth key) is a protocol
/// requirement of the chat servers; any other ordering is rejected.
pub(crate) fn auth_method(channel_id: u64, user_id: u64, auth_key: &str, id: u64) -> Packet {
    Packet::Method {
        method: method::AUTH.to_string(),
        arguments: vec![
            Value::from(channel_id),
            Value::from(user_id),
            Value::from(auth_key),
        ],
        id,
    }
}

/// Build a `msg` method frame carrying one chat message body.
pub(crate) fn msg_method(text: &str, id: u64) -> Packet {
    Packet::Method {
        method: method::MSG.to_string(),
        arguments: vec![Value::from(text)],
        id,
    }
}

// ── Event Mapping ────────────────────────────────────────────

/// Map a server event to a [`ChatEvent`].
///
/// Returns `None` for events the bot does not handle and for payloads
/// that do not deserialize.
pub(crate) fn parse_event(name: &str, data: Option<&Value>) -> Option<ChatEvent> {
    let Some(data) = data else {
        trace!(event = name, "Ignoring event without payload");
        return None;
    };

    match name {
        event::USER_JOIN => match serde_json::from_value::<UserJoinPayload>(data.clone()) {
            Ok(payload) => Some(ChatEvent::UserJoined {
                username: payload.username,
            }),
            Err(e) => {
                warn!(error = %e, "Malformed UserJoin payload");
                None
            },
        },
        event::CHAT_MESSAGE => match serde_json::from_value::<ChatMessagePayload>(data.clone()) {
            Ok(payload) => Some(ChatEvent::MessageReceived {
                username: payload.user_name,
                message_parts: payload.message.message,
            }),
            Err(e) => {
                warn!(error = %e, "Malformed ChatMessage payload");
                None
            },
        },
        _ => {
            trace!(event = name, "Ignoring unhandled event");
            None
        },
    }
}
