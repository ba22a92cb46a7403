//! Chat events dispatched to bot handlers.

use serde::{Deserialize, Serialize};

/// Kinds of chat event a handler can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A user joined the channel.
    UserJoined,
    /// A chat message was received.
    MessageReceived,
}

/// One fragment of a chat message body.
///
/// Messages arrive as an ordered sequence of typed fragments (text,
/// emoticons, links); `data` carries the textual content for all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFragment {
    /// Fragment kind as named by the server ("text", "emoticon", ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Textual content of the fragment.
    pub data: String,
}

impl MessageFragment {
    /// Create a text fragment.
    #[must_use]
    pub fn text(data: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            data: data.into(),
        }
    }
}

/// A structured event read from the chat socket.
///
/// Read-only to handlers; the dispatcher owns each instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A user joined the channel.
    UserJoined {
        /// Display name of the joiner.
        username: String,
    },
    /// A chat message arrived.
    MessageReceived {
        /// Display name of the sender.
        username: String,
        /// Ordered content fragments of the message body.
        message_parts: Vec<MessageFragment>,
    },
}

impl ChatEvent {
    /// The kind used for handler registration.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::UserJoined { .. } => EventKind::UserJoined,
            Self::MessageReceived { .. } => EventKind::MessageReceived,
        }
    }
}

/// Concatenate the textual content of `parts`, in order.
#[must_use]
pub fn joined_text(parts: &[MessageFragment]) -> String {
    parts.iter().map(|part| part.data.as_str()).collect()
}
