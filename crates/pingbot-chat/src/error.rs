//! Error types for the chat-session lifecycle.

use chrono::{DateTime, Utc};

/// Errors produced across the chat-session lifecycle, from credential
/// attachment through the live session.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The bearer credential's expiry has passed.
    #[error("bearer credential expired at {expired_at}")]
    ExpiredCredential {
        /// When the credential stopped being valid.
        expired_at: DateTime<Utc>,
    },

    /// The platform rejected an authenticated metadata request.
    #[error("metadata request rejected (HTTP {status})")]
    AuthRejected {
        /// HTTP status code of the rejection.
        status: u16,
    },

    /// The requested channel does not exist.
    #[error("channel not found: {channel_id}")]
    ChannelNotFound {
        /// The channel id that was looked up.
        channel_id: u64,
    },

    /// HTTP transport failure talking to the platform REST API.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// No auth acknowledgment arrived within the handshake window.
    #[error("timed out waiting for the auth acknowledgment")]
    HandshakeTimeout,

    /// The chat server rejected the auth key.
    #[error("chat server rejected the auth key: {0}")]
    AuthKeyRejected(String),

    /// `WebSocket` transport error.
    #[error("websocket error: {0}")]
    Transport(Box<tokio_tungstenite::tungstenite::Error>),

    /// The chat server closed the connection with a code.
    #[error("connection closed with code {0}")]
    Closed(u16),

    /// A frame failed to serialize or deserialize.
    #[error("malformed chat frame: {0}")]
    Json(#[from] serde_json::Error),

    /// Protocol violation from the chat server.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for ChatError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// Result type for chat-session operations.
pub type ChatResult<T> = Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = ChatError::AuthRejected { status: 401 };
        assert!(err.to_string().contains("401"));

        let err = ChatError::ChannelNotFound { channel_id: 99 };
        assert!(err.to_string().contains("99"));

        let err = ChatError::HandshakeTimeout;
        assert!(err.to_string().contains("auth acknowledgment"));

        let err = ChatError::AuthKeyRejected("bad key".to_string());
        assert!(err.to_string().contains("bad key"));

        let err = ChatError::Protocol("empty endpoint list".to_string());
        assert!(err.to_string().contains("empty endpoint list"));
    }

    #[test]
    fn closed_error_carries_code() {
        let err = ChatError::Closed(4049);
        assert!(err.to_string().contains("4049"));
    }

    #[test]
    fn expired_credential_names_the_instant() {
        let expired_at = Utc::now();
        let err = ChatError::ExpiredCredential { expired_at };
        assert!(err.to_string().contains(&expired_at.to_string()));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChatError>();
    }
}
