//! Identity and connection metadata fetched from the platform REST API.

/// The account owning the bearer token, as reported by the platform.
///
/// Immutable once fetched; used exactly once to derive the target channel
/// and to authenticate the chat socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Numeric user id, sent in the chat auth frame.
    pub user_id: u64,
    /// Display name of the account.
    pub username: String,
    /// The account's own channel id.
    pub channel_id: u64,
}

/// Connection details for one join attempt.
///
/// The auth key is single-use and short-lived: consume it in the handshake
/// immediately and discard the descriptor. It is never cached or reused
/// across handshake attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    /// Chat server endpoints, in preference order.
    pub endpoints: Vec<String>,
    /// Short-lived key authorizing the socket auth frame.
    pub auth_key: String,
}
