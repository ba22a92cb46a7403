//! Session handshake: upgrade a raw connection into an authenticated
//! session.

use std::time::Duration;

use tracing::{debug, info};

use crate::connection::ChatConnection;
use crate::error::{ChatError, ChatResult};
use crate::session::Session;

/// Default window for the auth acknowledgment.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(15);

/// Connect to the first endpoint and authenticate.
///
/// The auth frame carries `(channel_id, user_id, auth_key)` in exactly
/// that order; the chat servers reject any other ordering. Only the first
/// endpoint is attempted; the remaining entries are available
/// alternatives, not a fallback list.
///
/// # Errors
///
/// - [`ChatError::Protocol`] if `endpoints` is empty,
/// - [`ChatError::Transport`] for socket-level failures,
/// - [`ChatError::HandshakeTimeout`] if no acknowledgment arrives in time,
/// - [`ChatError::AuthKeyRejected`] if the server rejects the key,
/// - [`ChatError::Closed`] if the server closes before acknowledging.
pub async fn connect(
    endpoints: &[String],
    channel_id: u64,
    user_id: u64,
    auth_key: &str,
) -> ChatResult<Session> {
    connect_with_timeout(endpoints, channel_id, user_id, auth_key, HANDSHAKE_TIMEOUT).await
}

/// [`connect`] with an explicit acknowledgment window.
pub async fn connect_with_timeout(
    endpoints: &[String],
    channel_id: u64,
    user_id: u64,
    auth_key: &str,
    timeout: Duration,
) -> ChatResult<Session> {
    let endpoint = endpoints
        .first()
        .ok_or_else(|| ChatError::Protocol("empty endpoint list".into()))?;
    if endpoints.len() > 1 {
        debug!(
            alternatives = endpoints.len().saturating_sub(1),
            "Ignoring alternative endpoints"
        );
    }

    info!(endpoint = %endpoint, channel_id, "Connecting to chat server");
    let conn = ChatConnection::connect(endpoint).await?;

    debug!(channel_id, user_id, "Authenticating chat socket");
    let mut session = Session::new(conn);
    session
        .authenticate(channel_id, user_id, auth_key, timeout)
        .await?;

    info!(channel_id, "Chat session ready");
    Ok(session)
}
