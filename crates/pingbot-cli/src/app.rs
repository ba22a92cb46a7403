//! Startup sequencing: credential → identity → descriptor → handshake →
//! event loop.
//!
//! Every startup-phase failure is fatal: it propagates with context and
//! exits the process non-zero rather than hanging silently.

use anyhow::Context;
use tracing::{info, warn};

use pingbot_chat::{MetadataClient, handshake};
use pingbot_core::Credential;

use crate::bot;
use crate::config::Config;

/// Announcement sent immediately after the handshake, before any inbound
/// event is processed.
const CONNECTED_ANNOUNCEMENT: &str = "Hi! I'm connected!";

/// Run the bot until the session closes or Ctrl-C arrives.
///
/// # Errors
///
/// Any failure between the identity fetch and the handshake, and a
/// post-ready close (the close reason is part of the diagnostic).
pub async fn run(config: Config) -> anyhow::Result<()> {
    let credential = Credential::issued_now(config.token);
    let client = MetadataClient::new(&config.api_base, credential);

    let identity = client
        .current_identity()
        .await
        .context("failed to fetch the authenticated identity")?;
    info!(
        username = %identity.username,
        user_id = identity.user_id,
        channel_id = identity.channel_id,
        "Authenticated"
    );

    // The bot joins its own channel unless told otherwise.
    let channel_id = config.channel.unwrap_or(identity.channel_id);
    let descriptor = client
        .connection_descriptor(channel_id)
        .await
        .context("failed to fetch the chat connection descriptor")?;

    let mut session = handshake::connect(
        &descriptor.endpoints,
        channel_id,
        identity.user_id,
        &descriptor.auth_key,
    )
    .await
    .context("chat handshake failed")?;

    session.send(CONNECTED_ANNOUNCEMENT);
    bot::bind(&mut session);

    tokio::select! {
        reason = session.run() => {
            warn!(reason = %reason, "Chat session closed");
            anyhow::bail!("chat session closed: {reason}");
        }
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for the shutdown signal")?;
            info!("Shutting down");
            Ok(())
        }
    }
}
