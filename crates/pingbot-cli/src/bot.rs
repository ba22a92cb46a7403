//! Bot behavior: greet-on-join and the `!ping` command.
//!
//! Stateless reaction functions bound once to the ready session. Anything
//! that is not a ping is ignored; there is no help or unknown-command
//! response.

use tracing::info;

use pingbot_chat::Session;
use pingbot_core::{ChatEvent, EventKind, MessageFragment, joined_text};

/// Command prefix the bot answers to (matched case-insensitively).
const PING_PREFIX: &str = "!ping";

/// Greeting sent when a user joins the channel.
#[must_use]
pub fn greeting(username: &str) -> String {
    format!("Hi {username}! I'm pingbot! Write !ping and I will pong back!")
}

/// The reply for a message, if it is a ping command.
///
/// Concatenates the fragments' text in order, case-folds it, and matches
/// the literal `!ping` prefix.
#[must_use]
pub fn ping_reply(username: &str, parts: &[MessageFragment]) -> Option<String> {
    let text = joined_text(parts);
    if text.to_lowercase().starts_with(PING_PREFIX) {
        Some(format!("@{username} PONG!"))
    } else {
        None
    }
}

/// Bind the bot's handlers to a session.
///
/// Handlers are registered once, at startup; they dispatch only once the
/// session is ready.
pub fn bind(session: &mut Session) {
    let greeter = session.sender();
    session.on(EventKind::UserJoined, move |event| {
        if let ChatEvent::UserJoined { username } = event {
            greeter.send(&greeting(username));
        }
    });

    let ponger = session.sender();
    session.on(EventKind::MessageReceived, move |event| {
        if let ChatEvent::MessageReceived {
            username,
            message_parts,
        } = event
        {
            if let Some(reply) = ping_reply(username, message_parts) {
                ponger.send(&reply);
                info!(username = %username, "Ponged");
            }
        }
    });
}
