//! Pingbot Chat - the chat-session lifecycle.
//!
//! This crate provides:
//! - [`MetadataClient`] for the "who am I" and "how do I connect" lookups
//! - The chat wire protocol (`auth`/`msg` methods, `UserJoin`/`ChatMessage`
//!   events)
//! - [`handshake::connect`] to upgrade a raw connection into an
//!   authenticated [`Session`]
//! - The [`Session`] event dispatcher and its [`ChatSender`] outbound handle

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod connection;
mod error;
pub mod handshake;
mod protocol;
mod rest;
mod session;

pub use error::{ChatError, ChatResult};
pub use rest::MetadataClient;
pub use session::{ChatSender, CloseReason, Session, SessionState};
