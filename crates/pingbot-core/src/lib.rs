//! Pingbot Core - Domain types for the pingbot chat bot.
//!
//! This crate provides:
//! - The bearer [`Credential`] and its expiry handling
//! - The authenticated [`Identity`] and the per-join [`ConnectionDescriptor`]
//! - The [`ChatEvent`] variants dispatched to bot handlers

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod credential;
pub mod event;
pub mod identity;

pub use credential::Credential;
pub use event::{ChatEvent, EventKind, MessageFragment, joined_text};
pub use identity::{ConnectionDescriptor, Identity};
