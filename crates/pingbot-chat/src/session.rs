//! The live chat session: lifecycle state machine, outbound calls, and
//! serialized event dispatch.
//!
//! One task drives [`Session::run`] and owns the read half; a background
//! writer task owns the write half and drains the outbound queue. Handler
//! execution is serialized by the session task itself, so handler-side
//! state needs no locking.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::SinkExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, trace, warn};

use pingbot_core::{ChatEvent, EventKind};

use crate::connection::{ChatConnection, WsReader, WsWriter, recv_packet};
use crate::error::{ChatError, ChatResult};
use crate::protocol::{self, Packet};

/// Outbound frame queue depth. Sends are fire-and-forget; overflow drops
/// the frame with a warning rather than applying backpressure.
const OUTBOUND_QUEUE: usize = 64;

// ── Lifecycle ────────────────────────────────────────────────

/// Lifecycle states of a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Socket opened; auth frame not yet sent.
    Connecting,
    /// Auth frame sent; acknowledgment pending.
    Authenticating,
    /// Authenticated. The only state in which inbound events are
    /// dispatched and outbound calls are accepted.
    Ready,
    /// Terminal. No automatic reconnect is attempted.
    Closed(CloseReason),
}

/// Why a session reached the `Closed` state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The server sent a close frame with this code.
    ServerClose(u16),
    /// A transport-level failure on the read path.
    Transport(String),
    /// The stream ended without a close frame.
    StreamEnded,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerClose(code) => write!(f, "server close (code {code})"),
            Self::Transport(detail) => write!(f, "transport failure: {detail}"),
            Self::StreamEnded => write!(f, "stream ended"),
        }
    }
}

// ── Outbound Handle ──────────────────────────────────────────

/// Clonable fire-and-forget handle for outbound chat messages.
///
/// Per-call failures are not surfaced; a dead connection shows up as the
/// session's `Closed` transition instead.
#[derive(Clone)]
pub struct ChatSender {
    outbound_tx: mpsc::Sender<Packet>,
    next_method_id: Arc<AtomicU64>,
}

impl ChatSender {
    /// Enqueue a `msg` call carrying `text`.
    pub fn send(&self, text: &str) {
        let id = self.next_method_id.fetch_add(1, Ordering::Relaxed);
        let packet = protocol::msg_method(text, id);
        if let Err(e) = self.outbound_tx.try_send(packet) {
            warn!(error = %e, "Dropping outbound chat message");
        }
    }
}

// ── Session ──────────────────────────────────────────────────

/// Handler invoked for dispatched events.
type Handler = Box<dyn FnMut(&ChatEvent) + Send>;

/// A live chat socket and its event dispatcher.
///
/// Created by [`crate::handshake::connect`]; exactly one per joined
/// channel. Registering handlers and sending messages are the only
/// mutations; the session ends when the transport closes.
pub struct Session {
    state: SessionState,
    reader: WsReader,
    handlers: Vec<(EventKind, Handler)>,
    sender: ChatSender,
    writer_task: JoinHandle<()>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap a fresh connection and spawn the writer task.
    pub(crate) fn new(conn: ChatConnection) -> Self {
        let (writer, reader) = conn.into_parts();
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE);
        let writer_task = spawn_writer(writer, outbound_rx);
        Self {
            state: SessionState::Connecting,
            reader,
            handlers: Vec::new(),
            sender: ChatSender {
                outbound_tx,
                next_method_id: Arc::new(AtomicU64::new(1)),
            },
            writer_task,
        }
    }

    /// Send the ordered auth triple and wait for the acknowledgment.
    ///
    /// Walks the session from `Connecting` through `Authenticating` to
    /// `Ready`. On failure the session is left for the caller to drop.
    pub(crate) async fn authenticate(
        &mut self,
        channel_id: u64,
        user_id: u64,
        auth_key: &str,
        timeout: Duration,
    ) -> ChatResult<()> {
        let frame = protocol::auth_method(channel_id, user_id, auth_key, protocol::AUTH_METHOD_ID);
        if self.sender.outbound_tx.send(frame).await.is_err() {
            return Err(ChatError::Protocol(
                "writer task exited before the auth frame was sent".into(),
            ));
        }
        self.state = SessionState::Authenticating;

        tokio::time::timeout(timeout, wait_for_auth_reply(&mut self.reader))
            .await
            .map_err(|_| ChatError::HandshakeTimeout)??;

        self.state = SessionState::Ready;
        Ok(())
    }

    /// Register a handler for `kind`.
    ///
    /// Handlers for one event instance run in registration order, each to
    /// completion, before the next event is dispatched. Registration is
    /// not deduplicated: registering the same handler twice dispatches it
    /// twice. Handlers registered before the session is ready simply have
    /// no events to process yet.
    pub fn on(&mut self, kind: EventKind, handler: impl FnMut(&ChatEvent) + Send + 'static) {
        self.handlers.push((kind, Box::new(handler)));
    }

    /// A clonable outbound handle, for handlers that need to reply.
    #[must_use]
    pub fn sender(&self) -> ChatSender {
        self.sender.clone()
    }

    /// Enqueue a chat message (fire-and-forget).
    pub fn send(&self, text: &str) {
        self.sender.send(text);
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Drive the session until the transport closes.
    ///
    /// Reads frames, maps server events, and dispatches them to the
    /// registered handlers. Returns the reason recorded on the terminal
    /// `Closed` state; there is no automatic reconnect.
    pub async fn run(&mut self) -> CloseReason {
        let reason = loop {
            match recv_packet(&mut self.reader).await {
                Ok(Some(Packet::Event { event, data })) => {
                    if let Some(chat_event) = protocol::parse_event(&event, data.as_ref()) {
                        self.dispatch(&chat_event);
                    }
                },
                Ok(Some(Packet::Reply { id, error, .. })) => {
                    // Replies to msg calls; delivery is fire-and-forget.
                    match error {
                        Some(detail) => debug!(id, error = %detail, "Server rejected a method call"),
                        None => trace!(id, "Method acknowledged"),
                    }
                },
                Ok(Some(Packet::Method { method, .. })) => {
                    trace!(method = %method, "Ignoring server-initiated method");
                },
                Ok(None) => break CloseReason::StreamEnded,
                Err(ChatError::Closed(code)) => break CloseReason::ServerClose(code),
                Err(ChatError::Json(e)) => {
                    warn!(error = %e, "Failed to parse chat frame");
                },
                Err(e) => break CloseReason::Transport(e.to_string()),
            }
        };

        self.state = SessionState::Closed(reason.clone());
        self.writer_task.abort();
        reason
    }

    /// Dispatch one event to every matching handler, in registration
    /// order, each run to completion.
    fn dispatch(&mut self, event: &ChatEvent) {
        let kind = event.kind();
        for (registered, handler) in &mut self.handlers {
            if *registered == kind {
                handler(event);
            }
        }
    }
}

/// Wait for the reply correlated with the auth method.
async fn wait_for_auth_reply(reader: &mut WsReader) -> ChatResult<()> {
    loop {
        match recv_packet(reader).await? {
            Some(Packet::Reply { error, id, .. }) if id == protocol::AUTH_METHOD_ID => {
                return match error {
                    None => Ok(()),
                    Some(detail) => Err(ChatError::AuthKeyRejected(detail.to_string())),
                };
            },
            Some(other) => {
                // Frames may arrive before the acknowledgment; nothing is
                // dispatched until the session is ready.
                trace!(?other, "Ignoring frame before the auth acknowledgment");
            },
            None => {
                return Err(ChatError::Protocol(
                    "connection closed before the auth acknowledgment".into(),
                ));
            },
        }
    }
}

/// Spawn the writer task: owns the sink, drains the outbound queue.
fn spawn_writer(mut writer: WsWriter, mut outbound_rx: mpsc::Receiver<Packet>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(packet) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&packet) {
                Ok(j) => j,
                Err(e) => {
                    error!(error = %e, "Failed to serialize outbound frame");
                    continue;
                },
            };
            if let Err(e) = writer.send(Message::Text(json.into())).await {
                debug!(error = %e, "Writer task: send failed");
                break;
            }
        }
    })
}
