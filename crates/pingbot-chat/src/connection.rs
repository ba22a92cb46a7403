//! `WebSocket` connection management for the chat servers.
//!
//! Opens the persistent connection and owns the frame-level read path
//! shared by the handshake and the session's event loop.

use futures::StreamExt;
use futures::stream::{SplitSink, SplitStream};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::ChatError;
use crate::protocol::Packet;

/// Type alias for the websocket stream used by the session.
pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of the websocket.
pub(crate) type WsWriter = SplitSink<WsStream, Message>;

/// Read half of the websocket.
pub(crate) type WsReader = SplitStream<WsStream>;

/// A freshly opened connection to a chat server.
///
/// Split immediately into halves: the session's writer task takes the
/// sink, the session's event loop takes the stream.
pub(crate) struct ChatConnection {
    writer: WsWriter,
    reader: WsReader,
}

impl ChatConnection {
    /// Connect to the given chat endpoint.
    ///
    /// Returns an error on connection or TLS failure.
    pub(crate) async fn connect(url: &str) -> Result<Self, ChatError> {
        let (ws, _response) = connect_async(url).await?;
        let (writer, reader) = ws.split();
        Ok(Self { writer, reader })
    }

    /// Take the split halves.
    pub(crate) fn into_parts(self) -> (WsWriter, WsReader) {
        (self.writer, self.reader)
    }
}

/// Read the next frame from the reader half.
///
/// Returns `Ok(None)` if the stream ends without a close frame; a server
/// close frame is surfaced as [`ChatError::Closed`].
pub(crate) async fn recv_packet(reader: &mut WsReader) -> Result<Option<Packet>, ChatError> {
    loop {
        match reader.next().await {
            Some(Ok(Message::Text(text))) => {
                let packet: Packet = serde_json::from_str(&text)?;
                return Ok(Some(packet));
            },
            Some(Ok(Message::Close(frame))) => {
                let code = frame.as_ref().map_or(1000, |f| f.code.into());
                return Err(ChatError::Closed(code));
            },
            Some(Ok(_)) => {
                // Ping/pong handled by tungstenite; binary skipped.
            },
            Some(Err(e)) => return Err(e.into()),
            None => return Ok(None),
        }
    }
}
