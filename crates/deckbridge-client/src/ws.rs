//! WebSocket transport.
//!
//! One envelope per text frame. Pings are answered by tungstenite; binary
//! frames are not part of the protocol and are skipped.

use std::io;

use async_trait::async_trait;
use deckbridge_core::{MessageSink, MessageStream, Transport};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Error as WsError, protocol::Message},
};
use tracing::debug;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens WebSocket connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

/// Write half of a WebSocket connection.
pub struct WsSink(SplitSink<Socket, Message>);

/// Read half of a WebSocket connection.
pub struct WsStream(SplitStream<Socket>);

#[async_trait]
impl Transport for WsTransport {
    type Sink = WsSink;
    type Stream = WsStream;

    async fn connect(&self, url: &str) -> io::Result<(WsSink, WsStream)> {
        debug!(%url, "connecting websocket");
        let (socket, _) = connect_async(url).await.map_err(io::Error::other)?;
        let (sink, stream) = socket.split();
        debug!(%url, "websocket connected");
        Ok((WsSink(sink), WsStream(stream)))
    }
}

#[async_trait]
impl MessageSink for WsSink {
    async fn send(&mut self, text: String) -> io::Result<()> {
        self.0.send(Message::Text(text)).await.map_err(io::Error::other)
    }

    async fn close(&mut self) -> io::Result<()> {
        match self.0.close().await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(io::Error::other(e)),
        }
    }
}

#[async_trait]
impl MessageStream for WsStream {
    async fn recv(&mut self) -> io::Result<Option<String>> {
        loop {
            match self.0.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(Message::Binary(data))) => {
                    debug!(len = data.len(), "skipping binary frame");
                },
                Some(Ok(_)) => {},
                Some(Err(e)) => return Err(io::Error::other(e)),
            }
        }
    }
}
