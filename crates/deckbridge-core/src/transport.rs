//! Transport abstraction for message-oriented connections.
//!
//! A connection is a pair of halves carrying whole text messages. Production
//! uses WebSocket text frames; tests use in-memory channels or simulated TCP
//! with line framing. Splitting the halves lets one task read while another
//! owns writes.

use std::io;

use async_trait::async_trait;

/// Opens connections to a server.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Write half of a connection.
    type Sink: MessageSink;

    /// Read half of a connection.
    type Stream: MessageStream;

    /// Connect to `url`.
    ///
    /// Resolves once the connection is open and ready for messages.
    async fn connect(&self, url: &str) -> io::Result<(Self::Sink, Self::Stream)>;
}

/// Write half of a connection.
#[async_trait]
pub trait MessageSink: Send + 'static {
    /// Send one text message.
    async fn send(&mut self, text: String) -> io::Result<()>;

    /// Close the connection. Closing twice is a no-op.
    async fn close(&mut self) -> io::Result<()>;
}

/// Read half of a connection.
#[async_trait]
pub trait MessageStream: Send + 'static {
    /// Receive the next text message.
    ///
    /// Returns `Ok(None)` once the peer has closed the connection.
    async fn recv(&mut self) -> io::Result<Option<String>>;
}
