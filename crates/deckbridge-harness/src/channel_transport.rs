//! In-memory transport.
//!
//! Each `connect` hands the test a [`ServerConn`] through a [`ChannelServer`],
//! standing in for the server side of the socket. The test decides when the
//! server speaks, fails or hangs up. Connect attempts are timestamped so
//! backoff schedules can be asserted against virtual time.

use std::{
    io,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use deckbridge_core::{MessageSink, MessageStream, Transport};
use tokio::{sync::mpsc, time::Instant};
use tracing::debug;

#[derive(Debug, Default)]
struct Shared {
    refuse: bool,
    attempts: Vec<Duration>,
    urls: Vec<String>,
}

/// Client side of the in-memory network.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    shared: Arc<Mutex<Shared>>,
    accepted: mpsc::UnboundedSender<ServerConn>,
    start: Instant,
}

/// Server side of the in-memory network.
#[derive(Debug)]
pub struct ChannelServer {
    accepted: mpsc::UnboundedReceiver<ServerConn>,
}

/// Server end of one connection.
///
/// Dropping it hangs up on the client.
#[derive(Debug)]
pub struct ServerConn {
    /// URL the client dialed
    pub url: String,
    to_client: Option<mpsc::UnboundedSender<io::Result<String>>>,
    from_client: mpsc::UnboundedReceiver<String>,
}

/// Client write half.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Option<mpsc::UnboundedSender<String>>,
}

/// Client read half.
#[derive(Debug)]
pub struct ChannelStream {
    rx: mpsc::UnboundedReceiver<io::Result<String>>,
}

impl ChannelTransport {
    /// Create a connected transport and server pair.
    pub fn new() -> (Self, ChannelServer) {
        let (accepted, rx) = mpsc::unbounded_channel();
        let transport =
            Self { shared: Arc::new(Mutex::new(Shared::default())), accepted, start: Instant::now() };
        (transport, ChannelServer { accepted: rx })
    }

    /// Refuse (or stop refusing) new connections.
    pub fn refuse_connections(&self, refuse: bool) {
        self.lock().refuse = refuse;
    }

    /// Number of connect attempts so far, refused or not.
    pub fn connect_attempts(&self) -> usize {
        self.lock().attempts.len()
    }

    /// Virtual time of each connect attempt, relative to construction.
    pub fn attempt_times(&self) -> Vec<Duration> {
        self.lock().attempts.clone()
    }

    /// URL of each connect attempt.
    pub fn dialed_urls(&self) -> Vec<String> {
        self.lock().urls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    type Sink = ChannelSink;
    type Stream = ChannelStream;

    async fn connect(&self, url: &str) -> io::Result<(ChannelSink, ChannelStream)> {
        let refuse = {
            let mut shared = self.lock();
            shared.attempts.push(self.start.elapsed());
            shared.urls.push(url.to_string());
            shared.refuse
        };

        if refuse {
            debug!(%url, "refusing connection");
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"));
        }

        let (to_client, client_rx) = mpsc::unbounded_channel();
        let (client_tx, from_client) = mpsc::unbounded_channel();
        let conn = ServerConn { url: url.to_string(), to_client: Some(to_client), from_client };

        self.accepted
            .send(conn)
            .map_err(|_| io::Error::new(io::ErrorKind::ConnectionRefused, "server gone"))?;

        Ok((ChannelSink { tx: Some(client_tx) }, ChannelStream { rx: client_rx }))
    }
}

#[async_trait]
impl MessageSink for ChannelSink {
    async fn send(&mut self, text: String) -> io::Result<()> {
        let Some(tx) = self.tx.as_ref() else {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
        };
        tx.send(text).map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "server hung up"))
    }

    async fn close(&mut self) -> io::Result<()> {
        self.tx = None;
        Ok(())
    }
}

#[async_trait]
impl MessageStream for ChannelStream {
    async fn recv(&mut self) -> io::Result<Option<String>> {
        match self.rx.recv().await {
            Some(Ok(text)) => Ok(Some(text)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

impl ChannelServer {
    /// Wait for the next connection.
    pub async fn accept(&mut self) -> Option<ServerConn> {
        self.accepted.recv().await
    }

    /// Next connection if one is already waiting.
    pub fn try_accept(&mut self) -> Option<ServerConn> {
        self.accepted.try_recv().ok()
    }
}

impl ServerConn {
    /// Send text to the client. Returns `false` once the client is gone.
    pub fn send(&self, text: impl Into<String>) -> bool {
        self.to_client.as_ref().is_some_and(|tx| tx.send(Ok(text.into())).is_ok())
    }

    /// Report a transport error to the client, then hang up.
    pub fn fail(&mut self, reason: &str) {
        if let Some(tx) = self.to_client.take() {
            let _ = tx.send(Err(io::Error::new(io::ErrorKind::ConnectionReset, reason.to_string())));
        }
    }

    /// Hang up.
    pub fn close(&mut self) {
        self.to_client = None;
    }

    /// Wait for the next message from the client. `None` once the client
    /// has closed its write half.
    pub async fn recv(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// Next message from the client if one is already waiting.
    pub fn try_recv(&mut self) -> Option<String> {
        self.from_client.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn messages_flow_both_ways() {
        let (transport, mut server) = ChannelTransport::new();
        let (mut sink, mut stream) = transport.connect("mem://deck").await.unwrap();
        let mut conn = server.accept().await.unwrap();
        assert_eq!(conn.url, "mem://deck");

        sink.send("hello".into()).await.unwrap();
        assert_eq!(conn.recv().await.as_deref(), Some("hello"));

        assert!(conn.send("world"));
        assert_eq!(stream.recv().await.unwrap().as_deref(), Some("world"));

        conn.close();
        assert_eq!(stream.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn refused_attempts_are_counted() {
        let (transport, _server) = ChannelTransport::new();
        transport.refuse_connections(true);

        let err = transport.connect("mem://deck").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
        assert_eq!(transport.connect_attempts(), 1);
    }

    #[tokio::test]
    async fn failure_then_eof() {
        let (transport, mut server) = ChannelTransport::new();
        let (_sink, mut stream) = transport.connect("mem://deck").await.unwrap();
        let mut conn = server.accept().await.unwrap();

        conn.fail("reset");
        assert!(stream.recv().await.is_err());
        assert_eq!(stream.recv().await.unwrap(), None);
    }
}
