//! Turmoil-backed transport.
//!
//! Carries envelopes over simulated TCP, one per line, so the client can be
//! exercised under packet loss, latency and partitions. The URL scheme is
//! ignored; `ws://server:9000` dials `server:9000`.

use std::io;

use async_trait::async_trait;
use deckbridge_core::{MessageSink, MessageStream, Transport};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tracing::debug;
use turmoil::net::{TcpListener, TcpStream};

/// Opens simulated TCP connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimTransport;

/// Write half of a simulated connection.
pub struct SimSink(WriteHalf<TcpStream>);

/// Read half of a simulated connection.
pub struct SimStream(BufReader<ReadHalf<TcpStream>>);

#[async_trait]
impl Transport for SimTransport {
    type Sink = SimSink;
    type Stream = SimStream;

    async fn connect(&self, url: &str) -> io::Result<(SimSink, SimStream)> {
        let addr = url.split_once("://").map_or(url, |(_, rest)| rest).trim_end_matches('/');
        debug!(%addr, "dialing simulated server");

        let stream = TcpStream::connect(addr).await?;
        let (read, write) = tokio::io::split(stream);
        Ok((SimSink(write), SimStream(BufReader::new(read))))
    }
}

#[async_trait]
impl MessageSink for SimSink {
    async fn send(&mut self, text: String) -> io::Result<()> {
        write_line(&mut self.0, &text).await
    }

    async fn close(&mut self) -> io::Result<()> {
        self.0.shutdown().await
    }
}

#[async_trait]
impl MessageStream for SimStream {
    async fn recv(&mut self) -> io::Result<Option<String>> {
        read_line(&mut self.0).await
    }
}

/// Line-framed simulated server.
pub struct LineListener(TcpListener);

/// Server end of one line-framed connection.
pub struct LineConn {
    reader: BufReader<ReadHalf<TcpStream>>,
    writer: WriteHalf<TcpStream>,
}

impl LineListener {
    /// Listen on `addr`, e.g. `0.0.0.0:9000`.
    pub async fn bind(addr: &str) -> io::Result<Self> {
        Ok(Self(TcpListener::bind(addr).await?))
    }

    /// Wait for the next client.
    pub async fn accept(&self) -> io::Result<LineConn> {
        let (stream, peer) = self.0.accept().await?;
        debug!(%peer, "accepted simulated client");
        let (read, write) = tokio::io::split(stream);
        Ok(LineConn { reader: BufReader::new(read), writer: write })
    }
}

impl LineConn {
    /// Send one message.
    pub async fn send(&mut self, text: &str) -> io::Result<()> {
        write_line(&mut self.writer, text).await
    }

    /// Receive one message. `None` once the client hangs up.
    pub async fn recv(&mut self) -> io::Result<Option<String>> {
        read_line(&mut self.reader).await
    }
}

async fn write_line(writer: &mut WriteHalf<TcpStream>, text: &str) -> io::Result<()> {
    writer.write_all(text.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

async fn read_line(reader: &mut BufReader<ReadHalf<TcpStream>>) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
