//! Byte transport used by a session.

use bytes::Bytes;
use std::future::Future;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// Moves raw bytes between the session and the peer.
///
/// Once compression or encryption is enabled the transport applies it to
/// every later byte in both directions. [`Transport::receive`] must keep
/// yielding uncompressed frames in the plain `length ++ id ++ fields` layout.
pub trait Transport {
    /// Writes all of `data`.
    fn send(&mut self, data: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    /// Reads the next available chunk. An empty chunk means the peer closed
    /// the connection.
    fn receive(&mut self) -> impl Future<Output = io::Result<Bytes>> + Send;

    /// Starts the stream cipher keyed by `shared_secret`.
    fn enable_encryption(&mut self, shared_secret: &[u8]) -> io::Result<()>;

    /// Applies a compression threshold; negative disables compression.
    fn enable_compression(&mut self, threshold: i32) -> io::Result<()>;
}

/// Transport over any tokio byte stream, without cipher or compression
/// support.
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: S,
    read_buf: Vec<u8>,
}

pub type TcpTransport = StreamTransport<TcpStream>;

impl<S> StreamTransport<S> {
    pub fn new(stream: S, read_buffer_size: usize) -> Self {
        Self {
            stream,
            read_buf: vec![0u8; read_buffer_size],
        }
    }
}

impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write_all(data).await?;
        self.stream.flush().await
    }

    async fn receive(&mut self) -> io::Result<Bytes> {
        let n = self.stream.read(&mut self.read_buf).await?;
        Ok(Bytes::copy_from_slice(&self.read_buf[..n]))
    }

    fn enable_encryption(&mut self, _shared_secret: &[u8]) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "stream transport has no cipher",
        ))
    }

    fn enable_compression(&mut self, threshold: i32) -> io::Result<()> {
        if threshold < 0 {
            return Ok(());
        }
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "stream transport has no compression",
        ))
    }
}
