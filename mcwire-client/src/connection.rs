//! Connection settings and TCP connect.

use crate::error::ClientError;
use crate::session::Session;
use crate::transport::{StreamTransport, TcpTransport};
use mcwire_protocol::{DEFAULT_PORT, MAX_FRAME_SIZE, PROTOCOL_VERSION};
use std::time::Duration;
use tokio::net::TcpStream;

/// Default read buffer size (8 KiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// Minimum read buffer size (1 KiB).
pub const MIN_READ_BUFFER_SIZE: usize = 1024;

/// Maximum read buffer size (1 MiB).
pub const MAX_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server host, sent verbatim in the handshake.
    pub host: String,
    pub port: u16,
    /// Protocol version announced in the handshake.
    pub protocol_version: i32,
    /// Name used by offline logins.
    pub username: String,
    pub connect_timeout: Duration,
    /// Upper bound on every wait for inbound bytes.
    pub read_timeout: Duration,
    /// Read buffer size for socket reads.
    pub read_buffer_size: usize,
    pub max_frame_size: usize,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            protocol_version: PROTOCOL_VERSION,
            username: "Player".to_string(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            max_frame_size: MAX_FRAME_SIZE,
        }
    }

    pub fn with_protocol_version(mut self, version: i32) -> Self {
        self.protocol_version = version;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.clamp(MIN_READ_BUFFER_SIZE, MAX_READ_BUFFER_SIZE);
        self
    }

    pub fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// `host:port` for socket connects.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_PORT)
    }
}

/// Opens a TCP connection and wraps it in a session in the handshaking
/// state.
pub async fn connect(config: ConnectionConfig) -> Result<Session<TcpTransport>, ClientError> {
    let addr = config.addr();
    tracing::debug!("Connecting to {}...", addr);

    let stream = tokio::time::timeout(config.connect_timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| {
            tracing::debug!("Connection timeout");
            ClientError::Timeout
        })?
        .map_err(|e| {
            tracing::debug!("Connection failed: {}", e);
            ClientError::Transport(e)
        })?;

    // Frames are small and latency-bound
    stream.set_nodelay(true).ok();
    tracing::debug!("TCP connected to {}", addr);

    let transport = StreamTransport::new(stream, config.read_buffer_size);
    Ok(Session::new(transport, config))
}
