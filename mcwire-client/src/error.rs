//! Client error types.

use crate::auth::AuthError;
use mcwire_protocol::{ConnectionState, ProtocolError};
use std::fmt;
use thiserror::Error;

/// The exchange a client was in when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Handshake,
    Status,
    Login,
    Encryption,
    Play,
}

impl From<ConnectionState> for Phase {
    fn from(state: ConnectionState) -> Self {
        match state {
            ConnectionState::Handshaking => Phase::Handshake,
            ConnectionState::Status => Phase::Status,
            ConnectionState::Login => Phase::Login,
            ConnectionState::Play => Phase::Play,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Handshake => "handshake",
            Phase::Status => "status",
            Phase::Login => "login",
            Phase::Encryption => "encryption",
            Phase::Play => "play",
        };
        f.write_str(name)
    }
}

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("protocol error during {phase}: {source}")]
    Protocol {
        phase: Phase,
        #[source]
        source: ProtocolError,
    },

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("read timeout")]
    Timeout,

    #[error("disconnected by server: {reason}")]
    Disconnected { reason: String },

    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),

    #[error("encryption handoff failed: {0}")]
    Encryption(String),

    #[error("invalid state: expected {expected}, connection is in {actual}")]
    InvalidState {
        expected: ConnectionState,
        actual: ConnectionState,
    },

    #[error("pong payload {received} does not match ping payload {sent}")]
    PingMismatch { sent: i64, received: i64 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub(crate) fn protocol(phase: Phase, source: ProtocolError) -> Self {
        ClientError::Protocol { phase, source }
    }

    /// Returns the phase for protocol errors.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            ClientError::Protocol { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Returns whether the peer and this client disagree about the byte
    /// stream: an unexpected packet, a schema that does not fit the frame,
    /// or a corrupt length.
    pub fn is_protocol_desync(&self) -> bool {
        match self {
            ClientError::Protocol { source, .. } => source.is_desync(),
            ClientError::PingMismatch { .. } => true,
            _ => false,
        }
    }

    /// Returns whether the error came from input that ended early.
    pub fn is_truncated(&self) -> bool {
        match self {
            ClientError::Protocol { source, .. } => source.is_truncated(),
            ClientError::ConnectionClosed => true,
            _ => false,
        }
    }

    /// Returns whether the account service refused the credentials.
    pub fn is_authentication(&self) -> bool {
        matches!(self, ClientError::Authentication(_))
    }
}
