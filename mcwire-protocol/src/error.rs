//! Protocol error types.

use crate::packet::{ConnectionState, Direction};
use crate::value::FieldKind;
use thiserror::Error;

/// Protocol-level errors that can occur while decoding values, parsing
/// packets or splitting frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("truncated buffer: need {needed} bytes, {available} available")]
    TruncatedBuffer { needed: usize, available: usize },

    #[error("malformed VarInt: no terminating byte within {max_bytes} bytes")]
    MalformedVarInt { max_bytes: usize },

    #[error("VarInt overflow: value exceeds {bits} bits")]
    VarIntOverflow { bits: u32 },

    #[error("frame of {length} bytes ends inside its packet id")]
    MalformedFrame { length: usize },

    #[error("malformed boolean: {0:#04x}")]
    MalformedBoolean(u8),

    #[error("invalid UTF-8 in string payload")]
    InvalidUtf8,

    #[error("negative length prefix: {0}")]
    NegativeLength(i32),

    #[error("unexpected packet id {id:#04x} for {direction} {state} packets")]
    UnexpectedPacketId {
        id: i32,
        state: ConnectionState,
        direction: Direction,
    },

    #[error("schema mismatch in {packet}: fields end at byte {consumed}, frame ends at byte {declared}")]
    SchemaMismatch {
        packet: &'static str,
        consumed: usize,
        declared: usize,
    },

    #[error("field {field} of {packet} expects {expected}, got {actual}")]
    FieldKindMismatch {
        packet: &'static str,
        field: &'static str,
        expected: FieldKind,
        actual: FieldKind,
    },

    #[error("{packet} expects {expected} fields, got {actual}")]
    FieldCount {
        packet: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("invalid next state: {0}")]
    InvalidNextState(i32),

    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Returns whether more input could resolve this error on a streaming
    /// transport.
    pub fn is_truncated(&self) -> bool {
        matches!(self, ProtocolError::TruncatedBuffer { .. })
    }

    /// Returns whether this error means the peers disagree about the
    /// packet layout or sequence.
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            ProtocolError::UnexpectedPacketId { .. }
                | ProtocolError::SchemaMismatch { .. }
                | ProtocolError::MalformedVarInt { .. }
                | ProtocolError::VarIntOverflow { .. }
                | ProtocolError::MalformedFrame { .. }
        )
    }
}
