//! Login protocol packets.
//!
//! The login exchange starts with [`LoginStart`]. The server may then ask for
//! encryption ([`EncryptionRequest`]), enable compression
//! ([`SetCompression`]), refuse the player ([`LoginDisconnect`]) and finally
//! accept them with [`LoginSuccess`], which moves the connection to play.

use crate::error::ProtocolError;
use crate::packet::{ConnectionState, Direction, FieldSpec, Packet, PacketSchema};
use crate::packets::TypedPacket;
use crate::value::{FieldKind, Value};
use bytes::Bytes;
use uuid::Uuid;

// =============================================================================
// Serverbound
// =============================================================================

pub const LOGIN_START: PacketSchema = PacketSchema {
    name: "LoginStart",
    id: 0x00,
    state: ConnectionState::Login,
    direction: Direction::Serverbound,
    fields: &[FieldSpec::new("name", FieldKind::String)],
};

pub const ENCRYPTION_RESPONSE: PacketSchema = PacketSchema {
    name: "EncryptionResponse",
    id: 0x01,
    state: ConnectionState::Login,
    direction: Direction::Serverbound,
    fields: &[
        FieldSpec::new("shared_secret", FieldKind::ByteArray),
        FieldSpec::new("verify_token", FieldKind::ByteArray),
    ],
};

// =============================================================================
// Clientbound
// =============================================================================

pub const LOGIN_DISCONNECT: PacketSchema = PacketSchema {
    name: "LoginDisconnect",
    id: 0x00,
    state: ConnectionState::Login,
    direction: Direction::Clientbound,
    fields: &[FieldSpec::new("reason", FieldKind::String)],
};

pub const ENCRYPTION_REQUEST: PacketSchema = PacketSchema {
    name: "EncryptionRequest",
    id: 0x01,
    state: ConnectionState::Login,
    direction: Direction::Clientbound,
    fields: &[
        FieldSpec::new("server_id", FieldKind::String),
        FieldSpec::new("public_key", FieldKind::ByteArray),
        FieldSpec::new("verify_token", FieldKind::ByteArray),
    ],
};

pub const LOGIN_SUCCESS: PacketSchema = PacketSchema {
    name: "LoginSuccess",
    id: 0x02,
    state: ConnectionState::Login,
    direction: Direction::Clientbound,
    fields: &[
        FieldSpec::new("uuid", FieldKind::String),
        FieldSpec::new("username", FieldKind::String),
    ],
};

pub const SET_COMPRESSION: PacketSchema = PacketSchema {
    name: "SetCompression",
    id: 0x03,
    state: ConnectionState::Login,
    direction: Direction::Clientbound,
    fields: &[FieldSpec::new("threshold", FieldKind::VarInt)],
};

/// Login Start packet (client -> server).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginStart {
    /// The player's username.
    pub name: String,
}

impl LoginStart {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl TypedPacket for LoginStart {
    const SCHEMA: &'static PacketSchema = &LOGIN_START;

    fn to_fields(&self) -> Vec<Value> {
        vec![Value::String(self.name.clone())]
    }

    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError> {
        Ok(Self::new(packet.get("name", Value::as_str)?))
    }
}

/// Encryption Response packet (client -> server).
///
/// Both values are encrypted with the server's public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionResponse {
    pub shared_secret: Bytes,
    pub verify_token: Bytes,
}

impl TypedPacket for EncryptionResponse {
    const SCHEMA: &'static PacketSchema = &ENCRYPTION_RESPONSE;

    fn to_fields(&self) -> Vec<Value> {
        vec![
            Value::ByteArray(self.shared_secret.clone()),
            Value::ByteArray(self.verify_token.clone()),
        ]
    }

    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError> {
        Ok(Self {
            shared_secret: packet.get("shared_secret", Value::as_bytes)?.clone(),
            verify_token: packet.get("verify_token", Value::as_bytes)?.clone(),
        })
    }
}

/// Disconnect packet sent during login (server -> client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginDisconnect {
    /// Chat component JSON.
    pub reason: String,
}

impl TypedPacket for LoginDisconnect {
    const SCHEMA: &'static PacketSchema = &LOGIN_DISCONNECT;

    fn to_fields(&self) -> Vec<Value> {
        vec![Value::String(self.reason.clone())]
    }

    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError> {
        Ok(Self {
            reason: packet.get("reason", Value::as_str)?.to_owned(),
        })
    }
}

/// Encryption Request packet (server -> client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionRequest {
    /// Server ID (empty on vanilla servers).
    pub server_id: String,
    /// The server's public key (DER-encoded).
    pub public_key: Bytes,
    /// Random verify token.
    pub verify_token: Bytes,
}

impl TypedPacket for EncryptionRequest {
    const SCHEMA: &'static PacketSchema = &ENCRYPTION_REQUEST;

    fn to_fields(&self) -> Vec<Value> {
        vec![
            Value::String(self.server_id.clone()),
            Value::ByteArray(self.public_key.clone()),
            Value::ByteArray(self.verify_token.clone()),
        ]
    }

    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError> {
        Ok(Self {
            server_id: packet.get("server_id", Value::as_str)?.to_owned(),
            public_key: packet.get("public_key", Value::as_bytes)?.clone(),
            verify_token: packet.get("verify_token", Value::as_bytes)?.clone(),
        })
    }
}

/// Login Success packet (server -> client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub uuid: Uuid,
    pub username: String,
}

impl TypedPacket for LoginSuccess {
    const SCHEMA: &'static PacketSchema = &LOGIN_SUCCESS;

    fn to_fields(&self) -> Vec<Value> {
        vec![
            Value::String(self.uuid.hyphenated().to_string()),
            Value::String(self.username.clone()),
        ]
    }

    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError> {
        let raw = packet.get("uuid", Value::as_str)?;
        let uuid = Uuid::parse_str(raw).map_err(|_| ProtocolError::InvalidUuid(raw.to_owned()))?;
        Ok(Self {
            uuid,
            username: packet.get("username", Value::as_str)?.to_owned(),
        })
    }
}

/// Set Compression packet (server -> client).
///
/// Frames whose body reaches `threshold` bytes are compressed from here on;
/// a negative threshold disables compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCompression {
    pub threshold: i32,
}

impl TypedPacket for SetCompression {
    const SCHEMA: &'static PacketSchema = &SET_COMPRESSION;

    fn to_fields(&self) -> Vec<Value> {
        vec![Value::VarInt(self.threshold)]
    }

    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError> {
        Ok(Self {
            threshold: packet.get("threshold", Value::as_i32)?,
        })
    }
}
