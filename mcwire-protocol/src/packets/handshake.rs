//! Handshake packet definitions.
//!
//! The handshake is the first packet sent by the client and determines
//! whether this is a status ping or a login attempt. The server never
//! acknowledges it.

use crate::error::ProtocolError;
use crate::packet::{ConnectionState, Direction, FieldSpec, Packet, PacketSchema};
use crate::packets::TypedPacket;
use crate::value::{FieldKind, Value};
use serde::{Deserialize, Serialize};

pub const HANDSHAKE: PacketSchema = PacketSchema {
    name: "Handshake",
    id: 0x00,
    state: ConnectionState::Handshaking,
    direction: Direction::Serverbound,
    fields: &[
        FieldSpec::new("protocol_version", FieldKind::VarInt),
        FieldSpec::new("server_address", FieldKind::String),
        FieldSpec::new("server_port", FieldKind::UnsignedShort),
        FieldSpec::new("next_state", FieldKind::VarInt),
    ],
};

/// The next state after handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NextState {
    /// Status request (server list ping).
    Status = 1,
    /// Login request.
    Login = 2,
}

impl TryFrom<i32> for NextState {
    type Error = ProtocolError;

    fn try_from(value: i32) -> Result<Self, ProtocolError> {
        match value {
            1 => Ok(Self::Status),
            2 => Ok(Self::Login),
            _ => Err(ProtocolError::InvalidNextState(value)),
        }
    }
}

impl From<NextState> for ConnectionState {
    fn from(next: NextState) -> Self {
        match next {
            NextState::Status => ConnectionState::Status,
            NextState::Login => ConnectionState::Login,
        }
    }
}

/// Handshake packet sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    /// The protocol version the client is using.
    pub protocol_version: i32,
    /// The server address the client connected to.
    pub server_address: String,
    /// The server port the client connected to.
    pub server_port: u16,
    /// The next state: Status (1) or Login (2).
    pub next_state: NextState,
}

impl TypedPacket for Handshake {
    const SCHEMA: &'static PacketSchema = &HANDSHAKE;

    fn to_fields(&self) -> Vec<Value> {
        vec![
            Value::VarInt(self.protocol_version),
            Value::String(self.server_address.clone()),
            Value::UnsignedShort(self.server_port),
            Value::VarInt(self.next_state as i32),
        ]
    }

    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError> {
        Ok(Self {
            protocol_version: packet.get("protocol_version", Value::as_i32)?,
            server_address: packet.get("server_address", Value::as_str)?.to_owned(),
            server_port: packet.get("server_port", Value::as_u16)?,
            next_state: NextState::try_from(packet.get("next_state", Value::as_i32)?)?,
        })
    }
}
