//! Packet schemas and typed views, organized by connection state:
//! - Handshake: initial connection state
//! - Status: server list ping
//! - Login: authentication, encryption and compression negotiation
//! - Play: the first packets a server sends after login

pub mod handshake;
pub mod login;
pub mod play;
pub mod status;

pub use handshake::{Handshake, NextState};
pub use login::{
    EncryptionRequest, EncryptionResponse, LoginDisconnect, LoginStart, LoginSuccess,
    SetCompression,
};
pub use play::{JoinGame, PlayerAbilities, PluginMessage, ServerDifficulty, SpawnPosition};
pub use status::{Ping, Pong, ServerStatus, StatusRequest, StatusResponse};

use crate::error::ProtocolError;
use crate::packet::{ConnectionState, Direction, Packet, PacketSchema};
use crate::value::Value;

/// A strongly typed view over one packet schema.
pub trait TypedPacket: Sized {
    /// The schema this type reads and writes.
    const SCHEMA: &'static PacketSchema;

    /// Field values in schema order.
    fn to_fields(&self) -> Vec<Value>;

    /// Extracts the typed view from a packet already checked against
    /// [`Self::SCHEMA`].
    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError>;

    fn to_packet(&self) -> Packet {
        Packet::from_parts(Self::SCHEMA, self.to_fields())
    }

    /// Converts a parsed packet into this type.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnexpectedPacketId`] if the packet has a
    /// different schema.
    fn from_packet(packet: &Packet) -> Result<Self, ProtocolError> {
        if packet.schema() != Self::SCHEMA {
            return Err(ProtocolError::UnexpectedPacketId {
                id: packet.id(),
                state: Self::SCHEMA.state,
                direction: Self::SCHEMA.direction,
            });
        }
        Self::from_fields(packet)
    }
}

static HANDSHAKING_SERVERBOUND: [&PacketSchema; 1] = [&handshake::HANDSHAKE];

static STATUS_CLIENTBOUND: [&PacketSchema; 2] = [&status::STATUS_RESPONSE, &status::PONG];
static STATUS_SERVERBOUND: [&PacketSchema; 2] = [&status::STATUS_REQUEST, &status::PING];

static LOGIN_CLIENTBOUND: [&PacketSchema; 4] = [
    &login::LOGIN_DISCONNECT,
    &login::ENCRYPTION_REQUEST,
    &login::LOGIN_SUCCESS,
    &login::SET_COMPRESSION,
];
static LOGIN_SERVERBOUND: [&PacketSchema; 2] =
    [&login::LOGIN_START, &login::ENCRYPTION_RESPONSE];

static PLAY_CLIENTBOUND: [&PacketSchema; 5] = [
    &play::SERVER_DIFFICULTY,
    &play::PLUGIN_MESSAGE_CLIENTBOUND,
    &play::JOIN_GAME,
    &play::PLAYER_ABILITIES,
    &play::SPAWN_POSITION,
];
static PLAY_SERVERBOUND: [&PacketSchema; 1] = [&play::PLUGIN_MESSAGE_SERVERBOUND];

/// All known schemas for a state and direction.
pub fn schemas(state: ConnectionState, direction: Direction) -> &'static [&'static PacketSchema] {
    match (state, direction) {
        (ConnectionState::Handshaking, Direction::Serverbound) => &HANDSHAKING_SERVERBOUND,
        (ConnectionState::Handshaking, Direction::Clientbound) => &[],
        (ConnectionState::Status, Direction::Clientbound) => &STATUS_CLIENTBOUND,
        (ConnectionState::Status, Direction::Serverbound) => &STATUS_SERVERBOUND,
        (ConnectionState::Login, Direction::Clientbound) => &LOGIN_CLIENTBOUND,
        (ConnectionState::Login, Direction::Serverbound) => &LOGIN_SERVERBOUND,
        (ConnectionState::Play, Direction::Clientbound) => &PLAY_CLIENTBOUND,
        (ConnectionState::Play, Direction::Serverbound) => &PLAY_SERVERBOUND,
    }
}

/// Finds the schema for a packet id.
pub fn lookup(
    state: ConnectionState,
    direction: Direction,
    id: i32,
) -> Option<&'static PacketSchema> {
    schemas(state, direction).iter().copied().find(|s| s.id == id)
}

/// Parses a frame against every known schema for the state and direction.
pub fn parse_registered(
    state: ConnectionState,
    direction: Direction,
    frame: &[u8],
) -> Result<(Packet, usize), ProtocolError> {
    Packet::parse(state, direction, schemas(state, direction), frame)
}
