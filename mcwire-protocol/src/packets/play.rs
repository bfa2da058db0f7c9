//! Play-state packets a server sends right after login.
//!
//! Only the join sequence is described here; general play traffic is left
//! to higher layers.

use crate::composite::Position;
use crate::error::ProtocolError;
use crate::packet::{ConnectionState, Direction, FieldSpec, Packet, PacketSchema};
use crate::packets::TypedPacket;
use crate::value::{FieldKind, Value};
use bytes::Bytes;

pub const SERVER_DIFFICULTY: PacketSchema = PacketSchema {
    name: "ServerDifficulty",
    id: 0x0D,
    state: ConnectionState::Play,
    direction: Direction::Clientbound,
    fields: &[FieldSpec::new("difficulty", FieldKind::UnsignedByte)],
};

pub const PLUGIN_MESSAGE_CLIENTBOUND: PacketSchema = PacketSchema {
    name: "PluginMessage",
    id: 0x18,
    state: ConnectionState::Play,
    direction: Direction::Clientbound,
    fields: &[
        FieldSpec::new("channel", FieldKind::String),
        FieldSpec::new("data", FieldKind::Remaining),
    ],
};

pub const JOIN_GAME: PacketSchema = PacketSchema {
    name: "JoinGame",
    id: 0x23,
    state: ConnectionState::Play,
    direction: Direction::Clientbound,
    fields: &[
        FieldSpec::new("entity_id", FieldKind::Int),
        FieldSpec::new("gamemode", FieldKind::UnsignedByte),
        FieldSpec::new("dimension", FieldKind::Int),
        FieldSpec::new("difficulty", FieldKind::UnsignedByte),
        FieldSpec::new("max_players", FieldKind::UnsignedByte),
        FieldSpec::new("level_type", FieldKind::String),
        FieldSpec::new("reduced_debug_info", FieldKind::Boolean),
    ],
};

pub const PLAYER_ABILITIES: PacketSchema = PacketSchema {
    name: "PlayerAbilities",
    id: 0x2C,
    state: ConnectionState::Play,
    direction: Direction::Clientbound,
    fields: &[
        FieldSpec::new("flags", FieldKind::Byte),
        FieldSpec::new("flying_speed", FieldKind::Float),
        FieldSpec::new("fov_modifier", FieldKind::Float),
    ],
};

pub const SPAWN_POSITION: PacketSchema = PacketSchema {
    name: "SpawnPosition",
    id: 0x46,
    state: ConnectionState::Play,
    direction: Direction::Clientbound,
    fields: &[FieldSpec::new("location", FieldKind::Position)],
};

pub const PLUGIN_MESSAGE_SERVERBOUND: PacketSchema = PacketSchema {
    name: "PluginMessage",
    id: 0x09,
    state: ConnectionState::Play,
    direction: Direction::Serverbound,
    fields: &[
        FieldSpec::new("channel", FieldKind::String),
        FieldSpec::new("data", FieldKind::Remaining),
    ],
};

/// Join Game packet (server -> client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinGame {
    pub entity_id: i32,
    /// Game mode; bit 3 marks hardcore.
    pub gamemode: u8,
    /// -1 nether, 0 overworld, 1 end.
    pub dimension: i32,
    pub difficulty: u8,
    pub max_players: u8,
    pub level_type: String,
    pub reduced_debug_info: bool,
}

impl JoinGame {
    const HARDCORE_BIT: u8 = 0x08;

    pub fn is_hardcore(&self) -> bool {
        self.gamemode & Self::HARDCORE_BIT != 0
    }

    /// Game mode without the hardcore flag.
    pub fn base_gamemode(&self) -> u8 {
        self.gamemode & !Self::HARDCORE_BIT
    }
}

impl TypedPacket for JoinGame {
    const SCHEMA: &'static PacketSchema = &JOIN_GAME;

    fn to_fields(&self) -> Vec<Value> {
        vec![
            Value::Int(self.entity_id),
            Value::UnsignedByte(self.gamemode),
            Value::Int(self.dimension),
            Value::UnsignedByte(self.difficulty),
            Value::UnsignedByte(self.max_players),
            Value::String(self.level_type.clone()),
            Value::Boolean(self.reduced_debug_info),
        ]
    }

    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError> {
        Ok(Self {
            entity_id: packet.get("entity_id", Value::as_i32)?,
            gamemode: packet.get("gamemode", Value::as_u8)?,
            dimension: packet.get("dimension", Value::as_i32)?,
            difficulty: packet.get("difficulty", Value::as_u8)?,
            max_players: packet.get("max_players", Value::as_u8)?,
            level_type: packet.get("level_type", Value::as_str)?.to_owned(),
            reduced_debug_info: packet.get("reduced_debug_info", Value::as_bool)?,
        })
    }
}

/// Plugin channel message. The payload is unprefixed and runs to the end of
/// the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMessage {
    pub channel: String,
    pub data: Bytes,
}

impl PluginMessage {
    pub fn new(channel: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            channel: channel.into(),
            data: data.into(),
        }
    }

    /// Builds the client-to-server form of this message.
    pub fn to_serverbound(&self) -> Packet {
        Packet::from_parts(&PLUGIN_MESSAGE_SERVERBOUND, self.to_fields())
    }
}

impl TypedPacket for PluginMessage {
    const SCHEMA: &'static PacketSchema = &PLUGIN_MESSAGE_CLIENTBOUND;

    fn to_fields(&self) -> Vec<Value> {
        vec![
            Value::String(self.channel.clone()),
            Value::Remaining(self.data.clone()),
        ]
    }

    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError> {
        Ok(Self {
            channel: packet.get("channel", Value::as_str)?.to_owned(),
            data: packet.get("data", Value::as_bytes)?.clone(),
        })
    }
}

/// Server Difficulty packet (server -> client).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerDifficulty {
    /// 0 peaceful, 1 easy, 2 normal, 3 hard.
    pub difficulty: u8,
}

impl TypedPacket for ServerDifficulty {
    const SCHEMA: &'static PacketSchema = &SERVER_DIFFICULTY;

    fn to_fields(&self) -> Vec<Value> {
        vec![Value::UnsignedByte(self.difficulty)]
    }

    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError> {
        Ok(Self {
            difficulty: packet.get("difficulty", Value::as_u8)?,
        })
    }
}

/// Spawn Position packet (server -> client).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnPosition {
    pub location: Position,
}

impl TypedPacket for SpawnPosition {
    const SCHEMA: &'static PacketSchema = &SPAWN_POSITION;

    fn to_fields(&self) -> Vec<Value> {
        vec![Value::Position(self.location)]
    }

    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError> {
        Ok(Self {
            location: packet.get("location", Value::as_position)?,
        })
    }
}

/// Player Abilities packet (server -> client).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerAbilities {
    pub flags: i8,
    pub flying_speed: f32,
    pub fov_modifier: f32,
}

impl PlayerAbilities {
    pub const INVULNERABLE: i8 = 0x01;
    pub const FLYING: i8 = 0x02;
    pub const ALLOW_FLYING: i8 = 0x04;
    pub const CREATIVE_MODE: i8 = 0x08;

    pub fn has(&self, flag: i8) -> bool {
        self.flags & flag != 0
    }
}

impl TypedPacket for PlayerAbilities {
    const SCHEMA: &'static PacketSchema = &PLAYER_ABILITIES;

    fn to_fields(&self) -> Vec<Value> {
        vec![
            Value::Byte(self.flags),
            Value::Float(self.flying_speed),
            Value::Float(self.fov_modifier),
        ]
    }

    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError> {
        Ok(Self {
            flags: packet.get("flags", Value::as_i8)?,
            flying_speed: packet.get("flying_speed", Value::as_f32)?,
            fov_modifier: packet.get("fov_modifier", Value::as_f32)?,
        })
    }
}
