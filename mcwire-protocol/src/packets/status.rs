//! Status protocol packets (server list ping).

use crate::error::ProtocolError;
use crate::packet::{ConnectionState, Direction, FieldSpec, Packet, PacketSchema};
use crate::packets::TypedPacket;
use crate::value::{FieldKind, Value};
use serde::{Deserialize, Serialize};

pub const STATUS_REQUEST: PacketSchema = PacketSchema {
    name: "StatusRequest",
    id: 0x00,
    state: ConnectionState::Status,
    direction: Direction::Serverbound,
    fields: &[],
};

pub const PING: PacketSchema = PacketSchema {
    name: "Ping",
    id: 0x01,
    state: ConnectionState::Status,
    direction: Direction::Serverbound,
    fields: &[FieldSpec::new("payload", FieldKind::Long)],
};

pub const STATUS_RESPONSE: PacketSchema = PacketSchema {
    name: "StatusResponse",
    id: 0x00,
    state: ConnectionState::Status,
    direction: Direction::Clientbound,
    fields: &[FieldSpec::new("json", FieldKind::String)],
};

pub const PONG: PacketSchema = PacketSchema {
    name: "Pong",
    id: 0x01,
    state: ConnectionState::Status,
    direction: Direction::Clientbound,
    fields: &[FieldSpec::new("payload", FieldKind::Long)],
};

/// Status Request packet (client -> server).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusRequest;

impl TypedPacket for StatusRequest {
    const SCHEMA: &'static PacketSchema = &STATUS_REQUEST;

    fn to_fields(&self) -> Vec<Value> {
        Vec::new()
    }

    fn from_fields(_packet: &Packet) -> Result<Self, ProtocolError> {
        Ok(Self)
    }
}

/// Ping packet (client -> server).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ping {
    pub payload: i64,
}

impl TypedPacket for Ping {
    const SCHEMA: &'static PacketSchema = &PING;

    fn to_fields(&self) -> Vec<Value> {
        vec![Value::Long(self.payload)]
    }

    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError> {
        Ok(Self {
            payload: packet.get("payload", Value::as_i64)?,
        })
    }
}

/// Pong packet (server -> client), echoing the ping payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pong {
    pub payload: i64,
}

impl TypedPacket for Pong {
    const SCHEMA: &'static PacketSchema = &PONG;

    fn to_fields(&self) -> Vec<Value> {
        vec![Value::Long(self.payload)]
    }

    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError> {
        Ok(Self {
            payload: packet.get("payload", Value::as_i64)?,
        })
    }
}

/// Status Response packet (server -> client) carrying a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    pub json: String,
}

impl StatusResponse {
    /// Parses the JSON document.
    pub fn status(&self) -> Result<ServerStatus, ProtocolError> {
        Ok(serde_json::from_str(&self.json)?)
    }
}

impl TypedPacket for StatusResponse {
    const SCHEMA: &'static PacketSchema = &STATUS_RESPONSE;

    fn to_fields(&self) -> Vec<Value> {
        vec![Value::String(self.json.clone())]
    }

    fn from_fields(packet: &Packet) -> Result<Self, ProtocolError> {
        Ok(Self {
            json: packet.get("json", Value::as_str)?.to_owned(),
        })
    }
}

/// Server list information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub version: StatusVersion,
    #[serde(default)]
    pub players: Option<StatusPlayers>,
    /// Chat component or plain string.
    #[serde(default)]
    pub description: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

impl ServerStatus {
    /// Flattens the description to plain text, ignoring formatting.
    pub fn description_text(&self) -> String {
        fn collect(value: &serde_json::Value, out: &mut String) {
            match value {
                serde_json::Value::String(s) => out.push_str(s),
                serde_json::Value::Object(map) => {
                    if let Some(text) = map.get("text") {
                        collect(text, out);
                    }
                    if let Some(serde_json::Value::Array(extra)) = map.get("extra") {
                        for part in extra {
                            collect(part, out);
                        }
                    }
                }
                serde_json::Value::Array(parts) => {
                    for part in parts {
                        collect(part, out);
                    }
                }
                _ => {}
            }
        }

        let mut out = String::new();
        collect(&self.description, &mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusVersion {
    pub name: String,
    pub protocol: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPlayers {
    pub max: i32,
    pub online: i32,
}
