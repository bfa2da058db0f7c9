//! # mcwire-protocol
//!
//! Wire protocol implementation for the Minecraft Java edition client
//! (protocol 340).
//!
//! This crate provides:
//! - Fixed-width, variable-length and composite value codecs
//! - A tagged [`Value`] type with schema-driven packet serialization/parsing
//! - Length-prefixed frame splitting for streaming input
//! - Packet schemas for the handshake, status, login and early play phases

pub mod codec;
pub mod composite;
pub mod error;
pub mod frame;
pub mod packet;
pub mod packets;
pub mod primitive;
pub mod value;
pub mod varint;

pub use codec::FrameDecoder;
pub use composite::Position;
pub use error::ProtocolError;
pub use frame::MAX_FRAME_SIZE;
pub use packet::{ConnectionState, Direction, FieldSpec, Packet, PacketSchema};
pub use packets::{NextState, TypedPacket};
pub use value::{FieldKind, Value};

/// Protocol version spoken by this implementation (game release 1.12.2).
pub const PROTOCOL_VERSION: i32 = 340;

/// Default server port.
pub const DEFAULT_PORT: u16 = 25565;
