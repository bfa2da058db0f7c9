//! Schema-driven packet model.
//!
//! A [`PacketSchema`] is a static description of one packet type: its id,
//! connection state, direction and ordered field kinds. Length computation,
//! serialization and parsing are all single passes over that field list.
//!
//! Frame layout:
//!
//! ```text
//! +------------------+------------------+---------------------------+
//! | length (VarInt)  | packet id(VarInt)| fields in schema order    |
//! +------------------+------------------+---------------------------+
//!                    |<------------ length bytes ------------------>|
//! ```

use crate::error::ProtocolError;
use crate::value::{FieldKind, Value};
use crate::varint::{decode_varint, put_varint, varint_len};
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The connection state for a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Handshaking state (initial connection).
    Handshaking,
    /// Status state (server list ping).
    Status,
    /// Login state (authentication).
    Login,
    /// Play state (in-game).
    Play,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Handshaking => write!(f, "handshaking"),
            ConnectionState::Status => write!(f, "status"),
            ConnectionState::Login => write!(f, "login"),
            ConnectionState::Play => write!(f, "play"),
        }
    }
}

/// Which peer a packet travels towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Server to client.
    Clientbound,
    /// Client to server.
    Serverbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Clientbound => write!(f, "clientbound"),
            Direction::Serverbound => write!(f, "serverbound"),
        }
    }
}

/// One named field in a packet schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Static layout of one packet type.
#[derive(Debug, PartialEq, Eq)]
pub struct PacketSchema {
    pub name: &'static str,
    pub id: i32,
    pub state: ConnectionState,
    pub direction: Direction,
    pub fields: &'static [FieldSpec],
}

impl PacketSchema {
    /// Position of a named field.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    fn matches(&self, id: i32, state: ConnectionState, direction: Direction) -> bool {
        self.id == id && self.state == state && self.direction == direction
    }
}

/// An immutable packet: a schema plus one value per declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    schema: &'static PacketSchema,
    fields: Vec<Value>,
}

impl Packet {
    /// Builds a packet from caller-supplied values, checking them against
    /// the schema.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::FieldCount`] if the number of values differs
    /// - [`ProtocolError::FieldKindMismatch`] if a value has the wrong kind
    pub fn new(schema: &'static PacketSchema, fields: Vec<Value>) -> Result<Self, ProtocolError> {
        if fields.len() != schema.fields.len() {
            return Err(ProtocolError::FieldCount {
                packet: schema.name,
                expected: schema.fields.len(),
                actual: fields.len(),
            });
        }

        for (spec, value) in schema.fields.iter().zip(&fields) {
            if spec.kind != value.kind() {
                return Err(ProtocolError::FieldKindMismatch {
                    packet: schema.name,
                    field: spec.name,
                    expected: spec.kind,
                    actual: value.kind(),
                });
            }
        }

        Ok(Self { schema, fields })
    }

    /// Builds a packet whose values are known to match the schema.
    pub(crate) fn from_parts(schema: &'static PacketSchema, fields: Vec<Value>) -> Self {
        debug_assert!(Self::new(schema, fields.clone()).is_ok());
        Self { schema, fields }
    }

    pub fn schema(&self) -> &'static PacketSchema {
        self.schema
    }

    pub fn id(&self) -> i32 {
        self.schema.id
    }

    pub fn name(&self) -> &'static str {
        self.schema.name
    }

    pub fn state(&self) -> ConnectionState {
        self.schema.state
    }

    pub fn direction(&self) -> Direction {
        self.schema.direction
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &'static str) -> Result<&Value, ProtocolError> {
        self.schema
            .field_index(name)
            .and_then(|i| self.fields.get(i))
            .ok_or(ProtocolError::MissingField(name))
    }

    /// Looks up a field by name and projects it through an accessor such as
    /// [`Value::as_str`].
    pub fn get<'a, T>(
        &'a self,
        name: &'static str,
        project: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, ProtocolError> {
        project(self.field(name)?).ok_or(ProtocolError::MissingField(name))
    }

    /// Length of the packet id plus all fields (the value of the length
    /// prefix).
    pub fn body_len(&self) -> usize {
        self.fields
            .iter()
            .fold(varint_len(self.schema.id), |acc, v| acc + v.encoded_len())
    }

    /// Total frame size including the length prefix.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn frame_len(&self) -> usize {
        let body = self.body_len();
        varint_len(body as i32) + body
    }

    /// Appends the framed packet to `buf`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.reserve(self.frame_len());
        put_varint(buf, self.body_len() as i32);
        put_varint(buf, self.schema.id);
        for value in &self.fields {
            value.encode(buf);
        }
    }

    /// Serializes the packet into a length-prefixed frame.
    pub fn serialize(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.frame_len());
        self.encode_into(&mut buf);
        buf
    }

    /// Parses one frame from the start of `frame`, accepting only packets in
    /// `expected` that belong to `state` and `direction`.
    ///
    /// Returns the packet and the number of bytes the frame occupied. The
    /// input is never modified, so a failed parse leaves nothing to undo.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::TruncatedBuffer`] if the length prefix announces
    ///   more bytes than `frame` holds
    /// - [`ProtocolError::MalformedFrame`] if the frame is empty or ends
    ///   inside the packet id
    /// - [`ProtocolError::UnexpectedPacketId`] if no expected schema matches
    /// - [`ProtocolError::SchemaMismatch`] if the fields do not end exactly
    ///   at the frame boundary, including fields that would run past it
    /// - any value decoding error for a malformed field
    pub fn parse(
        state: ConnectionState,
        direction: Direction,
        expected: &[&'static PacketSchema],
        frame: &[u8],
    ) -> Result<(Self, usize), ProtocolError> {
        let (declared, prefix) = decode_varint(frame, 0)?;
        let declared =
            usize::try_from(declared).map_err(|_| ProtocolError::NegativeLength(declared))?;

        let end = prefix + declared;
        if frame.len() < end {
            return Err(ProtocolError::TruncatedBuffer {
                needed: declared,
                available: frame.len() - prefix,
            });
        }
        let body = &frame[..end];

        let (id, id_len) = decode_varint(body, prefix).map_err(|e| match e {
            ProtocolError::TruncatedBuffer { .. } => {
                ProtocolError::MalformedFrame { length: declared }
            }
            other => other,
        })?;
        let schema = expected
            .iter()
            .copied()
            .find(|s| s.matches(id, state, direction))
            .ok_or(ProtocolError::UnexpectedPacketId {
                id,
                state,
                direction,
            })?;

        let mut cursor = prefix + id_len;
        let mut fields = Vec::with_capacity(schema.fields.len());
        for spec in schema.fields {
            let (value, len) = Value::decode(spec.kind, body, cursor).map_err(|e| match e {
                ProtocolError::TruncatedBuffer { .. } => ProtocolError::SchemaMismatch {
                    packet: schema.name,
                    consumed: cursor,
                    declared: end,
                },
                other => other,
            })?;
            cursor += len;
            fields.push(value);
        }

        if cursor != end {
            return Err(ProtocolError::SchemaMismatch {
                packet: schema.name,
                consumed: cursor,
                declared: end,
            });
        }

        Ok((Self { schema, fields }, end))
    }

    /// Parses a frame that must be exactly `schema`.
    pub fn parse_as(
        schema: &'static PacketSchema,
        frame: &[u8],
    ) -> Result<(Self, usize), ProtocolError> {
        Self::parse(schema.state, schema.direction, &[schema], frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::Position;
    use bytes::{BufMut, Bytes};

    static SAMPLE: PacketSchema = PacketSchema {
        name: "Sample",
        id: 0x42,
        state: ConnectionState::Play,
        direction: Direction::Clientbound,
        fields: &[
            FieldSpec::new("flag", FieldKind::Boolean),
            FieldSpec::new("count", FieldKind::VarInt),
            FieldSpec::new("label", FieldKind::String),
            FieldSpec::new("at", FieldKind::Position),
        ],
    };

    static TAIL: PacketSchema = PacketSchema {
        name: "Tail",
        id: 0x07,
        state: ConnectionState::Play,
        direction: Direction::Clientbound,
        fields: &[
            FieldSpec::new("channel", FieldKind::String),
            FieldSpec::new("data", FieldKind::Remaining),
        ],
    };

    fn sample() -> Packet {
        Packet::new(
            &SAMPLE,
            vec![
                Value::Boolean(true),
                Value::VarInt(300),
                Value::from("abc"),
                Value::Position(Position::new(-1, 64, 7)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_serialize_layout() {
        let packet = sample();
        let bytes = packet.serialize();

        // id(1) + bool(1) + varint 300(2) + string(4) + position(8)
        assert_eq!(packet.body_len(), 16);
        assert_eq!(packet.frame_len(), 17);
        assert_eq!(bytes.len(), 17);
        assert_eq!(&bytes[..5], &[16, 0x42, 0x01, 0xAC, 0x02]);
        assert_eq!(&bytes[5..9], &[3, b'a', b'b', b'c']);
    }

    #[test]
    fn test_parse_roundtrip() {
        let packet = sample();
        let bytes = packet.serialize();

        let (parsed, consumed) = Packet::parse_as(&SAMPLE, &bytes).unwrap();
        assert_eq!(parsed, packet);
        assert_eq!(consumed, bytes.len());
        assert_eq!(parsed.get("count", Value::as_i32).unwrap(), 300);
        assert_eq!(parsed.get("label", Value::as_str).unwrap(), "abc");
    }

    #[test]
    fn test_parse_stops_at_frame_boundary() {
        let mut bytes = sample().serialize();
        bytes.put_slice(&[0xFF, 0xFF]);

        let (_, consumed) = Packet::parse_as(&SAMPLE, &bytes).unwrap();
        assert_eq!(consumed, bytes.len() - 2);
    }

    #[test]
    fn test_parse_truncated_frame() {
        let bytes = sample().serialize();
        let result = Packet::parse_as(&SAMPLE, &bytes[..bytes.len() - 3]);
        assert!(matches!(
            result,
            Err(ProtocolError::TruncatedBuffer {
                needed: 16,
                available: 13
            })
        ));
    }

    #[test]
    fn test_parse_unexpected_id() {
        let bytes = sample().serialize();

        // Right id, wrong state.
        let result = Packet::parse(
            ConnectionState::Login,
            Direction::Clientbound,
            &[&SAMPLE],
            &bytes,
        );
        assert!(matches!(
            result,
            Err(ProtocolError::UnexpectedPacketId {
                id: 0x42,
                state: ConnectionState::Login,
                ..
            })
        ));

        // Id not in the expected set.
        let result = Packet::parse_as(&TAIL, &bytes);
        assert!(matches!(
            result,
            Err(ProtocolError::UnexpectedPacketId { id: 0x42, .. })
        ));
    }

    #[test]
    fn test_parse_trailing_bytes_is_schema_mismatch() {
        // Frame declares one extra byte after the last field.
        let packet = sample();
        let mut body = BytesMut::new();
        put_varint(&mut body, SAMPLE.id);
        for v in packet.fields() {
            v.encode(&mut body);
        }
        body.put_u8(0x00);

        let mut frame = BytesMut::new();
        put_varint(&mut frame, body.len() as i32);
        frame.put_slice(&body);

        let result = Packet::parse_as(&SAMPLE, &frame);
        assert!(matches!(
            result,
            Err(ProtocolError::SchemaMismatch {
                packet: "Sample",
                consumed: 17,
                declared: 18
            })
        ));
    }

    #[test]
    fn test_parse_field_overrun_is_schema_mismatch() {
        // Frame is complete but shorter than the schema requires.
        let mut frame = BytesMut::new();
        put_varint(&mut frame, 3);
        put_varint(&mut frame, SAMPLE.id);
        frame.put_u8(0x01);
        frame.put_u8(0x05);

        let result = Packet::parse_as(&SAMPLE, &frame);
        assert!(matches!(
            result,
            Err(ProtocolError::SchemaMismatch {
                consumed: 4,
                declared: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_empty_frame() {
        let result = Packet::parse_as(&SAMPLE, &[0x00, 0x42]);
        match result {
            Err(err @ ProtocolError::MalformedFrame { length: 0 }) => {
                assert!(err.is_desync());
                assert!(!err.is_truncated());
            }
            other => panic!("expected malformed frame, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_packet_id_overrun() {
        // One-byte frame whose id VarInt has its continue bit set; the byte
        // after the frame must not be read as part of the id.
        let frame = [0x01, 0xC2, 0x00];
        let result = Packet::parse_as(&SAMPLE, &frame);
        assert!(matches!(
            result,
            Err(ProtocolError::MalformedFrame { length: 1 })
        ));

        // A frame still missing bytes stays truncated.
        let result = Packet::parse_as(&SAMPLE, &[0x02, 0xC2]);
        assert!(result.unwrap_err().is_truncated());
    }

    #[test]
    fn test_parse_malformed_field() {
        let mut frame = BytesMut::new();
        put_varint(&mut frame, 2);
        put_varint(&mut frame, SAMPLE.id);
        frame.put_u8(0x07);

        let result = Packet::parse_as(&SAMPLE, &frame);
        assert!(matches!(result, Err(ProtocolError::MalformedBoolean(0x07))));
    }

    #[test]
    fn test_remaining_field() {
        let packet = Packet::new(
            &TAIL,
            vec![
                Value::from("MC|Brand"),
                Value::Remaining(Bytes::from_static(b"\x07vanilla")),
            ],
        )
        .unwrap();
        let bytes = packet.serialize();
        let (parsed, _) = Packet::parse_as(&TAIL, &bytes).unwrap();
        assert_eq!(
            parsed.get("data", Value::as_bytes).unwrap().as_ref(),
            b"\x07vanilla"
        );
    }

    #[test]
    fn test_new_rejects_wrong_fields() {
        let result = Packet::new(&SAMPLE, vec![Value::Boolean(true)]);
        assert!(matches!(
            result,
            Err(ProtocolError::FieldCount {
                expected: 4,
                actual: 1,
                ..
            })
        ));

        let result = Packet::new(
            &SAMPLE,
            vec![
                Value::Boolean(true),
                Value::Int(300),
                Value::from("abc"),
                Value::Position(Position::default()),
            ],
        );
        assert!(matches!(
            result,
            Err(ProtocolError::FieldKindMismatch {
                field: "count",
                expected: FieldKind::VarInt,
                actual: FieldKind::Int,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_field() {
        let packet = sample();
        assert!(matches!(
            packet.field("nope"),
            Err(ProtocolError::MissingField("nope"))
        ));
        assert!(matches!(
            packet.get("label", Value::as_i32),
            Err(ProtocolError::MissingField("label"))
        ));
    }
}
