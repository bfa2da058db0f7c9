//! Tagged wire values.
//!
//! [`Value`] is the single representation of every field kind the packet
//! layer understands. Encoding is derived from the semantic value on demand,
//! so a value and its wire form cannot drift apart.

use crate::composite::{
    byte_array_len, decode_byte_array, decode_position, decode_string, put_byte_array,
    put_position, put_string, string_len, Position,
};
use crate::primitive::{
    decode_bool, decode_f32, decode_f64, decode_i16, decode_i32, decode_i64, decode_i8,
    decode_u16, decode_u8, put_bool, Decoded,
};
use crate::varint::{decode_varint, decode_varlong, put_varint, put_varlong, varint_len, varlong_len};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

/// Field kinds a packet schema can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Boolean,
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    Long,
    Float,
    Double,
    String,
    VarInt,
    VarLong,
    ByteArray,
    Position,
    /// Unprefixed bytes running to the end of the frame. Only valid as the
    /// last field of a schema.
    Remaining,
}

impl FieldKind {
    /// Encoded width of fixed-width kinds, `None` for variable-length ones.
    pub fn fixed_len(&self) -> Option<usize> {
        match self {
            FieldKind::Boolean | FieldKind::Byte | FieldKind::UnsignedByte => Some(1),
            FieldKind::Short | FieldKind::UnsignedShort => Some(2),
            FieldKind::Int | FieldKind::Float => Some(4),
            FieldKind::Long | FieldKind::Double | FieldKind::Position => Some(8),
            FieldKind::String
            | FieldKind::VarInt
            | FieldKind::VarLong
            | FieldKind::ByteArray
            | FieldKind::Remaining => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Boolean => "Boolean",
            FieldKind::Byte => "Byte",
            FieldKind::UnsignedByte => "UnsignedByte",
            FieldKind::Short => "Short",
            FieldKind::UnsignedShort => "UnsignedShort",
            FieldKind::Int => "Int",
            FieldKind::Long => "Long",
            FieldKind::Float => "Float",
            FieldKind::Double => "Double",
            FieldKind::String => "String",
            FieldKind::VarInt => "VarInt",
            FieldKind::VarLong => "VarLong",
            FieldKind::ByteArray => "ByteArray",
            FieldKind::Position => "Position",
            FieldKind::Remaining => "Remaining",
        };
        f.write_str(name)
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Byte(i8),
    UnsignedByte(u8),
    Short(i16),
    UnsignedShort(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    VarInt(i32),
    VarLong(i64),
    ByteArray(Bytes),
    Position(Position),
    Remaining(Bytes),
}

impl Value {
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::Boolean(_) => FieldKind::Boolean,
            Value::Byte(_) => FieldKind::Byte,
            Value::UnsignedByte(_) => FieldKind::UnsignedByte,
            Value::Short(_) => FieldKind::Short,
            Value::UnsignedShort(_) => FieldKind::UnsignedShort,
            Value::Int(_) => FieldKind::Int,
            Value::Long(_) => FieldKind::Long,
            Value::Float(_) => FieldKind::Float,
            Value::Double(_) => FieldKind::Double,
            Value::String(_) => FieldKind::String,
            Value::VarInt(_) => FieldKind::VarInt,
            Value::VarLong(_) => FieldKind::VarLong,
            Value::ByteArray(_) => FieldKind::ByteArray,
            Value::Position(_) => FieldKind::Position,
            Value::Remaining(_) => FieldKind::Remaining,
        }
    }

    /// Number of bytes [`Value::encode`] writes.
    pub fn encoded_len(&self) -> usize {
        match self {
            Value::String(s) => string_len(s),
            Value::VarInt(v) => varint_len(*v),
            Value::VarLong(v) => varlong_len(*v),
            Value::ByteArray(b) => byte_array_len(b),
            Value::Remaining(b) => b.len(),
            fixed => fixed.kind().fixed_len().unwrap_or_default(),
        }
    }

    /// Writes the canonical encoding of this value.
    pub fn encode(&self, buf: &mut impl BufMut) {
        match self {
            Value::Boolean(v) => put_bool(buf, *v),
            Value::Byte(v) => buf.put_i8(*v),
            Value::UnsignedByte(v) => buf.put_u8(*v),
            Value::Short(v) => buf.put_i16(*v),
            Value::UnsignedShort(v) => buf.put_u16(*v),
            Value::Int(v) => buf.put_i32(*v),
            Value::Long(v) => buf.put_i64(*v),
            Value::Float(v) => buf.put_f32(*v),
            Value::Double(v) => buf.put_f64(*v),
            Value::String(s) => {
                put_string(buf, s);
            }
            Value::VarInt(v) => {
                put_varint(buf, *v);
            }
            Value::VarLong(v) => {
                put_varlong(buf, *v);
            }
            Value::ByteArray(b) => {
                put_byte_array(buf, b);
            }
            Value::Position(p) => put_position(buf, *p),
            Value::Remaining(b) => buf.put_slice(b),
        }
    }

    /// Returns the canonical encoding as a standalone buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Decodes a value of the given kind at `offset`.
    ///
    /// [`FieldKind::Remaining`] consumes everything from `offset` to the end
    /// of `buf`, so callers must bound `buf` to the frame.
    pub fn decode(kind: FieldKind, buf: &[u8], offset: usize) -> Decoded<Value> {
        fn wrap<T>(decoded: Decoded<T>, f: impl FnOnce(T) -> Value) -> Decoded<Value> {
            decoded.map(|(v, len)| (f(v), len))
        }

        match kind {
            FieldKind::Boolean => wrap(decode_bool(buf, offset), Value::Boolean),
            FieldKind::Byte => wrap(decode_i8(buf, offset), Value::Byte),
            FieldKind::UnsignedByte => wrap(decode_u8(buf, offset), Value::UnsignedByte),
            FieldKind::Short => wrap(decode_i16(buf, offset), Value::Short),
            FieldKind::UnsignedShort => wrap(decode_u16(buf, offset), Value::UnsignedShort),
            FieldKind::Int => wrap(decode_i32(buf, offset), Value::Int),
            FieldKind::Long => wrap(decode_i64(buf, offset), Value::Long),
            FieldKind::Float => wrap(decode_f32(buf, offset), Value::Float),
            FieldKind::Double => wrap(decode_f64(buf, offset), Value::Double),
            FieldKind::String => wrap(decode_string(buf, offset), Value::String),
            FieldKind::VarInt => wrap(decode_varint(buf, offset), Value::VarInt),
            FieldKind::VarLong => wrap(decode_varlong(buf, offset), Value::VarLong),
            FieldKind::ByteArray => wrap(decode_byte_array(buf, offset), Value::ByteArray),
            FieldKind::Position => wrap(decode_position(buf, offset), Value::Position),
            FieldKind::Remaining => {
                let rest = buf.get(offset..).unwrap_or_default();
                Ok((Value::Remaining(Bytes::copy_from_slice(rest)), rest.len()))
            }
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Value::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Value::UnsignedByte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Value::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Value::UnsignedShort(v) => Some(*v),
            _ => None,
        }
    }

    /// `Int` or `VarInt`.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(v) | Value::VarInt(v) => Some(*v),
            _ => None,
        }
    }

    /// `Long` or `VarLong`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Long(v) | Value::VarLong(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// `ByteArray` or `Remaining`.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::ByteArray(b) | Value::Remaining(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_position(&self) -> Option<Position> {
        match self {
            Value::Position(p) => Some(*p),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<Position> for Value {
    fn from(p: Position) -> Self {
        Value::Position(p)
    }
}
