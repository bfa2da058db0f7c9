//! Length-prefixed strings and byte arrays, and packed block positions.

use crate::error::ProtocolError;
use crate::primitive::{decode_i64, Decoded};
use crate::varint::{decode_varint, put_varint, varint_len};
use bytes::{BufMut, Bytes};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reads a `VarInt` length prefix and checks that the payload it announces
/// is fully present. Returns the payload length and the prefix length.
fn decode_length(buf: &[u8], offset: usize) -> Result<(usize, usize), ProtocolError> {
    let (len, prefix) = decode_varint(buf, offset)?;
    let len = usize::try_from(len).map_err(|_| ProtocolError::NegativeLength(len))?;

    let available = buf.len().saturating_sub(offset + prefix);
    if available < len {
        return Err(ProtocolError::TruncatedBuffer {
            needed: len,
            available,
        });
    }
    Ok((len, prefix))
}

/// Writes a string as `VarInt(byte length) ++ UTF-8 bytes`.
pub fn put_string(buf: &mut impl BufMut, s: &str) -> usize {
    put_byte_array(buf, s.as_bytes())
}

/// Decodes a length-prefixed UTF-8 string.
///
/// # Errors
///
/// - [`ProtocolError::TruncatedBuffer`] if fewer bytes remain than declared
/// - [`ProtocolError::InvalidUtf8`] if the payload is not UTF-8
pub fn decode_string(buf: &[u8], offset: usize) -> Decoded<String> {
    let (len, prefix) = decode_length(buf, offset)?;
    let start = offset + prefix;
    let s = std::str::from_utf8(&buf[start..start + len]).map_err(|_| ProtocolError::InvalidUtf8)?;
    Ok((s.to_owned(), prefix + len))
}

/// Encoded size of a string.
#[must_use]
pub fn string_len(s: &str) -> usize {
    byte_array_len(s.as_bytes())
}

/// Writes an opaque byte array as `VarInt(length) ++ bytes`.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn put_byte_array(buf: &mut impl BufMut, bytes: &[u8]) -> usize {
    let prefix = put_varint(buf, bytes.len() as i32);
    buf.put_slice(bytes);
    prefix + bytes.len()
}

/// Decodes a length-prefixed byte array verbatim.
pub fn decode_byte_array(buf: &[u8], offset: usize) -> Decoded<Bytes> {
    let (len, prefix) = decode_length(buf, offset)?;
    let start = offset + prefix;
    Ok((Bytes::copy_from_slice(&buf[start..start + len]), prefix + len))
}

/// Encoded size of a byte array.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn byte_array_len(bytes: &[u8]) -> usize {
    varint_len(bytes.len() as i32) + bytes.len()
}

const XZ_BITS: u32 = 26;
const Y_BITS: u32 = 12;
const XZ_MASK: u64 = (1 << XZ_BITS) - 1;
const Y_MASK: u64 = (1 << Y_BITS) - 1;

/// A block position packed into a single 64-bit integer:
/// x in the top 26 bits, y in the next 12, z in the low 26.
///
/// Components outside the representable range are truncated to their field
/// width when packed; see [`Position::is_representable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const MIN_XZ: i32 = -(1 << (XZ_BITS - 1));
    pub const MAX_XZ: i32 = (1 << (XZ_BITS - 1)) - 1;
    pub const MIN_Y: i32 = -(1 << (Y_BITS - 1));
    pub const MAX_Y: i32 = (1 << (Y_BITS - 1)) - 1;

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns whether every component fits its packed field width.
    pub fn is_representable(&self) -> bool {
        (Self::MIN_XZ..=Self::MAX_XZ).contains(&self.x)
            && (Self::MIN_Y..=Self::MAX_Y).contains(&self.y)
            && (Self::MIN_XZ..=Self::MAX_XZ).contains(&self.z)
    }

    /// Packs the position into its wire representation.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    pub fn to_packed(self) -> i64 {
        let x = self.x as i64 as u64 & XZ_MASK;
        let y = self.y as i64 as u64 & Y_MASK;
        let z = self.z as i64 as u64 & XZ_MASK;
        ((x << (XZ_BITS + Y_BITS)) | (y << XZ_BITS) | z) as i64
    }

    /// Unpacks a wire value, sign-extending each component from its field
    /// width.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_packed(packed: i64) -> Self {
        // Shift each field to the top of the word, then arithmetic-shift it
        // back down so its top bit fills the upper bits.
        let x = packed >> (XZ_BITS + Y_BITS);
        let y = (packed << XZ_BITS) >> (64 - Y_BITS);
        let z = (packed << (64 - XZ_BITS)) >> (64 - XZ_BITS);
        Self {
            x: x as i32,
            y: y as i32,
            z: z as i32,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Writes a packed position as a big-endian long.
pub fn put_position(buf: &mut impl BufMut, position: Position) {
    buf.put_i64(position.to_packed());
}

/// Decodes a packed position.
pub fn decode_position(buf: &[u8], offset: usize) -> Decoded<Position> {
    let (packed, len) = decode_i64(buf, offset)?;
    Ok((Position::from_packed(packed), len))
}
