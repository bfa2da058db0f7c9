//! `VarInt` and `VarLong` encoding/decoding.
//!
//! Each byte carries 7 bits of payload, least significant group first, with
//! the high bit set when more bytes follow. Negative values are written as
//! their unsigned bit pattern, so every negative `VarInt` takes 5 bytes and
//! every negative `VarLong` takes 10.

use crate::error::ProtocolError;
use crate::primitive::Decoded;
use bytes::BufMut;

/// Maximum encoded size of a `VarInt`.
pub const MAX_VARINT_LEN: usize = 5;

/// Maximum encoded size of a `VarLong`.
pub const MAX_VARLONG_LEN: usize = 10;

/// Segment bits mask (lower 7 bits).
const SEGMENT_BITS: u8 = 0x7F;

/// Continue bit (high bit).
const CONTINUE_BIT: u8 = 0x80;

fn put_unsigned(buf: &mut impl BufMut, mut value: u64) -> usize {
    let mut written = 1;
    while value > u64::from(SEGMENT_BITS) {
        #[allow(clippy::cast_possible_truncation)]
        buf.put_u8((value as u8 & SEGMENT_BITS) | CONTINUE_BIT);
        value >>= 7;
        written += 1;
    }
    #[allow(clippy::cast_possible_truncation)]
    buf.put_u8(value as u8);
    written
}

fn decode_unsigned(buf: &[u8], offset: usize, max_len: usize, bits: u32) -> Decoded<u64> {
    let mut value: u64 = 0;

    for i in 0..max_len {
        let Some(&byte) = buf.get(offset + i) else {
            return Err(ProtocolError::TruncatedBuffer {
                needed: i + 1,
                available: buf.len().saturating_sub(offset),
            });
        };
        value |= u64::from(byte & SEGMENT_BITS) << (7 * i);

        if byte & CONTINUE_BIT == 0 {
            // The last group may only fill the bits left over by the others.
            if i + 1 == max_len && u32::from(byte) >> (bits - 7 * i as u32) != 0 {
                return Err(ProtocolError::VarIntOverflow { bits });
            }
            return Ok((value, i + 1));
        }
    }

    Err(ProtocolError::MalformedVarInt { max_bytes: max_len })
}

/// Writes a `VarInt`, returning the number of bytes written.
#[allow(clippy::cast_sign_loss)]
pub fn put_varint(buf: &mut impl BufMut, value: i32) -> usize {
    put_unsigned(buf, u64::from(value as u32))
}

/// Writes a `VarLong`, returning the number of bytes written.
#[allow(clippy::cast_sign_loss)]
pub fn put_varlong(buf: &mut impl BufMut, value: i64) -> usize {
    put_unsigned(buf, value as u64)
}

/// Decodes a `VarInt` starting at `offset`.
///
/// # Errors
///
/// - [`ProtocolError::TruncatedBuffer`] if the buffer ends mid-value
/// - [`ProtocolError::MalformedVarInt`] if no terminating byte appears within
///   [`MAX_VARINT_LEN`] bytes
/// - [`ProtocolError::VarIntOverflow`] if the fifth byte sets bits beyond
///   the 32-bit range (`ff ff ff ff 7f` is rejected, not read as -1)
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn decode_varint(buf: &[u8], offset: usize) -> Decoded<i32> {
    let (value, len) = decode_unsigned(buf, offset, MAX_VARINT_LEN, 32)?;
    Ok((value as u32 as i32, len))
}

/// Decodes a `VarLong` starting at `offset`.
///
/// # Errors
///
/// Same as [`decode_varint`], with a limit of [`MAX_VARLONG_LEN`] bytes and
/// a 64-bit range.
#[allow(clippy::cast_possible_wrap)]
pub fn decode_varlong(buf: &[u8], offset: usize) -> Decoded<i64> {
    let (value, len) = decode_unsigned(buf, offset, MAX_VARLONG_LEN, 64)?;
    Ok((value as i64, len))
}

/// Calculate the number of bytes needed to encode a `VarInt`.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn varint_len(value: i32) -> usize {
    unsigned_len(value as u32 as u64)
}

/// Calculate the number of bytes needed to encode a `VarLong`.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn varlong_len(value: i64) -> usize {
    unsigned_len(value as u64)
}

const fn unsigned_len(value: u64) -> usize {
    if value == 0 {
        return 1;
    }
    let bits_needed = 64 - value.leading_zeros();
    (bits_needed as usize).div_ceil(7)
}
