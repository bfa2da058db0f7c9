//! Length-prefixed frame boundaries.
//!
//! ```text
//! +-----------------+--------------------------------+
//! | length (VarInt) | packet id + fields             |
//! | 1-3 bytes       | length bytes                   |
//! +-----------------+--------------------------------+
//! ```
//!
//! These helpers only find where a frame ends; interpreting its contents is
//! [`Packet::parse`](crate::Packet::parse)'s job.

use crate::error::ProtocolError;
use crate::varint::{decode_varint, put_varint};
use bytes::{BufMut, BytesMut};

/// Maximum frame body size (2 MiB, same as vanilla).
pub const MAX_FRAME_SIZE: usize = 2 * 1024 * 1024;

/// Returns the total length (prefix included) of the first frame in `buf`.
///
/// Returns `Ok(None)` if the length prefix or the body is still incomplete,
/// or `Err` if the prefix is malformed or announces more than `max_size`.
pub fn frame_len(buf: &[u8], max_size: usize) -> Result<Option<usize>, ProtocolError> {
    let (declared, prefix) = match decode_varint(buf, 0) {
        Ok(decoded) => decoded,
        Err(ProtocolError::TruncatedBuffer { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };

    let declared =
        usize::try_from(declared).map_err(|_| ProtocolError::NegativeLength(declared))?;
    if declared > max_size {
        return Err(ProtocolError::FrameTooLarge {
            size: declared,
            max: max_size,
        });
    }

    let total = prefix + declared;
    if buf.len() < total {
        return Ok(None);
    }
    Ok(Some(total))
}

/// Splits the first complete frame off the front of `buf`.
pub fn split_frame(buf: &mut BytesMut, max_size: usize) -> Result<Option<BytesMut>, ProtocolError> {
    match frame_len(buf, max_size)? {
        Some(total) => Ok(Some(buf.split_to(total))),
        None => Ok(None),
    }
}

/// Builds a frame from a packet id and an already-encoded field payload.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn encode_raw(id: i32, payload: &[u8]) -> BytesMut {
    let mut body = BytesMut::with_capacity(5 + payload.len());
    put_varint(&mut body, id);
    body.put_slice(payload);

    let mut buf = BytesMut::with_capacity(5 + body.len());
    put_varint(&mut buf, body.len() as i32);
    buf.put_slice(&body);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_len_complete() {
        let frame = encode_raw(0x01, b"hello");
        assert_eq!(frame_len(&frame, MAX_FRAME_SIZE).unwrap(), Some(7));
    }

    #[test]
    fn test_incomplete_frame() {
        let frame = encode_raw(0x01, b"hello");
        assert_eq!(frame_len(&frame[..4], MAX_FRAME_SIZE).unwrap(), None);
        assert_eq!(frame_len(&[], MAX_FRAME_SIZE).unwrap(), None);
        // Length prefix itself cut mid-way.
        assert_eq!(frame_len(&[0x80], MAX_FRAME_SIZE).unwrap(), None);
    }

    #[test]
    fn test_frame_too_large() {
        let mut buf = BytesMut::new();
        put_varint(&mut buf, 1025);
        let result = frame_len(&buf, 1024);
        assert!(matches!(
            result,
            Err(ProtocolError::FrameTooLarge {
                size: 1025,
                max: 1024
            })
        ));
    }

    #[test]
    fn test_malformed_prefix() {
        let buf = [0xFF; 6];
        assert!(matches!(
            frame_len(&buf, MAX_FRAME_SIZE),
            Err(ProtocolError::MalformedVarInt { .. })
        ));
    }

    #[test]
    fn test_multiple_frames_in_buffer() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&encode_raw(0x00, b"one"));
        buf.extend_from_slice(&encode_raw(0x01, b"second"));

        let first = split_frame(&mut buf, MAX_FRAME_SIZE).unwrap().unwrap();
        assert_eq!(&first[..], b"\x04\x00one");

        let second = split_frame(&mut buf, MAX_FRAME_SIZE).unwrap().unwrap();
        assert_eq!(&second[..], b"\x07\x01second");

        assert!(split_frame(&mut buf, MAX_FRAME_SIZE).unwrap().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_empty_payload() {
        let frame = encode_raw(0x00, b"");
        assert_eq!(&frame[..], &[0x01, 0x00]);
    }
}
