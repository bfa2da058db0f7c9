//! Fixed-width scalar codec.
//!
//! Every decoder takes a buffer and an offset and returns the decoded value
//! together with the number of bytes it consumed. All multi-byte scalars are
//! big-endian; signed kinds are two's-complement and floats are IEEE-754.
//! Encoding goes through [`bytes::BufMut`] (`put_i16`, `put_f64`, ...), with
//! [`put_bool`] covering the one kind `BufMut` has no writer for.

use crate::error::ProtocolError;
use bytes::BufMut;

/// Result of a decode: the value and the number of bytes consumed.
pub type Decoded<T> = Result<(T, usize), ProtocolError>;

/// Copies exactly `N` bytes starting at `offset`.
pub(crate) fn take<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], ProtocolError> {
    let available = buf.len().saturating_sub(offset);
    if available < N {
        return Err(ProtocolError::TruncatedBuffer {
            needed: N,
            available,
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    Ok(out)
}

/// Decodes a boolean. Only `0x00` and `0x01` are accepted.
pub fn decode_bool(buf: &[u8], offset: usize) -> Decoded<bool> {
    let [byte] = take::<1>(buf, offset)?;
    match byte {
        0x00 => Ok((false, 1)),
        0x01 => Ok((true, 1)),
        other => Err(ProtocolError::MalformedBoolean(other)),
    }
}

/// Encodes a boolean as a single `0x00`/`0x01` byte.
pub fn put_bool(buf: &mut impl BufMut, value: bool) {
    buf.put_u8(u8::from(value));
}

macro_rules! fixed_width {
    ($($decode:ident => $ty:ty),* $(,)?) => {$(
        #[doc = concat!("Decodes a big-endian `", stringify!($ty), "`.")]
        pub fn $decode(buf: &[u8], offset: usize) -> Decoded<$ty> {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            let bytes = take::<WIDTH>(buf, offset)?;
            Ok((<$ty>::from_be_bytes(bytes), WIDTH))
        }
    )*};
}

fixed_width! {
    decode_i8 => i8,
    decode_u8 => u8,
    decode_i16 => i16,
    decode_u16 => u16,
    decode_i32 => i32,
    decode_i64 => i64,
    decode_f32 => f32,
    decode_f64 => f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_bool() {
        assert_eq!(decode_bool(&[0x00], 0).unwrap(), (false, 1));
        assert_eq!(decode_bool(&[0x01], 0).unwrap(), (true, 1));
        assert!(matches!(
            decode_bool(&[0x02], 0),
            Err(ProtocolError::MalformedBoolean(0x02))
        ));

        let mut buf = BytesMut::new();
        put_bool(&mut buf, true);
        put_bool(&mut buf, false);
        assert_eq!(&buf[..], &[0x01, 0x00]);
    }

    #[test]
    fn test_signed_byte() {
        assert_eq!(decode_i8(&[0x7F], 0).unwrap(), (127, 1));
        assert_eq!(decode_i8(&[0x80], 0).unwrap(), (-128, 1));
        assert_eq!(decode_i8(&[0xFF], 0).unwrap(), (-1, 1));
        assert_eq!(decode_u8(&[0xFF], 0).unwrap(), (255, 1));
    }

    #[test]
    fn test_big_endian_integers() {
        assert_eq!(decode_i16(&[0xFF, 0xFE], 0).unwrap(), (-2, 2));
        assert_eq!(decode_u16(&[0x63, 0xDD], 0).unwrap(), (25565, 2));
        assert_eq!(
            decode_i32(&[0x00, 0x00, 0x01, 0x00], 0).unwrap(),
            (256, 4)
        );
        assert_eq!(
            decode_i64(&[0x80, 0, 0, 0, 0, 0, 0, 0], 0).unwrap(),
            (i64::MIN, 8)
        );
    }

    #[test]
    fn test_floats() {
        let mut buf = BytesMut::new();
        buf.put_f32(1.5);
        buf.put_f64(-0.25);
        assert_eq!(decode_f32(&buf, 0).unwrap(), (1.5, 4));
        assert_eq!(decode_f64(&buf, 4).unwrap(), (-0.25, 8));
    }

    #[test]
    fn test_offset() {
        let buf = [0xAA, 0xBB, 0x00, 0x2A];
        assert_eq!(decode_u16(&buf, 2).unwrap(), (42, 2));
    }

    #[test]
    fn test_truncated() {
        let result = decode_i32(&[0x00, 0x01, 0x02], 0);
        assert!(matches!(
            result,
            Err(ProtocolError::TruncatedBuffer {
                needed: 4,
                available: 3
            })
        ));

        // Offset past the end is reported as zero bytes available.
        let result = decode_u8(&[0x00], 5);
        assert!(matches!(
            result,
            Err(ProtocolError::TruncatedBuffer {
                needed: 1,
                available: 0
            })
        ));
    }
}
