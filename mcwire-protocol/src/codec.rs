//! Streaming frame decoder.

use crate::error::ProtocolError;
use crate::frame::{split_frame, MAX_FRAME_SIZE};
use bytes::{Bytes, BytesMut};

/// Accumulates raw inbound bytes and yields complete frames.
pub struct FrameDecoder {
    buffer: BytesMut,
    max_frame_size: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::with_max_frame_size(MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
            max_frame_size,
        }
    }

    /// Appends data to the internal buffer.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Appends bytes to the internal buffer.
    pub fn extend_bytes(&mut self, data: Bytes) {
        self.buffer.extend_from_slice(&data);
    }

    /// Attempts to split the next complete frame (length prefix included)
    /// from the buffer. Returns `Ok(None)` until enough bytes have arrived.
    pub fn next_frame(&mut self) -> Result<Option<BytesMut>, ProtocolError> {
        split_frame(&mut self.buffer, self.max_frame_size)
    }

    /// Returns the number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode_raw;

    #[test]
    fn test_partial_frame_decoding() {
        let encoded = encode_raw(0x00, b"{\"description\":\"hi\"}");
        let mut decoder = FrameDecoder::new();

        // Feed partial data
        decoder.extend(&encoded[..10]);
        assert!(decoder.next_frame().unwrap().is_none());
        assert_eq!(decoder.buffered(), 10);

        // Feed the rest
        decoder.extend(&encoded[10..]);
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame, encoded);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_byte_at_a_time() {
        let encoded = encode_raw(0x03, &[0x80, 0x02]);
        let mut decoder = FrameDecoder::new();

        for (i, byte) in encoded.iter().enumerate() {
            decoder.extend(&[*byte]);
            let frame = decoder.next_frame().unwrap();
            if i + 1 < encoded.len() {
                assert!(frame.is_none());
            } else {
                assert_eq!(frame.unwrap(), encoded);
            }
        }
    }

    #[test]
    fn test_decoder_extend_bytes() {
        let encoded = encode_raw(0x01, b"x");
        let mut decoder = FrameDecoder::default();
        decoder.extend_bytes(Bytes::from(encoded.to_vec()));
        assert!(decoder.next_frame().unwrap().is_some());
    }

    #[test]
    fn test_max_frame_size() {
        let encoded = encode_raw(0x01, &[0u8; 64]);
        let mut decoder = FrameDecoder::with_max_frame_size(32);
        decoder.extend(&encoded);
        assert!(matches!(
            decoder.next_frame(),
            Err(ProtocolError::FrameTooLarge { size: 65, max: 32 })
        ));
    }

    #[test]
    fn test_decoder_clear() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(b"some data");
        assert_eq!(decoder.buffered(), 9);
        decoder.clear();
        assert_eq!(decoder.buffered(), 0);
    }
}
