//! Frame header construction and parsing.
//!
//! Every embedded payload is preceded by a fixed 8-byte header:
//!
//! ```text
//! [4 bytes] magic (big-endian u32, default 0x4D455441 "META")
//! [4 bytes] payload length in bytes (big-endian u32)
//! [N bytes] payload
//! ```

use super::error::CodecError;
use super::params::HEADER_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub magic: u32,
    pub payload_len: u32,
}

impl FrameHeader {
    pub fn to_bytes(self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..4].copy_from_slice(&self.magic.to_be_bytes());
        out[4..].copy_from_slice(&self.payload_len.to_be_bytes());
        out
    }

    pub fn from_bytes(bytes: [u8; HEADER_LEN]) -> Self {
        Self {
            magic: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            payload_len: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }
}

/// Build header + payload as one contiguous byte frame.
///
/// Payloads longer than `u32::MAX` bytes cannot be described by the header
/// and are reported as a capacity failure.
pub fn build_frame(magic: u32, payload: &[u8]) -> Result<Vec<u8>, CodecError> {
    let payload_len = u32::try_from(payload.len()).map_err(|_| CodecError::CapacityExceeded {
        required_bits: (HEADER_LEN + payload.len()).saturating_mul(8),
        available_bits: (HEADER_LEN + u32::MAX as usize).saturating_mul(8),
    })?;

    let header = FrameHeader { magic, payload_len };
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&header.to_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}
