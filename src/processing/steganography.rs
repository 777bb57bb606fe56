//! # LSB Metadata Steganography
//!
//! Hides a metadata [`Object`] in the carrier bits of an RGB pixel grid and
//! reads it back.
//!
//! ## Algorithm
//!
//! The payload is the serialized metadata encoded with the configured text
//! encoding, prefixed by an 8-byte [`FrameHeader`](super::frame::FrameHeader)
//! (magic + payload length, both big-endian).
//!
//! ### Encoding Process
//! 1. Serialize the metadata and encode it to bytes
//! 2. Prepend the header and expand the frame to bits, MSB first
//! 3. Check the grid has enough carrier slots for every bit
//! 4. For each bit, in row-major pixel order:
//!    - Clear the carrier bit of the next selected channel byte
//!    - Set it to the data bit
//!    - Move to the next channel (R → G → B → next pixel) or, for a single
//!      channel, straight to the next pixel
//! 5. Slots past the last bit are left untouched
//!
//! ### Decoding Process
//! 1. Read the first 64 carrier bits as the header
//! 2. Compare the magic; a mismatch means nothing is hidden
//! 3. Read `length * 8` further bits (clipped to the grid), decode and parse
//!
//! ### Capacity
//! A grid holds `width * height * channels / 8` bytes of frame, where
//! `channels` is 3 for [`ChannelSelection::All`](super::params::ChannelSelection::All) and 1 otherwise.
//!
//! Example: An 800x600 image can store ~180 KB across all channels.
//!
//! All functions take the caller's grid by reference and return a new grid;
//! the input is never modified.

use crate::json::{parse, serialize, Object};

use super::bits::{bytes_to_bits, bits_to_bytes, read_slots, slot_count, slot_offset, write_bit};
use super::error::CodecError;
use super::frame::{build_frame, FrameHeader};
use super::image_io::PixelGrid;
use super::params::{EmbeddingParams, HEADER_BITS, HEADER_LEN, MAGIC_BITS};

/// Bytes of payload (excluding the header) the grid can carry.
pub fn capacity(grid: &PixelGrid, params: &EmbeddingParams) -> usize {
    let slots = slot_count(grid.width(), grid.height(), params.channel);
    (slots / 8).saturating_sub(HEADER_LEN)
}

/// Embed `metadata` into a copy of `grid`.
///
/// # Errors
/// - [`CodecError::Serialize`] if the metadata holds a value the text format
///   cannot carry
/// - [`CodecError::UnencodableText`] if the text does not fit the encoding
/// - [`CodecError::CapacityExceeded`] if the grid has too few carrier slots;
///   nothing is written in that case
pub fn embed(
    grid: &PixelGrid,
    metadata: &Object,
    params: &EmbeddingParams,
) -> Result<PixelGrid, CodecError> {
    let text = serialize(metadata)?;
    let payload = params.encoding.encode(&text)?;
    embed_payload(grid, &payload, params)
}

/// Embed an already-encoded payload into a copy of `grid`.
pub fn embed_payload(
    grid: &PixelGrid,
    payload: &[u8],
    params: &EmbeddingParams,
) -> Result<PixelGrid, CodecError> {
    let frame = build_frame(params.magic, payload)?;

    let available_bits = slot_count(grid.width(), grid.height(), params.channel);
    let required_bits = frame.len().saturating_mul(8);
    if required_bits > available_bits {
        return Err(CodecError::CapacityExceeded {
            required_bits,
            available_bits,
        });
    }

    let mut modified = grid.clone();
    let raw: &mut [u8] = &mut modified;
    for (slot, bit) in bytes_to_bits(&frame).enumerate() {
        let offset = slot_offset(slot, params.channel);
        raw[offset] = write_bit(raw[offset], bit, params.bit_plane);
    }

    Ok(modified)
}

/// Read the frame header, if the grid is large enough to hold one.
fn read_header(grid: &PixelGrid, params: &EmbeddingParams) -> Option<FrameHeader> {
    if slot_count(grid.width(), grid.height(), params.channel) < HEADER_BITS {
        return None;
    }
    let bytes = bits_to_bytes(read_slots(grid, params.channel, params.bit_plane, 0, HEADER_BITS));
    let header: [u8; HEADER_LEN] = bytes.try_into().ok()?;
    Some(FrameHeader::from_bytes(header))
}

/// Payload length declared by a frame with the expected magic.
pub fn declared_payload_len(grid: &PixelGrid, params: &EmbeddingParams) -> Option<usize> {
    read_header(grid, params)
        .filter(|header| header.magic == params.magic)
        .map(|header| header.payload_len as usize)
}

/// Recover the raw payload bytes following a valid header.
///
/// The declared length is clipped to the bits the grid actually has.
pub fn extract_payload(grid: &PixelGrid, params: &EmbeddingParams) -> Result<Vec<u8>, CodecError> {
    let payload_len = declared_payload_len(grid, params).ok_or(CodecError::NoMetadataFound)?;
    let wanted_bits = payload_len.saturating_mul(8);
    let bits = read_slots(grid, params.channel, params.bit_plane, HEADER_BITS, wanted_bits);
    Ok(bits_to_bytes(bits))
}

/// Extract the metadata hidden in `grid`.
///
/// A missing frame, a wrong magic, a truncated payload and a payload that
/// does not decode or parse all yield [`CodecError::NoMetadataFound`].
pub fn extract_raw(grid: &PixelGrid, params: &EmbeddingParams) -> Result<Object, CodecError> {
    let payload = extract_payload(grid, params)?;
    let text = params
        .encoding
        .decode(&payload)
        .ok_or(CodecError::NoMetadataFound)?;
    parse(&text).map_err(|_| CodecError::NoMetadataFound)
}

/// Cheap presence check: compares only the 32-bit magic field.
///
/// The length and payload are not validated, so a grid with a corrupted
/// payload can verify true while [`extract_raw`] fails on it.
pub fn verify(grid: &PixelGrid, params: &EmbeddingParams) -> bool {
    if slot_count(grid.width(), grid.height(), params.channel) < MAGIC_BITS {
        return false;
    }
    let bytes = bits_to_bytes(read_slots(grid, params.channel, params.bit_plane, 0, MAGIC_BITS));
    match <[u8; 4]>::try_from(bytes) {
        Ok(magic) => u32::from_be_bytes(magic) == params.magic,
        Err(_) => false,
    }
}

/// Merge `overrides` into the existing metadata (or an empty object) and
/// re-embed the result.
///
/// Overridden keys are replaced, new keys added, all other keys kept.
pub fn update(
    grid: &PixelGrid,
    overrides: &Object,
    params: &EmbeddingParams,
) -> Result<PixelGrid, CodecError> {
    let mut merged = match extract_raw(grid, params) {
        Ok(existing) => existing,
        Err(CodecError::NoMetadataFound) => Object::new(),
        Err(e) => return Err(e),
    };
    merged.extend(overrides.clone());
    embed(grid, &merged, params)
}

/// Replace whatever is hidden in `grid` with an empty document.
///
/// The result still carries a valid frame: [`verify`] is true and
/// [`extract_raw`] returns an empty [`Object`].
///
/// # Errors
/// [`CodecError::CapacityExceeded`] if the grid cannot hold an empty frame.
pub fn clear(grid: &PixelGrid, params: &EmbeddingParams) -> Result<PixelGrid, CodecError> {
    embed(grid, &Object::new(), params)
}

/// Extract metadata from `source` and embed it into a copy of `destination`.
pub fn copy(
    source: &PixelGrid,
    destination: &PixelGrid,
    params: &EmbeddingParams,
) -> Result<PixelGrid, CodecError> {
    let metadata = extract_raw(source, params)?;
    embed(destination, &metadata, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::Value;
    use crate::processing::params::{BitPlane, ChannelSelection, TextEncoding};
    use image::Rgb;

    fn sample() -> Object {
        let mut meta = Object::new();
        meta.insert("author".into(), Value::from("John Doe"));
        meta.insert("year".into(), Value::Int(2025));
        meta
    }

    fn red_grid(w: u32, h: u32) -> PixelGrid {
        PixelGrid::from_pixel(w, h, Rgb([255, 0, 0]))
    }

    #[test]
    fn test_round_trip_default_params() {
        let grid = red_grid(100, 100);
        let params = EmbeddingParams::default();
        let embedded = embed(&grid, &sample(), &params).unwrap();
        let extracted = extract_raw(&embedded, &params).unwrap();
        assert_eq!(extracted, sample());
        assert_eq!(extracted["year"], Value::Int(2025));
    }

    #[test]
    fn test_wire_format_first_bits() {
        let grid = PixelGrid::from_pixel(40, 1, Rgb([0, 0, 0]));
        let params = EmbeddingParams::default();
        let embedded = embed(&grid, &Object::new(), &params).unwrap();

        // 'M' = 0x4D = 0100_1101 spread over R,G,B of pixels 0..=2
        let raw: &[u8] = &embedded;
        assert_eq!(&raw[..8], &[0, 1, 0, 0, 1, 1, 0, 1]);
        let payload = extract_payload(&embedded, &params).unwrap();
        assert_eq!(payload, b"{}");
    }

    #[test]
    fn test_input_grid_not_modified() {
        let grid = red_grid(20, 20);
        let before = grid.clone();
        let _ = embed(&grid, &sample(), &EmbeddingParams::default()).unwrap();
        assert_eq!(grid, before);
    }

    #[test]
    fn test_untouched_tail() {
        let grid = PixelGrid::from_pixel(50, 50, Rgb([255, 255, 255]));
        let params = EmbeddingParams::default();
        let embedded = embed(&grid, &Object::new(), &params).unwrap();
        // header (64) + "{}" (16) = 80 slots
        let raw: &[u8] = &embedded;
        assert!(raw[80..].iter().all(|&b| b == 255));
    }

    #[test]
    fn test_capacity_exceeded_writes_nothing() {
        let grid = red_grid(4, 4);
        let err = embed(&grid, &sample(), &EmbeddingParams::default()).unwrap_err();
        match err {
            CodecError::CapacityExceeded {
                required_bits,
                available_bits,
            } => {
                assert_eq!(available_bits, 48);
                assert!(required_bits > available_bits);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_exact_capacity_fits() {
        // header + "{}" = 10 bytes = 80 bits; a single channel needs 80 pixels
        let grid = red_grid(80, 1);
        let params = EmbeddingParams::default().with_channel(ChannelSelection::Blue);
        assert_eq!(capacity(&grid, &params), 2);
        let embedded = embed(&grid, &Object::new(), &params).unwrap();
        assert_eq!(extract_raw(&embedded, &params).unwrap(), Object::new());
    }

    #[test]
    fn test_single_channel_isolation() {
        let grid = PixelGrid::from_fn(30, 30, |x, y| Rgb([(x * 7) as u8, (y * 5) as u8, (x + y) as u8]));
        for channel in [ChannelSelection::Red, ChannelSelection::Green, ChannelSelection::Blue] {
            let params = EmbeddingParams::default().with_channel(channel);
            let embedded = embed(&grid, &sample(), &params).unwrap();
            let carried = channel.index().unwrap();
            for (before, after) in grid.pixels().zip(embedded.pixels()) {
                for c in 0..3 {
                    if c != carried {
                        assert_eq!(before[c], after[c]);
                    } else {
                        assert_eq!(before[c] & 0xFE, after[c] & 0xFE);
                    }
                }
            }
            assert_eq!(extract_raw(&embedded, &params).unwrap(), sample());
        }
    }

    #[test]
    fn test_higher_bit_plane() {
        let grid = red_grid(40, 40);
        let params = EmbeddingParams::default().with_bit_plane(BitPlane::new(4).unwrap());
        let embedded = embed(&grid, &sample(), &params).unwrap();
        for (before, after) in grid.pixels().zip(embedded.pixels()) {
            for c in 0..3 {
                assert_eq!(before[c] & !0b1000, after[c] & !0b1000);
            }
        }
        assert_eq!(extract_raw(&embedded, &params).unwrap(), sample());
        assert!(matches!(
            extract_raw(&embedded, &EmbeddingParams::default()),
            Err(CodecError::NoMetadataFound)
        ));
    }

    #[test]
    fn test_no_metadata_on_clean_grid() {
        let grid = red_grid(100, 100);
        let params = EmbeddingParams::default();
        assert!(matches!(extract_raw(&grid, &params), Err(CodecError::NoMetadataFound)));
        assert!(!verify(&grid, &params));
    }

    #[test]
    fn test_magic_mismatch() {
        let grid = red_grid(50, 50);
        let written = EmbeddingParams::default().with_magic(0xCAFEBABE);
        let embedded = embed(&grid, &sample(), &written).unwrap();
        assert!(verify(&embedded, &written));
        assert!(!verify(&embedded, &EmbeddingParams::default()));
        assert!(matches!(
            extract_raw(&embedded, &EmbeddingParams::default()),
            Err(CodecError::NoMetadataFound)
        ));
    }

    #[test]
    fn test_tiny_grid_has_no_frame() {
        let grid = red_grid(2, 2);
        let params = EmbeddingParams::default();
        assert!(!verify(&grid, &params));
        assert!(matches!(extract_raw(&grid, &params), Err(CodecError::NoMetadataFound)));
    }

    #[test]
    fn test_verify_true_but_extract_fails_on_corrupt_payload() {
        let grid = red_grid(50, 50);
        let params = EmbeddingParams::default();
        let mut embedded = embed(&grid, &sample(), &params).unwrap();
        // flip a carrier bit inside the payload's opening '{'
        let raw: &mut [u8] = &mut embedded;
        raw[HEADER_BITS + 1] ^= 1;
        assert!(verify(&embedded, &params));
        assert!(matches!(extract_raw(&embedded, &params), Err(CodecError::NoMetadataFound)));
    }

    #[test]
    fn test_update_merges() {
        let grid = red_grid(60, 60);
        let params = EmbeddingParams::default();
        let embedded = embed(&grid, &sample(), &params).unwrap();

        let mut overrides = Object::new();
        overrides.insert("author".into(), Value::from("Jane"));
        overrides.insert("a".into(), Value::Int(1));
        let updated = update(&embedded, &overrides, &params).unwrap();

        let meta = extract_raw(&updated, &params).unwrap();
        assert_eq!(meta["author"], Value::from("Jane"));
        assert_eq!(meta["year"], Value::Int(2025));
        assert_eq!(meta["a"], Value::Int(1));
    }

    #[test]
    fn test_update_on_clean_grid_starts_empty() {
        let grid = red_grid(60, 60);
        let params = EmbeddingParams::default();
        let mut overrides = Object::new();
        overrides.insert("a".into(), Value::Int(1));
        let updated = update(&grid, &overrides, &params).unwrap();
        assert_eq!(extract_raw(&updated, &params).unwrap(), overrides);
    }

    #[test]
    fn test_clear() {
        let grid = red_grid(60, 60);
        let params = EmbeddingParams::default();
        let embedded = embed(&grid, &sample(), &params).unwrap();
        let cleared = clear(&embedded, &params).unwrap();
        assert!(verify(&cleared, &params));
        assert_eq!(extract_raw(&cleared, &params).unwrap(), Object::new());
        assert_eq!(declared_payload_len(&cleared, &params), Some(2));
    }

    #[test]
    fn test_clear_needs_room_for_empty_frame() {
        let grid = red_grid(5, 5);
        assert!(matches!(
            clear(&grid, &EmbeddingParams::default()),
            Err(CodecError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_copy_between_grids() {
        let params = EmbeddingParams::default();
        let source = embed(&red_grid(60, 60), &sample(), &params).unwrap();
        let destination = PixelGrid::from_pixel(70, 40, Rgb([0, 128, 255]));
        let copied = copy(&source, &destination, &params).unwrap();
        assert_eq!(extract_raw(&copied, &params).unwrap(), sample());
        assert!(matches!(
            copy(&destination, &source, &params),
            Err(CodecError::NoMetadataFound)
        ));
    }

    #[test]
    fn test_latin1_payload() {
        let params = EmbeddingParams::default().with_encoding(TextEncoding::Latin1);
        let mut meta = Object::new();
        meta.insert("città".into(), Value::from("Zürich"));
        let embedded = embed(&red_grid(60, 60), &meta, &params).unwrap();
        assert_eq!(extract_payload(&embedded, &params).unwrap().len(), 18);
        assert_eq!(extract_raw(&embedded, &params).unwrap(), meta);
    }

    #[test]
    fn test_deeply_nested_payload_is_not_metadata() {
        let depth = 100_000;
        let text = format!(r#"{{"a":{}{}}}"#, "[".repeat(depth), "]".repeat(depth));
        let params = EmbeddingParams::default();
        let embedded = embed_payload(&red_grid(800, 800), text.as_bytes(), &params).unwrap();
        assert!(verify(&embedded, &params));
        assert!(matches!(extract_raw(&embedded, &params), Err(CodecError::NoMetadataFound)));
    }
}
