//! Bit-level primitives: carrier slot addressing and bit-plane access.
//!
//! A pixel grid is addressed as a flat sequence of *carrier slots* in
//! row-major order. With [`ChannelSelection::All`] every channel byte is a
//! slot (R, G, B of pixel 0, then pixel 1, ...); with a single channel only
//! that channel of each pixel is.

use super::params::{BitPlane, ChannelSelection};

const CHANNELS: usize = 3;

/// Number of carrier slots in a `width` x `height` grid.
pub fn slot_count(width: u32, height: u32, channel: ChannelSelection) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(channel.channels_per_pixel())
}

/// Offset into an interleaved RGB buffer of carrier slot `slot`.
pub fn slot_offset(slot: usize, channel: ChannelSelection) -> usize {
    match channel.index() {
        None => slot,
        Some(c) => slot * CHANNELS + c,
    }
}

/// Overwrite the carrier bit of `byte` with `bit`.
pub fn write_bit(byte: u8, bit: u8, plane: BitPlane) -> u8 {
    let shift = plane.shift();
    (byte & !(1 << shift)) | ((bit & 1) << shift)
}

/// Read the carrier bit of `byte`.
pub fn read_bit(byte: u8, plane: BitPlane) -> u8 {
    (byte >> plane.shift()) & 1
}

/// Expand bytes into bits, most significant bit first.
pub fn bytes_to_bits(bytes: &[u8]) -> impl Iterator<Item = u8> + '_ {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |i| (byte >> i) & 1))
}

/// Pack bits (most significant first) into bytes.
///
/// A trailing partial group is padded with zero bits on the right.
pub fn bits_to_bytes<I: IntoIterator<Item = u8>>(bits: I) -> Vec<u8> {
    let mut out = Vec::new();
    let mut current = 0u8;
    let mut filled = 0;
    for bit in bits {
        current = (current << 1) | (bit & 1);
        filled += 1;
        if filled == 8 {
            out.push(current);
            current = 0;
            filled = 0;
        }
    }
    if filled > 0 {
        out.push(current << (8 - filled));
    }
    out
}

/// Read `count` carrier bits starting at `first_slot`, clipped to the buffer.
pub fn read_slots(
    raw: &[u8],
    channel: ChannelSelection,
    plane: BitPlane,
    first_slot: usize,
    count: usize,
) -> impl Iterator<Item = u8> + '_ {
    (first_slot..first_slot.saturating_add(count))
        .map(move |slot| slot_offset(slot, channel))
        .take_while(move |&offset| offset < raw.len())
        .map(move |offset| read_bit(raw[offset], plane))
}
