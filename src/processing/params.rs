//! # Embedding Parameters
//!
//! One immutable value describing where and how payload bits are stored.
//! The same parameters must be used to read a payload back as were used to
//! write it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::CodecError;

/// Default frame magic: ASCII `META`.
pub const DEFAULT_MAGIC: u32 = 0x4D45_5441;

/// Frame header length in bytes: magic (4) + payload length (4).
pub const HEADER_LEN: usize = 8;

/// Header length in carrier bits.
pub const HEADER_BITS: usize = HEADER_LEN * 8;

/// Bits read by the presence check (the magic field only).
pub const MAGIC_BITS: usize = 32;

/// 1-based bit position within a channel byte that carries payload data.
///
/// `1` is the least significant bit, `8` the most significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BitPlane(u8);

impl BitPlane {
    pub const LSB: BitPlane = BitPlane(1);

    pub fn new(plane: u8) -> Result<Self, CodecError> {
        if (1..=8).contains(&plane) {
            Ok(Self(plane))
        } else {
            Err(CodecError::InvalidBitPlane(plane))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based shift of the carrier bit.
    pub fn shift(self) -> u8 {
        self.0 - 1
    }
}

impl Default for BitPlane {
    fn default() -> Self {
        Self::LSB
    }
}

impl TryFrom<u8> for BitPlane {
    type Error = CodecError;

    fn try_from(plane: u8) -> Result<Self, Self::Error> {
        Self::new(plane)
    }
}

impl From<BitPlane> for u8 {
    fn from(plane: BitPlane) -> Self {
        plane.0
    }
}

/// Which colour channels carry payload bits.
///
/// Deserializes from a name (`"all"`, `"red"`, ...) or a channel index
/// (`0`, `1`, `2`), the same forms [`FromStr`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "ChannelRepr")]
pub enum ChannelSelection {
    /// Red, green, blue of each pixel in turn before moving to the next pixel.
    #[default]
    All,
    Red,
    Green,
    Blue,
}

impl ChannelSelection {
    /// Map a channel index (0 = red, 1 = green, 2 = blue).
    pub fn from_index(index: i64) -> Result<Self, CodecError> {
        match index {
            0 => Ok(Self::Red),
            1 => Ok(Self::Green),
            2 => Ok(Self::Blue),
            other => Err(CodecError::ChannelIndexOutOfRange(other)),
        }
    }

    /// Index of the single selected channel, `None` for [`ChannelSelection::All`].
    pub fn index(self) -> Option<usize> {
        match self {
            Self::All => None,
            Self::Red => Some(0),
            Self::Green => Some(1),
            Self::Blue => Some(2),
        }
    }

    /// Carrier slots contributed by each pixel.
    pub fn channels_per_pixel(self) -> usize {
        match self {
            Self::All => 3,
            _ => 1,
        }
    }
}

impl FromStr for ChannelSelection {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "red" | "r" => Ok(Self::Red),
            "green" | "g" => Ok(Self::Green),
            "blue" | "b" => Ok(Self::Blue),
            other => other
                .parse::<i64>()
                .map_err(|_| CodecError::UnknownChannel(s.to_string()))
                .and_then(Self::from_index),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChannelRepr {
    Index(i64),
    Name(String),
}

impl TryFrom<ChannelRepr> for ChannelSelection {
    type Error = CodecError;

    fn try_from(repr: ChannelRepr) -> Result<Self, Self::Error> {
        match repr {
            ChannelRepr::Index(index) => Self::from_index(index),
            ChannelRepr::Name(name) => name.parse(),
        }
    }
}

impl fmt::Display for ChannelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::All => "all",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        };
        f.write_str(name)
    }
}

/// Text encoding applied to the serialized metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    /// ISO-8859-1: one byte per character, code points up to U+00FF only.
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
}

impl TextEncoding {
    pub fn encode(self, text: &str) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).map_err(|_| CodecError::UnencodableText(c)))
                .collect(),
        }
    }

    /// Decode payload bytes; `None` if they are not valid in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            _ => Err(CodecError::UnknownEncoding(s.to_string())),
        }
    }
}

/// Everything the codec needs to locate a frame inside a pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingParams {
    pub bit_plane: BitPlane,
    pub channel: ChannelSelection,
    pub encoding: TextEncoding,
    pub magic: u32,
}

impl Default for EmbeddingParams {
    fn default() -> Self {
        Self {
            bit_plane: BitPlane::LSB,
            channel: ChannelSelection::All,
            encoding: TextEncoding::Utf8,
            magic: DEFAULT_MAGIC,
        }
    }
}

impl EmbeddingParams {
    pub fn with_channel(mut self, channel: ChannelSelection) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_bit_plane(mut self, bit_plane: BitPlane) -> Self {
        self.bit_plane = bit_plane;
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_magic(mut self, magic: u32) -> Self {
        self.magic = magic;
        self
    }
}
