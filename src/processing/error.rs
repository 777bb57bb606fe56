//! Error types for the bit framing codec and its image collaborator.

use std::path::PathBuf;
use thiserror::Error;

use crate::json::SerializeError;

/// Errors raised while embedding into or reading from a pixel grid.
#[derive(Debug, Error)]
pub enum CodecError {
    /// No frame with the expected magic, or the payload did not decode.
    ///
    /// This is the normal "nothing hidden here" outcome.
    #[error("no metadata found")]
    NoMetadataFound,

    #[error("image too small: need {required_bits} bits but only {available_bits} available")]
    CapacityExceeded {
        required_bits: usize,
        available_bits: usize,
    },

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error("character {0:?} cannot be represented in the selected text encoding")]
    UnencodableText(char),

    #[error("bit plane must be between 1 and 8, got {0}")]
    InvalidBitPlane(u8),

    #[error("channel index must be 0 (red), 1 (green) or 2 (blue), got {0}")]
    ChannelIndexOutOfRange(i64),

    #[error("unknown channel '{0}'")]
    UnknownChannel(String),

    #[error("unknown text encoding '{0}'")]
    UnknownEncoding(String),
}

/// Errors raised by the image I/O collaborator.
#[derive(Debug, Error)]
pub enum ImageIoError {
    #[error("file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("not a decodable image: {}: {source}", .path.display())]
    NotADecodableImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
