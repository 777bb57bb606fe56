//! # Image Processing and Steganography
//!
//! Bit framing codec that hides a metadata document in the carrier bits of
//! an RGB pixel grid, plus the image I/O collaborator that turns files into
//! grids and back.
//!
//! - [`params`]: embedding parameters (bit plane, channel, encoding, magic)
//! - [`frame`]: 8-byte frame header
//! - [`bits`]: carrier slot addressing and bit-plane access
//! - [`steganography`]: embed / extract / verify / update / clear / copy
//! - [`image_io`]: file ↔ pixel grid conversion

pub mod bits;
pub mod error;
pub mod frame;
pub mod image_io;
pub mod params;
pub mod steganography;

// Re-export main functions for convenience
pub use error::{CodecError, ImageIoError};
pub use image_io::{read_pixel_grid, write_pixel_grid, PixelGrid};
pub use params::{BitPlane, ChannelSelection, EmbeddingParams, TextEncoding, DEFAULT_MAGIC};
pub use steganography::{capacity, clear, copy, embed, extract_raw, update, verify};
