//! # stego-meta
//!
//! Hides a key/value metadata document inside the pixel data of an image
//! using least-significant-bit embedding, and recovers it later.
//!
//! - [`json`]: metadata value model, parser and serializer
//! - [`processing`]: bit framing codec and image I/O
//! - [`metadata`]: file-level operations with a uniform result type
//! - [`batch`]: the same operations over many images
//! - [`common`]: configuration and logging

pub mod batch;
pub mod common;
pub mod json;
pub mod metadata;
pub mod processing;

pub use json::{Object, Value};
pub use metadata::{ErrorKind, MetadataEngine, OperationResult};
pub use processing::EmbeddingParams;
