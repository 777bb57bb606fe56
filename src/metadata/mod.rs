//! # Metadata Operations
//!
//! The public, file-level surface of the crate.
//!
//! ## Engine ([`engine`])
//! One method per use case (embed, extract, verify, update, clear, copy),
//! all returning the same [`OperationResult`]. Output naming is decided in
//! exactly one place, [`resolve_output`].
//!
//! ## Results ([`result`])
//! The uniform result type and the error taxonomy every failure is mapped to.
//!
//! ## Convenience ([`convenience`])
//! Copyright / author / date helpers and image info, layered on the engine.

pub mod convenience;
pub mod engine;
pub mod result;

// Re-export for convenience
pub use convenience::ImageInfo;
pub use engine::{resolve_output, MetadataEngine, WriteOperation};
pub use result::{ErrorKind, OperationError, OperationResult};
