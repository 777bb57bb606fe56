//! # Metadata Text Format
//!
//! A minimal JSON subset used to turn a metadata document into payload bytes
//! and back. See [`parser`] for the accepted grammar.

pub mod error;
pub mod parser;
pub mod serializer;
pub mod value;

pub use error::{ParseError, ParseErrorKind, SerializeError};
pub use parser::{parse, MAX_NESTING_DEPTH};
pub use serializer::serialize;
pub use value::{Object, Value};
