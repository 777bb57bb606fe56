//! Error types for metadata text parsing and serialization.

use thiserror::Error;

/// What went wrong while parsing metadata text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A character that cannot start or continue the current construct.
    UnexpectedToken(char),
    /// Input ended in the middle of a value.
    UnexpectedEnd,
    /// A string literal with no closing quote.
    UnterminatedString,
    /// A backslash followed by something other than `"`, `\`, `n`, `r`, `t`.
    BadEscape(char),
    /// A second `.` in a number, or an integer that does not fit in 64 bits.
    MalformedNumber,
    /// Non-whitespace after the top-level object.
    TrailingInput,
    /// More nested containers than [`MAX_NESTING_DEPTH`](super::parser::MAX_NESTING_DEPTH).
    NestingTooDeep,
}

/// Parse failure with the character offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} at offset {position}", describe(.kind))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, position: usize) -> Self {
        Self { kind, position }
    }
}

fn describe(kind: &ParseErrorKind) -> String {
    match kind {
        ParseErrorKind::UnexpectedToken(c) => format!("unexpected '{c}'"),
        ParseErrorKind::UnexpectedEnd => "unexpected end of input".to_string(),
        ParseErrorKind::UnterminatedString => "unterminated string".to_string(),
        ParseErrorKind::BadEscape(c) => format!("bad escape sequence '\\{c}'"),
        ParseErrorKind::MalformedNumber => "malformed number".to_string(),
        ParseErrorKind::TrailingInput => "trailing input after object".to_string(),
        ParseErrorKind::NestingTooDeep => "nesting too deep".to_string(),
    }
}

/// Serialization failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerializeError {
    /// A value the text format cannot represent (nulls inside arrays,
    /// negative or non-finite numbers, nesting deeper than the parser accepts).
    #[error("unsupported value type: {0}")]
    UnsupportedValueType(String),
}
