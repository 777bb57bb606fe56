//! # Operation Results
//!
//! Every public metadata operation returns the same [`OperationResult`]
//! shape. Callers branch on `success` / `error`, never on which operation
//! produced the value.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::json::{Object, ParseError};
use crate::processing::{CodecError, ImageIoError};

/// Failure categories reported inside an [`OperationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    SourceNotFound,
    NotADecodableImage,
    /// Nothing hidden, wrong parameters, or an undecodable payload.
    NoMetadataFound,
    UnsupportedValueType,
    /// Caller-supplied metadata text failed to parse.
    MalformedJson,
    ChannelIndexOutOfRange,
    CapacityExceeded,
    InvalidBitPlane,
    UnencodableText,
    /// An unrecognised channel or encoding name.
    InvalidParameter,
    /// Writing the output failed after all validation passed.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl OperationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for OperationError {}

impl From<CodecError> for OperationError {
    fn from(e: CodecError) -> Self {
        let kind = match &e {
            CodecError::NoMetadataFound => ErrorKind::NoMetadataFound,
            CodecError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            CodecError::Serialize(_) => ErrorKind::UnsupportedValueType,
            CodecError::UnencodableText(_) => ErrorKind::UnencodableText,
            CodecError::InvalidBitPlane(_) => ErrorKind::InvalidBitPlane,
            CodecError::ChannelIndexOutOfRange(_) => ErrorKind::ChannelIndexOutOfRange,
            CodecError::UnknownChannel(_) | CodecError::UnknownEncoding(_) => {
                ErrorKind::InvalidParameter
            }
        };
        Self::new(kind, e.to_string())
    }
}

impl From<ImageIoError> for OperationError {
    fn from(e: ImageIoError) -> Self {
        let kind = match &e {
            ImageIoError::SourceNotFound(_) => ErrorKind::SourceNotFound,
            ImageIoError::NotADecodableImage { .. } => ErrorKind::NotADecodableImage,
            ImageIoError::Write { .. } => ErrorKind::Io,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<ParseError> for OperationError {
    fn from(e: ParseError) -> Self {
        Self::new(ErrorKind::MalformedJson, e.to_string())
    }
}

/// Uniform outcome of embed, extract, verify, update, clear and copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResult {
    pub success: bool,
    /// Where the modified image was written (writing operations only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Size in bytes of the payload now hidden in the image, header excluded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_size: Option<usize>,
    /// Recovered metadata (extract only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Object>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

impl OperationResult {
    pub fn written(output_path: PathBuf, payload_size: usize) -> Self {
        Self {
            success: true,
            output_path: Some(output_path),
            payload_size: Some(payload_size),
            metadata: None,
            error: None,
        }
    }

    pub fn extracted(metadata: Object, payload_size: usize) -> Self {
        Self {
            success: true,
            output_path: None,
            payload_size: Some(payload_size),
            metadata: Some(metadata),
            error: None,
        }
    }

    pub fn verified() -> Self {
        Self {
            success: true,
            output_path: None,
            payload_size: None,
            metadata: None,
            error: None,
        }
    }

    pub fn failed(error: OperationError) -> Self {
        Self {
            success: false,
            output_path: None,
            payload_size: None,
            metadata: None,
            error: Some(error),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

impl From<Result<OperationResult, OperationError>> for OperationResult {
    fn from(result: Result<OperationResult, OperationError>) -> Self {
        result.unwrap_or_else(OperationResult::failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_mapping() {
        let err: OperationError = CodecError::CapacityExceeded {
            required_bits: 100,
            available_bits: 10,
        }
        .into();
        assert_eq!(err.kind, ErrorKind::CapacityExceeded);
        assert!(err.message.contains("100"));

        let err: OperationError = CodecError::ChannelIndexOutOfRange(5).into();
        assert_eq!(err.kind, ErrorKind::ChannelIndexOutOfRange);
    }

    #[test]
    fn test_failed_result_shape() {
        let result = OperationResult::failed(OperationError::new(ErrorKind::NoMetadataFound, "none"));
        assert!(!result.success);
        assert_eq!(result.error_kind(), Some(ErrorKind::NoMetadataFound));
        assert!(result.output_path.is_none());
    }

    #[test]
    fn test_json_shape_omits_empty_fields() {
        let result = OperationResult::written(PathBuf::from("out.png"), 33);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["output_path"], "out.png");
        assert_eq!(json["payload_size"], 33);
        assert!(json.get("error").is_none());
    }
}
