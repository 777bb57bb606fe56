//! # Metadata Engine
//!
//! File-level façade over the steganography codec. One method per use case,
//! each returning an [`OperationResult`].
//!
//! ## Responsibilities
//!
//! Each method:
//! 1. Reads and validates the input image(s)
//! 2. Delegates to [`steganography`](crate::processing::steganography)
//! 3. Writes the output image (writing operations only)
//! 4. Translates failures into an [`OperationError`]
//!
//! ## Output paths
//!
//! When no output path is given, [`resolve_output`] picks one:
//!
//! | Operation | Default output |
//! |---|---|
//! | embed | `<stem>_embedded.png` next to the source |
//! | update | the source itself |
//! | clear | the source itself |
//! | copy | the destination itself |

use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::json::Object;
use crate::processing::steganography;
use crate::processing::{read_pixel_grid, write_pixel_grid, EmbeddingParams, PixelGrid};

use super::result::{OperationError, OperationResult};

/// Writing operations, used to pick a default output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Embed,
    Update,
    Clear,
    Copy,
}

/// Decide where a writing operation stores its result.
///
/// `target` is the image being modified: the source for embed, update and
/// clear, the destination for copy. An explicit `output` always wins.
pub fn resolve_output(operation: WriteOperation, target: &Path, output: Option<&Path>) -> PathBuf {
    if let Some(output) = output {
        return output.to_path_buf();
    }
    match operation {
        WriteOperation::Embed => {
            let stem = target
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            target.with_file_name(format!("{stem}_embedded.png"))
        }
        WriteOperation::Update | WriteOperation::Clear | WriteOperation::Copy => {
            target.to_path_buf()
        }
    }
}

/// Runs metadata operations on image files with one fixed set of
/// [`EmbeddingParams`].
///
/// # Example
/// ```ignore
/// let engine = MetadataEngine::default();
/// let result = engine.embed(Path::new("photo.png"), &metadata, None);
/// assert!(result.success);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetadataEngine {
    params: EmbeddingParams,
}

impl MetadataEngine {
    pub fn new(params: EmbeddingParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &EmbeddingParams {
        &self.params
    }

    /// Hide `metadata` in the image at `source`.
    ///
    /// Replaces any metadata already hidden with the same parameters.
    pub fn embed(&self, source: &Path, metadata: &Object, output: Option<&Path>) -> OperationResult {
        let result = self.try_embed(source, metadata, output);
        self.finish("embed", source, result)
    }

    fn try_embed(
        &self,
        source: &Path,
        metadata: &Object,
        output: Option<&Path>,
    ) -> Result<OperationResult, OperationError> {
        let grid = read_pixel_grid(source)?;
        let modified = steganography::embed(&grid, metadata, &self.params)?;
        let output_path = resolve_output(WriteOperation::Embed, source, output);
        self.store(&modified, output_path)
    }

    /// Recover the metadata hidden in the image at `source`.
    ///
    /// An image with nothing hidden fails with
    /// [`ErrorKind::NoMetadataFound`](super::ErrorKind::NoMetadataFound).
    pub fn extract(&self, source: &Path) -> OperationResult {
        let result = self.try_extract(source);
        self.finish("extract", source, result)
    }

    fn try_extract(&self, source: &Path) -> Result<OperationResult, OperationError> {
        let grid = read_pixel_grid(source)?;
        let metadata = steganography::extract_raw(&grid, &self.params)?;
        let payload_size = steganography::declared_payload_len(&grid, &self.params).unwrap_or(0);
        Ok(OperationResult::extracted(metadata, payload_size))
    }

    /// Check whether the image at `source` starts with the expected magic.
    ///
    /// Only the magic field is read; see
    /// [`steganography::verify`](crate::processing::steganography::verify).
    pub fn verify(&self, source: &Path) -> OperationResult {
        let result = self.try_verify(source);
        self.finish("verify", source, result)
    }

    fn try_verify(&self, source: &Path) -> Result<OperationResult, OperationError> {
        let grid = read_pixel_grid(source)?;
        if steganography::verify(&grid, &self.params) {
            Ok(OperationResult::verified())
        } else {
            Err(crate::processing::CodecError::NoMetadataFound.into())
        }
    }

    /// Merge `overrides` into the metadata hidden in `source` (or into an
    /// empty document if there is none) and store the result.
    pub fn update(&self, source: &Path, overrides: &Object, output: Option<&Path>) -> OperationResult {
        let result = self.try_update(source, overrides, output);
        self.finish("update", source, result)
    }

    fn try_update(
        &self,
        source: &Path,
        overrides: &Object,
        output: Option<&Path>,
    ) -> Result<OperationResult, OperationError> {
        let grid = read_pixel_grid(source)?;
        let modified = steganography::update(&grid, overrides, &self.params)?;
        let output_path = resolve_output(WriteOperation::Update, source, output);
        self.store(&modified, output_path)
    }

    /// Replace the metadata hidden in `source` with an empty document.
    pub fn clear(&self, source: &Path, output: Option<&Path>) -> OperationResult {
        let result = self.try_clear(source, output);
        self.finish("clear", source, result)
    }

    fn try_clear(&self, source: &Path, output: Option<&Path>) -> Result<OperationResult, OperationError> {
        let grid = read_pixel_grid(source)?;
        let modified = steganography::clear(&grid, &self.params)?;
        let output_path = resolve_output(WriteOperation::Clear, source, output);
        self.store(&modified, output_path)
    }

    /// Copy the metadata hidden in `source` into `destination`.
    pub fn copy(&self, source: &Path, destination: &Path, output: Option<&Path>) -> OperationResult {
        let result = self.try_copy(source, destination, output);
        self.finish("copy", source, result)
    }

    fn try_copy(
        &self,
        source: &Path,
        destination: &Path,
        output: Option<&Path>,
    ) -> Result<OperationResult, OperationError> {
        let source_grid = read_pixel_grid(source)?;
        let destination_grid = read_pixel_grid(destination)?;
        let modified = steganography::copy(&source_grid, &destination_grid, &self.params)?;
        let output_path = resolve_output(WriteOperation::Copy, destination, output);
        self.store(&modified, output_path)
    }

    fn store(&self, modified: &PixelGrid, output_path: PathBuf) -> Result<OperationResult, OperationError> {
        write_pixel_grid(modified, &output_path)?;
        let payload_size = steganography::declared_payload_len(modified, &self.params).unwrap_or(0);
        Ok(OperationResult::written(output_path, payload_size))
    }

    fn finish(
        &self,
        operation: &str,
        source: &Path,
        result: Result<OperationResult, OperationError>,
    ) -> OperationResult {
        match &result {
            Ok(done) => match &done.output_path {
                Some(path) => info!(
                    "✅ {} {} -> {} ({} payload bytes)",
                    operation,
                    source.display(),
                    path.display(),
                    done.payload_size.unwrap_or(0)
                ),
                None => debug!("✅ {} {}", operation, source.display()),
            },
            Err(e) => warn!("❌ {} {} failed: {}", operation, source.display(), e),
        }
        result.into()
    }
}
