//! Shortcuts for common metadata tasks, built on [`MetadataEngine`].

use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

use crate::json::{Object, Value};
use crate::processing::{read_pixel_grid, steganography};

use super::engine::MetadataEngine;
use super::result::{OperationError, OperationResult};

pub const COPYRIGHT_KEY: &str = "copyright";
pub const AUTHOR_KEY: &str = "author";
pub const EMAIL_KEY: &str = "email";
pub const CREATED_KEY: &str = "created";

/// Dimensions, capacity and hidden metadata of an image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Payload bytes the image can hold with the engine's parameters.
    pub capacity_bytes: usize,
    /// Hidden metadata; empty when there is none.
    pub metadata: Object,
}

impl MetadataEngine {
    /// Hidden metadata, or an empty document when there is none or the
    /// image cannot be read.
    pub fn extract_metadata(&self, source: &Path) -> Object {
        self.extract(source).metadata.unwrap_or_default()
    }

    pub fn has_metadata(&self, source: &Path) -> bool {
        self.verify(source).success
    }

    /// Extract only `keys`; keys that are not present are left out.
    pub fn extract_keys(&self, source: &Path, keys: &[&str]) -> OperationResult {
        let mut result = self.extract(source);
        if let Some(metadata) = result.metadata.as_mut() {
            metadata.retain(|key, _| keys.contains(&key.as_str()));
        }
        result
    }

    pub fn add_copyright(&self, source: &Path, copyright: &str, output: Option<&Path>) -> OperationResult {
        let mut overrides = Object::new();
        overrides.insert(COPYRIGHT_KEY.to_string(), Value::from(copyright));
        self.update(source, &overrides, output)
    }

    /// Set the author name and, when given, an email address.
    pub fn add_author_info(
        &self,
        source: &Path,
        name: &str,
        email: Option<&str>,
        output: Option<&Path>,
    ) -> OperationResult {
        let mut overrides = Object::new();
        overrides.insert(AUTHOR_KEY.to_string(), Value::from(name));
        if let Some(email) = email {
            overrides.insert(EMAIL_KEY.to_string(), Value::from(email));
        }
        self.update(source, &overrides, output)
    }

    /// Record a creation date as `YYYY-MM-DD`; defaults to today (local time).
    pub fn add_creation_date(
        &self,
        source: &Path,
        date: Option<NaiveDate>,
        output: Option<&Path>,
    ) -> OperationResult {
        let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
        let mut overrides = Object::new();
        overrides.insert(
            CREATED_KEY.to_string(),
            Value::from(date.format("%Y-%m-%d").to_string()),
        );
        self.update(source, &overrides, output)
    }

    pub fn image_info(&self, source: &Path) -> Result<ImageInfo, OperationError> {
        let grid = read_pixel_grid(source)?;
        let metadata = steganography::extract_raw(&grid, self.params()).unwrap_or_default();
        Ok(ImageInfo {
            width: grid.width(),
            height: grid.height(),
            capacity_bytes: steganography::capacity(&grid, self.params()),
            metadata,
        })
    }
}
