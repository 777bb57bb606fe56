//! # Image I/O
//!
//! Converts image files to and from the plain RGB [`PixelGrid`] the codec
//! works on. Any format the `image` crate can decode is accepted as input;
//! output is always written as PNG so carrier bits survive.
//!
//! Alpha is not preserved: inputs are flattened to RGB on read and outputs
//! are fully opaque.

use image::ImageFormat;
use std::path::Path;

use super::error::ImageIoError;

/// A 2-D grid of 8-bit RGB pixels, row-major.
pub type PixelGrid = image::RgbImage;

/// Read an image file into an RGB pixel grid.
pub fn read_pixel_grid(path: &Path) -> Result<PixelGrid, ImageIoError> {
    if !path.exists() {
        return Err(ImageIoError::SourceNotFound(path.to_path_buf()));
    }

    let img = image::io::Reader::open(path)
        .map_err(|e| ImageIoError::NotADecodableImage {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(e),
        })?
        .with_guessed_format()
        .map_err(|e| ImageIoError::NotADecodableImage {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(e),
        })?
        .decode()
        .map_err(|source| ImageIoError::NotADecodableImage {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(img.to_rgb8())
}

/// Write a pixel grid to `path` as PNG.
pub fn write_pixel_grid(grid: &PixelGrid, path: &Path) -> Result<(), ImageIoError> {
    grid.save_with_format(path, ImageFormat::Png)
        .map_err(|source| ImageIoError::Write {
            path: path.to_path_buf(),
            source,
        })
}
