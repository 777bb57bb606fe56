//! # Configuration Utilities
//!
//! TOML configuration for the `stegmeta` binary and batch runs.
//!
//! # Example TOML
//!
//! ```toml
//! [embedding]
//! bit_plane = 1
//! channel = "all"          # or an index: 0, 1, 2
//! encoding = "utf-8"
//! magic = 0x4D455441
//!
//! [batch]
//! workers = 4
//! output_dir = "out"
//! report = "out/report.json"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::processing::EmbeddingParams;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: StegoConfig = load_config("stegmeta.toml")?;
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Complete configuration; every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StegoConfig {
    /// Where and how payload bits are stored
    pub embedding: EmbeddingParams,
    /// Batch run settings
    pub batch: BatchConfig,
}

/// Batch run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of images processed concurrently (at least 1)
    pub workers: usize,
    /// Directory that receives output images (created if missing)
    pub output_dir: PathBuf,
    /// Optional path for a JSON report of the run
    pub report: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            output_dir: PathBuf::from("output"),
            report: None,
        }
    }
}
