//! # Batch Processing
//!
//! Applies one metadata operation to many images at once.
//!
//! Each image is independent: work runs on tokio's blocking pool with at most
//! `workers` images in flight, and every input gets exactly one
//! [`BatchEntry`] in input order. A failure (or a panic) on one image is
//! recorded in its own entry and never touches the others.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let runner = BatchRunner::new(MetadataEngine::default(), BatchConfig::default());
//! let report = runner.run(paths, BatchOperation::Embed(metadata)).await?;
//! report.export_to_json("report.json")?;
//! ```

use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

use crate::common::config::BatchConfig;
use crate::json::Object;
use crate::metadata::{ErrorKind, MetadataEngine, OperationError, OperationResult};

/// File extensions picked up when a directory is given as batch input.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "bmp", "tif", "tiff", "jpg", "jpeg", "gif", "webp", "ppm"];

/// The operation applied to every image in a batch.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    Embed(Object),
    Update(Object),
    Clear,
    Verify,
    Extract,
}

impl BatchOperation {
    fn writes_output(&self) -> bool {
        matches!(self, Self::Embed(_) | Self::Update(_) | Self::Clear)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Embed(_) => "embed",
            Self::Update(_) => "update",
            Self::Clear => "clear",
            Self::Verify => "verify",
            Self::Extract => "extract",
        }
    }
}

/// Outcome for one input image.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub source: PathBuf,
    pub result: OperationResult,
}

/// Aggregated counts over a batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Failures per error kind
    pub failure_kinds: HashMap<String, usize>,
}

/// Results of a batch run, one entry per input in input order.
#[derive(Debug)]
pub struct BatchReport {
    operation: &'static str,
    elapsed: Duration,
    entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn all_succeeded(&self) -> bool {
        self.entries.iter().all(|e| e.result.success)
    }

    /// Success flag per source path.
    pub fn success_map(&self) -> HashMap<PathBuf, bool> {
        self.entries
            .iter()
            .map(|e| (e.source.clone(), e.result.success))
            .collect()
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.entries.len(),
            ..Default::default()
        };
        for entry in &self.entries {
            if entry.result.success {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
                if let Some(kind) = entry.result.error_kind() {
                    *summary.failure_kinds.entry(kind.to_string()).or_insert(0) += 1;
                }
            }
        }
        summary
    }

    pub fn export_to_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let output = serde_json::json!({
            "operation": self.operation,
            "duration_ms": self.elapsed.as_millis() as u64,
            "summary": self.summary(),
            "entries": self.entries,
        });

        let json_string = serde_json::to_string_pretty(&output)?;
        let mut file = File::create(path)?;
        file.write_all(json_string.as_bytes())?;

        Ok(())
    }
}

/// Runs one [`BatchOperation`] over many images with a bounded worker pool.
pub struct BatchRunner {
    engine: Arc<MetadataEngine>,
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new(engine: MetadataEngine, config: BatchConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            config,
        }
    }

    /// Where a writing operation stores the result for `source`:
    /// `<output_dir>/<file stem>.png`.
    pub fn output_path_for(&self, source: &Path) -> PathBuf {
        self.config.output_dir.join(format!("{}.png", file_stem(source)))
    }

    /// One distinct output path per input, in input order.
    ///
    /// Inputs that would share a name (`photo.png` and `photo.bmp`, or the
    /// same path listed twice) get `_2`, `_3`, ... suffixes after the first.
    pub fn planned_outputs(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut taken = HashSet::new();
        paths
            .iter()
            .map(|source| {
                let mut candidate = self.output_path_for(source);
                let mut n = 2;
                while !taken.insert(candidate.clone()) {
                    candidate = self
                        .config
                        .output_dir
                        .join(format!("{}_{n}.png", file_stem(source)));
                    n += 1;
                }
                if n > 2 {
                    debug!(
                        "Output for {} renamed to {} to avoid a collision",
                        source.display(),
                        candidate.display()
                    );
                }
                candidate
            })
            .collect()
    }

    /// Process every path and collect one entry per input.
    ///
    /// # Errors
    /// Only if the output directory cannot be created; per-image failures are
    /// reported inside the returned [`BatchReport`].
    pub async fn run(&self, paths: Vec<PathBuf>, operation: BatchOperation) -> std::io::Result<BatchReport> {
        let started = Instant::now();
        if operation.writes_output() {
            tokio::fs::create_dir_all(&self.config.output_dir).await?;
        }

        info!(
            "📦 Batch {} over {} image(s) with {} worker(s)",
            operation.name(),
            paths.len(),
            self.config.workers.max(1)
        );

        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let operation = Arc::new(operation);
        let outputs = self.planned_outputs(&paths);
        let mut handles = Vec::with_capacity(paths.len());

        for (source, output) in paths.iter().zip(outputs) {
            let engine = Arc::clone(&self.engine);
            let operation = Arc::clone(&operation);
            let semaphore = Arc::clone(&semaphore);
            let source = source.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                tokio::task::spawn_blocking(move || process_one(&engine, &operation, &source, &output))
                    .await
            }));
        }

        let mut entries = Vec::with_capacity(paths.len());
        for (source, handle) in paths.into_iter().zip(handles) {
            let result = match handle.await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) | Err(e) => {
                    warn!("❌ Batch task for {} did not complete: {}", source.display(), e);
                    OperationResult::failed(OperationError::new(
                        ErrorKind::Io,
                        format!("task did not complete: {e}"),
                    ))
                }
            };
            entries.push(BatchEntry { source, result });
        }

        let report = BatchReport {
            operation: operation.name(),
            elapsed: started.elapsed(),
            entries,
        };
        let summary = report.summary();
        info!(
            "📦 Batch {} finished: {}/{} succeeded",
            report.operation, summary.succeeded, summary.total
        );
        Ok(report)
    }
}

fn file_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

fn process_one(
    engine: &MetadataEngine,
    operation: &BatchOperation,
    source: &Path,
    output: &Path,
) -> OperationResult {
    match operation {
        BatchOperation::Embed(metadata) => engine.embed(source, metadata, Some(output)),
        BatchOperation::Update(overrides) => engine.update(source, overrides, Some(output)),
        BatchOperation::Clear => engine.clear(source, Some(output)),
        BatchOperation::Verify => engine.verify(source),
        BatchOperation::Extract => engine.extract(source),
    }
}

/// Expand inputs into image paths: files are taken as-is, directories are
/// scanned (non-recursively) for known image extensions, sorted by name.
pub fn collect_images(inputs: &[PathBuf]) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && has_image_extension(path))
                .collect();
            found.sort();
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_for() {
        let runner = BatchRunner::new(
            MetadataEngine::default(),
            BatchConfig {
                workers: 2,
                output_dir: PathBuf::from("/out"),
                report: None,
            },
        );
        assert_eq!(
            runner.output_path_for(Path::new("/in/photo.jpg")),
            PathBuf::from("/out/photo.png")
        );
    }

    #[test]
    fn test_planned_outputs_are_unique() {
        let runner = BatchRunner::new(
            MetadataEngine::default(),
            BatchConfig {
                workers: 1,
                output_dir: PathBuf::from("/out"),
                report: None,
            },
        );
        let inputs = [
            "/a/photo.png",
            "/b/photo.bmp",
            "/a/photo.png",
            "/c/photo_2.jpg",
            "/c/other.tif",
        ]
        .map(PathBuf::from);
        let outputs = runner.planned_outputs(&inputs);
        assert_eq!(
            outputs,
            [
                "/out/photo.png",
                "/out/photo_2.png",
                "/out/photo_3.png",
                "/out/photo_2_2.png",
                "/out/other.png",
            ]
            .map(PathBuf::from)
        );
    }

    #[test]
    fn test_summary_counts() {
        let report = BatchReport {
            operation: "verify",
            elapsed: Duration::from_millis(5),
            entries: vec![
                BatchEntry {
                    source: PathBuf::from("a.png"),
                    result: OperationResult::verified(),
                },
                BatchEntry {
                    source: PathBuf::from("b.png"),
                    result: OperationResult::failed(OperationError::new(ErrorKind::NoMetadataFound, "none")),
                },
                BatchEntry {
                    source: PathBuf::from("c.png"),
                    result: OperationResult::failed(OperationError::new(ErrorKind::SourceNotFound, "gone")),
                },
            ],
        };
        let summary = report.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.failure_kinds.get("NoMetadataFound"), Some(&1));
        assert!(!report.all_succeeded());
        assert_eq!(report.success_map()[&PathBuf::from("a.png")], true);
    }

    #[test]
    fn test_collect_images_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.JPG", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let found = collect_images(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png"]);
    }
}
