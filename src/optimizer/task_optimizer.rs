//! # Task Optimizer Module
//!
//! Worker per l'elaborazione di una singola directory media.
//! Ogni file produce un `FileOutcome` esplicito raccolto in un `DirectoryReport`:
//! un errore su un file non interrompe mai l'elaborazione degli altri.
//!
//! ## Pipeline per file:
//! 1. Salta voci che non sono file regolari
//! 2. Salta estensioni non riconosciute (solo `.jpg`, `.jpeg`, `.png`)
//! 3. Legge dimensione in byte e dimensioni in pixel
//! 4. Salta immagini già entro `max_dimension` (mai ricodificate)
//! 5. Ricodifica in un file fratello con nome univoco `<file><random>.temp`
//! 6. Sostituisce l'originale se il candidato non è più grande (pareggio incluso),
//!    altrimenti scarta il candidato

use crate::{
    config::Config,
    error::Result,
    file_manager::{DirectoryEntry, FileManager},
    image_processor::{EncodeSettings, ImageKind, ImageTranscoder},
    optimizer::progress_tracker::ProgressTracker,
    resize::{fit_within, Dimensions},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempPath;
use tracing::{debug, info, warn};

/// Why a directory entry passed through without being looked at as an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotRegularFile,
    UnsupportedExtension,
}

/// Result of processing one directory entry
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// The re-encoded image replaced the original
    Compressed { original_size: u64, new_size: u64 },
    /// The re-encoded image was larger and was discarded
    Kept { original_size: u64, candidate_size: u64 },
    /// Already within the bound, never re-encoded
    WithinBounds { original_size: u64 },
    Skipped(SkipReason),
    /// Processing failed; the file is left as it was
    Failed { reason: String },
}

impl FileOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Compressed { .. } => "compressed",
            Self::Kept { .. } => "kept",
            Self::WithinBounds { .. } => "within_bounds",
            Self::Skipped(_) => "skipped",
            Self::Failed { .. } => "failed",
        }
    }

    /// Whether the entry was a recognized image (as opposed to a passthrough entry)
    pub fn is_image(&self) -> bool {
        !matches!(self, Self::Skipped(_))
    }

    pub fn bytes_saved(&self) -> u64 {
        match self {
            Self::Compressed {
                original_size,
                new_size,
            } => original_size.saturating_sub(*new_size),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Per-directory collection of file outcomes
#[derive(Debug, Clone)]
pub struct DirectoryReport {
    pub directory: PathBuf,
    pub files: Vec<FileReport>,
    /// Set when the directory itself could not be read
    pub error: Option<String>,
}

impl DirectoryReport {
    pub fn new(directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
            files: Vec::new(),
            error: None,
        }
    }

    pub fn image_count(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_image()).count()
    }

    pub fn compressed_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Compressed { .. }))
    }

    pub fn kept_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Kept { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    pub fn bytes_saved(&self) -> u64 {
        self.files.iter().map(|f| f.outcome.bytes_saved()).sum()
    }

    /// Outcome recorded for the entry named `file_name`
    pub fn outcome_for(&self, file_name: &str) -> Option<&FileOutcome> {
        self.files
            .iter()
            .find(|f| f.path.file_name().map_or(false, |n| n == file_name))
            .map(|f| &f.outcome)
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| predicate(&f.outcome)).count()
    }
}

/// Applies the resize + keep-if-smaller policy to every image of a directory
pub struct DirectoryProcessor {
    max_dimension: u32,
    quality: u8,
    transcoder: Arc<dyn ImageTranscoder>,
}

impl DirectoryProcessor {
    pub fn new(config: &Config, transcoder: Arc<dyn ImageTranscoder>) -> Self {
        Self {
            max_dimension: config.max_dimension,
            quality: config.quality,
            transcoder,
        }
    }

    /// Process every entry of `dir` (non-recursive).
    ///
    /// Never fails: an unreadable directory yields a report with `error` set.
    pub async fn process(&self, dir: &Path, tracker: &mut ProgressTracker) -> DirectoryReport {
        let mut report = DirectoryReport::new(dir);

        let entries = match FileManager::list_entries(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("⚠️ Failed to process directory {}: {}", dir.display(), e);
                report.error = Some(e.to_string());
                tracker.finish_directory(&report);
                return report;
            }
        };

        let image_count = entries
            .iter()
            .filter(|e| e.is_file && FileManager::is_image(&e.path))
            .count();
        debug!("Found {} images in {}", image_count, dir.display());
        tracker.start_directory(image_count);

        for entry in entries {
            let outcome = self.process_entry(&entry).await;
            let file_report = FileReport {
                path: entry.path,
                outcome,
            };
            tracker.record_file(&file_report);
            report.files.push(file_report);
        }

        tracker.finish_directory(&report);
        report
    }

    async fn process_entry(&self, entry: &DirectoryEntry) -> FileOutcome {
        if !entry.is_file {
            return FileOutcome::Skipped(SkipReason::NotRegularFile);
        }

        let Some(kind) = ImageKind::from_path(&entry.path) else {
            return FileOutcome::Skipped(SkipReason::UnsupportedExtension);
        };

        let name = entry.file_name();
        match self.process_image(&entry.path, &name, kind).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("⚠️ Failed to process {}: {}", name, e);
                FileOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn process_image(&self, path: &Path, name: &str, kind: ImageKind) -> Result<FileOutcome> {
        let original_size = FileManager::file_size(path).await?;
        info!("Processing: {} ({})", name, FileManager::format_mb(original_size));

        let transcoder = Arc::clone(&self.transcoder);
        let source = path.to_path_buf();
        let dimensions = tokio::task::spawn_blocking(move || transcoder.dimensions(&source)).await??;

        let Some(target) = fit_within(dimensions, self.max_dimension) else {
            debug!(
                "{} is {}, within {}px: leaving untouched",
                name, dimensions, self.max_dimension
            );
            return Ok(FileOutcome::WithinBounds { original_size });
        };

        let source = path.to_path_buf();
        let candidate =
            tokio::task::spawn_blocking(move || FileManager::create_candidate(&source)).await??;
        let candidate_path = candidate.to_path_buf();

        let new_size = match self.encode_candidate(path, &candidate_path, target, kind).await {
            Ok(new_size) => new_size,
            Err(e) => {
                if let Err(discard_err) = FileManager::discard(candidate).await {
                    debug!(
                        "Failed to remove candidate {}: {}",
                        candidate_path.display(),
                        discard_err
                    );
                }
                return Err(e);
            }
        };

        self.settle(path, candidate, original_size, new_size).await
    }

    /// Encode into `candidate` and return its size in bytes
    async fn encode_candidate(
        &self,
        path: &Path,
        candidate: &Path,
        target: Dimensions,
        kind: ImageKind,
    ) -> Result<u64> {
        let settings = EncodeSettings::for_kind(kind, self.quality);
        let transcoder = Arc::clone(&self.transcoder);
        let source = path.to_path_buf();
        let output = candidate.to_path_buf();
        tokio::task::spawn_blocking(move || transcoder.transcode(&source, &output, target, settings))
            .await??;

        Ok(FileManager::file_size(candidate).await?)
    }

    /// Keep the smaller of original and candidate
    async fn settle(
        &self,
        path: &Path,
        candidate: TempPath,
        original_size: u64,
        new_size: u64,
    ) -> Result<FileOutcome> {
        if new_size <= original_size {
            FileManager::replace_file(path, candidate).await?;
            info!(
                "✅ Compressed: {} → {} (saved: {})",
                FileManager::format_mb(original_size),
                FileManager::format_mb(new_size),
                FileManager::format_mb(original_size - new_size)
            );
            Ok(FileOutcome::Compressed {
                original_size,
                new_size,
            })
        } else {
            FileManager::discard(candidate).await?;
            debug!(
                "Re-encoded {} is larger ({} > {} bytes): keeping original",
                path.display(),
                new_size,
                original_size
            );
            Ok(FileOutcome::Kept {
                original_size,
                candidate_size: new_size,
            })
        }
    }
}
