//! # Progress Tracking Module
//!
//! Unifica progress bar, statistiche ed eventi JSON in un singolo tracker.
//! L'esecuzione è sequenziale, quindi il tracker è posseduto dall'orchestratore
//! e passato per `&mut` al processore di directory.

use crate::{
    json_output::JsonMessage,
    optimizer::task_optimizer::{DirectoryReport, FileOutcome, FileReport},
    progress::{OptimizationStats, ProgressManager},
};

/// Tracker progress unificato per tutte le directory media di un'esecuzione
pub struct ProgressTracker {
    json_output: bool,
    show_progress: bool,
    stats: OptimizationStats,
    progress: ProgressManager,
}

impl ProgressTracker {
    /// Crea un nuovo tracker; in modalità JSON la progress bar non viene disegnata
    pub fn new(json_output: bool) -> Self {
        Self {
            json_output,
            show_progress: !json_output,
            stats: OptimizationStats::new(),
            progress: ProgressManager::hidden(),
        }
    }

    /// Tracker che non disegna e non emette nulla
    pub fn hidden() -> Self {
        Self {
            json_output: false,
            show_progress: false,
            stats: OptimizationStats::new(),
            progress: ProgressManager::hidden(),
        }
    }

    /// Prepara la progress bar per una directory con `image_count` immagini
    pub fn start_directory(&mut self, image_count: usize) {
        self.progress = if self.show_progress && image_count > 0 {
            ProgressManager::new(image_count as u64)
        } else {
            ProgressManager::hidden()
        };
    }

    /// Registra il risultato di un file
    pub fn record_file(&mut self, report: &FileReport) {
        match &report.outcome {
            FileOutcome::Compressed {
                original_size,
                new_size,
            } => self.stats.add_compressed(*original_size, *new_size),
            FileOutcome::Kept { original_size, .. } => self.stats.add_kept(*original_size),
            FileOutcome::WithinBounds { original_size } => {
                self.stats.add_within_bounds(*original_size)
            }
            FileOutcome::Skipped(_) => {
                self.stats.add_passthrough();
                return;
            }
            FileOutcome::Failed { .. } => self.stats.add_error(),
        }

        if self.json_output {
            JsonMessage::file_complete(report).emit();
        }

        let name = report
            .path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy();
        let message = match &report.outcome {
            FileOutcome::Compressed {
                original_size,
                new_size,
            } => format!(
                "[OK] {}: {:.1}% saved",
                name,
                crate::file_manager::FileManager::calculate_reduction(*original_size, *new_size)
            ),
            FileOutcome::Kept { .. } => format!("[KEEP] {}: re-encode was larger", name),
            FileOutcome::WithinBounds { .. } => format!("[SKIP] {}: within bounds", name),
            FileOutcome::Skipped(_) => format!("[SKIP] {}", name),
            FileOutcome::Failed { .. } => format!("[ERROR] {}: error", name),
        };
        self.progress.update(&message);
    }

    /// Chiude la directory corrente
    pub fn finish_directory(&mut self, report: &DirectoryReport) {
        self.progress.finish(&format!(
            "{} images, {} compressed, {} errors",
            report.image_count(),
            report.compressed_count(),
            report.failed_count()
        ));

        if self.json_output {
            JsonMessage::directory_complete(report).emit();
        }
    }

    /// Statistiche accumulate su tutte le directory
    pub fn stats(&self) -> &OptimizationStats {
        &self.stats
    }
}
