//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce la progress bar e le statistiche di compressione.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time per directory media
//! - Tracking statistiche di compressione (immagini elaborate, sostituite, errori)
//! - Calcolo percentuali di riduzione e byte risparmiati sulle immagini
//!
//! ## Componenti principali:
//! - `ProgressManager`: Gestisce la progress bar di una directory
//! - `OptimizationStats`: Traccia statistiche cumulative su tutta l'esecuzione
//!
//! ## Statistiche tracciate:
//! - **images_processed**: Immagini riconosciute ed esaminate
//! - **images_compressed**: Immagini sostituite dalla versione ricodificata
//! - **images_kept**: Immagini la cui ricodifica era più grande (originale mantenuto)
//! - **images_within_bounds**: Immagini già entro il limite (mai ricodificate)
//! - **passthrough_files**: File non immagine lasciati intatti
//! - **errors**: Immagini fallite (lasciate intatte)
//! - **total_bytes_saved**: Byte risparmiati sulle immagini
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:02] [========================================] 12/12 (100%) image7.png: 45.2% saved
//! ```

use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

/// Manages progress reporting for one media directory
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A manager that never draws (JSON mode, empty directories)
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Statistics tracker for compression results
#[derive(Debug, Default, Clone, Serialize)]
pub struct OptimizationStats {
    pub images_processed: usize,
    pub images_compressed: usize,
    pub images_kept: usize,
    pub images_within_bounds: usize,
    pub passthrough_files: usize,
    pub errors: usize,
    pub total_bytes_saved: u64,
    pub total_original_size: u64,
}

impl OptimizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_compressed(&mut self, original_size: u64, new_size: u64) {
        self.images_processed += 1;
        self.images_compressed += 1;
        self.total_original_size += original_size;
        self.total_bytes_saved += original_size.saturating_sub(new_size);
    }

    pub fn add_kept(&mut self, original_size: u64) {
        self.images_processed += 1;
        self.images_kept += 1;
        self.total_original_size += original_size;
    }

    pub fn add_within_bounds(&mut self, original_size: u64) {
        self.images_processed += 1;
        self.images_within_bounds += 1;
        self.total_original_size += original_size;
    }

    pub fn add_passthrough(&mut self) {
        self.passthrough_files += 1;
    }

    pub fn add_error(&mut self) {
        self.images_processed += 1;
        self.errors += 1;
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.total_bytes_saved as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Images: {} | Compressed: {} | Kept: {} | Within bounds: {} | Errors: {} | Saved: {} ({:.2}%)",
            self.images_processed,
            self.images_compressed,
            self.images_kept,
            self.images_within_bounds,
            self.errors,
            FileManager::format_size(self.total_bytes_saved),
            self.overall_reduction_percent()
        )
    }
}
