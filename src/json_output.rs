//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per l'uso programmatico
//! (una riga JSON per evento su stdout, attivato con `--json`).
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio compressione (input, output, configurazione)
//! - `file_complete`: Fine elaborazione di un file immagine
//! - `directory_complete`: Fine elaborazione di una directory media
//! - `complete`: Fine processo con dimensioni finali e statistiche
//! - `error`: Errore fatale

use crate::config::Config;
use crate::image_processor::png_compression_level;
use crate::optimizer::task_optimizer::{DirectoryReport, FileOutcome, FileReport};
use crate::progress::OptimizationStats;
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio del processo di compressione
    #[serde(rename = "start")]
    Start {
        input_path: PathBuf,
        output_path: PathBuf,
        config: Config,
        /// PNG level derived from `config.quality`
        png_compression_level: u8,
    },

    /// Fine elaborazione di un file immagine
    #[serde(rename = "file_complete")]
    FileComplete {
        path: PathBuf,
        status: &'static str,
        original_size: Option<u64>,
        new_size: Option<u64>,
        reduction_percent: Option<f64>,
        error: Option<String>,
    },

    /// Fine elaborazione di una directory media
    #[serde(rename = "directory_complete")]
    DirectoryComplete {
        directory: PathBuf,
        images: usize,
        compressed: usize,
        errors: usize,
        bytes_saved: u64,
        error: Option<String>,
    },

    /// Processo completato
    #[serde(rename = "complete")]
    Complete {
        output_path: PathBuf,
        original_size: u64,
        new_size: u64,
        bytes_saved: i64,
        percent_saved: f64,
        duration_seconds: f64,
        stats: OptimizationStats,
    },

    /// Errore generale
    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    /// Crea un messaggio di inizio
    pub fn start(config: &Config, output_path: PathBuf) -> Self {
        Self::Start {
            input_path: config.input_path.clone(),
            output_path,
            config: config.clone(),
            png_compression_level: png_compression_level(config.quality),
        }
    }

    /// Crea un messaggio di completamento file
    pub fn file_complete(report: &FileReport) -> Self {
        let (original_size, new_size, error) = match &report.outcome {
            FileOutcome::Compressed {
                original_size,
                new_size,
            } => (Some(*original_size), Some(*new_size), None),
            FileOutcome::Kept { original_size, .. }
            | FileOutcome::WithinBounds { original_size } => {
                (Some(*original_size), Some(*original_size), None)
            }
            FileOutcome::Skipped(_) => (None, None, None),
            FileOutcome::Failed { reason } => (None, None, Some(reason.clone())),
        };

        let reduction_percent = match (original_size, new_size) {
            (Some(original), Some(new)) => {
                Some(crate::file_manager::FileManager::calculate_reduction(original, new))
            }
            _ => None,
        };

        Self::FileComplete {
            path: report.path.clone(),
            status: report.outcome.label(),
            original_size,
            new_size,
            reduction_percent,
            error,
        }
    }

    /// Crea un messaggio di completamento directory
    pub fn directory_complete(report: &DirectoryReport) -> Self {
        Self::DirectoryComplete {
            directory: report.directory.clone(),
            images: report.image_count(),
            compressed: report.compressed_count(),
            errors: report.failed_count(),
            bytes_saved: report.bytes_saved(),
            error: report.error.clone(),
        }
    }

    /// Crea un messaggio di errore
    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_message_shape() {
        let config = Config::new("deck.pptx");
        let json = serde_json::to_value(JsonMessage::start(
            &config,
            PathBuf::from("deck_compressed.pptx"),
        ))
        .unwrap();

        assert_eq!(json["type"], "start");
        assert_eq!(json["config"]["input_path"], "deck.pptx");
        assert_eq!(json["config"]["max_dimension"], 1920);
        assert_eq!(json["config"]["quality"], 80);
        assert_eq!(json["png_compression_level"], 1);
    }

    #[test]
    fn test_file_complete_for_failure() {
        let report = FileReport {
            path: PathBuf::from("ppt/media/image1.png"),
            outcome: FileOutcome::Failed {
                reason: "bad header".to_string(),
            },
        };
        let json = serde_json::to_value(JsonMessage::file_complete(&report)).unwrap();

        assert_eq!(json["type"], "file_complete");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "bad header");
        assert!(json["reduction_percent"].is_null());
    }

    #[test]
    fn test_file_complete_within_bounds_reports_size() {
        let report = FileReport {
            path: PathBuf::from("ppt/media/image3.png"),
            outcome: FileOutcome::WithinBounds { original_size: 321 },
        };
        let json = serde_json::to_value(JsonMessage::file_complete(&report)).unwrap();

        assert_eq!(json["status"], "within_bounds");
        assert_eq!(json["original_size"], 321);
        assert_eq!(json["reduction_percent"], 0.0);
    }

    #[test]
    fn test_file_complete_for_compressed() {
        let report = FileReport {
            path: PathBuf::from("ppt/media/image2.jpg"),
            outcome: FileOutcome::Compressed {
                original_size: 200,
                new_size: 50,
            },
        };
        let json = serde_json::to_value(JsonMessage::file_complete(&report)).unwrap();

        assert_eq!(json["status"], "compressed");
        assert_eq!(json["reduction_percent"], 75.0);
    }
}
