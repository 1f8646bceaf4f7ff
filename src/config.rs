//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione di una singola esecuzione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri della compressione
//! - Fornisce validazione dei parametri di input
//! - Fornisce valori di default sensati (gli stessi della command line)
//!
//! ## Parametri di configurazione:
//! - `input_path`: Archivio di presentazione da comprimere
//! - `max_dimension`: Lato massimo in pixel (default: 1920)
//! - `quality`: Qualità 0-100 (default: 80). Per JPEG è la qualità dell'encoder,
//!   per PNG viene convertita in un livello di compressione 0-9 (100 = nessuna compressione)
//! - `json_output`: Emette eventi JSON su stdout invece dei log leggibili
//! - `scratch_parent`: Directory in cui creare il workspace temporaneo
//!   (default: directory temporanea di sistema)
//!
//! La configurazione è immutabile una volta creata: nessun file di configurazione,
//! nessuna variabile d'ambiente.
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     max_dimension: 1280,
//!     quality: 70,
//!     ..Config::new("deck.pptx")
//! };
//! config.validate()?;
//! ```

use crate::error::{CompressError, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Default bound for the longer side of an image, in pixels
pub const DEFAULT_MAX_DIMENSION: u32 = 1920;

/// Default encoder quality
pub const DEFAULT_QUALITY: u8 = 80;

/// Configuration for one compression run
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Presentation archive to compress
    pub input_path: PathBuf,
    /// Maximum width/height in pixels
    pub max_dimension: u32,
    /// Quality for JPEG (1-100) and PNG (100-0, where 0 is max compression)
    pub quality: u8,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
    /// Parent directory for the scratch workspace (None = system temp dir)
    pub scratch_parent: Option<PathBuf>,
}

impl Config {
    /// Create a configuration for `input_path` with default parameters
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            max_dimension: DEFAULT_MAX_DIMENSION,
            quality: DEFAULT_QUALITY,
            json_output: false,
            scratch_parent: None,
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.max_dimension == 0 {
            return Err(CompressError::Validation(
                "Maximum dimension must be a positive number of pixels".to_string(),
            ));
        }

        if self.quality > 100 {
            return Err(CompressError::Validation(
                "Quality must be between 0 and 100".to_string(),
            ));
        }

        if let Some(ref parent) = self.scratch_parent {
            if !parent.is_dir() {
                return Err(CompressError::Validation(format!(
                    "Scratch directory is not a directory: {}",
                    parent.display()
                )));
            }
        }

        Ok(())
    }

    /// Directory under which the scratch workspace is created
    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_parent
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::new("deck.pptx");
        assert!(config.validate().is_ok());

        config.max_dimension = 0;
        assert!(config.validate().is_err());

        config.max_dimension = 1920;
        config.quality = 101;
        assert!(config.validate().is_err());

        config.quality = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_default() {
        let config = Config::new("deck.pptx");
        assert_eq!(config.input_path, PathBuf::from("deck.pptx"));
        assert_eq!(config.max_dimension, 1920);
        assert_eq!(config.quality, 80);
        assert!(!config.json_output);
        assert!(config.scratch_parent.is_none());
    }

    #[test]
    fn test_scratch_parent_must_be_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("not_a_dir");
        std::fs::write(&file, b"x").unwrap();

        let mut config = Config::new("deck.pptx");
        config.scratch_parent = Some(file);
        assert!(config.validate().is_err());

        config.scratch_parent = Some(temp_dir.path().to_path_buf());
        assert!(config.validate().is_ok());
        assert_eq!(config.scratch_root(), temp_dir.path());
    }
}
