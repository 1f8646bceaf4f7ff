//! # Path Resolution Module
//!
//! Centralizza tutta la logica di calcolo dei path: archivio di output,
//! directory media dentro l'albero estratto, nomi del workspace temporaneo.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Suffix inserted before the extension of the output archive
pub const OUTPUT_SUFFIX: &str = "_compressed";

/// Name of the container copy inside the scratch workspace
pub const CONTAINER_NAME: &str = "presentation.zip";

/// Name of the expanded tree inside the scratch workspace
pub const EXTRACT_DIR_NAME: &str = "extracted";

/// Utility per calcolare i path in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// `<dir>/<stem>_compressed<.ext>`, sibling of the input
    pub fn compressed_output_path(input_path: &Path) -> PathBuf {
        let stem = input_path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy();

        let filename = match input_path.extension() {
            Some(ext) => format!("{}{}.{}", stem, OUTPUT_SUFFIX, ext.to_string_lossy()),
            None => format!("{}{}", stem, OUTPUT_SUFFIX),
        };

        let result = input_path.with_file_name(filename);
        debug!("Resolved output path: {} -> {}", input_path.display(), result.display());
        result
    }

    /// Media directory every presentation carries (`ppt/media`)
    pub fn primary_media_dir(extracted_root: &Path) -> PathBuf {
        extracted_root.join("ppt").join("media")
    }

    /// Optional media directory (`ppt/slides/_media`)
    pub fn secondary_media_dir(extracted_root: &Path) -> PathBuf {
        extracted_root.join("ppt").join("slides").join("_media")
    }

    /// Prefix of the scratch workspace directory name, unique per run
    pub fn scratch_prefix() -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        format!("temp_pptx_{}_", millis)
    }
}
