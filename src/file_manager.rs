//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file all'interno delle directory media.
//!
//! ## Responsabilità:
//! - Elenco non ricorsivo dei file di una directory media
//! - Determinazione formato file (immagine riconosciuta o no)
//! - Sostituzione dell'originale con la versione ricodificata
//! - Utilità per calcoli dimensioni e percentuali
//! - Formattazione human-readable delle dimensioni
//!
//! ## Formati supportati:
//! - **Immagini**: JPG, JPEG, PNG (case-insensitive)
//!
//! ## Operazioni sui file:
//! - `list_entries()`: Elenca le voci di una directory (senza sottodirectory)
//! - `is_image()`: Determina se un file è un'immagine da elaborare
//! - `create_candidate()`: Crea un file temporaneo fratello con nome univoco
//!   (`<file><random>.temp`), che non collide mai con voci esistenti
//! - `replace_file()`: Sostituisce l'originale con il candidato (rename)
//! - `discard()`: Elimina un candidato scartato
//!
//! ## Utilità:
//! - `format_mb()`: Converte bytes in MB con due decimali
//! - `format_size()`: Converte bytes in formato leggibile (KB, MB, GB)
//! - `calculate_reduction()`: Calcola percentuale di riduzione

use crate::image_processor::ImageKind;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::fs;

/// Suffix appended to a file name for its re-encoded candidate
pub const CANDIDATE_SUFFIX: &str = ".temp";

/// One entry of a media directory listing
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    pub is_file: bool,
}

impl DirectoryEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }
}

/// Manages file operations inside media directories
pub struct FileManager;

impl FileManager {
    /// List the entries of `dir` (non-recursive), sorted by name.
    ///
    /// The listing is taken up front so files created while processing
    /// (candidates) never show up in the same pass.
    pub async fn list_entries(dir: &Path) -> io::Result<Vec<DirectoryEntry>> {
        let mut reader = fs::read_dir(dir).await?;
        let mut entries = Vec::new();

        while let Some(entry) = reader.next_entry().await? {
            let path = entry.path();
            // Follow symlinks like a plain stat would
            let is_file = fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            entries.push(DirectoryEntry { path, is_file });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    /// Check if a file is an image the compressor re-encodes
    pub fn is_image(path: &Path) -> bool {
        ImageKind::from_path(path).is_some()
    }

    /// Size in bytes of a file
    pub async fn file_size(path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Whether a path exists (errors count as missing)
    pub async fn exists(path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    /// Create an empty sibling file for the re-encoded candidate of `original`.
    ///
    /// The name is `<file name><random>.temp` and is created exclusively, so an
    /// entry already present in the directory is never reused. Dropping the
    /// returned path deletes the file.
    pub fn create_candidate(original: &Path) -> io::Result<TempPath> {
        let dir = match original.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let name = original.file_name().unwrap_or_default();

        let file = tempfile::Builder::new()
            .prefix(name)
            .suffix(CANDIDATE_SUFFIX)
            .tempfile_in(dir)?;
        Ok(file.into_temp_path())
    }

    /// Replace `original` with `candidate`.
    ///
    /// A single rename overwrites the original, so a failure leaves the
    /// original untouched instead of deleted.
    pub async fn replace_file(original: &Path, candidate: TempPath) -> io::Result<()> {
        let candidate = candidate.keep().map_err(|e| e.error)?;
        if let Err(e) = fs::rename(&candidate, original).await {
            Self::remove_if_present(&candidate).await?;
            return Err(e);
        }
        Ok(())
    }

    /// Delete a candidate that will not be used
    pub async fn discard(candidate: TempPath) -> io::Result<()> {
        let candidate = candidate.keep().map_err(|e| e.error)?;
        Self::remove_if_present(&candidate).await
    }

    async fn remove_if_present(path: &Path) -> io::Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Size in megabytes with two decimals (e.g. `1.50 MB`)
    pub fn format_mb(size: u64) -> String {
        format!("{:.2} MB", size as f64 / 1024.0 / 1024.0)
    }

    /// Signed size delta in megabytes with two decimals
    pub fn format_mb_signed(delta: i64) -> String {
        format!("{:.2} MB", delta as f64 / 1024.0 / 1024.0)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction (negative when the file grew)
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_image() {
        assert!(FileManager::is_image(Path::new("ppt/media/image1.JPEG")));
        assert!(FileManager::is_image(Path::new("image2.png")));
        assert!(!FileManager::is_image(Path::new("image3.emf")));
        assert!(!FileManager::is_image(Path::new("image1.png.temp")));
    }

    #[test]
    fn test_candidate_is_a_fresh_sibling() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("image1.png");
        let squatter = temp_dir.path().join("image1.png.temp");
        std::fs::write(&original, b"png").unwrap();
        std::fs::write(&squatter, b"unrelated entry").unwrap();

        let candidate = FileManager::create_candidate(&original).unwrap();
        let name = candidate.file_name().unwrap().to_string_lossy().into_owned();

        assert_eq!(candidate.parent(), Some(temp_dir.path()));
        assert!(name.starts_with("image1.png"));
        assert!(name.ends_with(CANDIDATE_SUFFIX));
        assert_ne!(&*candidate, squatter.as_path());
        assert!(!FileManager::is_image(&candidate));
        assert_eq!(std::fs::read(&squatter).unwrap(), b"unrelated entry");

        let path = candidate.to_path_buf();
        drop(candidate);
        assert!(!path.exists());
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(FileManager::format_mb(1024 * 1024 * 3 / 2), "1.50 MB");
        assert_eq!(FileManager::format_mb_signed(-(1024 * 1024)), "-1.00 MB");
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(2048), "2.00 KB");
        assert_eq!(FileManager::calculate_reduction(200, 50), 75.0);
        assert_eq!(FileManager::calculate_reduction(0, 50), 0.0);
        assert_eq!(FileManager::calculate_reduction(100, 150), -50.0);
    }

    #[tokio::test]
    async fn test_list_entries_is_flat_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("b.png"), b"b").unwrap();
        std::fs::write(temp_dir.path().join("a.jpg"), b"a").unwrap();
        std::fs::create_dir(temp_dir.path().join("nested")).unwrap();
        std::fs::write(temp_dir.path().join("nested").join("c.png"), b"c").unwrap();

        let entries = FileManager::list_entries(temp_dir.path()).await.unwrap();
        let names: Vec<String> = entries.iter().map(|e| e.file_name()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "nested"]);
        assert!(entries[0].is_file);
        assert!(!entries[2].is_file);
    }

    #[tokio::test]
    async fn test_list_entries_missing_directory_errors() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileManager::list_entries(&temp_dir.path().join("missing")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_replace_and_discard() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("image1.png");
        std::fs::write(&original, b"original bytes").unwrap();

        let candidate = FileManager::create_candidate(&original).unwrap();
        let candidate_path = candidate.to_path_buf();
        std::fs::write(&candidate_path, b"smaller").unwrap();
        FileManager::replace_file(&original, candidate).await.unwrap();
        assert_eq!(std::fs::read(&original).unwrap(), b"smaller");
        assert!(!candidate_path.exists());

        let rejected = FileManager::create_candidate(&original).unwrap();
        let rejected_path = rejected.to_path_buf();
        std::fs::write(&rejected_path, b"larger than before").unwrap();
        FileManager::discard(rejected).await.unwrap();
        assert!(!rejected_path.exists());
        assert_eq!(FileManager::file_size(&original).await.unwrap(), 7);

        // Discarding a candidate that is already gone is not an error
        let gone = FileManager::create_candidate(&original).unwrap();
        std::fs::remove_file(&gone).unwrap();
        FileManager::discard(gone).await.unwrap();
    }
}
