//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `CompressError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e leggibili dall'utente
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `InputNotFound`: Il file di input non esiste
//! - `Io`: Errori di I/O (permessi, disco pieno, etc.)
//! - `Decode`: Immagine non decodificabile (formato corrotto o non supportato)
//! - `Encode`: Parametri di encoding non validi o encoder fallito
//! - `Archive`: Container zip corrotto o non scrivibile
//! - `UnsupportedFormat`: Contenuto non riconosciuto come immagine
//! - `Validation`: Errori di validazione dei parametri
//! - `Task`: Un task bloccante è terminato in modo anomalo
//!
//! ## Esempio:
//! ```rust,ignore
//! if !input.exists() {
//!     return Err(CompressError::InputNotFound(input.to_path_buf()));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for presentation image compression
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    #[error("File \"{}\" not found!", .0.display())]
    InputNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, CompressError>;
