//! # PPTX Image Compressor Library
//!
//! Modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi principali tramite re-exports per `main.rs` e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Parametri della compressione e validazione
//! - `error`: Tipi di errore custom
//! - `archive`: Espansione e ricomposizione del container zip
//! - `resize`: Calcolo delle dimensioni target
//! - `image_processor`: Decode, resize e re-encode JPEG/PNG
//! - `file_manager`: Operazioni sui file (listing, sostituzione, formattazione)
//! - `optimizer`: Orchestratore della pipeline e processore di directory
//! - `progress`: Progress bar e statistiche
//! - `json_output`: Eventi JSON-lines per l'uso programmatico
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use pptx_image_compressor::{Config, PresentationCompressor};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let compressor = PresentationCompressor::new(Config::new("deck.pptx"))?;
//! let summary = compressor.run().await?;
//! println!("saved {} bytes", summary.bytes_saved);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod json_output;
pub mod optimizer;
pub mod progress;
pub mod resize;

pub use archive::{ArchiveCodec, ZipCodec};
pub use config::Config;
pub use error::CompressError;
pub use image_processor::{ImageProcessor, ImageTranscoder};
pub use optimizer::{PresentationCompressor, RunSummary};
pub use resize::Dimensions;
