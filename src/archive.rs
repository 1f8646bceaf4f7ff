//! # Archive Module
//!
//! Questo modulo astrae il container zip della presentazione dietro un'unica
//! capability con due operazioni: `unpack` e `pack`.
//!
//! ## Responsabilità:
//! - Espandere un container zip in un albero di directory (directory vuote incluse)
//! - Ricomporre un albero di directory in un container zip con path relativi
//! - Nessun cambio della working directory di processo: i path relativi vengono
//!   calcolati rispetto alla directory base e scritti direttamente nell'archivio
//!
//! ## Implementazione:
//! `ZipCodec` usa la crate `zip` su tutte le piattaforme, senza tool esterni
//! (`unzip`/`zip`/PowerShell) e senza fallback per piattaforma.
//!
//! ## Esempio:
//! ```rust,ignore
//! let codec = ZipCodec::new();
//! codec.unpack(Path::new("deck.zip"), Path::new("extracted"))?;
//! // ... modifica dei file ...
//! codec.pack(Path::new("extracted"), Path::new("deck.zip"))?;
//! ```

use crate::error::Result;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Component, Path};
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Pack/unpack capability for the presentation container
pub trait ArchiveCodec: Send + Sync {
    /// Expand `container` into `dest`, reproducing the full tree.
    fn unpack(&self, container: &Path, dest: &Path) -> Result<()>;

    /// Collapse `source_dir` into `container`, replacing any previous content.
    fn pack(&self, source_dir: &Path, container: &Path) -> Result<()>;
}

/// Zip-format codec backed by the `zip` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipCodec;

impl ZipCodec {
    pub fn new() -> Self {
        Self
    }

    fn options(&self) -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
    }
}

impl ArchiveCodec for ZipCodec {
    fn unpack(&self, container: &Path, dest: &Path) -> Result<()> {
        let file = File::open(container)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        std::fs::create_dir_all(dest)?;
        debug!("Extracting {} entries into {}", archive.len(), dest.display());

        // Entries escaping `dest` are rejected by the enclosed-name check
        archive.extract(dest)?;
        Ok(())
    }

    fn pack(&self, source_dir: &Path, container: &Path) -> Result<()> {
        let file = File::create(container)?;
        let mut writer = ZipWriter::new(BufWriter::new(file));
        let options = self.options();
        let mut entries = 0usize;

        for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            let relative = entry
                .path()
                .strip_prefix(source_dir)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            let name = entry_name(relative);

            if entry.file_type().is_dir() {
                writer.add_directory(name, options)?;
            } else if entry.file_type().is_file() {
                writer.start_file(name, options)?;
                let mut source = File::open(entry.path())?;
                io::copy(&mut source, &mut writer)?;
            } else {
                debug!("Skipping non-regular entry: {}", entry.path().display());
                continue;
            }
            entries += 1;
        }

        let mut inner = writer.finish()?;
        inner.flush()?;
        debug!("Packed {} entries into {}", entries, container.display());
        Ok(())
    }
}

/// Zip entry name for a path relative to the packed root (always `/`-separated)
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
