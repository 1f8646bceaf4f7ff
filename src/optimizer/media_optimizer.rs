//! # Presentation Compressor Main Orchestrator
//!
//! Orchestratore principale: una sequenza lineare in cui nessun passo inizia
//! prima che il precedente sia terminato.
//!
//! ## Flusso di esecuzione:
//! 1. **Validazione**: il file di input deve esistere
//! 2. **Output path**: `<dir>/<stem>_compressed<ext>` accanto all'input
//! 3. **Workspace**: directory temporanea con nome univoco (`temp_pptx_<millis>_...`)
//! 4. **Unpack**: copia dell'archivio nel workspace ed espansione in `extracted/`
//! 5. **Immagini**: `ppt/media` e, se presente, `ppt/slides/_media`
//! 6. **Repack**: ricompone l'albero e copia il container sull'output
//! 7. **Report**: dimensione originale, nuova, byte risparmiati, percentuale
//! 8. **Cleanup**: il workspace viene rimosso sempre, errori di rimozione ignorati
//!
//! ## Error handling:
//! - Errori per singoli file o directory media non bloccano l'operazione
//! - Qualsiasi altro errore viene propagato al chiamante dopo il cleanup
//! - L'archivio di input non viene mai modificato

use crate::{
    archive::{ArchiveCodec, ZipCodec},
    config::Config,
    error::CompressError,
    file_manager::FileManager,
    image_processor::{ImageProcessor, ImageTranscoder},
    json_output::JsonMessage,
    optimizer::{
        path_resolver::{PathResolver, CONTAINER_NAME, EXTRACT_DIR_NAME},
        progress_tracker::ProgressTracker,
        task_optimizer::{DirectoryProcessor, DirectoryReport},
    },
    progress::OptimizationStats,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Final numbers of a successful run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub original_size: u64,
    pub new_size: u64,
    /// Negative when the output grew
    pub bytes_saved: i64,
    pub percent_saved: f64,
    pub stats: OptimizationStats,
    pub directories: Vec<DirectoryReport>,
}

impl RunSummary {
    fn new(
        output_path: PathBuf,
        original_size: u64,
        new_size: u64,
        stats: OptimizationStats,
        directories: Vec<DirectoryReport>,
    ) -> Self {
        Self {
            output_path,
            original_size,
            new_size,
            bytes_saved: original_size as i64 - new_size as i64,
            percent_saved: FileManager::calculate_reduction(original_size, new_size),
            stats,
            directories,
        }
    }

    /// Human-readable report lines
    pub fn report_lines(&self) -> Vec<String> {
        vec![
            format!("✅ Done! File saved as: {}", self.output_path.display()),
            "📊 Compression results:".to_string(),
            format!("   Original size: {}", FileManager::format_mb(self.original_size)),
            format!("   New size:      {}", FileManager::format_mb(self.new_size)),
            format!("   Saved:         {}", FileManager::format_mb_signed(self.bytes_saved)),
            format!("   Compression ratio: {:.1}%", self.percent_saved),
            format!("   {}", self.stats.format_summary()),
        ]
    }
}

/// Orchestratore principale
pub struct PresentationCompressor {
    config: Config,
    codec: Arc<dyn ArchiveCodec>,
    transcoder: Arc<dyn ImageTranscoder>,
}

impl PresentationCompressor {
    /// Crea un nuovo compressore con zip e transcoder di default
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            codec: Arc::new(ZipCodec::new()),
            transcoder: Arc::new(ImageProcessor::new()),
        })
    }

    /// Sostituisce il codec dell'archivio
    pub fn with_codec(mut self, codec: Arc<dyn ArchiveCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Sostituisce il transcoder delle immagini
    pub fn with_transcoder(mut self, transcoder: Arc<dyn ImageTranscoder>) -> Self {
        self.transcoder = transcoder;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Esegue la compressione completa
    pub async fn run(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        let input_path = &self.config.input_path;

        if !FileManager::exists(input_path).await {
            return Err(CompressError::InputNotFound(input_path.clone()).into());
        }

        let output_path = PathResolver::compressed_output_path(input_path);
        if self.config.json_output {
            JsonMessage::start(&self.config, output_path.clone()).emit();
        }

        info!("🔄 Creating temporary directory...");
        let scratch_root = self.config.scratch_root();
        let workspace = tempfile::Builder::new()
            .prefix(&PathResolver::scratch_prefix())
            .tempdir_in(&scratch_root)
            .with_context(|| {
                format!("Failed to create temporary directory in {}", scratch_root.display())
            })?;
        debug!("Scratch workspace: {}", workspace.path().display());

        let result = self
            .run_in_workspace(workspace.path(), &output_path)
            .await;

        info!("🧹 Cleaning up temporary files...");
        if let Err(e) = workspace.close() {
            debug!("Ignoring cleanup failure: {}", e);
        }

        let summary = result?;
        self.report(&summary, start_time.elapsed().as_secs_f64());
        Ok(summary)
    }

    async fn run_in_workspace(&self, workspace: &Path, output_path: &Path) -> Result<RunSummary> {
        let input_path = &self.config.input_path;

        info!("📦 Unpacking presentation as ZIP...");
        let container = workspace.join(CONTAINER_NAME);
        tokio::fs::copy(input_path, &container)
            .await
            .with_context(|| format!("Failed to copy {}", input_path.display()))?;

        let extract_dir = workspace.join(EXTRACT_DIR_NAME);
        tokio::fs::create_dir(&extract_dir).await?;
        self.unpack(container.clone(), extract_dir.clone())
            .await
            .with_context(|| format!("Failed to unpack {}", input_path.display()))?;

        info!("🔍 Searching and compressing images...");
        let (directories, stats) = self.process_media(&extract_dir).await;

        info!("📦 Repacking presentation...");
        self.pack(extract_dir, container.clone())
            .await
            .context("Failed to repack presentation")?;
        tokio::fs::copy(&container, output_path)
            .await
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        let original_size = FileManager::file_size(input_path).await?;
        let new_size = FileManager::file_size(output_path).await?;

        Ok(RunSummary::new(
            output_path.to_path_buf(),
            original_size,
            new_size,
            stats,
            directories,
        ))
    }

    /// Elabora le directory media note dentro l'albero estratto
    async fn process_media(&self, extract_dir: &Path) -> (Vec<DirectoryReport>, OptimizationStats) {
        let processor = DirectoryProcessor::new(&self.config, Arc::clone(&self.transcoder));
        let mut tracker = ProgressTracker::new(self.config.json_output);
        let mut reports = Vec::new();

        let primary = PathResolver::primary_media_dir(extract_dir);
        reports.push(processor.process(&primary, &mut tracker).await);

        let secondary = PathResolver::secondary_media_dir(extract_dir);
        if FileManager::exists(&secondary).await {
            reports.push(processor.process(&secondary, &mut tracker).await);
        } else {
            debug!("No {} directory, skipping", secondary.display());
        }

        (reports, tracker.stats().clone())
    }

    async fn unpack(&self, container: PathBuf, dest: PathBuf) -> Result<(), CompressError> {
        let codec = Arc::clone(&self.codec);
        tokio::task::spawn_blocking(move || codec.unpack(&container, &dest)).await?
    }

    async fn pack(&self, source_dir: PathBuf, container: PathBuf) -> Result<(), CompressError> {
        let codec = Arc::clone(&self.codec);
        tokio::task::spawn_blocking(move || codec.pack(&source_dir, &container)).await?
    }

    /// Stampa il report finale
    fn report(&self, summary: &RunSummary, duration: f64) {
        if self.config.json_output {
            JsonMessage::Complete {
                output_path: summary.output_path.clone(),
                original_size: summary.original_size,
                new_size: summary.new_size,
                bytes_saved: summary.bytes_saved,
                percent_saved: summary.percent_saved,
                duration_seconds: duration,
                stats: summary.stats.clone(),
            }
            .emit();
        } else {
            for line in summary.report_lines() {
                info!("{}", line);
            }
            debug!("Completed in {:.2}s", duration);
        }
    }
}
