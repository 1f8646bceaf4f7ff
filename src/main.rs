//! # PPTX Image Compressor - Main Entry Point
//!
//! Punto di ingresso dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Creazione della configurazione e avvio del compressore
//! - Mappatura degli errori sul codice di uscita (0 successo, 1 errore)
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (path, max_dimension, quality, flag)
//! 2. Configura il logging (INFO, DEBUG con `--verbose`, WARN su stderr con `--json`)
//! 3. Crea un oggetto Config e avvia `PresentationCompressor`
//!
//! ## Esempio di utilizzo:
//! ```bash
//! pptx-compress "My Presentation.pptx" 1920 80
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::fmt::writer::{MakeWriterExt, OrElse, WithMaxLevel};
use tracing_subscriber::fmt::MakeWriter;

use pptx_image_compressor::config::{DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY};
use pptx_image_compressor::json_output::JsonMessage;
use pptx_image_compressor::{CompressError, Config, PresentationCompressor};

const USAGE: &str = r#"
Usage: pptx-compress <path_to_file.pptx> [max_size] [quality]

  path_to_file.pptx : Path to your PowerPoint file
  max_size          : Maximum width/height in pixels (default: 1920)
  quality           : Quality for JPEG (1-100) and PNG (100-0, where 0 is max compression)

Example: pptx-compress "My Presentation.pptx" 1920 80
"#;

#[derive(Parser)]
#[command(name = "pptx-compress", version)]
#[command(about = "Shrink a PowerPoint file by downscaling and re-encoding its images")]
struct Args {
    /// Presentation archive to compress
    path: Option<PathBuf>,

    /// Maximum width/height in pixels
    #[arg(default_value_t = DEFAULT_MAX_DIMENSION, value_parser = clap::value_parser!(u32).range(1..))]
    max_dimension: u32,

    /// Quality for JPEG (1-100) and PNG (100-0, where 0 is max compression)
    #[arg(default_value_t = DEFAULT_QUALITY, value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: u8,

    /// Emit JSON-lines events on stdout
    #[arg(long)]
    json: bool,

    /// Parent directory for the temporary workspace
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Warnings and errors go to `err`, everything else to `out`
fn split_by_level<O, E>(out: O, err: E) -> OrElse<WithMaxLevel<E>, O>
where
    O: for<'a> MakeWriter<'a>,
    E: for<'a> MakeWriter<'a>,
{
    err.with_max_level(tracing::Level::WARN).or_else(out)
}

fn init_logging(verbose: bool, json: bool) -> Result<()> {
    if json {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::stderr)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(if verbose {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            })
            .with_writer(split_by_level(std::io::stdout, std::io::stderr))
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let Some(input_path) = args.path else {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    };

    if let Err(e) = init_logging(args.verbose, args.json) {
        eprintln!("❌ Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let config = Config {
        max_dimension: args.max_dimension,
        quality: args.quality,
        json_output: args.json,
        scratch_parent: args.scratch_dir,
        ..Config::new(input_path)
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if args.json {
                JsonMessage::error(e.to_string(), Some(format!("{:#}", e))).emit();
            }
            if matches!(
                e.downcast_ref::<CompressError>(),
                Some(CompressError::InputNotFound(_))
            ) {
                eprintln!("Error: {}", e);
            } else {
                eprintln!("❌ An error occurred: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<()> {
    let compressor = PresentationCompressor::new(config)?;
    compressor.run().await?;
    Ok(())
}
