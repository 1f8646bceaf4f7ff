//! # Optimizer Module
//!
//! Separa le responsabilità della pipeline in sottomoduli:
//! - `media_optimizer`: Orchestratore principale (workspace, unpack, repack, report)
//! - `task_optimizer`: Elaborazione sequenziale dei file di una directory media
//! - `progress_tracker`: Progress bar, statistiche ed eventi JSON
//! - `path_resolver`: Logica di calcolo path centralizzata

pub mod media_optimizer;
pub mod path_resolver;
pub mod progress_tracker;
pub mod task_optimizer;

pub use media_optimizer::{PresentationCompressor, RunSummary};
pub use path_resolver::PathResolver;
pub use progress_tracker::ProgressTracker;
pub use task_optimizer::{DirectoryProcessor, DirectoryReport, FileOutcome, FileReport, SkipReason};
