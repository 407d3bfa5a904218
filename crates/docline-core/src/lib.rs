//! Docline Core - resumable chunked document ingestion
//!
//! Turns a directory of source documents into numbered gzip JSONL parts,
//! one part per chunk, so an interrupted job resumes where it stopped:
//! identifiers already present in the output are skipped on the next run
//! and new parts always continue the existing numbering.

pub mod archive;
pub mod chunk;
pub mod discover;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod sequence;
pub mod shutdown;

// Re-exports for convenience
pub use archive::{ScanStats, read_part, scan_processed, write_part};
pub use chunk::{DEFAULT_CHUNK_SIZE, chunk_count, chunk_items};
pub use discover::{discover_sources, pending_sources};
pub use dispatch::{
    BatchOutcome, BatchResult, DEFAULT_WORKERS, ItemFailure, Transform, build_pool,
    dispatch_batch,
};
pub use error::ItemError;
pub use logging::{IndicatifLogger, Verbosity, init_logging};
pub use pipeline::{Inspection, PipelineConfig, RunSummary, inspect, run, run_until};
pub use progress::{ProgressContext, SharedProgress};
pub use record::{ProcessedRecord, ProcessedSet, RecordMetadata, SourceItem};
pub use sequence::{list_parts, next_part_index, part_file_name, parse_part_index};
pub use shutdown::{install_signal_handlers, shutdown_flag};
