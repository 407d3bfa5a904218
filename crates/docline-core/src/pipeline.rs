//! Pipeline driver
//!
//! scan existing parts → discover pending sources → for each chunk:
//! dispatch to the worker pool, write one part. Chunks run strictly one after
//! another; only the transformation inside a chunk is parallel.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::archive::{ScanStats, scan_processed, write_part};
use crate::chunk::{DEFAULT_CHUNK_SIZE, chunk_count, chunk_items};
use crate::discover::{discover_sources, pending_sources};
use crate::dispatch::{DEFAULT_WORKERS, Transform, build_pool, dispatch_batch};
use crate::progress::{ProgressContext, fmt_elapsed, fmt_num};
use crate::sequence::{list_parts, next_part_index, part_file_name};
use crate::shutdown::shutdown_flag;

/// Runtime configuration for one run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory scanned (non-recursively) for source documents
    pub input_dir: PathBuf,
    /// Directory holding `part_*.jsonl.gz`; created if absent
    pub output_dir: PathBuf,
    /// Maximum sources per part
    pub chunk_size: NonZeroUsize,
    /// Worker threads per chunk
    pub workers: usize,
    /// Accepted file extensions, case-insensitive
    pub extensions: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: DEFAULT_WORKERS,
            extensions: vec!["pdf".to_string()],
        }
    }
}

/// Pipeline execution summary
#[derive(Debug, Default)]
pub struct RunSummary {
    pub discovered: usize,
    pub already_processed: usize,
    pub pending: usize,
    pub chunks_written: usize,
    pub records_written: usize,
    pub failed_items: usize,
    /// Index of the first part written by this run
    pub first_part: Option<u32>,
    /// Stopped early on a shutdown request
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn log(&self) {
        log::info!("=== docline summary ===");
        log::info!(
            "Files: {} discovered, {} already processed, {} pending",
            fmt_num(self.discovered),
            fmt_num(self.already_processed),
            fmt_num(self.pending)
        );
        log::info!(
            "Chunks: {} written{}",
            self.chunks_written,
            if self.interrupted { " (interrupted)" } else { "" }
        );
        log::info!(
            "Records: {} written, {} failed",
            fmt_num(self.records_written),
            fmt_num(self.failed_items)
        );
        log::info!("Total processing time: {}", fmt_elapsed(self.elapsed));

        if self.records_written > 0 && !self.elapsed.is_zero() {
            let rate = self.records_written as f64 / self.elapsed.as_secs_f64();
            log::info!("Throughput: {rate:.1} files/sec");
        }
        if self.failed_items > 0 {
            log::warn!(
                "{} files failed to transform and will be retried on the next run",
                fmt_num(self.failed_items)
            );
        }
    }
}

/// Output directory state relative to the input, without writing anything
#[derive(Debug)]
pub struct Inspection {
    pub discovered: usize,
    /// Distinct sources found in existing parts
    pub processed: usize,
    pub pending: usize,
    pub parts: usize,
    pub next_part: u32,
    pub scan: ScanStats,
}

/// Run the pipeline, stopping between chunks on SIGINT/SIGTERM.
pub fn run<T: Transform + ?Sized>(
    config: &PipelineConfig,
    transform: &T,
    progress: &ProgressContext,
) -> Result<RunSummary> {
    run_until(config, transform, progress, shutdown_flag())
}

/// Run the pipeline, checking `stop` before each chunk.
pub fn run_until<T: Transform + ?Sized>(
    config: &PipelineConfig,
    transform: &T,
    progress: &ProgressContext,
    stop: &AtomicBool,
) -> Result<RunSummary> {
    let start = Instant::now();

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    log::info!(
        "docline starting: input={}, output={}, chunk_size={}, workers={}",
        config.input_dir.display(),
        config.output_dir.display(),
        config.chunk_size,
        config.workers
    );

    let (processed, scan) = scan_processed(&config.output_dir).with_context(|| {
        format!(
            "scan: failed to read existing parts in {}",
            config.output_dir.display()
        )
    })?;
    log::info!(
        "Found {} processed files in {} existing parts",
        fmt_num(processed.len()),
        scan.archives
    );

    let sources = discover_sources(&config.input_dir, &config.extensions).with_context(|| {
        format!(
            "discover: failed to list input directory {}",
            config.input_dir.display()
        )
    })?;
    let discovered = sources.len();
    let pending = pending_sources(sources, &processed);
    drop(processed);

    log::info!(
        "Found {} files in {} ({} pending)",
        fmt_num(discovered),
        config.input_dir.display(),
        fmt_num(pending.len())
    );

    let mut summary = RunSummary {
        discovered,
        already_processed: discovered - pending.len(),
        pending: pending.len(),
        ..Default::default()
    };

    if pending.is_empty() {
        log::info!("Nothing to do");
        summary.elapsed = start.elapsed();
        return Ok(summary);
    }

    let start_index = next_part_index(&config.output_dir).with_context(|| {
        format!(
            "sequence: failed to list parts in {}",
            config.output_dir.display()
        )
    })?;
    summary.first_part = Some(start_index);

    let pool = build_pool(config.workers).context("Failed to create worker pool")?;
    let total_chunks = chunk_count(pending.len(), config.chunk_size);

    for (i, chunk) in chunk_items(&pending, config.chunk_size).enumerate() {
        if stop.load(Ordering::Relaxed) {
            log::warn!(
                "Shutdown requested, stopping before chunk {}/{total_chunks}",
                i + 1
            );
            summary.interrupted = true;
            break;
        }

        let index = u32::try_from(i)
            .ok()
            .and_then(|offset| start_index.checked_add(offset))
            .context("sequence: part index overflow")?;
        let path = config.output_dir.join(part_file_name(index));
        let chunk_start = Instant::now();

        log::info!(
            "Processing chunk {}/{total_chunks} with {} files",
            i + 1,
            chunk.len()
        );
        let pb = progress.chunk_bar(&format!("chunk {}", i + 1), chunk.len());
        let batch = dispatch_batch(&pool, chunk, transform, &pb);
        pb.finish_and_clear();

        let written = write_part(&path, &batch.records)
            .with_context(|| format!("write: failed to write {}", path.display()))?;

        summary.chunks_written += 1;
        summary.records_written += written;
        summary.failed_items += batch.failures.len();

        log::info!(
            "Saved chunk {}/{total_chunks} to {} ({} records, {} failed) in {}",
            i + 1,
            path.display(),
            written,
            batch.failures.len(),
            fmt_elapsed(chunk_start.elapsed())
        );
    }

    summary.elapsed = start.elapsed();
    summary.log();
    Ok(summary)
}

/// Compare input against existing output without writing anything.
pub fn inspect(config: &PipelineConfig) -> Result<Inspection> {
    let (processed, scan) = scan_processed(&config.output_dir).with_context(|| {
        format!(
            "scan: failed to read existing parts in {}",
            config.output_dir.display()
        )
    })?;
    let sources = discover_sources(&config.input_dir, &config.extensions).with_context(|| {
        format!(
            "discover: failed to list input directory {}",
            config.input_dir.display()
        )
    })?;
    let discovered = sources.len();
    let pending = pending_sources(sources, &processed).len();

    let parts = list_parts(&config.output_dir)
        .with_context(|| format!("sequence: failed to list parts in {}", config.output_dir.display()))?;
    let next_part = match parts.last() {
        Some((max, _)) => max.checked_add(1).context("sequence: part index overflow")?,
        None => 0,
    };

    Ok(Inspection {
        discovered,
        processed: processed.len(),
        pending,
        parts: parts.len(),
        next_part,
        scan,
    })
}
