//! Batch dispatch over a bounded worker pool
//!
//! Every item produces a [`BatchOutcome`]; errors and panics stay inside the
//! worker that hit them and come back as [`ItemFailure`]s. A chunk never
//! aborts because of one bad document.

use std::panic::{self, AssertUnwindSafe};

use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::error::ItemError;
use crate::record::{ProcessedRecord, SourceItem};

/// Default worker pool width
pub const DEFAULT_WORKERS: usize = 4;

/// Document transformation run by the dispatcher.
///
/// Implementations are shared across worker threads and must not rely on
/// call order. The returned record must be built from `item` (see
/// [`ProcessedRecord::new`]); a record keyed to another source is rejected.
pub trait Transform: Send + Sync {
    fn transform(&self, item: &SourceItem) -> Result<ProcessedRecord, ItemError>;
}

impl<F> Transform for F
where
    F: Fn(&SourceItem) -> Result<ProcessedRecord, ItemError> + Send + Sync,
{
    fn transform(&self, item: &SourceItem) -> Result<ProcessedRecord, ItemError> {
        self(item)
    }
}

/// A source item that produced no record
#[derive(Debug)]
pub struct ItemFailure {
    pub source_id: String,
    pub error: ItemError,
}

/// Tagged result of transforming one item
#[derive(Debug)]
pub enum BatchOutcome {
    Success(ProcessedRecord),
    Failure(ItemFailure),
}

/// Records and failures gathered for one chunk
#[derive(Debug, Default)]
pub struct BatchResult {
    pub records: Vec<ProcessedRecord>,
    pub failures: Vec<ItemFailure>,
}

impl BatchResult {
    pub fn attempted(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

impl FromIterator<BatchOutcome> for BatchResult {
    fn from_iter<I: IntoIterator<Item = BatchOutcome>>(iter: I) -> Self {
        let mut result = Self::default();
        for outcome in iter {
            match outcome {
                BatchOutcome::Success(record) => result.records.push(record),
                BatchOutcome::Failure(failure) => result.failures.push(failure),
            }
        }
        result
    }
}

/// Pool with exactly `workers` threads, reused for every chunk of a run.
pub fn build_pool(workers: usize) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("docline-worker-{i}"))
        .build()
}

/// Transform one item, folding errors, panics, and mis-keyed records into a failure.
pub fn transform_one<T: Transform + ?Sized>(transform: &T, item: &SourceItem) -> BatchOutcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| transform.transform(item)))
        .unwrap_or_else(|payload| Err(ItemError::from_panic(payload)));

    let error = match result {
        Ok(record) if record.source_id() == item.id() => return BatchOutcome::Success(record),
        Ok(record) => ItemError::IdentifierMismatch {
            expected: item.id().to_owned(),
            found: record.source_id().to_owned(),
        },
        Err(e) => e,
    };
    BatchOutcome::Failure(ItemFailure {
        source_id: item.id().to_owned(),
        error,
    })
}

/// Transform every item of `chunk` on `pool`.
///
/// At most `pool.current_num_threads()` items are in flight. Record order
/// follows the chunk but callers should not rely on it. Each failure is
/// logged at WARN.
pub fn dispatch_batch<T: Transform + ?Sized>(
    pool: &rayon::ThreadPool,
    chunk: &[SourceItem],
    transform: &T,
    pb: &ProgressBar,
) -> BatchResult {
    let outcomes: Vec<BatchOutcome> = pool.install(|| {
        chunk
            .par_iter()
            .map(|item| {
                let outcome = transform_one(transform, item);
                pb.inc(1);
                outcome
            })
            .collect()
    });

    let result: BatchResult = outcomes.into_iter().collect();
    for failure in &result.failures {
        log::warn!("{}: {}", failure.source_id, failure.error);
    }
    result
}
