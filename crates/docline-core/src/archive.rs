//! Archive parts: gzip-compressed newline-delimited JSON
//!
//! Writing is strict (any error is returned); scanning is lenient, since parts
//! left behind by a crashed run may be truncated or hold half-written lines.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use serde::Deserialize;

use crate::record::{ProcessedRecord, ProcessedSet};
use crate::sequence::list_parts;

/// Buffer size for the compressed output file (256KB)
const WRITE_BUF_SIZE: usize = 256 * 1024;

/// Initial capacity for per-line read buffer
const LINE_BUF_CAPACITY: usize = 4096;

/// Write `records` to `path` as one gzip member, one JSON object per line.
///
/// The file is opened in append mode and created if absent. Flushed and
/// synced before returning. Returns the number of records written.
pub fn write_part(path: &Path, records: &[ProcessedRecord]) -> io::Result<usize> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut encoder = GzEncoder::new(
        BufWriter::with_capacity(WRITE_BUF_SIZE, file),
        Compression::default(),
    );

    for record in records {
        serde_json::to_writer(&mut encoder, record)?;
        encoder.write_all(b"\n")?;
    }

    let writer = encoder.finish()?;
    let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
    file.sync_all()?;
    Ok(records.len())
}

/// Read every record of a part. Unlike [`scan_processed`], any decode or
/// parse error is returned.
pub fn read_part(path: &Path) -> io::Result<Vec<ProcessedRecord>> {
    let reader = BufReader::new(MultiGzDecoder::new(BufReader::new(File::open(path)?)));
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

/// Counters from scanning existing parts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    /// Part files opened
    pub archives: usize,
    /// Non-blank lines seen
    pub lines: usize,
    /// Lines that yielded an identifier
    pub records: usize,
    /// Lines skipped as unparseable or missing `metadata.file_path`
    pub malformed: usize,
    /// Parts whose gzip stream ended in an error
    pub truncated: usize,
}

/// Only the dedup key is decoded while scanning.
#[derive(Deserialize)]
struct RecordKey {
    metadata: KeyMetadata,
}

#[derive(Deserialize)]
struct KeyMetadata {
    file_path: String,
}

/// Rebuild the processed set from every part in `output_dir`.
///
/// Malformed lines and corrupt gzip tails are logged and skipped. Failing to
/// list the directory or open a part is an error.
pub fn scan_processed(output_dir: &Path) -> io::Result<(ProcessedSet, ScanStats)> {
    let mut set = ProcessedSet::new();
    let mut stats = ScanStats::default();

    for (_, path) in list_parts(output_dir)? {
        let file = File::open(&path)
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())))?;
        stats.archives += 1;
        let reader = BufReader::new(MultiGzDecoder::new(BufReader::new(file)));
        scan_archive(reader, &path, &mut set, &mut stats);
    }

    if stats.malformed > 0 || stats.truncated > 0 {
        log::warn!(
            "Skipped {} malformed lines and {} truncated parts while scanning {}",
            stats.malformed,
            stats.truncated,
            output_dir.display()
        );
    }
    log::debug!(
        "Scanned {} parts: {} records, {} distinct sources",
        stats.archives,
        stats.records,
        set.len()
    );
    Ok((set, stats))
}

fn scan_archive(
    mut reader: impl BufRead,
    path: &Path,
    set: &mut ProcessedSet,
    stats: &mut ScanStats,
) {
    let mut buf = Vec::with_capacity(LINE_BUF_CAPACITY);
    let mut line_no = 0usize;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                log::warn!("{}: unreadable after line {line_no}: {e}", path.display());
                stats.truncated += 1;
                break;
            }
        }
        line_no += 1;

        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }
        stats.lines += 1;

        match serde_json::from_slice::<RecordKey>(line) {
            Ok(key) => {
                stats.records += 1;
                set.insert(key.metadata.file_path);
            }
            Err(e) => {
                stats.malformed += 1;
                log::warn!("{}:{line_no}: skipping malformed record: {e}", path.display());
            }
        }
    }
}
