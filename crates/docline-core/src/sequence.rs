//! Archive part naming and next-index computation
//!
//! Parts are named `part_{index:05}.jsonl.gz`. Indices only grow: a run starts
//! at one past the highest index already on disk, so output from earlier runs
//! is never overwritten.

use std::io;
use std::path::{Path, PathBuf};

pub const PART_PREFIX: &str = "part_";
pub const PART_EXTENSION: &str = ".jsonl.gz";

/// Minimum zero-padded width of the index
const INDEX_WIDTH: usize = 5;

/// File name for the part with `index`.
pub fn part_file_name(index: u32) -> String {
    format!("{PART_PREFIX}{index:05}{PART_EXTENSION}")
}

/// Parse the index out of a part file name.
///
/// Requires at least [`INDEX_WIDTH`] ASCII digits, so `part_1.jsonl.gz` is
/// not a part. Wider indices are accepted once the 5-digit space is used up.
pub fn parse_part_index(name: &str) -> Option<u32> {
    let digits = name
        .strip_prefix(PART_PREFIX)?
        .strip_suffix(PART_EXTENSION)?;
    if digits.len() < INDEX_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Archive parts in `dir` as `(index, path)`, sorted by index.
///
/// A missing directory has no parts.
pub fn list_parts(dir: &Path) -> io::Result<Vec<(u32, PathBuf)>> {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped_dir).join(format!("{PART_PREFIX}*{PART_EXTENSION}"));
    let pattern_str = pattern.to_string_lossy();

    let entries = glob::glob(&pattern_str)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let mut parts = Vec::new();
    for entry in entries {
        let path = entry.map_err(glob::GlobError::into_error)?;
        let Some(index) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_part_index)
        else {
            continue;
        };
        if !path.is_file() {
            continue;
        }
        parts.push((index, path));
    }
    parts.sort_unstable_by_key(|(index, _)| *index);
    Ok(parts)
}

/// First unused part index in `dir`: one past the highest existing index, or 0.
pub fn next_part_index(dir: &Path) -> io::Result<u32> {
    let parts = list_parts(dir)?;
    match parts.last() {
        None => Ok(0),
        Some((max, _)) => max
            .checked_add(1)
            .ok_or_else(|| io::Error::other("part index space exhausted")),
    }
}
