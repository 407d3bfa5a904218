//! Input discovery and resume filtering

use std::fs;
use std::io;
use std::path::Path;

use crate::record::{ProcessedSet, SourceItem};

/// List files in `input_dir` whose name ends in one of `extensions`.
///
/// Non-recursive. The directory is canonicalized once and file names are
/// joined onto it, so identifiers are absolute. Matching is ASCII
/// case-insensitive; a leading `.` on an extension is optional. Result is
/// sorted by identifier.
pub fn discover_sources(input_dir: &Path, extensions: &[String]) -> io::Result<Vec<SourceItem>> {
    let root = fs::canonicalize(input_dir)?;
    let mut items = Vec::new();

    for entry in fs::read_dir(&root)? {
        let entry = entry?;
        let name = entry.file_name();
        if !matches_extension(&name.to_string_lossy(), extensions) {
            continue;
        }
        let path = root.join(&name);
        if !path.is_file() {
            continue;
        }
        match SourceItem::from_path(path) {
            Some(item) => items.push(item),
            None => log::warn!(
                "Skipping file with non-UTF-8 name: {}",
                root.join(&name).display()
            ),
        }
    }

    items.sort();
    log::debug!("{} candidate files in {}", items.len(), root.display());
    Ok(items)
}

/// Drop sources already present in `processed`, keeping order.
///
/// Matching is exact string equality on the identifier.
pub fn pending_sources(sources: Vec<SourceItem>, processed: &ProcessedSet) -> Vec<SourceItem> {
    let pending: Vec<SourceItem> = sources
        .into_iter()
        .filter(|s| !processed.contains(s.id()))
        .collect();
    log::debug!("{} items pending", pending.len());
    pending
}

fn matches_extension(name: &str, extensions: &[String]) -> bool {
    let name = name.to_ascii_lowercase();
    extensions.iter().any(|ext| {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        !ext.is_empty()
            && name
                .strip_suffix(ext.as_str())
                .is_some_and(|stem| stem.ends_with('.'))
    })
}
