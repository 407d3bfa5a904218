//! Source items, processed records, and the resume set

use std::fmt;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A discovered document awaiting transformation.
///
/// `id` is the exact string written to `metadata.file_path` and matched
/// against existing archives on resume. Ordering is by `id`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceItem {
    id: String,
    path: PathBuf,
}

impl SourceItem {
    /// Build from a path. Returns `None` when the path is not valid UTF-8.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let id = path.to_str()?.to_owned();
        Some(Self { id, path })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for SourceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// `metadata` object of a record. `file_path` is the dedup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub file_path: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of transforming one [`SourceItem`], written as one JSON line.
///
/// Only `metadata.file_path` has fixed meaning; everything else is
/// transformation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub metadata: RecordMetadata,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ProcessedRecord {
    /// Empty record keyed to `item`.
    pub fn new(item: &SourceItem) -> Self {
        Self {
            metadata: RecordMetadata {
                file_path: item.id().to_owned(),
                extra: Map::new(),
            },
            payload: Map::new(),
        }
    }

    /// Add a top-level payload field. `metadata` is reserved.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        debug_assert_ne!(key, "metadata", "`metadata` is a reserved record key");
        self.payload.insert(key, value.into());
        self
    }

    /// Add a key to the metadata object. `file_path` is reserved.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        debug_assert_ne!(key, "file_path", "`file_path` is set from the source item");
        self.metadata.extra.insert(key, value.into());
        self
    }

    pub fn source_id(&self) -> &str {
        &self.metadata.file_path
    }
}

/// Identifiers already present in the output directory.
///
/// Rebuilt from disk at the start of every run, never persisted.
#[derive(Debug, Default)]
pub struct ProcessedSet {
    ids: FxHashSet<String>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the identifier was already present.
    pub fn insert(&mut self, id: String) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<String> for ProcessedSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(p: &str) -> SourceItem {
        SourceItem::from_path(PathBuf::from(p)).unwrap()
    }

    #[test]
    fn source_item_id_matches_path() {
        let it = item("/data/in/a.pdf");
        assert_eq!(it.id(), "/data/in/a.pdf");
        assert_eq!(it.path(), Path::new("/data/in/a.pdf"));
        assert_eq!(it.to_string(), "/data/in/a.pdf");
    }

    #[cfg(unix)]
    #[test]
    fn source_item_rejects_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = PathBuf::from(OsStr::from_bytes(b"/data/\xff.pdf"));
        assert!(SourceItem::from_path(path).is_none());
    }

    #[test]
    fn source_items_sort_by_id() {
        let mut items = vec![item("/d/b.pdf"), item("/d/a.pdf"), item("/d/B.pdf")];
        items.sort();
        let ids: Vec<_> = items.iter().map(SourceItem::id).collect();
        assert_eq!(ids, ["/d/B.pdf", "/d/a.pdf", "/d/b.pdf"]);
    }

    #[test]
    fn record_serializes_flat_payload() {
        let rec = ProcessedRecord::new(&item("/d/a.pdf"))
            .with_field("text", "hello")
            .with_field("modalities", json!([]))
            .with_metadata("page_count", 2);

        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            value,
            json!({
                "text": "hello",
                "modalities": [],
                "metadata": {"file_path": "/d/a.pdf", "page_count": 2}
            })
        );
    }

    #[test]
    fn record_parses_foreign_fields() {
        let line = r#"{"text":"x","metadata":{"file_path":"/d/a.pdf","lang":"en"},"extra":1}"#;
        let rec: ProcessedRecord = serde_json::from_str(line).unwrap();
        assert_eq!(rec.source_id(), "/d/a.pdf");
        assert_eq!(rec.metadata.extra["lang"], "en");
        assert_eq!(rec.payload["extra"], 1);
        assert_eq!(rec.payload["text"], "x");
    }

    #[test]
    fn processed_set_collapses_duplicates() {
        let mut set: ProcessedSet = ["/a".to_string(), "/b".to_string(), "/a".to_string()]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("/a"));
        assert!(!set.contains("/c"));
        assert!(!set.insert("/b".to_string()));
        assert!(set.insert("/c".to_string()));
        assert_eq!(set.len(), 3);
    }
}
