//! PDF -> record transformation

use docline_core::{ItemError, ProcessedRecord, SourceItem, Transform};
use serde_json::Value;

use crate::text::normalize_text;

/// Extracts the text layer and page count of one PDF.
///
/// Files that lopdf cannot load are item failures, not fatal errors: the
/// source stays pending and is retried on the next run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfProcessor;

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Transform in-memory PDF bytes belonging to `item`
    pub fn process_bytes(
        &self,
        item: &SourceItem,
        bytes: &[u8],
    ) -> Result<ProcessedRecord, ItemError> {
        let page_count = page_count(bytes)?;
        let raw = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ItemError::parse(format!("text extraction failed: {e}")))?;
        let text = normalize_text(&raw);

        if text.is_empty() {
            log::debug!("{item}: no text layer ({page_count} pages)");
        }
        Ok(build_record(item, text, page_count))
    }
}

impl Transform for PdfProcessor {
    fn transform(&self, item: &SourceItem) -> Result<ProcessedRecord, ItemError> {
        let bytes = std::fs::read(item.path())?;
        self.process_bytes(item, &bytes)
    }
}

fn page_count(bytes: &[u8]) -> Result<usize, ItemError> {
    let document = lopdf::Document::load_mem(bytes)
        .map_err(|e| ItemError::parse(format!("not a readable PDF: {e}")))?;
    Ok(document.get_pages().len())
}

fn build_record(item: &SourceItem, text: String, page_count: usize) -> ProcessedRecord {
    ProcessedRecord::new(item)
        .with_field("text", text)
        .with_field("modalities", Value::Array(Vec::new()))
        .with_metadata("page_count", page_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn item(path: &str) -> SourceItem {
        SourceItem::from_path(PathBuf::from(path)).unwrap()
    }

    #[test]
    fn record_shape() {
        let item = item("/data/papers/a.pdf");
        let record = build_record(&item, "hello".to_string(), 3);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["text"], "hello");
        assert_eq!(json["modalities"], serde_json::json!([]));
        assert_eq!(json["metadata"]["file_path"], "/data/papers/a.pdf");
        assert_eq!(json["metadata"]["page_count"], 3);
        assert_eq!(record.source_id(), item.id());
    }

    #[test]
    fn garbage_bytes_are_a_parse_error() {
        let err = PdfProcessor::new()
            .process_bytes(&item("/x/fake.pdf"), b"this is not a pdf at all")
            .unwrap_err();
        assert!(matches!(err, ItemError::Parse(_)), "got {err:?}");
        assert!(err.to_string().contains("not a readable PDF"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = item(dir.path().join("gone.pdf").to_str().unwrap());

        let err = PdfProcessor::new().transform(&missing).unwrap_err();
        assert!(matches!(err, ItemError::Io(_)), "got {err:?}");
    }

    #[test]
    fn renamed_text_file_fails_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, "plain text pretending to be a PDF\n").unwrap();

        let result = PdfProcessor::new().transform(&item(path.to_str().unwrap()));
        assert!(result.is_err());
    }
}
