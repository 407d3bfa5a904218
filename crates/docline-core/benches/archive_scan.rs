use std::path::PathBuf;

use docline_core::{ProcessedRecord, SourceItem, part_file_name, scan_processed, write_part};

fn synthetic_records(part: usize, n: usize) -> Vec<ProcessedRecord> {
    (0..n)
        .map(|i| {
            let path = PathBuf::from(format!("/data/input/doc_{part:03}_{i:05}.pdf"));
            let item = SourceItem::from_path(path).unwrap();
            ProcessedRecord::new(&item)
                .with_field("text", "Lorem ipsum dolor sit amet. ".repeat(40))
                .with_field("modalities", serde_json::json!([]))
                .with_metadata("page_count", 12)
        })
        .collect()
}

#[divan::bench(args = [1, 4, 16])]
fn scan_parts(bencher: divan::Bencher, parts: usize) {
    let dir = tempfile::tempdir().unwrap();
    for part in 0..parts {
        let path = dir.path().join(part_file_name(part as u32));
        write_part(&path, &synthetic_records(part, 1000)).unwrap();
    }
    bencher.bench(|| scan_processed(dir.path()).unwrap());
}

#[divan::bench]
fn write_one_part(bencher: divan::Bencher) {
    let records = synthetic_records(0, 1000);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(part_file_name(0));
    bencher.bench(|| {
        let _ = std::fs::remove_file(&path);
        write_part(&path, &records).unwrap()
    });
}

fn main() {
    divan::main();
}
