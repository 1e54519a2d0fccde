//! Writers sharing partial files never lose or corrupt artifacts

use crate::integration::test_utils::{artifact_set, canonical_snapshot, collect};
use shardfold::collector::{merge_partials, PartialRecord, PartialWriter};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

#[test]
fn test_sessions_sharing_a_worker_id_merge_completely() {
    let artifacts = artifact_set(40);

    let reference = TempDir::new().unwrap();
    collect(reference.path(), None, &artifacts, 1000);
    merge_partials(reference.path()).unwrap();

    let shared = TempDir::new().unwrap();
    let handles: Vec<_> = artifacts
        .chunks(10)
        .map(|chunk| {
            let root = shared.path().to_path_buf();
            let chunk = chunk.to_vec();
            thread::spawn(move || collect(&root, None, &chunk, 0))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    merge_partials(shared.path()).unwrap();

    assert_eq!(canonical_snapshot(reference.path()), canonical_snapshot(shared.path()));
}

#[test]
fn test_independent_writers_on_one_partial_keep_lines_whole() {
    let temp_dir = TempDir::new().unwrap();
    let root = Arc::new(temp_dir.path().to_path_buf());
    let document = format!("{{\n    \"blob\": \"{}\"\n}}", "z".repeat(64 * 1024));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let root = Arc::clone(&root);
            let document = document.clone();
            thread::spawn(move || {
                let writer = PartialWriter::new(root.as_path(), None);
                for i in 0..25 {
                    writer
                        .append(Path::new("big.json"), &format!("t{}_{:02}", t, i), &document)
                        .unwrap();
                }
                writer.close().unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let partial = temp_dir.path().join("big.partial.main.jsonl");
    let records: Vec<PartialRecord> = fs::read_to_string(&partial)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 100);
    assert!(records.iter().all(|record| record.document == document));
}
