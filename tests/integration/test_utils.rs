//! Shared helpers for integration tests: artifact generation and tree inspection.

use shardfold::collector::{to_document_string, Artifact, Collector};
use shardfold::config::CollectorConfig;
use shardfold::types::WorkerId;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A generated artifact whose document carries its declared hash under `_info.hash`.
pub fn artifact(id: &str, logical_path: &str, hash_byte: u8) -> Artifact {
    let hash = format!("0x{}", hex::encode([hash_byte; 32]));
    let document = serde_json::json!({
        "_info": {"hash": hash, "comment": format!("generated for {}", id)},
        "pre": {"balance": hash_byte, "storage": {"0x00": "0x01"}},
        "post": [1, 2, {"nested": id}],
    });
    Artifact::new(id, logical_path, to_document_string(&document).unwrap())
        .with_hash(hash)
        .with_format("state_test")
        .with_fork("Cancun")
}

/// A fixed artifact set spread over several folders and logical files.
pub fn artifact_set(count: usize) -> Vec<Artifact> {
    const PATHS: [&str; 4] = [
        "state_tests/cancun/eip1/test_a.json",
        "state_tests/cancun/eip1/test_b.json",
        "state_tests/shanghai/test_c.json",
        "blockchain_tests/test_d.json",
    ];
    (0..count)
        .map(|i| artifact(&format!("test_{:04}", i), PATHS[i % PATHS.len()], i as u8))
        .collect()
}

/// Write `artifacts` as one worker session (`None` for single-process mode).
pub fn collect(root: &Path, worker: Option<&str>, artifacts: &[Artifact], flush_interval: usize) {
    let config = CollectorConfig {
        flush_interval,
        ..CollectorConfig::default()
    };
    let worker = worker.map(|w| WorkerId::new(w).unwrap());
    let mut collector = Collector::new(root, worker, &config);
    for artifact in artifacts {
        collector.add(artifact.clone()).unwrap();
    }
    collector.finish().unwrap();
}

/// Files under `root` whose names end with one of `suffixes`.
pub fn files_with_suffix(root: &Path, suffixes: &[&str]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            suffixes.iter().any(|suffix| name.ends_with(suffix))
        })
        .map(|e| e.into_path())
        .collect()
}

/// Every canonical file under `root` as (relative path, bytes), sorted by path.
pub fn canonical_snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files: Vec<_> = files_with_suffix(root, &[".json"])
        .into_iter()
        .filter(|path| !path.components().any(|c| c.as_os_str() == ".meta"))
        .map(|path| {
            let bytes = std::fs::read(&path).unwrap();
            (path.strip_prefix(root).unwrap().to_path_buf(), bytes)
        })
        .collect();
    files.sort();
    files
}
