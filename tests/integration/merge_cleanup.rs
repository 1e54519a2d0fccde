//! Merge leaves only canonical files and the index summary behind

use crate::integration::test_utils::{artifact_set, collect, files_with_suffix};
use shardfold::collector::merge_partials;
use shardfold::index::merge_index;
use shardfold::ApiError;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_no_partials_or_locks_remain() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let artifacts = artifact_set(12);
    collect(root, Some("gw0"), &artifacts[..6], 2);
    collect(root, Some("gw1"), &artifacts[6..], 2);
    collect(root, None, &artifacts[..1], 2);

    assert!(!files_with_suffix(root, &[".jsonl"]).is_empty());
    assert!(!files_with_suffix(root, &[".lock"]).is_empty());

    let report = merge_partials(root).unwrap();
    assert_eq!(report.targets, 4);
    assert_eq!(report.artifacts, 12);
    merge_index(root).unwrap();

    assert!(files_with_suffix(root, &[".jsonl", ".lock"]).is_empty());
    assert!(root.join(".meta/index.json").exists());
}

#[test]
fn test_stale_lock_from_killed_worker_is_removed() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    collect(root, Some("gw0"), &artifact_set(2), 0);
    fs::create_dir_all(root.join("orphan")).unwrap();
    fs::write(root.join("orphan/test.partial.gw7.lock"), "").unwrap();

    merge_partials(root).unwrap();
    assert!(files_with_suffix(root, &[".lock"])
        .iter()
        .all(|path| path.starts_with(root.join(".meta"))));
}

#[test]
fn test_merge_without_partials_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("done.json"), "{}").unwrap();
    assert!(matches!(
        merge_partials(temp_dir.path()),
        Err(ApiError::NoPartialsFound(_))
    ));
    assert!(matches!(
        merge_index(temp_dir.path()),
        Err(ApiError::NoPartialIndexesFound(_))
    ));
}

#[test]
fn test_second_run_overwrites_canonical_files() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let artifacts = artifact_set(4);

    collect(root, None, &artifacts, 0);
    merge_partials(root).unwrap();
    let first = fs::read(root.join("blockchain_tests/test_d.json")).unwrap();

    collect(root, None, &artifacts, 0);
    merge_partials(root).unwrap();
    assert_eq!(fs::read(root.join("blockchain_tests/test_d.json")).unwrap(), first);
}

#[test]
fn test_zero_artifact_run_still_merges_an_index() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    collect(root, Some("gw0"), &[], 10);
    collect(root, Some("gw1"), &[], 10);

    assert!(matches!(merge_partials(root), Err(ApiError::NoPartialsFound(_))));
    let summary = merge_index(root).unwrap();
    assert_eq!(summary.test_count, 0);
    assert_eq!(
        summary.root_hash,
        "0xe3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert!(files_with_suffix(root, &[".jsonl", ".lock"]).is_empty());
}

#[cfg(unix)]
#[test]
fn test_merged_files_have_ordinary_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let mode = |path: &std::path::Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let reference = root.join("reference.txt");
    fs::write(&reference, "").unwrap();

    collect(root, Some("gw0"), &artifact_set(4), 0);
    merge_partials(root).unwrap();
    merge_index(root).unwrap();

    let canonical = root.join("state_tests/cancun/eip1/test_a.json");
    assert_eq!(mode(&canonical), mode(&reference));
    assert_eq!(mode(&root.join(".meta/index.json")), mode(&reference));

    fs::set_permissions(&canonical, fs::Permissions::from_mode(0o640)).unwrap();
    collect(root, Some("gw0"), &artifact_set(4), 0);
    merge_partials(root).unwrap();
    assert_eq!(mode(&canonical), 0o640);
}
