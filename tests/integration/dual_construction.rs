//! Folder-built and index-built trees agree

use crate::integration::test_utils::{artifact, artifact_set, collect};
use shardfold::collector::merge_partials;
use shardfold::index::{merge_index, IndexEntry};
use shardfold::tree::{from_index_entries, TreeBuilder};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_index_root_hash_matches_folder_hash() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let artifacts = artifact_set(20);
    collect(root, Some("gw0"), &artifacts[..7], 3);
    collect(root, Some("gw1"), &artifacts[7..], 3);

    merge_partials(root).unwrap();
    let summary = merge_index(root).unwrap();

    let folder_root = TreeBuilder::new(root.to_path_buf()).compute_root().unwrap();
    assert_eq!(summary.root_hash, folder_root.to_prefixed_hex());
    assert_eq!(summary.test_count, 20);
    assert_eq!(summary.fixture_formats, vec!["state_test"]);
    assert_eq!(summary.forks, vec!["Cancun"]);
}

#[test]
fn test_entries_and_files_agree_without_merge() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("state_tests")).unwrap();
    fs::write(
        root.join("state_tests/a.json"),
        r#"{"t1": {"_info": {"hash": "0xaa"}}, "t2": {"_info": {"generatedTestHash": "0xbb"}}}"#,
    )
    .unwrap();

    let entries = vec![
        IndexEntry::new("t2", "state_tests/a.json").with_hash("0xbb"),
        IndexEntry::new("t1", "state_tests/a.json").with_hash("0xaa"),
    ];
    assert_eq!(
        TreeBuilder::new(root.to_path_buf()).compute_root().unwrap(),
        from_index_entries(&entries).unwrap().digest()
    );
}

#[test]
fn test_null_hash_entry_does_not_move_root() {
    let with_null = TempDir::new().unwrap();
    let mut artifacts = artifact_set(4);
    collect(with_null.path(), None, &artifacts, 0);
    let mut unhashed = artifact("test_unhashed", "blockchain_tests/test_d.json", 9);
    unhashed.hash = None;
    artifacts.push(unhashed.clone());
    collect(with_null.path(), Some("gw9"), std::slice::from_ref(&unhashed), 0);
    merge_partials(with_null.path()).unwrap();
    let with_null = merge_index(with_null.path()).unwrap();

    let without = TempDir::new().unwrap();
    collect(without.path(), None, &artifacts[..4], 0);
    merge_partials(without.path()).unwrap();
    let without = merge_index(without.path()).unwrap();

    assert_eq!(with_null.test_count, 5);
    assert_eq!(without.test_count, 4);
    assert_eq!(with_null.root_hash, without.root_hash);
}
