//! Merged output must not depend on how artifacts were split across workers

use crate::integration::test_utils::{artifact_set, canonical_snapshot, collect};
use proptest::prelude::*;
use proptest::test_runner::{Config, TestRunner};
use shardfold::collector::{merge_partials, Artifact};
use shardfold::index::merge_index;
use std::path::Path;
use tempfile::TempDir;

const ARTIFACTS: usize = 14;

fn merge_split(root: &Path, order: &[usize], workers: &[u8], flush_interval: usize, artifacts: &[Artifact]) {
    let mut shards: Vec<Vec<Artifact>> = vec![Vec::new(); 4];
    for (&i, &worker) in order.iter().zip(workers) {
        shards[worker as usize].push(artifacts[i].clone());
    }
    for (worker, shard) in shards.iter().enumerate() {
        if !shard.is_empty() {
            collect(root, Some(&format!("gw{}", worker)), shard, flush_interval);
        }
    }
    merge_partials(root).unwrap();
}

#[test]
fn test_any_partition_produces_identical_output() {
    let artifacts = artifact_set(ARTIFACTS);

    let reference = TempDir::new().unwrap();
    collect(reference.path(), None, &artifacts, 1000);
    merge_partials(reference.path()).unwrap();
    let expected_files = canonical_snapshot(reference.path());
    let expected_index = merge_index(reference.path()).unwrap();
    assert_eq!(expected_files.len(), 4);

    let mut runner = TestRunner::new(Config {
        cases: 24,
        ..Config::default()
    });
    let strategy = (
        Just((0..ARTIFACTS).collect::<Vec<_>>()).prop_shuffle(),
        proptest::collection::vec(0u8..4, ARTIFACTS),
        0usize..4,
    );

    runner
        .run(&strategy, |(order, workers, flush_interval)| {
            let temp_dir = TempDir::new().unwrap();
            merge_split(temp_dir.path(), &order, &workers, flush_interval, &artifacts);

            prop_assert_eq!(canonical_snapshot(temp_dir.path()), expected_files.clone());
            let index = merge_index(temp_dir.path()).unwrap();
            prop_assert_eq!(index, expected_index.clone());
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_single_artifact_per_worker_matches_single_process() {
    let artifacts = artifact_set(6);

    let single = TempDir::new().unwrap();
    collect(single.path(), None, &artifacts, 0);
    merge_partials(single.path()).unwrap();

    let sharded = TempDir::new().unwrap();
    for (i, artifact) in artifacts.iter().enumerate().rev() {
        collect(sharded.path(), Some(&format!("gw{}", i)), std::slice::from_ref(artifact), 0);
    }
    merge_partials(sharded.path()).unwrap();

    assert_eq!(canonical_snapshot(single.path()), canonical_snapshot(sharded.path()));
}
