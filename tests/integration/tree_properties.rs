//! Hash tree properties over generated trees

use proptest::prelude::*;
use proptest::test_runner::TestRunner;
use shardfold::index::IndexEntry;
use shardfold::tree::traverse::traverse;
use shardfold::tree::{diff, from_index_entries, render, HashNode, TraversalOptions};
use shardfold::types::Level;

fn entries_strategy() -> impl Strategy<Value = Vec<IndexEntry>> {
    let entry = ("[a-c]", "[a-c]", "[a-e]", any::<[u8; 4]>()).prop_map(|(folder, file, id, hash)| {
        IndexEntry::new(format!("t_{}", id), format!("{}/{}.json", folder, file))
            .with_hash(format!("0x{}", hex::encode(hash)))
    });
    proptest::collection::vec(entry, 1..24)
}

fn leaf_paths(tree: &HashNode) -> Vec<String> {
    traverse(tree, "", &TraversalOptions::new())
        .into_iter()
        .filter(|visit| visit.node.level() == Level::Test)
        .map(|visit| visit.path)
        .collect()
}

#[test]
fn test_digest_recomputation_is_idempotent() {
    let mut runner = TestRunner::default();
    runner
        .run(&entries_strategy(), |entries| {
            let first = from_index_entries(&entries).unwrap();
            let second = from_index_entries(&entries).unwrap();
            prop_assert_eq!(first.digest(), first.digest());
            prop_assert_eq!(first.digest(), second.digest());

            let mut reversed = entries.clone();
            reversed.reverse();
            // Duplicate (path, id) pairs keep the last entry, so only dedup-free sets are order free.
            let mut keys: Vec<_> = entries.iter().map(|e| (&e.json_path, &e.id)).collect();
            keys.sort();
            keys.dedup();
            if keys.len() == entries.len() {
                prop_assert_eq!(from_index_entries(&reversed).unwrap().digest(), first.digest());
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_one_leaf_change_yields_one_diff_entry() {
    let mut runner = TestRunner::default();
    runner
        .run(&(entries_strategy(), any::<prop::sample::Index>()), |(entries, pick)| {
            let before = from_index_entries(&entries).unwrap();
            let leaves = leaf_paths(&before);
            let target = &leaves[pick.index(leaves.len())];
            let (json_path, id) = target.rsplit_once('/').unwrap();

            let mut changed = entries.clone();
            changed.push(IndexEntry::new(id, json_path).with_hash("0xdeadbeefdeadbeef"));
            let after = from_index_entries(&changed).unwrap();

            let entries = diff(&before, &after, &TraversalOptions::new());
            prop_assert_eq!(entries.len(), 1);
            prop_assert_eq!(&entries[0].path, target);
            prop_assert_ne!(before.digest(), after.digest());

            // Only the ancestors of the changed leaf move.
            let top = json_path.split('/').next().unwrap();
            for (name, child) in before.children().unwrap() {
                let other = &after.children().unwrap()[name];
                if name == top {
                    prop_assert_ne!(child.digest(), other.digest());
                } else {
                    prop_assert_eq!(child.digest(), other.digest());
                }
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_depth_limit_is_a_prefix_of_unlimited_report() {
    let mut runner = TestRunner::default();
    runner
        .run(&(entries_strategy(), 0usize..5), |(entries, depth)| {
            let tree = from_index_entries(&entries).unwrap();
            let full = render(&tree, "root", &TraversalOptions::new());
            let limited = render(&tree, "root", &TraversalOptions::new().with_max_depth(depth));

            let indent = |line: &String| line.len() - line.trim_start().len();
            let expected: Vec<_> = full.iter().filter(|line| indent(line) <= depth).cloned().collect();
            prop_assert_eq!(limited, expected);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_empty_tree_digest_is_sha256_of_nothing() {
    let tree = from_index_entries(std::iter::empty()).unwrap();
    assert_eq!(
        tree.digest().to_prefixed_hex(),
        "0xe3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}
