//! Integration tests for the shardfold merge and hashing pipeline

mod cli_commands;
mod concurrent_writers;
mod dual_construction;
mod merge_cleanup;
mod shard_independence;
mod test_utils;
mod tree_properties;
