//! Digest computation for hash tree nodes using SHA-256

use crate::error::FormatError;
use crate::types::Digest;
use sha2::{Digest as _, Sha256};
use std::path::Path;

/// Combine child digests (already in ascending name order) into an interior digest.
///
/// SHA-256 over the plain concatenation; zero children yields SHA-256 of the empty string.
pub fn combine_digests<I>(children: I) -> Digest
where
    I: IntoIterator<Item = Digest>,
{
    let mut hasher = Sha256::new();
    for child in children {
        hasher.update(child.as_bytes());
    }
    Digest::new(hasher.finalize().to_vec())
}

/// Digest of a node with no children.
pub fn empty_digest() -> Digest {
    combine_digests(std::iter::empty())
}

/// Decode a generator-declared hash (`0x`-prefixed or bare hex) into leaf digest bytes.
pub fn parse_declared_hash(value: &str, path: &Path, key: &str) -> Result<Digest, FormatError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    hex::decode(digits)
        .map(Digest::new)
        .map_err(|_| FormatError::InvalidHex {
            path: path.to_path_buf(),
            key: key.to_string(),
            value: value.to_string(),
        })
}
