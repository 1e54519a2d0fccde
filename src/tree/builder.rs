//! Hash tree construction from a directory of canonical files or from index entries

use crate::error::{ApiError, FormatError, StorageError};
use crate::index::IndexEntry;
use crate::tree::hasher;
use crate::tree::node::HashNode;
use crate::tree::path;
use crate::tree::walker::{Entry, Walker};
use crate::types::{Digest, Level};
use serde_json::Value;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, trace};

/// Hash field of a TEST entry, with the legacy fallback name.
const INFO_FIELD: &str = "_info";
const HASH_FIELDS: [&str; 2] = ["hash", "generatedTestHash"];

/// Builds a hash tree from a directory of canonical JSON files.
pub struct TreeBuilder {
    root: PathBuf,
}

impl TreeBuilder {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Name used for the root node in reports: the directory's own name.
    pub fn root_name(&self) -> String {
        self.root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    /// Build the FOLDER node for the root directory.
    ///
    /// Subdirectories become FOLDER nodes and every `.json` file a FILE node whose
    /// TEST leaves carry each entry's declared hash. Recursion depth is bounded by
    /// the directory depth.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn build(&self) -> Result<HashNode, ApiError> {
        let start = Instant::now();
        let node = build_folder(&Walker::new(), &self.root, Vec::new())?;

        info!(
            tests = node.leaf_count(),
            root_hash = %node.digest(),
            duration_ms = start.elapsed().as_millis(),
            "Tree build completed"
        );
        Ok(node)
    }

    /// Build the tree and return only its root digest.
    pub fn compute_root(&self) -> Result<Digest, ApiError> {
        Ok(self.build()?.digest())
    }
}

fn build_folder(walker: &Walker, dir: &Path, parents: Vec<String>) -> Result<HashNode, ApiError> {
    let dir_name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut child_parents = parents.clone();
    child_parents.push(dir_name);

    let mut children = BTreeMap::new();
    for entry in walker.children(dir)? {
        let child = match &entry {
            Entry::Directory { path, .. } => build_folder(walker, path, child_parents.clone())?,
            Entry::File { path, .. } => file_node_from_json(path, child_parents.clone())?,
        };
        children.insert(entry.name().to_string(), child);
    }
    trace!(dir = %dir.display(), children = children.len(), "Hashed folder");
    Ok(HashNode::branch(Level::Folder, parents, children))
}

/// Parse one canonical file into a FILE node.
///
/// Every top-level entry must be an object whose `_info` carries a hex hash;
/// the first entry that does not fails the whole file.
pub fn file_node_from_json(file_path: &Path, parents: Vec<String>) -> Result<HashNode, ApiError> {
    let bytes = std::fs::read(file_path).map_err(|e| StorageError::io(file_path, e))?;
    let data: Value = serde_json::from_slice(&bytes).map_err(|source| FormatError::InvalidJson {
        path: file_path.to_path_buf(),
        source,
    })?;
    let Value::Object(entries) = data else {
        return Err(FormatError::NotAnObject {
            path: file_path.to_path_buf(),
        }
        .into());
    };

    let file_name = file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut test_parents = parents.clone();
    test_parents.push(file_name);

    let mut children = BTreeMap::new();
    for (key, item) in entries {
        let digest = declared_hash(file_path, &key, &item)?;
        children.insert(key, HashNode::leaf(Level::Test, test_parents.clone(), digest));
    }
    debug!(file = %file_path.display(), tests = children.len(), "Hashed file");
    Ok(HashNode::branch(Level::File, parents, children))
}

fn declared_hash(file_path: &Path, key: &str, item: &Value) -> Result<Digest, FormatError> {
    let Value::Object(item) = item else {
        return Err(FormatError::EntryNotObject {
            path: file_path.to_path_buf(),
            key: key.to_string(),
        });
    };
    let missing = || FormatError::MissingHash {
        path: file_path.to_path_buf(),
        key: key.to_string(),
    };
    let info = item.get(INFO_FIELD).and_then(Value::as_object).ok_or_else(missing)?;
    let value = HASH_FIELDS
        .iter()
        .filter_map(|field| info.get(*field))
        .find(|value| !value.is_null() && value.as_str() != Some(""))
        .ok_or_else(missing)?;
    let Some(value) = value.as_str() else {
        return Err(FormatError::HashNotString {
            path: file_path.to_path_buf(),
            key: key.to_string(),
        });
    };
    hasher::parse_declared_hash(value, file_path, key)
}

/// Builds the same three-level tree from index entries, without touching the filesystem.
///
/// `json_path` segments address FOLDER nodes, its last segment the FILE node, and
/// the entry id the TEST leaf. Entries without a declared hash are skipped.
pub struct IndexTreeBuilder {
    root_name: String,
    root: HashNode,
}

impl IndexTreeBuilder {
    /// Start an empty tree whose root node is named `root_name`.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
            root: HashNode::branch(Level::Folder, Vec::new(), BTreeMap::new()),
        }
    }

    /// Add one entry. Returns `false` when the entry has no declared hash and was skipped.
    ///
    /// A later entry with the same path and id replaces the earlier leaf.
    pub fn insert(&mut self, entry: &IndexEntry) -> Result<bool, FormatError> {
        let Some(hash) = entry.fixture_hash.as_deref() else {
            return Ok(false);
        };
        let digest = hasher::parse_declared_hash(hash, Path::new(&entry.json_path), &entry.id)?;

        let segments = path::segments(&entry.json_path);
        let Some((file_name, folders)) = segments.split_last() else {
            return Err(invalid_path(entry));
        };

        let mut parents = vec![self.root_name.clone()];
        let mut node = &mut self.root;
        for folder in folders {
            node = child_branch(node, folder, Level::Folder, &parents).ok_or_else(|| invalid_path(entry))?;
            parents.push(folder.to_string());
        }
        let file = child_branch(node, file_name, Level::File, &parents).ok_or_else(|| invalid_path(entry))?;
        parents.push(file_name.to_string());

        let tests = file.children_mut().ok_or_else(|| invalid_path(entry))?;
        tests.insert(entry.id.clone(), HashNode::leaf(Level::Test, parents, digest));
        Ok(true)
    }

    pub fn finish(self) -> HashNode {
        self.root
    }
}

/// Child branch `name` of `node` at `level`, created if absent.
///
/// `None` when `node` is a leaf or the existing child sits at another level
/// (a path used both as a folder and as a file).
fn child_branch<'a>(
    node: &'a mut HashNode,
    name: &str,
    level: Level,
    parents: &[String],
) -> Option<&'a mut HashNode> {
    let child = match node.children_mut()?.entry(name.to_string()) {
        btree_map::Entry::Occupied(occupied) => occupied.into_mut(),
        btree_map::Entry::Vacant(vacant) => {
            vacant.insert(HashNode::branch(level, parents.to_vec(), BTreeMap::new()))
        }
    };
    (child.level() == level).then_some(child)
}

fn invalid_path(entry: &IndexEntry) -> FormatError {
    FormatError::InvalidIndexPath {
        id: entry.id.clone(),
        json_path: entry.json_path.clone(),
    }
}

/// Build a tree from index entries, skipping those without a declared hash.
pub fn from_index_entries<'a, I>(entries: I) -> Result<HashNode, FormatError>
where
    I: IntoIterator<Item = &'a IndexEntry>,
{
    let mut builder = IndexTreeBuilder::new(".");
    for entry in entries {
        builder.insert(entry)?;
    }
    Ok(builder.finish())
}
