//! Hash tree node types

use crate::tree::hasher;
use crate::types::{Digest, Level};
use std::collections::BTreeMap;

/// Content of a node: a declared leaf digest, or named children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    Leaf(Digest),
    Branch(BTreeMap<String, HashNode>),
}

/// A node of the FOLDER → FILE → TEST hash tree.
///
/// Interior digests are not stored; [`HashNode::digest`] derives them from the
/// children every time, so the result only ever reflects the current children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashNode {
    level: Level,
    /// Names of the ancestors, outermost first (used for breadcrumbs).
    parents: Vec<String>,
    content: NodeContent,
}

impl HashNode {
    pub fn leaf(level: Level, parents: Vec<String>, digest: Digest) -> Self {
        Self {
            level,
            parents,
            content: NodeContent::Leaf(digest),
        }
    }

    pub fn branch(level: Level, parents: Vec<String>, children: BTreeMap<String, HashNode>) -> Self {
        Self {
            level,
            parents,
            content: NodeContent::Branch(children),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// Children in ascending name order; `None` for leaves.
    pub fn children(&self) -> Option<&BTreeMap<String, HashNode>> {
        match &self.content {
            NodeContent::Branch(children) => Some(children),
            NodeContent::Leaf(_) => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut BTreeMap<String, HashNode>> {
        match &mut self.content {
            NodeContent::Branch(children) => Some(children),
            NodeContent::Leaf(_) => None,
        }
    }

    pub fn has_children(&self) -> bool {
        self.children().is_some_and(|children| !children.is_empty())
    }

    /// Number of leaves below (or at) this node.
    pub fn leaf_count(&self) -> usize {
        match &self.content {
            NodeContent::Leaf(_) => 1,
            NodeContent::Branch(children) => children.values().map(HashNode::leaf_count).sum(),
        }
    }

    pub fn digest(&self) -> Digest {
        match &self.content {
            NodeContent::Leaf(digest) => digest.clone(),
            NodeContent::Branch(children) => {
                hasher::combine_digests(children.values().map(HashNode::digest))
            }
        }
    }
}
