//! Depth- and granularity-limited traversal shared by the reporter and the differ

use crate::tree::node::HashNode;
use crate::types::Level;

/// Which part of a tree a traversal visits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalOptions {
    /// Finest level visited; children below it are never entered.
    pub granularity: Option<Level>,
    /// Deepest level below the root that is visited (the root is depth 0).
    pub max_depth: Option<usize>,
}

impl TraversalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_granularity(mut self, granularity: Level) -> Self {
        self.granularity = Some(granularity);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Only the root node.
    pub fn root_only() -> Self {
        Self::new().with_max_depth(0)
    }

    fn admits(&self, level: Level) -> bool {
        self.granularity.map_or(true, |granularity| level <= granularity)
    }

    fn may_descend(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max_depth| depth < max_depth)
    }
}

/// One node reached by [`traverse`].
#[derive(Debug, Clone)]
pub struct Visit<'a> {
    /// Name under the parent; the root uses the name given to [`traverse`].
    pub name: &'a str,
    /// Child names from the root joined with `/`; empty for the root itself.
    pub path: String,
    pub depth: usize,
    pub node: &'a HashNode,
    /// Whether traversal stops here (no admitted children, or the depth limit).
    pub is_frontier: bool,
}

/// Visit `root` and its admitted descendants in pre-order, children in ascending name order.
///
/// Iterative, so the only bound is the tree's own depth.
pub fn traverse<'a>(root: &'a HashNode, root_name: &'a str, options: &TraversalOptions) -> Vec<Visit<'a>> {
    let mut visits = Vec::new();
    let mut stack = vec![(root_name, String::new(), 0usize, root)];

    while let Some((name, path, depth, node)) = stack.pop() {
        let admitted: Vec<(&'a String, &'a HashNode)> = if options.may_descend(depth) {
            node.children()
                .into_iter()
                .flatten()
                .filter(|(_, child)| options.admits(child.level()))
                .collect()
        } else {
            Vec::new()
        };

        for &(child_name, child) in admitted.iter().rev() {
            let child_path = if path.is_empty() {
                child_name.to_string()
            } else {
                format!("{path}/{child_name}")
            };
            stack.push((child_name.as_str(), child_path, depth + 1, child));
        }

        visits.push(Visit {
            name,
            path,
            depth,
            node,
            is_frontier: admitted.is_empty(),
        });
    }

    visits
}
