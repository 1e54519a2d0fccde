//! Indented hash listings

use crate::tree::node::HashNode;
use crate::tree::traverse::{traverse, TraversalOptions};
use crate::types::Level;

/// What a hash report shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// Only the top digest, as a bare `0x…` line.
    RootOnly,
    /// One line per visited node.
    Tree(TraversalOptions),
}

/// Render `root` as `<indent><name>: 0x<hex>` lines, one per visited node.
///
/// Indentation is one space per level below the root. The first line names the
/// root with its ancestor breadcrumb when it has one.
pub fn render(root: &HashNode, root_name: &str, options: &TraversalOptions) -> Vec<String> {
    traverse(root, root_name, options)
        .into_iter()
        .map(|visit| {
            let label = if visit.depth == 0 {
                breadcrumb(visit.node, visit.name)
            } else {
                visit.name.to_string()
            };
            format!("{}{}: {}", " ".repeat(visit.depth), label, visit.node.digest())
        })
        .collect()
}

pub fn render_report(root: &HashNode, root_name: &str, mode: &ReportMode) -> Vec<String> {
    match mode {
        ReportMode::RootOnly => vec![root.digest().to_prefixed_hex()],
        ReportMode::Tree(options) => render(root, root_name, options),
    }
}

fn breadcrumb(node: &HashNode, name: &str) -> String {
    if node.parents().is_empty() {
        return name.to_string();
    }
    let separator = if node.level() == Level::Test { "::" } else { "/" };
    format!("{}{}{}", node.parents().join("/"), separator, name)
}
