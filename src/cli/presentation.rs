//! CLI presentation: hash difference listing.

use crate::tree::DiffEntry;
use owo_colors::OwoColorize;
use std::fmt::Write;

const MISSING: &str = "<missing>";

/// Render `entries` under a header naming both sides. Empty input renders nothing.
///
/// Each path is indented by its depth; its left hash follows on a `- ` line and its
/// right hash on a `+ ` line.
pub fn format_diff(entries: &[DiffEntry], left_label: &str, right_label: &str, color: bool) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let header = "── Hash Differences ──";
    let left_header = format!("--- {}", left_label);
    let right_header = format!("+++ {}", right_label);
    if color {
        let _ = writeln!(out, "{}", header.bold());
        let _ = writeln!(out, "{}", left_header.dimmed());
        let _ = writeln!(out, "{}", right_header.dimmed());
    } else {
        let _ = writeln!(out, "{}\n{}\n{}", header, left_header, right_header);
    }
    out.push('\n');

    for entry in entries {
        let indent = "  ".repeat(entry.depth() + 1);
        let left = entry
            .left
            .as_ref()
            .map_or_else(|| MISSING.to_string(), |d| d.to_prefixed_hex());
        let right = entry
            .right
            .as_ref()
            .map_or_else(|| MISSING.to_string(), |d| d.to_prefixed_hex());
        let left = format!("- {}", left);
        let right = format!("+ {}", right);
        if color {
            let _ = writeln!(out, "{}{}", indent, entry.display_path().bold());
            let _ = writeln!(out, "{}  {}", indent, left.red());
            let _ = writeln!(out, "{}  {}", indent, right.green());
        } else {
            let _ = writeln!(out, "{}{}", indent, entry.display_path());
            let _ = writeln!(out, "{}  {}", indent, left);
            let _ = writeln!(out, "{}  {}", indent, right);
        }
        out.push('\n');
    }
    out
}
