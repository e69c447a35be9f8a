//! CLI output: result formatting and error mapping to a stable CLI surface.

use crate::error::{ApiError, HashError};
use crate::tree::digest::Digest;
use crate::tree::digester::FileDigest;
use crate::tree::walker::slash_path;
use std::path::Path;

/// Exit status for a cancelled or timed-out digest.
pub const EXIT_CANCELLED: i32 = 130;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    e.to_string()
}

pub fn exit_code(e: &ApiError) -> i32 {
    match e {
        ApiError::Hash(HashError::Cancelled) => EXIT_CANCELLED,
        _ => 1,
    }
}

/// `<digest>  <root>`
pub fn format_tree_line(digest: &Digest, root: &Path) -> String {
    format!("{}  {}", digest, root.display())
}

/// Every leaf as `<digest>  <relative>`, then the tree line.
pub fn format_tree_listing(leaves: &[FileDigest], digest: &Digest, root: &Path) -> String {
    let mut lines: Vec<String> = leaves
        .iter()
        .map(|leaf| format!("{}  {}", leaf.digest, slash_path(&leaf.relative)))
        .collect();
    lines.push(format_tree_line(digest, root));
    lines.join("\n")
}
