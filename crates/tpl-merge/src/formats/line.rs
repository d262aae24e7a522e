//! Plain line merge
//!
//! Fallback for files with no structure we understand: keep the template
//! content verbatim, then append old lines the template does not contain.
//! Template lines come first; order within each source is preserved; blank
//! lines never count as content worth carrying.

use std::collections::HashSet;

/// Merge two plain-text files line-wise.
pub fn merge_lines(new: &str, old: &str) -> String {
    let mut seen: HashSet<&str> = new.lines().collect();

    let mut merged: Vec<&str> = new.lines().collect();
    for line in old.lines() {
        if !line.trim().is_empty() && seen.insert(line) {
            merged.push(line);
        }
    }

    let mut out = merged.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}
