//! Entry merge for ignore-pattern files
//!
//! Ignore files are ordered sets of pattern lines. The template's content
//! is authoritative for template-originated entries; anything else the old
//! file carries is a user addition and is appended verbatim under a marker
//! header. A clean old file leaves the new content byte-identical.

use std::collections::HashSet;

/// Header written above preserved user entries.
pub const USER_ENTRIES_HEADER: &str = "# User-defined entries";

/// Merge two ignore-pattern files.
///
/// Comment and blank lines in the old file are not entries; they are never
/// carried over. This also keeps a previously generated header from
/// stacking up across repeated syncs.
pub fn merge_entries(new: &str, old: &str) -> String {
    let template_entries: HashSet<&str> = entries(new).collect();

    let mut user_entries = Vec::new();
    let mut seen = HashSet::new();
    for entry in entries(old) {
        if !template_entries.contains(entry) && seen.insert(entry) {
            user_entries.push(entry);
        }
    }

    if user_entries.is_empty() {
        return new.to_string();
    }

    let mut merged = new.trim_end_matches('\n').to_string();
    if !merged.is_empty() {
        merged.push_str("\n\n");
    }
    merged.push_str(USER_ENTRIES_HEADER);
    merged.push('\n');
    for entry in user_entries {
        merged.push_str(entry);
        merged.push('\n');
    }
    merged
}

fn entries(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clean_old_file_leaves_new_untouched() {
        let new = "# defaults\n*.log\ntarget/\n";
        let merged = merge_entries(new, "*.log\ntarget/\n");
        assert_eq!(merged, new);
    }

    #[test]
    fn user_entries_are_appended_under_header() {
        let new = "*.log\ntarget/\n";
        let old = "*.log\n.envrc\nscratch/\n";
        let merged = merge_entries(new, old);
        assert_eq!(
            merged,
            "*.log\ntarget/\n\n# User-defined entries\n.envrc\nscratch/\n"
        );
    }

    #[test]
    fn header_does_not_stack_across_repeated_merges() {
        let new = "*.log\n";
        let once = merge_entries(new, "*.log\n.envrc\n");
        let twice = merge_entries(new, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn duplicate_user_entries_collapse() {
        let merged = merge_entries("*.log\n", ".envrc\n.envrc\n");
        assert_eq!(merged, "*.log\n\n# User-defined entries\n.envrc\n");
    }

    #[test]
    fn old_comments_are_not_entries() {
        let new = "*.log\n";
        let merged = merge_entries(new, "# my note\n*.log\n");
        assert_eq!(merged, new);
    }

    #[test]
    fn empty_template_still_preserves_user_entries() {
        let merged = merge_entries("", ".envrc\n");
        assert_eq!(merged, "# User-defined entries\n.envrc\n");
    }
}
