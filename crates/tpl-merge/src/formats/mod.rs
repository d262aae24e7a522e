//! Per-strategy file mergers
//!
//! Each merger takes the freshly deployed (new) content and the backed-up
//! (old) content and returns the merged file text. The structured mergers
//! parse into [`crate::Value`] trees and dispatch to the deep-merge rules;
//! the text mergers work on lines and anchored regions directly.

mod entry;
mod line;
mod section;
mod structured;

pub use entry::{USER_ENTRIES_HEADER, merge_entries};
pub use line::merge_lines;
pub use section::merge_sections;
pub use structured::{merge_json, merge_yaml_deep, merge_yaml_three_way};

use crate::classify::MergeStrategy;
use crate::error::Result;
use crate::policy::FieldPolicyTable;

/// Apply the merger for `strategy` to a pair of file contents.
///
/// `base` is the prior-template snapshot of the file, when the backup
/// carries one; it is only consulted by [`MergeStrategy::Yaml3Way`]. A
/// `Yaml3Way` request without a base degrades to the two-way YAML merge.
pub fn merge_with_strategy(
    strategy: MergeStrategy,
    new: &str,
    old: &str,
    base: Option<&str>,
    policies: &FieldPolicyTable,
) -> Result<String> {
    match (strategy, base) {
        (MergeStrategy::Yaml3Way, Some(base)) => merge_yaml_three_way(new, old, base, policies),
        (MergeStrategy::Yaml3Way, None) | (MergeStrategy::YamlDeep, _) => {
            merge_yaml_deep(new, old, policies)
        }
        (MergeStrategy::JsonMerge, _) => merge_json(new, old, policies),
        (MergeStrategy::EntryMerge, _) => Ok(merge_entries(new, old)),
        (MergeStrategy::SectionMerge, _) => Ok(merge_sections(new, old)),
        (MergeStrategy::LineMerge, _) => Ok(merge_lines(new, old)),
    }
}
