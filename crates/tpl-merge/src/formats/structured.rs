//! Structured YAML/JSON mergers
//!
//! Parse both sides into [`Value`] trees, apply the deep-merge rules, and
//! re-serialize. Mapping keys come back sorted, so merged output is
//! deterministic regardless of input key order.

use crate::error::Result;
use crate::merge::{merge_deep, merge_three_way};
use crate::policy::FieldPolicyTable;
use crate::value::Value;

/// Two-way merge of two JSON documents.
pub fn merge_json(new: &str, old: &str, policies: &FieldPolicyTable) -> Result<String> {
    let new_tree = Value::parse_json(new)?;
    let old_tree = Value::parse_json(old)?;
    merge_deep(&new_tree, &old_tree, policies).to_json_string()
}

/// Two-way merge of two YAML documents.
pub fn merge_yaml_deep(new: &str, old: &str, policies: &FieldPolicyTable) -> Result<String> {
    let new_tree = Value::parse_yaml(new)?;
    let old_tree = Value::parse_yaml(old)?;
    merge_deep(&new_tree, &old_tree, policies).to_yaml_string()
}

/// Three-way merge of two YAML documents against a base snapshot.
pub fn merge_yaml_three_way(
    new: &str,
    old: &str,
    base: &str,
    policies: &FieldPolicyTable,
) -> Result<String> {
    let new_tree = Value::parse_yaml(new)?;
    let old_tree = Value::parse_yaml(old)?;
    let base_tree = Value::parse_yaml(base)?;
    merge_three_way(&new_tree, &old_tree, &base_tree, policies).to_yaml_string()
}
