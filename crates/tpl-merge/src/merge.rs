//! Two-way and three-way deep merge over [`Value`] trees
//!
//! Both merges walk the new (template) and old (user) trees together and
//! produce a fresh tree; inputs are never mutated.
//!
//! The two-way merge has no way to tell "user edited this" from "template
//! changed this", so it preserves the old value for every contested scalar
//! except declared template-owned fields. The three-way merge adds the base
//! tree — the template's own state at the previous sync — and uses it to
//! adopt new defaults for values the user never touched, and to drop fields
//! the template intentionally removed.

use std::collections::BTreeMap;

use crate::policy::{FieldPolicy, FieldPolicyTable};
use crate::value::Value;

/// Two-way deep merge: `new` is the freshly deployed template tree, `old`
/// is the user's tree from the backup.
pub fn merge_deep(new: &Value, old: &Value, policies: &FieldPolicyTable) -> Value {
    match (new, old) {
        (Value::Mapping(new_map), Value::Mapping(old_map)) => {
            Value::Mapping(merge_maps_two_way(new_map, old_map, policies))
        }
        // A non-mapping root has no field name to consult; the old value
        // is the user's document and wins.
        _ => old.clone(),
    }
}

/// Three-way deep merge: `base` is the template's state at the previous
/// sync, before the user had a chance to edit it.
pub fn merge_three_way(
    new: &Value,
    old: &Value,
    base: &Value,
    policies: &FieldPolicyTable,
) -> Value {
    match (new, old) {
        (Value::Mapping(new_map), Value::Mapping(old_map)) => {
            let empty = BTreeMap::new();
            let base_map = base.as_mapping().unwrap_or(&empty);
            Value::Mapping(merge_maps_three_way(new_map, old_map, base_map, policies))
        }
        _ => {
            if old.normalized_eq(base) {
                new.clone()
            } else {
                old.clone()
            }
        }
    }
}

fn merge_maps_two_way(
    new_map: &BTreeMap<String, Value>,
    old_map: &BTreeMap<String, Value>,
    policies: &FieldPolicyTable,
) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();

    for (key, new_val) in new_map {
        let merged = match old_map.get(key) {
            // Template added a field
            None => new_val.clone(),
            Some(old_val) => merge_entry_two_way(key, new_val, old_val, policies),
        };
        out.insert(key.clone(), merged);
    }

    // User-added keys the template no longer declares are preserved in a
    // two-way merge; only the three-way merge can prove a removal.
    for (key, old_val) in old_map {
        if !new_map.contains_key(key) {
            out.insert(key.clone(), old_val.clone());
        }
    }

    out
}

fn merge_entry_two_way(
    key: &str,
    new_val: &Value,
    old_val: &Value,
    policies: &FieldPolicyTable,
) -> Value {
    match (new_val, old_val) {
        (Value::Mapping(new_map), Value::Mapping(old_map)) => {
            Value::Mapping(merge_maps_two_way(new_map, old_map, policies))
        }
        // Structural conflict: one side restructured the entry. Treat it as
        // a user customization and keep the old shape.
        (Value::Mapping(_), _) | (_, Value::Mapping(_)) => old_val.clone(),
        _ => match policies.policy_for(key) {
            FieldPolicy::AlwaysNew => new_val.clone(),
            FieldPolicy::PreserveIfUnchanged => old_val.clone(),
        },
    }
}

fn merge_maps_three_way(
    new_map: &BTreeMap<String, Value>,
    old_map: &BTreeMap<String, Value>,
    base_map: &BTreeMap<String, Value>,
    policies: &FieldPolicyTable,
) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();

    for (key, new_val) in new_map {
        let merged = match old_map.get(key) {
            None => new_val.clone(),
            Some(old_val) => {
                merge_entry_three_way(key, new_val, old_val, base_map.get(key), policies)
            }
        };
        out.insert(key.clone(), merged);
    }

    // Keys only in `old` are dropped: the template removed them, and the
    // base tier is what lets us trust that over "user added this".
    out
}

fn merge_entry_three_way(
    key: &str,
    new_val: &Value,
    old_val: &Value,
    base_val: Option<&Value>,
    policies: &FieldPolicyTable,
) -> Value {
    match (new_val, old_val) {
        (Value::Mapping(new_map), Value::Mapping(old_map)) => {
            let empty = BTreeMap::new();
            let base_map = base_val.and_then(Value::as_mapping).unwrap_or(&empty);
            Value::Mapping(merge_maps_three_way(new_map, old_map, base_map, policies))
        }
        (Value::Mapping(_), _) | (_, Value::Mapping(_)) => old_val.clone(),
        _ => {
            if policies.policy_for(key) == FieldPolicy::AlwaysNew {
                return new_val.clone();
            }
            match base_val {
                // Untouched since the last sync: adopt the new default.
                Some(base) if old_val.normalized_eq(base) => new_val.clone(),
                // Edited, or introduced by the user (no base entry).
                _ => old_val.clone(),
            }
        }
    }
}
