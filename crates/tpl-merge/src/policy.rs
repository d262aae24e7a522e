//! Declared per-field merge policies
//!
//! Certain scalar fields are template-owned: whatever the user writes, the
//! template's value wins on every sync. The recorded template version is the
//! canonical example. Rather than scattering name comparisons through the
//! merge rules, the policy for each field is declared once in a table and
//! injected into the merge functions.

use std::collections::BTreeMap;

/// How a field behaves when both the template and the user supply a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Template-owned: the new template's value always wins.
    AlwaysNew,
    /// User-owned once edited: preserved unless it still equals the merge
    /// base (the value at the time of the previous sync).
    PreserveIfUnchanged,
}

/// A declared field-name → policy table.
///
/// Undeclared fields default to [`FieldPolicy::PreserveIfUnchanged`].
#[derive(Debug, Clone)]
pub struct FieldPolicyTable {
    policies: BTreeMap<String, FieldPolicy>,
}

impl FieldPolicyTable {
    /// Empty table: every field defaults to `PreserveIfUnchanged`.
    pub fn empty() -> Self {
        Self {
            policies: BTreeMap::new(),
        }
    }

    /// Declare a policy for a field name.
    pub fn with_policy(mut self, field: impl Into<String>, policy: FieldPolicy) -> Self {
        self.policies.insert(field.into(), policy);
        self
    }

    /// The policy for a field, defaulting to `PreserveIfUnchanged`.
    pub fn policy_for(&self, field: &str) -> FieldPolicy {
        self.policies
            .get(field)
            .copied()
            .unwrap_or(FieldPolicy::PreserveIfUnchanged)
    }

    /// Whether a field is template-owned.
    pub fn is_system_field(&self, field: &str) -> bool {
        self.policy_for(field) == FieldPolicy::AlwaysNew
    }
}

impl Default for FieldPolicyTable {
    /// The stock policy set: the recorded template version is
    /// template-owned, everything else is user-preservable.
    fn default() -> Self {
        Self::empty().with_policy("template_version", FieldPolicy::AlwaysNew)
    }
}
