//! Restore walk: merge a snapshot back over a fresh deployment
//!
//! For every file the snapshot captured, the walk classifies the path,
//! selects a merger, and merges `(new = deployed file, old = backed-up
//! file, base = prior-template snapshot when present)`. A failure on one
//! file never stops the walk; the deployed file stays as-is and the
//! failure is reported as a warning.

use tracing::{debug, warn};

use tpl_fs::{NormalizedPath, TemplatePath, io};
use tpl_merge::{FieldPolicyTable, MergeStrategy, RiskLevel, classify, merge_with_strategy};

use crate::Result;
use crate::backup::BackupManager;

use super::report::MergeWarning;

/// Metadata names inside legacy snapshots that must not be copied back.
const NON_RESTORABLE: &[&str] = &["backup_metadata.json"];

/// Counts produced by a restore walk.
pub(super) struct RestoreOutcome {
    pub merged: usize,
    pub restored: usize,
    pub warnings: Vec<MergeWarning>,
}

/// Merge every file captured in `snapshot` back over the deployed tree.
///
/// Snapshots with a manifest walk `backed_up_items` and can upgrade YAML
/// merges to three-way when the snapshot carries a base tier. Snapshots
/// without one (taken before manifests existed) fall back to a file-by-file
/// two-way walk of the snapshot contents.
pub(super) fn restore_from_snapshot(
    root: &NormalizedPath,
    snapshot: &NormalizedPath,
    policies: &FieldPolicyTable,
) -> Result<RestoreOutcome> {
    let config_root = root.join(TemplatePath::ConfigRoot.as_str());
    let manager = BackupManager::new(root.clone());

    let items = match manager.load_metadata(snapshot) {
        Ok(metadata) => metadata.backed_up_items,
        Err(e) => {
            debug!(snapshot = %snapshot, error = %e, "no manifest; legacy two-way restore");
            return legacy_restore(&config_root, snapshot, policies);
        }
    };

    let mut outcome = RestoreOutcome {
        merged: 0,
        restored: 0,
        warnings: Vec::new(),
    };

    for rel in &items {
        let old_path = snapshot.join(rel);
        if !old_path.is_file() {
            outcome.warnings.push(MergeWarning {
                path: rel.clone(),
                message: "recorded in manifest but missing from snapshot".to_string(),
            });
            continue;
        }

        let base_path = snapshot
            .join(TemplatePath::DefaultsDir.as_str())
            .join(rel);
        let base_path = base_path.is_file().then_some(base_path);

        restore_one(&config_root, rel, &old_path, base_path.as_ref(), policies, &mut outcome);
    }

    Ok(outcome)
}

fn legacy_restore(
    config_root: &NormalizedPath,
    snapshot: &NormalizedPath,
    policies: &FieldPolicyTable,
) -> Result<RestoreOutcome> {
    let mut outcome = RestoreOutcome {
        merged: 0,
        restored: 0,
        warnings: Vec::new(),
    };

    let defaults_prefix = format!("{}/", TemplatePath::DefaultsDir.as_str());
    for rel in io::walk_relative(snapshot)? {
        if rel.starts_with(&defaults_prefix) || NON_RESTORABLE.contains(&rel.as_str()) {
            continue;
        }
        let old_path = snapshot.join(&rel);
        // Legacy snapshots predate the base tier; never upgrade to
        // three-way here.
        restore_one(config_root, &rel, &old_path, None, policies, &mut outcome);
    }

    Ok(outcome)
}

fn restore_one(
    config_root: &NormalizedPath,
    rel: &str,
    old_path: &NormalizedPath,
    base_path: Option<&NormalizedPath>,
    policies: &FieldPolicyTable,
    outcome: &mut RestoreOutcome,
) {
    let new_path = config_root.join(rel);

    // A path only the backup knows about is a custom, non-template
    // section: bring it back untouched.
    if !new_path.exists() {
        match io::copy_file(old_path, &new_path) {
            Ok(()) => outcome.restored += 1,
            Err(e) => outcome.warnings.push(MergeWarning {
                path: rel.to_string(),
                message: e.to_string(),
            }),
        }
        return;
    }

    let (risk, mut strategy) = classify(rel, true);
    if risk == RiskLevel::High {
        warn!(path = rel, "merging file that commonly holds hand-authored content");
    }
    if strategy == MergeStrategy::YamlDeep && base_path.is_some() {
        strategy = MergeStrategy::Yaml3Way;
    }

    match merge_file(&new_path, old_path, base_path, strategy, policies) {
        Ok(()) => {
            debug!(path = rel, ?strategy, "merged");
            outcome.merged += 1;
        }
        Err(e) => {
            warn!(path = rel, error = %e, "merge failed; keeping deployed file");
            outcome.warnings.push(MergeWarning {
                path: rel.to_string(),
                message: e.to_string(),
            });
        }
    }
}

fn merge_file(
    new_path: &NormalizedPath,
    old_path: &NormalizedPath,
    base_path: Option<&NormalizedPath>,
    strategy: MergeStrategy,
    policies: &FieldPolicyTable,
) -> Result<()> {
    let new_text = io::read_text(new_path)?;
    let old_text = io::read_text(old_path)?;
    let base_text = match base_path {
        Some(path) => Some(io::read_text(path)?),
        None => None,
    };

    let merged = merge_with_strategy(
        strategy,
        &new_text,
        &old_text,
        base_text.as_deref(),
        policies,
    )?;
    io::write_text(new_path, &merged)?;
    Ok(())
}
