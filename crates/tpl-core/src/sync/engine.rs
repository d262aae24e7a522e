//! SyncEngine implementation
//!
//! The engine is the only place the whole flow is wired together. Failure
//! semantics follow the phase: version-read problems fail open (sync
//! proceeds), backup and deploy failures abort before/with the snapshot
//! preserved, restore problems degrade to per-file warnings, and prune
//! problems never fail a completed sync.

use tracing::{debug, info, warn};

use tpl_fs::NormalizedPath;
use tpl_merge::FieldPolicyTable;

use crate::Result;
use crate::backup::{BackupManager, BackupType};
use crate::deploy::Deployer;
use crate::version::{self, VersionSource};

use super::report::{SyncOptions, SyncResult};
use super::restore;

/// The collaborators a sync needs, constructed once by the caller and
/// passed by reference. There is no package-level mutable state to
/// override; tests inject fixtures here like any other caller.
pub struct Dependencies {
    /// Writes the new template onto the configuration tree
    pub deployer: Box<dyn Deployer>,
    /// Supplies the incoming template's version
    pub version_source: Box<dyn VersionSource>,
}

/// Engine for synchronizing a project's configuration tree with its
/// template.
pub struct SyncEngine {
    /// Project root
    root: NormalizedPath,
    /// Field policies injected into every structured merge
    policies: FieldPolicyTable,
}

impl SyncEngine {
    /// Create an engine with the stock field policies.
    pub fn new(root: NormalizedPath) -> Self {
        Self {
            root,
            policies: FieldPolicyTable::default(),
        }
    }

    /// Create an engine with caller-supplied field policies.
    pub fn with_policies(root: NormalizedPath, policies: FieldPolicyTable) -> Self {
        Self { root, policies }
    }

    /// The project root this engine operates on.
    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Run a sync.
    ///
    /// Either skips entirely (version match), aborts with no tree changes
    /// (backup failure) or with the snapshot preserved (deploy failure),
    /// or completes with zero or more per-file warnings in the result.
    pub fn sync(&self, deps: &Dependencies, options: &SyncOptions) -> Result<SyncResult> {
        let incoming = deps.version_source.current_template_version();

        let recorded = match version::recorded_template_version(&self.root) {
            Ok(recorded) => recorded,
            Err(e) => {
                // Fail open: an unreadable version must trigger a sync,
                // never mask one.
                warn!(error = %e, "could not read recorded version; treating as unknown");
                String::new()
            }
        };

        if !options.force && recorded == incoming {
            info!(version = %incoming, "template already current; skipping sync");
            return Ok(SyncResult::skipped());
        }
        if version::is_downgrade(&recorded, &incoming) {
            warn!(recorded = %recorded, incoming = %incoming, "syncing to an older template version");
        }

        if options.dry_run {
            info!(recorded = %recorded, incoming = %incoming, "dry run; would sync");
            return Ok(SyncResult::skipped());
        }

        let manager = BackupManager::new(self.root.clone());
        let backup_path = manager.backup("pre-sync snapshot", BackupType::PreSync)?;

        deps.deployer.deploy(&self.root)?;

        let mut result = SyncResult {
            ran: true,
            merged: 0,
            restored: 0,
            warnings: Vec::new(),
            backup_path: backup_path.as_ref().map(|p| p.as_str().to_string()),
        };

        if let Some(snapshot) = &backup_path {
            let outcome = restore::restore_from_snapshot(&self.root, snapshot, &self.policies)?;
            result.merged = outcome.merged;
            result.restored = outcome.restored;
            result.warnings = outcome.warnings;
        } else {
            debug!("fresh deployment; nothing to restore");
        }

        // A completed sync is not failed by retention housekeeping.
        match manager.prune(options.retain) {
            Ok(deleted) => debug!(deleted, "pruned snapshots"),
            Err(e) => warn!(error = %e, "failed to prune old snapshots"),
        }

        info!(
            merged = result.merged,
            restored = result.restored,
            warnings = result.warnings.len(),
            "sync complete"
        );
        Ok(result)
    }
}
