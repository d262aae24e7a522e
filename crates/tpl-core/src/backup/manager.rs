//! Backup manager implementation
//!
//! Handles creating, listing, verifying, and pruning configuration tree
//! snapshots.

use std::collections::BTreeMap;
use std::fs;
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tpl_fs::{ConfigStore, NormalizedPath, TemplatePath, checksum, io};

use crate::{Error, Result};

/// Snapshot directory names: `YYYYMMDD_HHMMSS`, optionally with a collision
/// suffix. Anything else in the backup root is never touched by pruning.
static SNAPSHOT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{8}_\d{6}(?:_\d+)?$").unwrap());

/// Transient files never worth capturing.
const EXCLUDED_BASENAMES: &[&str] = &[".DS_Store"];
const EXCLUDED_EXTENSIONS: &[&str] = &["tmp", "lock"];
const EXCLUDED_DIR_NAMES: &[&str] = &["cache"];

/// Why a snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupType {
    /// Automatic snapshot taken before a template deployment
    PreSync,
    /// Snapshot requested explicitly by the caller
    Manual,
}

/// What to do when two snapshots land on the same second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Append `_1`, `_2`, … until the name is free
    #[default]
    AppendSuffix,
    /// Refuse with [`Error::SnapshotExists`]
    Fail,
}

/// Manifest written into every snapshot as `backup_metadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    /// Snapshot timestamp (`YYYYMMDD_HHMMSS`, UTC)
    pub timestamp: String,
    /// Human-readable reason for the snapshot
    pub description: String,
    /// Relative paths of every captured file
    pub backed_up_items: Vec<String>,
    /// Relative paths matched by the transient-file deny-list
    pub excluded_items: Vec<String>,
    /// Directories skipped wholesale
    pub excluded_dirs: Vec<String>,
    /// Project root the snapshot was taken from
    pub project_root: String,
    /// Why the snapshot was taken
    pub backup_type: BackupType,
    /// Per-file checksums of captured items; absent in manifests written
    /// before verification existed
    #[serde(default)]
    pub checksums: BTreeMap<String, String>,
}

/// Manages configuration tree snapshots under `.template-backups/`.
pub struct BackupManager {
    /// Project root
    root: NormalizedPath,
    /// Configuration tree root (`<root>/.template`)
    config_root: NormalizedPath,
    /// Snapshot root (`<root>/.template-backups`)
    backup_root: NormalizedPath,
    collision_policy: CollisionPolicy,
}

impl BackupManager {
    /// Create a new BackupManager for the given project root.
    pub fn new(root: NormalizedPath) -> Self {
        let config_root = root.join(TemplatePath::ConfigRoot.as_str());
        let backup_root = root.join(TemplatePath::BackupRoot.as_str());
        Self {
            root,
            config_root,
            backup_root,
            collision_policy: CollisionPolicy::default(),
        }
    }

    /// Override the timestamp-collision policy.
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Snapshot the configuration tree.
    ///
    /// Returns `Ok(None)` when there is no configuration tree to capture —
    /// a fresh project is not an error. Fails with [`Error::NotADirectory`]
    /// when the config root path exists but is a file.
    ///
    /// The snapshot is complete once `backup_metadata.json` lands; the
    /// manifest is written last.
    pub fn backup(
        &self,
        description: &str,
        backup_type: BackupType,
    ) -> Result<Option<NormalizedPath>> {
        if !self.config_root.exists() {
            debug!(root = %self.config_root, "no configuration tree; skipping backup");
            return Ok(None);
        }
        if !self.config_root.is_dir() {
            return Err(Error::NotADirectory {
                path: self.config_root.to_native(),
            });
        }

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let snapshot = self.claim_snapshot_dir(&timestamp)?;

        let defaults_prefix = format!("{}/", TemplatePath::DefaultsDir.as_str());
        let mut backed_up_items = Vec::new();
        let mut excluded_items = Vec::new();
        let mut excluded_dirs: Vec<String> = Vec::new();
        let mut checksums = BTreeMap::new();

        for rel in io::walk_relative(&self.config_root)? {
            if let Some(dir) = excluded_dir_prefix(&rel) {
                if !excluded_dirs.contains(&dir) {
                    excluded_dirs.push(dir);
                }
                continue;
            }
            if is_excluded_file(&rel) {
                excluded_items.push(rel);
                continue;
            }

            let source = self.config_root.join(&rel);
            if let Some(base_rel) = rel.strip_prefix(&defaults_prefix) {
                // The pristine prior-template copy becomes the snapshot's
                // merge-base tier; it is not part of the captured tree.
                let dest = snapshot
                    .join(TemplatePath::DefaultsDir.as_str())
                    .join(base_rel);
                io::copy_file(&source, &dest)?;
                continue;
            }

            let dest = snapshot.join(&rel);
            io::copy_file(&source, &dest)?;
            let digest = checksum::compute_file_checksum(source.as_ref())?;
            checksums.insert(rel.clone(), digest);
            backed_up_items.push(rel);
        }

        let metadata = BackupMetadata {
            timestamp,
            description: description.to_string(),
            backed_up_items,
            excluded_items,
            excluded_dirs,
            project_root: self.root.as_str().to_string(),
            backup_type,
            checksums,
        };
        let metadata_path = snapshot.join(TemplatePath::MetadataFile.as_str());
        ConfigStore::new().save(&metadata_path, &metadata)?;

        debug!(snapshot = %snapshot, files = metadata.backed_up_items.len(), "backup complete");
        Ok(Some(snapshot))
    }

    /// Reserve a snapshot directory for `timestamp`, applying the collision
    /// policy.
    fn claim_snapshot_dir(&self, timestamp: &str) -> Result<NormalizedPath> {
        let candidate = self.backup_root.join(timestamp);
        if !candidate.exists() {
            fs::create_dir_all(candidate.as_ref())?;
            return Ok(candidate);
        }

        match self.collision_policy {
            CollisionPolicy::Fail => Err(Error::SnapshotExists {
                name: timestamp.to_string(),
            }),
            CollisionPolicy::AppendSuffix => {
                for suffix in 1.. {
                    let name = format!("{timestamp}_{suffix}");
                    let candidate = self.backup_root.join(&name);
                    if !candidate.exists() {
                        fs::create_dir_all(candidate.as_ref())?;
                        return Ok(candidate);
                    }
                }
                unreachable!("suffix search is unbounded")
            }
        }
    }

    /// List snapshot directories, oldest first.
    ///
    /// Only directories matching the snapshot name pattern are returned.
    pub fn list_snapshots(&self) -> Result<Vec<NormalizedPath>> {
        if !self.backup_root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(self.backup_root.as_ref())? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && SNAPSHOT_NAME.is_match(name)
            {
                names.push(name.to_string());
            }
        }
        names.sort();

        Ok(names
            .iter()
            .map(|name| self.backup_root.join(name))
            .collect())
    }

    /// Load the manifest of a snapshot.
    pub fn load_metadata(&self, snapshot: &NormalizedPath) -> Result<BackupMetadata> {
        let path = snapshot.join(TemplatePath::MetadataFile.as_str());
        if !path.is_file() {
            return Err(Error::MetadataNotFound {
                path: path.to_native(),
            });
        }
        Ok(ConfigStore::new().load(&path)?)
    }

    /// Re-checksum every manifest entry of a snapshot.
    ///
    /// Returns the relative paths whose current content no longer matches
    /// the recorded checksum (or which disappeared). Manifests without
    /// checksums verify trivially.
    pub fn verify(&self, snapshot: &NormalizedPath) -> Result<Vec<String>> {
        let metadata = self.load_metadata(snapshot)?;
        let mut mismatched = Vec::new();

        for (rel, expected) in &metadata.checksums {
            let path = snapshot.join(rel);
            match checksum::compute_file_checksum(path.as_ref()) {
                Ok(actual) if &actual == expected => {}
                Ok(_) => mismatched.push(rel.clone()),
                Err(e) => {
                    warn!(path = %path, error = %e, "snapshot entry unreadable");
                    mismatched.push(rel.clone());
                }
            }
        }

        Ok(mismatched)
    }

    /// Delete all but the most recent `keep` snapshots.
    ///
    /// Returns the number of snapshots deleted. Directories not matching
    /// the snapshot name pattern are never deleted; a missing backup root
    /// deletes nothing.
    pub fn prune(&self, keep: usize) -> Result<usize> {
        let snapshots = self.list_snapshots()?;
        if snapshots.len() <= keep {
            return Ok(0);
        }

        let doomed = snapshots.len() - keep;
        for snapshot in &snapshots[..doomed] {
            debug!(snapshot = %snapshot, "pruning snapshot");
            fs::remove_dir_all(snapshot.as_ref())?;
        }
        Ok(doomed)
    }

    /// The snapshot root path.
    pub fn backup_root(&self) -> &NormalizedPath {
        &self.backup_root
    }
}

fn is_excluded_file(rel: &str) -> bool {
    let basename = rel.rsplit('/').next().unwrap_or(rel);
    if EXCLUDED_BASENAMES.contains(&basename) {
        return true;
    }
    basename
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && EXCLUDED_EXTENSIONS.contains(&ext))
}

/// If `rel` sits under a deny-listed directory, the path of that directory.
fn excluded_dir_prefix(rel: &str) -> Option<String> {
    let components: Vec<&str> = rel.split('/').collect();
    for (idx, component) in components[..components.len().saturating_sub(1)]
        .iter()
        .enumerate()
    {
        if EXCLUDED_DIR_NAMES.contains(component) {
            return Some(components[..=idx].join("/"));
        }
    }
    None
}
