//! Report types for sync operations

use serde::{Deserialize, Serialize};

/// Snapshots kept after a sync unless the caller asks otherwise.
pub const DEFAULT_RETAIN: usize = 5;

/// Options for a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Run even when the recorded and incoming versions match.
    pub force: bool,
    /// Snapshots to keep when pruning.
    pub retain: usize,
    /// Stop after the version gate and report instead of writing.
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            force: false,
            retain: DEFAULT_RETAIN,
            dry_run: false,
        }
    }
}

/// A non-fatal, file-scoped problem encountered during restore.
///
/// The freshly deployed file is left in place for the affected path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeWarning {
    /// Path relative to the configuration root
    pub path: String,
    /// What went wrong
    pub message: String,
}

/// Outcome of a sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResult {
    /// Whether the sync actually ran (false when skipped or dry-run)
    pub ran: bool,
    /// Files merged against the backup
    pub merged: usize,
    /// Backup-only files restored verbatim
    pub restored: usize,
    /// File-scoped problems; the sync still completed
    pub warnings: Vec<MergeWarning>,
    /// The snapshot used for restore, when one was taken
    pub backup_path: Option<String>,
}

impl SyncResult {
    /// A sync that did not run.
    pub fn skipped() -> Self {
        Self {
            ran: false,
            merged: 0,
            restored: 0,
            warnings: Vec::new(),
            backup_path: None,
        }
    }
}
