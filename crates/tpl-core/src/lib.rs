//! Sync orchestration layer for Template Manager
//!
//! This crate drives the end-to-end template synchronization flow:
//!
//! - **Version gate**: skip the sync when the recorded template version
//!   already matches the incoming one
//! - **BackupManager**: timestamped pre-sync snapshots with a manifest,
//!   verification, and retention-based pruning
//! - **SyncEngine**: backup → deploy → merge-restore → prune, collecting
//!   per-file warnings instead of aborting
//!
//! # Architecture
//!
//! `tpl-core` sits above the pure layers and below whatever surface
//! triggers a sync:
//!
//! ```text
//!        CLI / wizard / update hook
//!                   |
//!               tpl-core
//!                   |
//!            +------+------+
//!            |             |
//!         tpl-fs       tpl-merge
//! ```
//!
//! The filesystem collaborators a sync needs — how the new template lands
//! on disk, and what version it carries — are injected through
//! [`Dependencies`]; the engine itself never fetches or renders templates.

pub mod backup;
pub mod deploy;
pub mod error;
pub mod logging;
pub mod sync;
pub mod version;

pub use backup::{BackupManager, BackupMetadata, BackupType, CollisionPolicy};
pub use deploy::{Deployer, DirectoryDeployer};
pub use error::{Error, Result};
pub use sync::{Dependencies, MergeWarning, SyncEngine, SyncOptions, SyncResult};
pub use version::{FALLBACK_VERSION, FixedVersion, VersionSource, recorded_template_version};
