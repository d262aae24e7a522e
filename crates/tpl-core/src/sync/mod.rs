//! Sync orchestration: version gate, backup, deploy, restore-merge, prune
//!
//! This module drives the end-to-end flow:
//! - **version gate**: skip when the recorded and incoming versions match
//! - **backup**: snapshot the live tree before anything destructive
//! - **deploy**: hand the tree to the injected [`crate::Deployer`]
//! - **restore**: walk the snapshot and merge every captured file back
//!   against the fresh deployment, collecting per-file warnings
//! - **prune**: enforce the snapshot retention count

mod engine;
mod report;
mod restore;

pub use engine::{Dependencies, SyncEngine};
pub use report::{DEFAULT_RETAIN, MergeWarning, SyncOptions, SyncResult};
