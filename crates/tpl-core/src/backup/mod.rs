//! Configuration tree backup and retention
//!
//! Before every deployment the live `.template/` tree is snapshotted into
//! `.template-backups/<timestamp>/` together with a manifest of what was
//! captured and what was deliberately excluded. Snapshots are immutable
//! once written and are only ever removed wholesale by pruning.
//!
//! A snapshot may carry a `.template-defaults/` tier — the template's own
//! state at the time of the previous sync — which is what enables the
//! three-way merge during restore.

mod manager;

pub use manager::{BackupManager, BackupMetadata, BackupType, CollisionPolicy};
