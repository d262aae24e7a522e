//! Error types for tpl-core

use std::path::PathBuf;

/// Result type for tpl-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tpl-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration root path collides with a non-directory file
    #[error("Configuration root at {path} is not a directory")]
    NotADirectory { path: PathBuf },

    /// A snapshot directory with this name already exists
    #[error("Snapshot {name} already exists")]
    SnapshotExists { name: String },

    /// Snapshot metadata file is missing
    #[error("No backup metadata found at {path}")]
    MetadataNotFound { path: PathBuf },

    /// Template deployment failed
    #[error("Deploy failed: {message}")]
    DeployFailed { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from tpl-fs
    #[error(transparent)]
    Fs(#[from] tpl_fs::Error),

    /// Merge error from tpl-merge
    #[error(transparent)]
    Merge(#[from] tpl_merge::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
