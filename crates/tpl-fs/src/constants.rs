//! Constants and enums for template filesystem paths.

use std::path::Path;

/// Standard template filesystem markers and paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplatePath {
    /// The `.template` directory (configuration tree root)
    ConfigRoot,
    /// The `sections` directory under the config root
    SectionsDir,
    /// The `.template-defaults` directory (pristine copy of the last deploy)
    DefaultsDir,
    /// The `.template-backups` directory (snapshot root)
    BackupRoot,
    /// The top-level `config.yaml` inside the config root
    ConfigFile,
    /// The per-snapshot `backup_metadata.json` manifest
    MetadataFile,
}

impl TemplatePath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigRoot => ".template",
            Self::SectionsDir => "sections",
            Self::DefaultsDir => ".template-defaults",
            Self::BackupRoot => ".template-backups",
            Self::ConfigFile => "config.yaml",
            Self::MetadataFile => "backup_metadata.json",
        }
    }
}

impl AsRef<Path> for TemplatePath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for TemplatePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for TemplatePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
