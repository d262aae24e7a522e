//! Version gating for template synchronization
//!
//! A sync only runs when the incoming template's version differs from the
//! version recorded in the project's configuration tree. The comparison is
//! exact string equality; semver is consulted only to warn about
//! downgrades.

use serde::Deserialize;
use tracing::debug;

use tpl_fs::{ConfigStore, NormalizedPath, TemplatePath};

use crate::Result;

/// Version assumed when the project has no recorded template version.
pub const FALLBACK_VERSION: &str = "0.0.0";

/// Supplies the incoming template's version string.
///
/// Implemented by whatever knows where the new template comes from — a
/// vendored manifest, a release feed, a fixture in tests.
pub trait VersionSource {
    fn current_template_version(&self) -> String;
}

/// A `VersionSource` that returns a fixed string.
pub struct FixedVersion(pub String);

impl VersionSource for FixedVersion {
    fn current_template_version(&self) -> String {
        self.0.clone()
    }
}

/// The slice of `config.yaml` the version gate cares about.
#[derive(Debug, Deserialize)]
struct VersionedConfig {
    #[serde(default)]
    template_version: Option<String>,
}

/// Read the project's recorded template version.
///
/// Returns [`FALLBACK_VERSION`] when the configuration file is absent or
/// carries no version field. An unreadable, oversized, or malformed file is
/// an error — the caller decides whether to fail open.
pub fn recorded_template_version(root: &NormalizedPath) -> Result<String> {
    let path = root
        .join(TemplatePath::ConfigRoot.as_str())
        .join(TemplatePath::ConfigFile.as_str());

    if !path.is_file() {
        debug!(path = %path, "no recorded template version; assuming {FALLBACK_VERSION}");
        return Ok(FALLBACK_VERSION.to_string());
    }

    let config: VersionedConfig = ConfigStore::new().load(&path)?;
    Ok(config
        .template_version
        .unwrap_or_else(|| FALLBACK_VERSION.to_string()))
}

/// Whether moving from `recorded` to `incoming` walks the version backwards.
///
/// Only meaningful when both strings parse as semver; anything else is not
/// a downgrade.
pub fn is_downgrade(recorded: &str, incoming: &str) -> bool {
    match (
        semver::Version::parse(recorded),
        semver::Version::parse(incoming),
    ) {
        (Ok(recorded), Ok(incoming)) => incoming < recorded,
        _ => false,
    }
}
