//! Template deployment seam
//!
//! The engine does not know how templates are fetched or rendered; it
//! hands the project root to a [`Deployer`] and expects the configuration
//! tree to hold the new template afterwards. [`DirectoryDeployer`] is the
//! bundled implementation for templates that already exist on disk.

use std::fs;

use tracing::debug;

use tpl_fs::{NormalizedPath, TemplatePath, io};

use crate::{Error, Result};

/// Writes the new template onto the project's configuration tree.
pub trait Deployer {
    fn deploy(&self, project_root: &NormalizedPath) -> Result<()>;
}

/// Deploys a template from a plain directory of files.
///
/// Deployment replaces the configuration tree: the previous tree is
/// removed, the template files are copied in, and a pristine copy is
/// written to `.template/.template-defaults/` so the next sync can
/// three-way merge against today's defaults.
pub struct DirectoryDeployer {
    template_dir: NormalizedPath,
}

impl DirectoryDeployer {
    pub fn new(template_dir: NormalizedPath) -> Self {
        Self { template_dir }
    }
}

impl Deployer for DirectoryDeployer {
    fn deploy(&self, project_root: &NormalizedPath) -> Result<()> {
        if !self.template_dir.is_dir() {
            return Err(Error::DeployFailed {
                message: format!("template directory not found: {}", self.template_dir),
            });
        }

        let config_root = project_root.join(TemplatePath::ConfigRoot.as_str());
        if config_root.exists() {
            fs::remove_dir_all(config_root.as_ref())?;
        }

        let files = io::walk_relative(&self.template_dir)?;
        debug!(files = files.len(), dest = %config_root, "deploying template");

        let defaults_root = config_root.join(TemplatePath::DefaultsDir.as_str());
        for rel in &files {
            let source = self.template_dir.join(rel);
            io::copy_file(&source, &config_root.join(rel))?;
            io::copy_file(&source, &defaults_root.join(rel))?;
        }

        Ok(())
    }
}
