//! [`TestProject`] builder for template-manager test scenarios.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use tpl_fs::NormalizedPath;

/// A temporary project directory with helper methods for test setup and
/// assertion.
///
/// # Example
///
/// ```rust,no_run
/// use tpl_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.write_config_file("config.yaml", "template_version: 1.0.0\n");
/// project.assert_file_exists(".template/config.yaml");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary project directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// The project root as a native path.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The project root as a [`NormalizedPath`].
    pub fn norm_root(&self) -> NormalizedPath {
        NormalizedPath::new(self.temp_dir.path())
    }

    /// Write a file under `.template/`, creating parent directories.
    pub fn write_config_file(&self, rel: &str, content: &str) {
        self.write_file(&format!(".template/{rel}"), content);
    }

    /// Write a file under `.template/.template-defaults/`.
    pub fn write_defaults_file(&self, rel: &str, content: &str) {
        self.write_file(&format!(".template/.template-defaults/{rel}"), content);
    }

    /// Write a file anywhere under the project root.
    pub fn write_file(&self, rel: &str, content: &str) {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Stage a template source directory (outside the config tree) for a
    /// directory-based deployer. Returns its path.
    pub fn stage_template(&self, name: &str, files: &[(&str, &str)]) -> NormalizedPath {
        let dir = self.root().join(name);
        for (rel, content) in files {
            let path = dir.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        NormalizedPath::new(dir)
    }

    /// Read a file under `.template/`.
    pub fn read_config_file(&self, rel: &str) -> String {
        let path = self.root().join(".template").join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Assert that `rel` (relative to the project root) exists.
    pub fn assert_file_exists(&self, rel: &str) {
        let path = self.root().join(rel);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// Assert that `rel` (relative to the project root) does **not** exist.
    pub fn assert_file_not_exists(&self, rel: &str) {
        let path = self.root().join(rel);
        assert!(!path.exists(), "Expected file NOT to exist: {}", path.display());
    }

    /// Assert that the file at `rel` contains `needle`.
    pub fn assert_file_contains(&self, rel: &str, needle: &str) {
        let path = self.root().join(rel);
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()));
        assert!(
            content.contains(needle),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            path.display(),
            needle,
            content
        );
    }
}
