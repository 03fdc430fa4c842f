//! [`TestProject`] builder for launcher test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use launcher_core::{CONFIG_FILENAME, LauncherConfig, MANIFEST_FILENAME};
use tempfile::TempDir;

/// Manifest with `install` and `publish` operations backed by scripts in
/// `bin/`, plus text help.
pub const DEFAULT_MANIFEST: &str = r#"[extension]
name = "bubblebot"
version = "1.4.0"
description = "Deploy bots from a repository"

[operations.install]
command = "bin/install"
description = "Set up bubblebot in this project"

[operations.publish]
command = "bin/publish"
description = "Publish a new version"

[help]
text = "bubblebot help: install | publish"
"#;

/// A temporary project directory with helpers for laying out launcher files.
///
/// # Example
///
/// ```rust,no_run
/// use launcher_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.write_config("package_manager = \"pnpm\"\n");
/// project.install_package(launcher_test_utils::project::DEFAULT_MANIFEST);
/// assert!(project.package_dir().is_dir());
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
    /// Create an empty temporary project.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the project root.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The configuration the launcher would load for this project.
    pub fn config(&self) -> LauncherConfig {
        LauncherConfig::load(self.root()).expect("TestProject::config: invalid launcher.toml")
    }

    /// Where the configured package is materialized.
    pub fn package_dir(&self) -> PathBuf {
        self.config().package_dir(self.root())
    }

    /// Write `launcher.toml`.
    pub fn write_config(&self, content: &str) {
        fs::write(self.root().join(CONFIG_FILENAME), content).unwrap();
    }

    /// Materialize the configured package with the given manifest.
    pub fn install_package(&self, manifest: &str) {
        materialize_package(&self.package_dir(), manifest);
    }

    /// Write the override module at its configured location.
    pub fn write_override(&self, content: &str) {
        let path = self.config().override_file(self.root());
        write_file(&path, content);
    }

    /// Write an executable script relative to the project root.
    pub fn write_script(&self, relative: &str, body: &str) -> PathBuf {
        let path = self.root().join(relative);
        write_script(&path, body);
        path
    }

    /// Write an executable script inside the installed package.
    pub fn write_package_script(&self, relative: &str, body: &str) -> PathBuf {
        let path = self.package_dir().join(relative);
        write_script(&path, body);
        path
    }

    /// Read a file relative to the project root, panicking if absent.
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative))
            .unwrap_or_else(|e| panic!("TestProject::read: {relative}: {e}"))
    }

    /// Assert that a path relative to the project root exists.
    pub fn assert_exists(&self, relative: &str) {
        assert!(
            self.root().join(relative).exists(),
            "expected {relative} to exist in {}",
            self.root().display()
        );
    }

    /// Assert that a path relative to the project root does not exist.
    pub fn assert_not_exists(&self, relative: &str) {
        assert!(
            !self.root().join(relative).exists(),
            "expected {relative} to be absent from {}",
            self.root().display()
        );
    }
}

/// Create `package_dir` with a `launcher_extension.toml` holding `manifest`.
pub fn materialize_package(package_dir: &Path, manifest: &str) {
    fs::create_dir_all(package_dir).unwrap();
    fs::write(package_dir.join(MANIFEST_FILENAME), manifest).unwrap();
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn write_script(path: &Path, body: &str) {
    write_file(path, &format!("#!/bin/sh\n{body}\n"));
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
