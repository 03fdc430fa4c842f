//! Project configuration from `launcher.toml`.
//!
//! Every key is optional; a project without the file gets the defaults
//! below. The file sits at the project root next to the dependency directory.
//!
//! # Example TOML
//!
//! ```toml
//! package = "bubblebot"
//! package_manager = "pnpm"
//! dependency_dir = "node_modules"
//! override_path = "lib/override.toml"
//! refresh_on_launch = true
//! ```

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Extension package bootstrapped when the project does not name one.
pub const DEFAULT_PACKAGE: &str = "bubblebot";

/// Default project-local dependency directory.
pub const DEFAULT_DEPENDENCY_DIR: &str = "node_modules";

/// Default location of the local override module.
pub const DEFAULT_OVERRIDE_PATH: &str = "lib/override.toml";

/// Package managers the launcher knows how to drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    /// Executable name looked up on PATH.
    pub fn program(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
        }
    }

    /// Arguments that add `package` as a dependency of the project manifest.
    pub fn add_args(self, package: &str) -> Vec<String> {
        let verb: &[&str] = match self {
            Self::Npm => &["install", "--save"],
            Self::Yarn | Self::Pnpm | Self::Bun => &["add"],
        };
        verb.iter()
            .map(|s| s.to_string())
            .chain(std::iter::once(package.to_string()))
            .collect()
    }

    /// Arguments that refresh an already installed `package`.
    pub fn update_args(self, package: &str) -> Vec<String> {
        let verb = match self {
            Self::Yarn => "upgrade",
            Self::Npm | Self::Pnpm | Self::Bun => "update",
        };
        vec![verb.to_string(), package.to_string()]
    }

    /// Where to get the tool when it is missing from PATH.
    pub fn install_hint(self) -> &'static str {
        match self {
            Self::Npm => "Install: https://nodejs.org",
            Self::Yarn => "Install: npm install --global yarn",
            Self::Pnpm => "Install: https://pnpm.io/installation",
            Self::Bun => "Install: https://bun.sh",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Launcher configuration for one project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LauncherConfig {
    /// Name of the extension package, as the package manager knows it.
    pub package: String,
    /// Package manager used to install and refresh the package.
    pub package_manager: PackageManager,
    /// Dependency directory, relative to the project root.
    pub dependency_dir: String,
    /// Override module path, relative to the project root.
    pub override_path: String,
    /// Shell command replacing the package manager's add command.
    pub install_command: Option<String>,
    /// Shell command replacing the package manager's update command.
    pub refresh_command: Option<String>,
    /// Re-sync the installed package on every launch.
    pub refresh_on_launch: bool,
    /// Serialize concurrent installs into the same project.
    pub lock_installs: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
            package_manager: PackageManager::default(),
            dependency_dir: DEFAULT_DEPENDENCY_DIR.to_string(),
            override_path: DEFAULT_OVERRIDE_PATH.to_string(),
            install_command: None,
            refresh_command: None,
            refresh_on_launch: false,
            lock_installs: true,
        }
    }
}

impl LauncherConfig {
    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `launcher.toml` from the project root, falling back to defaults
    /// when the file does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(crate::CONFIG_FILENAME);
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content, &path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no launcher config, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Directory the package manager materializes the package into.
    pub fn package_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.dependency_dir).join(&self.package)
    }

    /// Location of the optional override module.
    pub fn override_file(&self, root: &Path) -> PathBuf {
        root.join(&self.override_path)
    }

    fn validate(&self) -> Result<()> {
        validate_package_name(&self.package)?;

        for (key, value) in [
            ("dependency_dir", &self.dependency_dir),
            ("override_path", &self.override_path),
        ] {
            if value.is_empty() {
                return Err(Error::InvalidConfig {
                    reason: format!("{key} must not be empty"),
                });
            }
            let path = Path::new(value);
            if path.has_root() || path.components().any(|c| c == Component::ParentDir) {
                return Err(Error::InvalidConfig {
                    reason: format!(
                        "{key} must be a relative path inside the project, got {value:?}"
                    ),
                });
            }
        }

        for (key, value) in [
            ("install_command", &self.install_command),
            ("refresh_command", &self.refresh_command),
        ] {
            if value.as_deref().is_some_and(|cmd| cmd.trim().is_empty()) {
                return Err(Error::InvalidConfig {
                    reason: format!("{key} must not be blank"),
                });
            }
        }

        Ok(())
    }
}

/// Accepts `name` and `@scope/name` with the characters registries allow.
fn validate_package_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidConfig {
        reason: format!("invalid package name {name:?}: {reason}"),
    };

    if name.is_empty() {
        return Err(invalid("must not be empty"));
    }

    let bare = match name.strip_prefix('@') {
        Some(scoped) => {
            let (scope, rest) = scoped
                .split_once('/')
                .ok_or_else(|| invalid("scoped names must look like @scope/name"))?;
            if scope.is_empty() {
                return Err(invalid("empty scope"));
            }
            check_segment(scope).map_err(|r| invalid(r))?;
            rest
        }
        None => name,
    };

    if bare.is_empty() || bare.starts_with('.') {
        return Err(invalid("name must not be empty or start with '.'"));
    }
    check_segment(bare).map_err(|r| invalid(r))
}

fn check_segment(segment: &str) -> std::result::Result<(), &'static str> {
    if segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
    {
        Ok(())
    } else {
        Err("only alphanumerics, '-', '_', '.', and '~' are allowed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(content: &str) -> Result<LauncherConfig> {
        LauncherConfig::from_toml(content, Path::new("launcher.toml"))
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), LauncherConfig::default());
    }

    #[test]
    fn test_parse_full() {
        let config = parse(
            r#"
package = "@acme/deploy-kit"
package_manager = "pnpm"
dependency_dir = "vendor/modules"
override_path = "config/deploy.toml"
refresh_on_launch = true
lock_installs = false
"#,
        )
        .unwrap();

        assert_eq!(config.package, "@acme/deploy-kit");
        assert_eq!(config.package_manager, PackageManager::Pnpm);
        assert!(config.refresh_on_launch);
        assert!(!config.lock_installs);
        assert_eq!(
            config.package_dir(Path::new("/proj")),
            Path::new("/proj/vendor/modules/@acme/deploy-kit")
        );
        assert_eq!(
            config.override_file(Path::new("/proj")),
            Path::new("/proj/config/deploy.toml")
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = parse("packge = \"typo\"\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }), "got: {err:?}");
    }

    #[test]
    fn test_unknown_package_manager_rejected() {
        let err = parse("package_manager = \"maven\"\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }), "got: {err:?}");
    }

    #[rstest]
    #[case("package = \"\"")]
    #[case("package = \"bad name\"")]
    #[case("package = \"evil;rm\"")]
    #[case("package = \"@noslash\"")]
    #[case("package = \"@/name\"")]
    #[case("package = \".hidden\"")]
    #[case("dependency_dir = \"/abs\"")]
    #[case("dependency_dir = \"../outside\"")]
    #[case("override_path = \"lib/../../x.toml\"")]
    #[case("install_command = \"   \"")]
    fn test_invalid_values_rejected(#[case] content: &str) {
        let err = parse(content).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }), "got: {err:?}");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = LauncherConfig::load(tmp.path()).unwrap();
        assert_eq!(config, LauncherConfig::default());
    }

    #[test]
    fn test_load_reads_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(crate::CONFIG_FILENAME),
            "package = \"other-kit\"\n",
        )
        .unwrap();
        let config = LauncherConfig::load(tmp.path()).unwrap();
        assert_eq!(config.package, "other-kit");
    }

    #[rstest]
    #[case(PackageManager::Npm, &["install", "--save", "kit"])]
    #[case(PackageManager::Yarn, &["add", "kit"])]
    #[case(PackageManager::Pnpm, &["add", "kit"])]
    #[case(PackageManager::Bun, &["add", "kit"])]
    fn test_add_args(#[case] pm: PackageManager, #[case] expected: &[&str]) {
        assert_eq!(pm.add_args("kit"), expected);
    }

    #[test]
    fn test_update_args() {
        assert_eq!(PackageManager::Yarn.update_args("kit"), ["upgrade", "kit"]);
        assert_eq!(PackageManager::Npm.update_args("kit"), ["update", "kit"]);
    }
}
