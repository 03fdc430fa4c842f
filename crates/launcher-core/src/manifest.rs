//! Extension manifest parsing for `launcher_extension.toml` files.
//!
//! The manifest is an extension package's entry point: it names the package
//! and maps each operation the launcher may dispatch to the command that
//! implements it. The canonical filename is
//! [`MANIFEST_FILENAME`](crate::MANIFEST_FILENAME).
//!
//! # Example TOML
//!
//! ```toml
//! [extension]
//! name = "bubblebot"
//! version = "1.4.0"
//! description = "Deploy bots from a repository"
//!
//! [operations.install]
//! command = "bin/install.js"
//! interpreter = "node"
//! description = "Set up bubblebot in this project"
//!
//! [operations.publish]
//! command = "bin/publish.js --verbose"
//! interpreter = "node"
//!
//! [help]
//! command = "bin/help.js"
//! interpreter = "node"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Complete extension manifest loaded from `launcher_extension.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtensionManifest {
    /// Core extension metadata.
    pub extension: ExtensionMeta,
    /// Operations the launcher may dispatch, keyed by operation name.
    #[serde(default)]
    pub operations: BTreeMap<String, Operation>,
    /// How the extension prints its own help.
    #[serde(default)]
    pub help: Option<HelpEntry>,
}

/// Basic metadata about an extension.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionMeta {
    /// Extension name (e.g., "bubblebot").
    pub name: String,
    /// Semver version string.
    pub version: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
}

/// One dispatchable operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Operation {
    /// Script path relative to the package root, optionally followed by
    /// fixed leading arguments.
    pub command: String,
    /// Interpreter the script is run with (e.g., "node"), looked up on PATH.
    #[serde(default)]
    pub interpreter: Option<String>,
    /// One-line summary shown in usage output.
    #[serde(default)]
    pub description: Option<String>,
}

/// `[help]` table: either literal text or a command to run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HelpEntry {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub interpreter: Option<String>,
}

/// A resolved command with absolute program path and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    /// Program to execute.
    pub program: PathBuf,
    /// Fixed arguments that precede any forwarded arguments.
    pub args: Vec<String>,
}

/// The extension's help capability after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpCapability {
    Text(String),
    Command(ResolvedCommand),
}

impl Operation {
    /// Resolve against the package directory.
    pub fn resolve(&self, package_dir: &Path) -> ResolvedCommand {
        resolve_command(package_dir, &self.command, self.interpreter.as_deref())
    }
}

impl HelpEntry {
    /// Resolve against the package directory. Assumes a validated manifest.
    pub fn resolve(&self, package_dir: &Path) -> Option<HelpCapability> {
        match (&self.text, &self.command) {
            (Some(text), _) => Some(HelpCapability::Text(text.clone())),
            (None, Some(command)) => Some(HelpCapability::Command(resolve_command(
                package_dir,
                command,
                self.interpreter.as_deref(),
            ))),
            (None, None) => None,
        }
    }
}

/// Split `command` into script and fixed arguments and anchor the script in
/// `package_dir`.
///
/// `"bin/publish.js --verbose"` with interpreter `node` becomes program
/// `node` with args `[<package_dir>/bin/publish.js, --verbose]`; without an
/// interpreter the script itself is the program.
fn resolve_command(package_dir: &Path, command: &str, interpreter: Option<&str>) -> ResolvedCommand {
    let parts: Vec<&str> = command.split_whitespace().collect();
    let (script, args): (&str, Vec<String>) = match parts.split_first() {
        Some((first, rest)) => (*first, rest.iter().map(|s| s.to_string()).collect()),
        None => (command, Vec::new()),
    };

    let script_path = Path::new(script);

    // Operations must stay inside the package.
    let resolved_script = if script_path.has_root() {
        tracing::warn!(
            "Extension operation uses absolute path {:?}, resolving it inside the package",
            script
        );
        let relative = script.trim_start_matches('/').trim_start_matches('\\');
        package_dir.join(relative)
    } else {
        package_dir.join(script_path)
    };

    match interpreter {
        Some(interpreter) => ResolvedCommand {
            program: PathBuf::from(interpreter),
            args: std::iter::once(resolved_script.to_string_lossy().into_owned())
                .chain(args)
                .collect(),
        },
        None => ResolvedCommand {
            program: resolved_script,
            args,
        },
    }
}

impl ExtensionManifest {
    /// Parse an extension manifest from a TOML string.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self> {
        let manifest: Self = toml::from_str(content).map_err(|source| Error::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read and parse an extension manifest from a file path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ManifestNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(Error::Io(e)),
        };
        Self::from_toml(&content, path)
    }

    /// Validate the manifest fields.
    fn validate(&self) -> Result<()> {
        let name = &self.extension.name;
        let invalid = |reason: String| Error::InvalidManifest {
            name: name.clone(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("extension name must not be empty".to_string()));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid(
                "extension name must contain only alphanumeric characters, '-', '_', or '.'"
                    .to_string(),
            ));
        }

        semver::Version::parse(&self.extension.version).map_err(|e| Error::InvalidVersion {
            version: self.extension.version.clone(),
            source: e,
        })?;

        for (op_name, op) in &self.operations {
            if op_name.is_empty() || op_name.chars().any(char::is_whitespace) {
                return Err(invalid(format!(
                    "operation name {op_name:?} must be non-empty and contain no whitespace"
                )));
            }
            if op.command.trim().is_empty() {
                return Err(invalid(format!("operation '{op_name}' has an empty command")));
            }
            if op.interpreter.as_deref().is_some_and(|i| i.trim().is_empty()) {
                return Err(invalid(format!(
                    "operation '{op_name}' has an empty interpreter"
                )));
            }
        }

        if let Some(ref help) = self.help {
            match (&help.text, &help.command) {
                (Some(_), Some(_)) => {
                    return Err(invalid(
                        "[help] must declare either text or command, not both".to_string(),
                    ));
                }
                (None, None) => {
                    return Err(invalid("[help] must declare text or command".to_string()));
                }
                (None, Some(command)) if command.trim().is_empty() => {
                    return Err(invalid("[help] command must not be empty".to_string()));
                }
                _ => {}
            }
        }

        Ok(())
    }
}
