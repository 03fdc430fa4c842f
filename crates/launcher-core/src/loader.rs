//! Module loading: turns an installed package into an operation table.
//!
//! The primary module is the package's `launcher_extension.toml`. A failure
//! to resolve it after the probe reported the package present means the
//! install is corrupted, and is fatal. The override module is an optional
//! project-local TOML file loaded alongside it; the launcher never dispatches
//! into it, it only hands its location to the extension.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::context::BootstrapContext;
use crate::error::{Error, Result};
use crate::manifest::{ExtensionManifest, HelpCapability, Operation};

/// In-memory handle to the loaded extension package.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    name: String,
    version: String,
    description: Option<String>,
    package_dir: PathBuf,
    operations: BTreeMap<String, Operation>,
    help: Option<HelpCapability>,
}

impl LoadedModule {
    /// Build the handle from a validated manifest.
    pub fn from_manifest(manifest: ExtensionManifest, package_dir: &Path) -> Self {
        let help = manifest.help.as_ref().and_then(|h| h.resolve(package_dir));
        Self {
            name: manifest.extension.name,
            version: manifest.extension.version,
            description: manifest.extension.description,
            package_dir: package_dir.to_path_buf(),
            operations: manifest.operations,
            help,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }

    /// Look up an operation by exact name.
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    /// All operations, sorted by name.
    pub fn operations(&self) -> impl Iterator<Item = (&str, &Operation)> {
        self.operations.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn help(&self) -> Option<&HelpCapability> {
        self.help.as_ref()
    }
}

/// Handle to the project's override module.
#[derive(Debug, Clone)]
pub struct OverrideModule {
    path: PathBuf,
    table: toml::Table,
}

impl OverrideModule {
    /// Load the override module at `path`, or `None` when there is no file.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::OverrideParse {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        let table = toml::from_str::<toml::Table>(&content)
            .map_err(|e| Error::OverrideParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(Some(Self {
            path: path.to_path_buf(),
            table,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &toml::Table {
        &self.table
    }
}

/// Resolve the primary module and the optional override into `ctx`.
pub fn load(ctx: &mut BootstrapContext) -> Result<()> {
    ctx.ensure_ready()?;

    let package_dir = ctx.package_dir();
    let manifest = ExtensionManifest::from_path(&package_dir.join(crate::MANIFEST_FILENAME))?;
    let module = LoadedModule::from_manifest(manifest, &package_dir);
    tracing::debug!(
        name = module.name(),
        version = module.version(),
        operations = module.operations.len(),
        "loaded extension module"
    );

    let overlay = OverrideModule::load(&ctx.config().override_file(ctx.root()))?;
    if let Some(ref overlay) = overlay {
        tracing::debug!(path = %overlay.path().display(), "loaded override module");
    }

    ctx.primary = Some(module);
    ctx.overlay = overlay;
    Ok(())
}
