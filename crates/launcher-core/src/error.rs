use std::path::PathBuf;

use crate::context::InstallationState;

/// Errors that can occur while bootstrapping or dispatching.
///
/// Installer failures are not represented here: they are an expected
/// terminal state and are reported through
/// [`Outcome::InstallFailed`](crate::Outcome::InstallFailed).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to parse `launcher.toml`.
    #[error("failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// `launcher.toml` parsed but holds an unusable value.
    #[error("invalid launcher configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The package directory exists but has no entry-point manifest.
    #[error(
        "extension manifest not found at {0}; the installed package looks corrupted, \
         remove it and run the install operation again"
    )]
    ManifestNotFound(PathBuf),

    /// Failed to parse the extension manifest TOML.
    #[error("failed to parse extension manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The manifest parsed but declares something unusable.
    #[error("invalid extension manifest '{name}': {reason}")]
    InvalidManifest { name: String, reason: String },

    /// Invalid semver version string in the manifest.
    #[error("invalid version '{version}': {source}")]
    InvalidVersion {
        version: String,
        source: semver::Error,
    },

    /// The override module exists but cannot be read or parsed.
    #[error("failed to load override module {path}: {reason}")]
    OverrideParse { path: PathBuf, reason: String },

    /// A step that needs an installed package ran in the wrong state.
    #[error("extension package is not ready (state: {state:?})")]
    NotReady { state: InstallationState },

    /// Illegal installation-state transition.
    #[error("invalid installation state transition {from:?} -> {to:?}")]
    InvalidTransition {
        from: InstallationState,
        to: InstallationState,
    },

    /// A recognized operation could not be started.
    #[error("failed to start operation '{operation}' ({program}): {source}")]
    OperationSpawn {
        operation: String,
        program: String,
        source: std::io::Error,
    },

    /// I/O error reading launcher files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
