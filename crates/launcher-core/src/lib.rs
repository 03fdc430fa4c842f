//! Bootstrap and dispatch engine for the self-installing extension launcher.
//!
//! The launcher checks whether an extension package is materialized in the
//! project's dependency directory, installs it through the project's package
//! manager when the user asks for `install`, loads the package's
//! `launcher_extension.toml` entry point together with an optional local
//! override file, and finally dispatches the requested operation.
//!
//! # Flow
//!
//! ```text
//! probe ──► (install) ──► load ──► dispatch
//! ```
//!
//! Every step reads and writes a single [`BootstrapContext`]; there is no
//! ambient state. [`Launcher::run`] drives the whole sequence once per process.

pub mod bootstrap;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod installer;
pub mod loader;
pub mod lock;
pub mod logging;
pub mod manifest;
pub mod probe;
pub mod request;
pub mod runner;

/// Filename of the entry-point manifest at the root of an extension package.
pub const MANIFEST_FILENAME: &str = "launcher_extension.toml";

/// Filename of the optional project configuration at the project root.
pub const CONFIG_FILENAME: &str = "launcher.toml";

/// The reserved operation that triggers installation when the package is absent.
pub const INSTALL_OPERATION: &str = "install";

/// Name of the launcher binary, used in user-facing instructions.
pub const LAUNCHER_BIN: &str = "launcher";

pub use bootstrap::{Launcher, Outcome};
pub use config::{LauncherConfig, PackageManager};
pub use context::{BootstrapContext, InstallationState};
pub use dispatcher::HelpOutput;
pub use error::{Error, Result};
pub use installer::InstallFailure;
pub use loader::{LoadedModule, OverrideModule};
pub use manifest::{ExtensionManifest, HelpCapability, Operation, ResolvedCommand};
pub use probe::ProbeOutcome;
pub use request::InvocationRequest;
pub use runner::{CapturedOutput, CommandSpec, ProcessRunner, TokioRunner};
