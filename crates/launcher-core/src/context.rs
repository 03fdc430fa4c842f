//! The single value threaded through probe, install, load, and dispatch.

use std::path::{Path, PathBuf};

use crate::config::LauncherConfig;
use crate::error::{Error, Result};
use crate::loader::{LoadedModule, OverrideModule};

/// Where the extension package stands during one launcher run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationState {
    /// Found in the dependency directory at startup.
    Present,
    /// Not found at startup.
    Absent,
    /// The package manager is running.
    Installing,
    /// The package manager reported success.
    Installed,
    /// The package manager failed; terminal.
    Failed,
}

impl InstallationState {
    /// Whether the package may be loaded and dispatched into.
    pub fn can_dispatch(self) -> bool {
        matches!(self, Self::Present | Self::Installed)
    }

    fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Absent, Self::Installing)
                | (Self::Installing, Self::Installed)
                | (Self::Installing, Self::Failed)
        )
    }
}

/// Bootstrap state for one invocation.
///
/// Owns the installation state and the loaded module handles. Each stage of
/// the bootstrap takes it by reference; nothing is stored globally.
#[derive(Debug)]
pub struct BootstrapContext {
    root: PathBuf,
    config: LauncherConfig,
    state: InstallationState,
    pub(crate) primary: Option<LoadedModule>,
    pub(crate) overlay: Option<OverrideModule>,
}

impl BootstrapContext {
    /// Create a context whose initial state comes from the probe.
    pub fn new(root: &Path, config: LauncherConfig, present: bool) -> Self {
        let state = if present {
            InstallationState::Present
        } else {
            InstallationState::Absent
        };
        tracing::debug!(?state, "bootstrap context created");
        Self {
            root: root.to_path_buf(),
            config,
            state,
            primary: None,
            overlay: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn state(&self) -> InstallationState {
        self.state
    }

    /// The extension package's location in the dependency directory.
    pub fn package_dir(&self) -> PathBuf {
        self.config.package_dir(&self.root)
    }

    /// The loaded extension package, once the loader has run.
    pub fn primary(&self) -> Option<&LoadedModule> {
        self.primary.as_ref()
    }

    /// The loaded override module, if the project has one.
    pub fn overlay(&self) -> Option<&OverrideModule> {
        self.overlay.as_ref()
    }

    /// Move to `next`, rejecting transitions the bootstrap never makes.
    pub fn transition(&mut self, next: InstallationState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(from = ?self.state, to = ?next, "installation state transition");
        self.state = next;
        Ok(())
    }

    /// Fail with [`Error::NotReady`] unless dispatch is allowed.
    pub(crate) fn ensure_ready(&self) -> Result<()> {
        if self.state.can_dispatch() {
            Ok(())
        } else {
            Err(Error::NotReady { state: self.state })
        }
    }
}
