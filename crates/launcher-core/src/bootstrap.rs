//! The bootstrap-and-dispatch sequence.
//!
//! ```text
//! Start ─► Probing ─┬─ present ─► Present ───────────────────────┐
//!                   └─ absent ──► Absent ─┬─ op != install ─► NotInstalled
//!                                         └─ op == install ─► Installing
//!                                              ├─ failure ─► Failed ─► InstallFailed
//!                                              └─ success ─► Installed ┤
//!                                                                      ▼
//!                                          load ─► dispatch ─► Dispatched | Help
//! ```

use std::path::{Path, PathBuf};

use crate::config::LauncherConfig;
use crate::context::{BootstrapContext, InstallationState};
use crate::dispatcher::{self, Dispatch, HelpOutput};
use crate::error::Result;
use crate::installer::{self, InstallFailure};
use crate::loader;
use crate::lock::InstallLock;
use crate::probe::probe;
use crate::request::InvocationRequest;
use crate::runner::{ProcessRunner, TokioRunner};

/// How a launcher run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A recognized operation ran to completion.
    Dispatched { operation: String, exit_code: i32 },
    /// The operation was missing or unknown; help was produced.
    Help(HelpOutput),
    /// The package is absent and the user did not ask to install it.
    NotInstalled { package: String },
    /// The package manager failed; nothing was loaded or dispatched.
    InstallFailed(InstallFailure),
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Dispatched { exit_code, .. } => *exit_code,
            Self::Help(_) => 0,
            Self::NotInstalled { .. } | Self::InstallFailed(_) => 1,
        }
    }
}

/// Drives one invocation from probe to dispatch.
#[derive(Debug)]
pub struct Launcher<R = TokioRunner> {
    root: PathBuf,
    config: LauncherConfig,
    runner: R,
}

impl Launcher<TokioRunner> {
    /// Launcher for the project at `root`, configured from its `launcher.toml`.
    pub fn discover(root: &Path) -> Result<Self> {
        let config = LauncherConfig::load(root)?;
        Ok(Self::new(root, config, TokioRunner))
    }
}

impl<R: ProcessRunner> Launcher<R> {
    pub fn new(root: &Path, config: LauncherConfig, runner: R) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
            runner,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run the whole sequence once.
    ///
    /// Install failures and the not-installed case are outcomes, not errors.
    /// `Err` means the installed package could not be resolved or a
    /// recognized operation could not be started.
    pub async fn run(&self, request: &InvocationRequest) -> Result<Outcome> {
        let package_dir = self.config.package_dir(&self.root);
        let present = probe(&package_dir).is_present();
        let mut ctx = BootstrapContext::new(&self.root, self.config.clone(), present);

        if present {
            if self.config.refresh_on_launch {
                installer::refresh(&self.runner, &self.config, &self.root).await;
            }
        } else if !request.is_install() {
            tracing::debug!(operation = ?request.operation(), "package absent, not installing");
            return Ok(Outcome::NotInstalled {
                package: self.config.package.clone(),
            });
        } else if let Some(failure) = self.install(&mut ctx).await? {
            return Ok(Outcome::InstallFailed(failure));
        }

        loader::load(&mut ctx)?;

        let outcome = match dispatcher::dispatch(&ctx, request, &self.runner).await? {
            Dispatch::Invoked {
                operation,
                exit_code,
            } => Outcome::Dispatched {
                operation,
                exit_code,
            },
            Dispatch::Help(help) => Outcome::Help(help),
        };
        Ok(outcome)
    }

    /// `Absent → Installing → Installed | Failed`. Returns the failure, if any.
    async fn install(&self, ctx: &mut BootstrapContext) -> Result<Option<InstallFailure>> {
        ctx.transition(InstallationState::Installing)?;

        let lock = if self.config.lock_installs {
            match InstallLock::acquire_async(&self.root).await {
                Ok(lock) => Some(lock),
                Err(e) => {
                    ctx.transition(InstallationState::Failed)?;
                    return Err(e);
                }
            }
        } else {
            None
        };

        if lock.is_some() && probe(&ctx.package_dir()).is_present() {
            tracing::info!(
                package = %self.config.package,
                "package was installed by a concurrent launcher"
            );
            ctx.transition(InstallationState::Installed)?;
            return Ok(None);
        }

        let result = installer::install(&self.runner, &self.config, &self.root).await;
        drop(lock);

        match result {
            Ok(()) => {
                ctx.transition(InstallationState::Installed)?;
                Ok(None)
            }
            Err(failure) => {
                ctx.transition(InstallationState::Failed)?;
                Ok(Some(failure))
            }
        }
    }
}
