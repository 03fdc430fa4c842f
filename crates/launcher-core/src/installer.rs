//! Extension installation through the project's package manager.
//!
//! Builds the package manager's add (or update) command for the configured
//! package and runs it with output captured. A failed install is returned as
//! an [`InstallFailure`] holding the captured streams so the caller can echo
//! them verbatim; it is never retried.

use std::fmt;
use std::path::Path;

use crate::config::LauncherConfig;
use crate::runner::{CapturedOutput, CommandSpec, ProcessRunner};

/// Everything needed to report a failed install to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallFailure {
    /// The command line that was attempted.
    pub command: String,
    /// Exit code; `None` when the child never ran or was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Why the child could not be started, with an install hint if known.
    pub spawn_error: Option<String>,
}

impl fmt::Display for InstallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref reason) = self.spawn_error {
            return write!(f, "failed to run '{}': {}", self.command, reason);
        }
        match self.exit_code {
            Some(code) => write!(f, "'{}' exited with code {}", self.command, code),
            None => write!(f, "'{}' was terminated by a signal", self.command),
        }
    }
}

/// The command that adds the package to the project.
pub fn install_command(config: &LauncherConfig, root: &Path) -> CommandSpec {
    match config.install_command {
        Some(ref custom) => CommandSpec::shell(custom, root),
        None => CommandSpec::new(config.package_manager.program(), root)
            .args(config.package_manager.add_args(&config.package)),
    }
}

/// The command that refreshes an already installed package.
pub fn refresh_command(config: &LauncherConfig, root: &Path) -> CommandSpec {
    match config.refresh_command {
        Some(ref custom) => CommandSpec::shell(custom, root),
        None => CommandSpec::new(config.package_manager.program(), root)
            .args(config.package_manager.update_args(&config.package)),
    }
}

/// Run the install command and wait for it to finish.
pub async fn install(
    runner: &dyn ProcessRunner,
    config: &LauncherConfig,
    root: &Path,
) -> Result<(), InstallFailure> {
    let cmd = install_command(config, root);
    tracing::info!(package = %config.package, command = %cmd, "installing extension package");
    execute(runner, config, &cmd).await?;
    tracing::info!(package = %config.package, "extension package installed");
    Ok(())
}

/// Run the refresh command. Failures are logged and otherwise ignored.
pub async fn refresh(runner: &dyn ProcessRunner, config: &LauncherConfig, root: &Path) {
    let cmd = refresh_command(config, root);
    tracing::debug!(package = %config.package, command = %cmd, "refreshing extension package");
    if let Err(failure) = execute(runner, config, &cmd).await {
        tracing::warn!(
            package = %config.package,
            stderr = %String::from_utf8_lossy(&failure.stderr).trim(),
            "package refresh failed, continuing with the installed copy: {failure}"
        );
    }
}

async fn execute(
    runner: &dyn ProcessRunner,
    config: &LauncherConfig,
    cmd: &CommandSpec,
) -> Result<(), InstallFailure> {
    match runner.capture(cmd).await {
        Ok(output) if output.success() => Ok(()),
        Ok(CapturedOutput {
            code,
            stdout,
            stderr,
        }) => Err(InstallFailure {
            command: cmd.to_string(),
            exit_code: code,
            stdout,
            stderr,
            spawn_error: None,
        }),
        Err(e) => {
            let mut reason = e.to_string();
            if e.kind() == std::io::ErrorKind::NotFound && config.install_command.is_none() {
                reason.push_str("\n  ");
                reason.push_str(config.package_manager.install_hint());
            }
            Err(InstallFailure {
                command: cmd.to_string(),
                exit_code: None,
                stdout: Vec::new(),
                stderr: Vec::new(),
                spawn_error: Some(reason),
            })
        }
    }
}
