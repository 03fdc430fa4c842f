//! Command dispatch into the loaded extension.
//!
//! A recognized operation is spawned with the caller's arguments appended
//! verbatim and its exit code becomes the launcher's. Anything else, including
//! no operation at all, falls back to help and is not an error.

use std::fmt::Write as _;

use crate::context::BootstrapContext;
use crate::error::{Error, Result};
use crate::loader::LoadedModule;
use crate::manifest::{HelpCapability, ResolvedCommand};
use crate::request::InvocationRequest;
use crate::runner::{CommandSpec, ProcessRunner};

/// Environment variable carrying the project root to operations.
pub const ENV_PROJECT_ROOT: &str = "LAUNCHER_PROJECT_ROOT";
/// Environment variable carrying the package name to operations.
pub const ENV_PACKAGE: &str = "LAUNCHER_PACKAGE";
/// Environment variable carrying the package directory to operations.
pub const ENV_PACKAGE_DIR: &str = "LAUNCHER_PACKAGE_DIR";
/// Environment variable carrying the override module path, when loaded.
pub const ENV_OVERRIDE: &str = "LAUNCHER_OVERRIDE";

/// What the help fallback produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpOutput {
    /// Text for the caller to print: the extension's own or built-in usage.
    Text(String),
    /// The extension's help command already ran with inherited stdio.
    Ran,
}

/// Result of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The operation ran and exited with `exit_code`.
    Invoked { operation: String, exit_code: i32 },
    /// No matching operation; help was produced instead.
    Help(HelpOutput),
}

/// Resolve the request against the loaded module and act on it.
pub async fn dispatch(
    ctx: &BootstrapContext,
    request: &InvocationRequest,
    runner: &dyn ProcessRunner,
) -> Result<Dispatch> {
    ctx.ensure_ready()?;
    let module = ctx.primary().ok_or(Error::NotReady { state: ctx.state() })?;

    let Some((name, operation)) = request
        .operation()
        .and_then(|name| module.operation(name).map(|op| (name, op)))
    else {
        tracing::debug!(operation = ?request.operation(), "no matching operation, showing help");
        return Ok(Dispatch::Help(help(ctx, module, runner).await));
    };

    let resolved = operation.resolve(module.package_dir());
    let cmd = command_for(ctx, module, &resolved).args(request.args().iter().cloned());
    tracing::debug!(operation = name, command = %cmd, "dispatching");

    let exit_code = runner
        .run(&cmd)
        .await
        .map_err(|source| Error::OperationSpawn {
            operation: name.to_string(),
            program: resolved.program.display().to_string(),
            source,
        })?;

    Ok(Dispatch::Invoked {
        operation: name.to_string(),
        exit_code,
    })
}

/// Run or render the module's help; fall back to built-in usage.
async fn help(
    ctx: &BootstrapContext,
    module: &LoadedModule,
    runner: &dyn ProcessRunner,
) -> HelpOutput {
    match module.help() {
        Some(HelpCapability::Text(text)) => HelpOutput::Text(text.clone()),
        Some(HelpCapability::Command(resolved)) => {
            let cmd = command_for(ctx, module, resolved);
            match runner.run(&cmd).await {
                Ok(code) => {
                    if code != 0 {
                        tracing::debug!(code, "extension help command exited non-zero");
                    }
                    HelpOutput::Ran
                }
                Err(e) => {
                    tracing::warn!(command = %cmd, error = %e, "extension help command failed to start");
                    HelpOutput::Text(usage(module))
                }
            }
        }
        None => HelpOutput::Text(usage(module)),
    }
}

/// Built-in usage listing the module's operations.
pub fn usage(module: &LoadedModule) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} {}", module.name(), module.version());
    if let Some(description) = module.description() {
        let _ = write!(out, " - {description}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out);
    let _ = writeln!(out, "Usage: {} <operation> [args...]", crate::LAUNCHER_BIN);
    let _ = writeln!(out);

    let ops: Vec<_> = module.operations().collect();
    if ops.is_empty() {
        let _ = writeln!(out, "This extension exposes no operations.");
        return out;
    }

    let width = ops.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let _ = writeln!(out, "Operations:");
    for (name, op) in ops {
        match op.description.as_deref() {
            Some(description) => {
                let _ = writeln!(out, "  {name:<width$}  {description}");
            }
            None => {
                let _ = writeln!(out, "  {name}");
            }
        }
    }
    out
}

fn command_for(
    ctx: &BootstrapContext,
    module: &LoadedModule,
    resolved: &ResolvedCommand,
) -> CommandSpec {
    let mut cmd = CommandSpec::new(&resolved.program, ctx.root())
        .args(resolved.args.iter().cloned())
        .env(ENV_PROJECT_ROOT, ctx.root())
        .env(ENV_PACKAGE, module.name())
        .env(ENV_PACKAGE_DIR, module.package_dir());
    if let Some(overlay) = ctx.overlay() {
        cmd = cmd.env(ENV_OVERRIDE, overlay.path());
    }
    cmd
}
