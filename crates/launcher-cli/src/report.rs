//! User-facing rendering of bootstrap outcomes.

use std::io::Write;

use colored::Colorize;
use launcher_core::{HelpOutput, INSTALL_OPERATION, InstallFailure, LAUNCHER_BIN, Outcome};

/// Print whatever the user should see for `outcome`.
///
/// Dispatched operations and help commands already wrote to the terminal
/// themselves, so they produce nothing here.
pub fn report(outcome: &Outcome, out: &mut impl Write, err: &mut impl Write) -> std::io::Result<()> {
    match outcome {
        Outcome::Dispatched { .. } | Outcome::Help(HelpOutput::Ran) => Ok(()),
        Outcome::Help(HelpOutput::Text(text)) => {
            out.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                writeln!(out)?;
            }
            out.flush()
        }
        Outcome::NotInstalled { package } => {
            writeln!(err, "{} is not installed in this project.", package.cyan())?;
            writeln!(
                err,
                "Run {} to install it.",
                format!("'{LAUNCHER_BIN} {INSTALL_OPERATION}'").bold()
            )
        }
        Outcome::InstallFailed(failure) => install_failed(failure, out, err),
    }
}

/// Echo the installer's captured streams verbatim, then say what failed.
fn install_failed(
    failure: &InstallFailure,
    out: &mut impl Write,
    err: &mut impl Write,
) -> std::io::Result<()> {
    out.write_all(&failure.stdout)?;
    out.flush()?;
    err.write_all(&failure.stderr)?;
    if !failure.stderr.is_empty() && !failure.stderr.ends_with(b"\n") {
        writeln!(err)?;
    }
    writeln!(err, "{}: install failed: {}", "error".red().bold(), failure)
}
