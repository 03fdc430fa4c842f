//! Launcher CLI
//!
//! `launcher <operation> [arg...]` installs the project's extension package on
//! demand and forwards the operation to it.

mod cli;
mod error;
mod report;

use clap::Parser;
use colored::Colorize;
use launcher_core::{Launcher, logging};

use cli::Cli;
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            1
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    // A second subscriber is the only failure mode; logging is optional.
    let _ = logging::init();

    let request = Cli::parse().into_request();
    let cwd = std::env::current_dir()?;
    tracing::debug!(cwd = %cwd.display(), ?request, "launcher started");

    let launcher = Launcher::discover(&cwd)?;
    let outcome = launcher.run(&request).await?;

    report::report(&outcome, &mut std::io::stdout(), &mut std::io::stderr())?;
    Ok(outcome.exit_code())
}
