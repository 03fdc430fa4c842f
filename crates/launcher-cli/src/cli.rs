//! CLI argument parsing using clap derive
//!
//! The launcher defines no flags of its own: the first token is the
//! operation and everything after it belongs to the extension, hyphenated or
//! not. `--help` and `--version` are therefore disabled and reach the
//! extension like any other token. Tokens are kept as `OsString` so
//! arguments that are not valid UTF-8 are forwarded unchanged.

use std::ffi::OsString;

use clap::Parser;
use launcher_core::InvocationRequest;

/// Self-installing launcher for a project's extension package
#[derive(Parser, Debug)]
#[command(name = "launcher")]
#[command(about, long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Operation exposed by the extension package (`install` installs it
    /// first), followed by the arguments forwarded to it untouched
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub argv: Vec<OsString>,
}

impl Cli {
    pub fn into_request(self) -> InvocationRequest {
        InvocationRequest::from_args(self.argv)
    }
}
