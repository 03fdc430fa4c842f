//! External process execution.
//!
//! All child processes the launcher starts (package manager, extension
//! operations, help command) go through [`ProcessRunner`] so the bootstrap
//! sequence can be exercised without touching real package managers.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::Command;

/// A fully described child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute (looked up on PATH when not a path).
    pub program: PathBuf,
    /// Arguments, passed verbatim.
    pub args: Vec<OsString>,
    /// Working directory of the child.
    pub cwd: PathBuf,
    /// Variables added to the inherited environment.
    pub env: Vec<(String, OsString)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
            env: Vec::new(),
        }
    }

    /// Build a command that executes `cmd_str` through the system shell.
    ///
    /// - Unix: `sh -c "{cmd_str}"`
    /// - Windows: `cmd /C "{cmd_str}"`
    pub fn shell(cmd_str: &str, cwd: &Path) -> Self {
        #[cfg(windows)]
        let (program, flag) = ("cmd", "/C");
        #[cfg(not(windows))]
        let (program, flag) = ("sh", "-c");

        Self::new(program, cwd).arg(flag).arg(cmd_str)
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.cwd);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Exit status and captured streams of a finished child.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Exit code; `None` when the child was killed by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Spawns child processes and waits for them.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion with stdout and stderr captured.
    async fn capture(&self, cmd: &CommandSpec) -> std::io::Result<CapturedOutput>;

    /// Run to completion with stdio inherited; returns the exit code the
    /// launcher should propagate.
    async fn run(&self, cmd: &CommandSpec) -> std::io::Result<i32>;
}

/// [`ProcessRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRunner;

#[async_trait]
impl ProcessRunner for TokioRunner {
    async fn capture(&self, cmd: &CommandSpec) -> std::io::Result<CapturedOutput> {
        let output = cmd
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(CapturedOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    async fn run(&self, cmd: &CommandSpec) -> std::io::Result<i32> {
        let status = cmd
            .to_command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;
        Ok(exit_code(status))
    }
}

/// Map a child's status to a launcher exit code, shell style.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
