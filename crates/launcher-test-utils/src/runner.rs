//! [`ScriptedRunner`]: a [`ProcessRunner`] that never spawns anything.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use launcher_core::{CapturedOutput, CommandSpec, ProcessRunner};

use crate::project::materialize_package;

/// What a captured (package manager) command should do.
#[derive(Debug, Clone)]
enum CaptureScript {
    /// Exit 0 after materializing the package with this manifest.
    Install { package_dir: PathBuf, manifest: String },
    /// Exit with `code`, emitting the given streams.
    Fail { code: i32, stdout: String, stderr: String },
    /// Fail to spawn with `NotFound`.
    Missing,
    /// Exit 0 without touching the filesystem.
    Succeed,
}

/// Records every command and answers with scripted results.
///
/// Captured commands (installs and refreshes) follow the capture script;
/// inherited-stdio commands (operations and help) return `run_exit_code`.
#[derive(Debug)]
pub struct ScriptedRunner {
    script: CaptureScript,
    run_exit_code: i32,
    captured: Mutex<Vec<CommandSpec>>,
    ran: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    fn with_script(script: CaptureScript) -> Self {
        Self {
            script,
            run_exit_code: 0,
            captured: Mutex::new(Vec::new()),
            ran: Mutex::new(Vec::new()),
        }
    }

    /// Package manager that succeeds and materializes the package.
    pub fn installing(package_dir: &Path, manifest: &str) -> Self {
        Self::with_script(CaptureScript::Install {
            package_dir: package_dir.to_path_buf(),
            manifest: manifest.to_string(),
        })
    }

    /// Package manager that exits with `code` and the given output.
    pub fn failing(code: i32, stdout: &str, stderr: &str) -> Self {
        Self::with_script(CaptureScript::Fail {
            code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        })
    }

    /// Package manager missing from PATH.
    pub fn missing() -> Self {
        Self::with_script(CaptureScript::Missing)
    }

    /// Package manager that succeeds without side effects.
    pub fn succeeding() -> Self {
        Self::with_script(CaptureScript::Succeed)
    }

    /// Exit code returned for every dispatched command.
    pub fn with_run_exit_code(mut self, code: i32) -> Self {
        self.run_exit_code = code;
        self
    }

    /// Commands run with captured output, in order.
    pub fn captured(&self) -> Vec<CommandSpec> {
        self.captured.lock().unwrap().clone()
    }

    /// Commands run with inherited stdio, in order.
    pub fn ran(&self) -> Vec<CommandSpec> {
        self.ran.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn capture(&self, cmd: &CommandSpec) -> std::io::Result<CapturedOutput> {
        self.captured.lock().unwrap().push(cmd.clone());
        match &self.script {
            CaptureScript::Install {
                package_dir,
                manifest,
            } => {
                materialize_package(package_dir, manifest);
                Ok(CapturedOutput {
                    code: Some(0),
                    ..CapturedOutput::default()
                })
            }
            CaptureScript::Fail {
                code,
                stdout,
                stderr,
            } => Ok(CapturedOutput {
                code: Some(*code),
                stdout: stdout.as_bytes().to_vec(),
                stderr: stderr.as_bytes().to_vec(),
            }),
            CaptureScript::Missing => Err(std::io::Error::from(std::io::ErrorKind::NotFound)),
            CaptureScript::Succeed => Ok(CapturedOutput {
                code: Some(0),
                ..CapturedOutput::default()
            }),
        }
    }

    async fn run(&self, cmd: &CommandSpec) -> std::io::Result<i32> {
        self.ran.lock().unwrap().push(cmd.clone());
        Ok(self.run_exit_code)
    }
}
