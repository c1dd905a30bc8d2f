//! Process executor boundary
//!
//! `TshClient` never spawns processes directly. It goes through
//! [`CommandExecutor`], which has two modes: run and capture (version,
//! status, ls) and run attached to the caller's terminal (login, ssh).
//! Tests substitute [`crate::tsh::mock::MockExecutor`].

use std::io::Read;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::tsh::error::TshError;

/// Captured result of a non-interactive call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code(),
        }
    }
}

/// Runs external programs on behalf of the client
pub trait CommandExecutor: Send + Sync {
    /// Run to completion with stdout and stderr captured
    fn output(&self, program: &Path, args: &[String]) -> Result<CommandOutput, TshError>;

    /// Run with stdin, stdout and stderr attached to the caller's terminal
    ///
    /// Blocks until the program exits and returns its exit code.
    fn interactive(&self, program: &Path, args: &[String]) -> Result<Option<i32>, TshError>;
}

/// Executor backed by real child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    /// Upper bound for captured calls; `None` waits indefinitely
    timeout: Option<Duration>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Kill captured calls that run longer than `timeout`
    ///
    /// Interactive calls are never timed out.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn output_with_timeout(
        &self,
        mut cmd: Command,
        program: &Path,
        args: &[String],
        limit: Duration,
    ) -> Result<CommandOutput, TshError> {
        let mut child = cmd.spawn().map_err(|e| spawn_error(program, e))?;

        // Drained while waiting so a full pipe cannot stall the child
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_reader = thread::spawn(move || drain(stdout));
        let stderr_reader = thread::spawn(move || drain(stderr));

        let status = match child
            .wait_timeout(limit)
            .map_err(|e| spawn_error(program, e))?
        {
            Some(status) => status,
            None => {
                if let Err(e) = child.kill() {
                    tracing::warn!(error = %e, "Failed to kill timed out tsh process");
                }
                if let Err(e) = child.wait() {
                    tracing::warn!(error = %e, "Failed to reap timed out tsh process");
                }
                return Err(TshError::Timeout {
                    command: describe(program, args),
                    after: limit,
                });
            }
        };

        Ok(CommandOutput {
            stdout: stdout_reader.join().unwrap_or_default(),
            stderr: stderr_reader.join().unwrap_or_default(),
            code: status.code(),
        })
    }
}

impl CommandExecutor for ProcessExecutor {
    fn output(&self, program: &Path, args: &[String]) -> Result<CommandOutput, TshError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        match self.timeout {
            Some(limit) => self.output_with_timeout(cmd, program, args, limit),
            None => cmd
                .output()
                .map(CommandOutput::from)
                .map_err(|e| spawn_error(program, e)),
        }
    }

    fn interactive(&self, program: &Path, args: &[String]) -> Result<Option<i32>, TshError> {
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| spawn_error(program, e))?;
        Ok(status.code())
    }
}

fn drain(stream: Option<impl Read>) -> String {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        if let Err(e) = stream.read_to_end(&mut buf) {
            tracing::debug!(error = %e, "Failed to read child output");
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn spawn_error(program: &Path, source: std::io::Error) -> TshError {
    TshError::Spawn {
        program: program.display().to_string(),
        source,
    }
}

/// Human-readable command line for error messages and logs
pub fn describe(program: &Path, args: &[String]) -> String {
    if args.is_empty() {
        program.display().to_string()
    } else {
        format!("{} {}", program.display(), args.join(" "))
    }
}
