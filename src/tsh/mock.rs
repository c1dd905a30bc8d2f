//! Scripted executor for deterministic testing
//!
//! Implements [`CommandExecutor`] without spawning processes. Responses are
//! scripted per tsh subcommand (the first argument) and every call is
//! captured for later verification.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use tpot::tsh::mock::MockExecutor;
//! use tpot::tsh::{AuthSelector, ProxyTarget, TshClient};
//!
//! let executor = MockExecutor::new().with_stdout("version", "Teleport v4.1.11 git:v4.1.11");
//! let target = ProxyTarget::new("https://proxy.example.com:3080", AuthSelector::User("alice".into()));
//! let client = TshClient::new(target, Arc::new(executor.clone()));
//!
//! assert_eq!(client.version().unwrap().to_string(), "v4.1.11");
//! assert_eq!(executor.calls()[0].args, vec!["version"]);
//! ```

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::tsh::error::TshError;
use crate::tsh::executor::{CommandExecutor, CommandOutput};

/// What a scripted call returns
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Result of a captured call
    Output(CommandOutput),
    /// Exit code of an interactive call
    Exit(Option<i32>),
    /// The binary could not be started
    SpawnFailure(String),
}

/// A call seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub interactive: bool,
}

impl RecordedCall {
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// Mock executor for testing
///
/// Several responses queued for the same subcommand are returned in order;
/// the last one repeats. Unscripted captured calls succeed with empty output
/// and unscripted interactive calls exit 0.
#[derive(Clone, Default)]
pub struct MockExecutor {
    responses: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a subcommand
    pub fn with_response(self, subcommand: &str, response: MockResponse) -> Self {
        self.responses
            .lock()
            .entry(subcommand.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Successful captured call printing `stdout`
    pub fn with_stdout(self, subcommand: &str, stdout: &str) -> Self {
        self.with_response(
            subcommand,
            MockResponse::Output(CommandOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                code: Some(0),
            }),
        )
    }

    /// Captured call with the given streams and exit code
    pub fn with_output(self, subcommand: &str, stdout: &str, stderr: &str, code: i32) -> Self {
        self.with_response(
            subcommand,
            MockResponse::Output(CommandOutput {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                code: Some(code),
            }),
        )
    }

    /// Interactive call exiting with `code`
    pub fn with_exit(self, subcommand: &str, code: i32) -> Self {
        self.with_response(subcommand, MockResponse::Exit(Some(code)))
    }

    /// Any call for this subcommand fails to spawn
    pub fn failing(self, subcommand: &str) -> Self {
        self.with_response(
            subcommand,
            MockResponse::SpawnFailure("mock-failure".to_string()),
        )
    }

    /// All captured calls in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Calls for one subcommand
    pub fn calls_for(&self, subcommand: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.subcommand() == Some(subcommand))
            .cloned()
            .collect()
    }

    fn record(&self, program: &Path, args: &[String], interactive: bool) -> Option<MockResponse> {
        self.calls.lock().push(RecordedCall {
            program: program.to_path_buf(),
            args: args.to_vec(),
            interactive,
        });

        let subcommand = args.first()?;
        let mut responses = self.responses.lock();
        let queue = responses.get_mut(subcommand)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

fn spawn_failure(program: &Path, message: String) -> TshError {
    TshError::Spawn {
        program: program.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, message),
    }
}

impl CommandExecutor for MockExecutor {
    fn output(&self, program: &Path, args: &[String]) -> Result<CommandOutput, TshError> {
        match self.record(program, args, false) {
            Some(MockResponse::Output(output)) => Ok(output),
            Some(MockResponse::Exit(code)) => Ok(CommandOutput {
                code,
                ..CommandOutput::default()
            }),
            Some(MockResponse::SpawnFailure(msg)) => Err(spawn_failure(program, msg)),
            None => Ok(CommandOutput {
                code: Some(0),
                ..CommandOutput::default()
            }),
        }
    }

    fn interactive(&self, program: &Path, args: &[String]) -> Result<Option<i32>, TshError> {
        match self.record(program, args, true) {
            Some(MockResponse::Exit(code)) => Ok(code),
            Some(MockResponse::Output(output)) => Ok(output.code),
            Some(MockResponse::SpawnFailure(msg)) => Err(spawn_failure(program, msg)),
            None => Ok(Some(0)),
        }
    }
}
