use std::time::Duration;

use thiserror::Error;

use crate::tsh::version::Version;

#[derive(Error, Debug)]
pub enum TshError {
    #[error("Failed to parse tsh output: {0}")]
    Parse(String),

    #[error("Unsupported tsh version {found}, need at least {minimum}")]
    UnsupportedVersion { found: Version, minimum: Version },

    /// The process exited non-zero or wrote to stderr on a captured call
    #[error("`{command}` failed{}", failure_detail(.code, .stderr))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`{command}` produced no output")]
    EmptyOutput { command: String },

    #[error("Host not found in the node list: {0}")]
    HostNotFound(String),

    #[error("Invalid proxy address {address}: {reason}")]
    InvalidProxyAddress { address: String, reason: String },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {after:?}")]
    Timeout { command: String, after: Duration },
}

fn failure_detail(code: &Option<i32>, stderr: &str) -> String {
    let mut detail = code
        .map(|c| format!(" with exit code {c}"))
        .unwrap_or_default();
    if !stderr.trim().is_empty() {
        detail.push_str(": ");
        detail.push_str(stderr.trim_end());
    }
    detail
}

impl TshError {
    /// Whether the caller should ask the user for another host
    pub fn is_host_not_found(&self) -> bool {
        matches!(self, TshError::HostNotFound(_))
    }
}
