//! Orchestration of the tsh binary
//!
//! [`TshClient`] builds the invocation flags, runs tsh through a
//! [`CommandExecutor`] and interprets the output with the scanners in this
//! module. Every call blocks until its tsh process exits.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use url::Url;

use crate::tsh::error::TshError;
use crate::tsh::executor::{describe, CommandExecutor, CommandOutput};
use crate::tsh::nodes::{parse_directory, HostDirectory};
use crate::tsh::profile::{has_valid_session, parse_profiles, TimeZones};
use crate::tsh::status::ProxyStatus;
use crate::tsh::version::{Version, MIN_STATUS_VERSION};

/// Binary name used when the proxy has no `tsh_path` override
pub const DEFAULT_TSH_BINARY: &str = "tsh";

/// How tsh authenticates against the proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSelector {
    /// Named auth connector (`--auth=<connector>`)
    Connector(String),
    /// Local user (`--user=<name>`)
    User(String),
}

impl AuthSelector {
    pub fn flag(&self) -> String {
        match self {
            AuthSelector::Connector(connector) => format!("--auth={connector}"),
            AuthSelector::User(user) => format!("--user={user}"),
        }
    }
}

/// The proxy a client talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    /// Proxy URL, e.g. `https://teleport.example.com:3080`
    pub address: String,
    pub auth: AuthSelector,
    /// Overrides the default binary
    pub tsh_path: Option<PathBuf>,
    /// Default remote login for `connect`
    pub login: Option<String>,
}

impl ProxyTarget {
    pub fn new(address: impl Into<String>, auth: AuthSelector) -> Self {
        Self {
            address: address.into(),
            auth,
            tsh_path: None,
            login: None,
        }
    }

    pub fn with_tsh_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tsh_path = Some(path.into());
        self
    }

    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    /// Host part of the address with an explicit port kept (`host:3080`)
    pub fn proxy_host(&self) -> Result<String, TshError> {
        let invalid = |reason: String| TshError::InvalidProxyAddress {
            address: self.address.clone(),
            reason,
        };
        let url = Url::parse(&self.address).map_err(|e| invalid(e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?;
        Ok(match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        })
    }
}

/// Per-client settings with documented defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Binary used when the target has no override (default `tsh`)
    pub default_binary: PathBuf,
    /// Oldest tsh accepted by [`TshClient::status`] (default v2.6.1)
    pub min_version: Version,
    /// Zone abbreviations accepted in `Valid until` lines
    pub time_zones: TimeZones,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            default_binary: PathBuf::from(DEFAULT_TSH_BINARY),
            min_version: MIN_STATUS_VERSION,
            time_zones: TimeZones::default(),
        }
    }
}

/// Client for one proxy
pub struct TshClient {
    target: ProxyTarget,
    options: ClientOptions,
    executor: Arc<dyn CommandExecutor>,
    /// Node list used to resolve hostnames in [`TshClient::connect`]
    directory: HostDirectory,
}

impl TshClient {
    pub fn new(target: ProxyTarget, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            target,
            options: ClientOptions::default(),
            executor,
            directory: HostDirectory::new(),
        }
    }

    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_directory(mut self, directory: HostDirectory) -> Self {
        self.directory = directory;
        self
    }

    pub fn target(&self) -> &ProxyTarget {
        &self.target
    }

    pub fn directory(&self) -> &HostDirectory {
        &self.directory
    }

    pub fn set_directory(&mut self, directory: HostDirectory) {
        self.directory = directory;
    }

    /// The tsh binary this client invokes
    pub fn binary(&self) -> PathBuf {
        self.target
            .tsh_path
            .clone()
            .unwrap_or_else(|| self.options.default_binary.clone())
    }

    /// `--proxy=<host[:port]>`
    pub fn proxy_flag(&self) -> Result<String, TshError> {
        Ok(format!("--proxy={}", self.target.proxy_host()?))
    }

    /// `--auth=<connector>` or `--user=<name>`
    pub fn auth_flag(&self) -> String {
        self.target.auth.flag()
    }

    /// Whether `tsh status` reports a live session for this proxy
    ///
    /// Any failure of the probe, including stderr output, reads as logged out.
    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in_at(Utc::now())
    }

    pub fn is_logged_in_at(&self, now: DateTime<Utc>) -> bool {
        let args = vec!["status".to_string()];
        let output = match self.executor.output(&self.binary(), &args) {
            Ok(output) => output,
            Err(e) => {
                debug!(error = %e, "tsh status failed, assuming logged out");
                return false;
            }
        };
        if !output.success() || !output.stderr.is_empty() {
            debug!(stderr = %output.stderr, code = ?output.code, "tsh status reported an error, assuming logged out");
            return false;
        }

        let profiles = parse_profiles(&output.stdout, &self.options.time_zones);
        has_valid_session(&profiles, &self.target.address, now)
    }

    /// Run `tsh login` unless a valid session already exists
    ///
    /// The login flow is interactive (password, browser, OTP prompts) and its
    /// output goes straight to the terminal.
    pub fn ensure_logged_in(&self) -> Result<(), TshError> {
        if self.is_logged_in() {
            debug!(proxy = %self.target.address, "Session still valid, skipping login");
            return Ok(());
        }

        info!(proxy = %self.target.address, "No valid session, running tsh login");
        let args = self.session_args("login")?;
        self.run_interactive(&args)
    }

    /// Log in if needed, then list the nodes behind the proxy
    pub fn list_hosts(&self) -> Result<HostDirectory, TshError> {
        self.ensure_logged_in()?;

        let args = vec!["ls".to_string(), self.proxy_flag()?];
        let output = self.capture(&args)?;
        let directory = parse_directory(&output.stdout);
        info!(count = directory.len(), "Listed nodes");
        Ok(directory)
    }

    /// [`TshClient::list_hosts`] and keep the result for [`TshClient::connect`]
    pub fn refresh_directory(&mut self) -> Result<&HostDirectory, TshError> {
        self.directory = self.list_hosts()?;
        Ok(&self.directory)
    }

    /// Version reported by `tsh version`
    pub fn version(&self) -> Result<Version, TshError> {
        let args = vec!["version".to_string()];
        let output = self.capture(&args)?;
        let stdout = self.require_stdout(output, &args)?;
        Version::parse_banner(&stdout)
    }

    /// Identity, roles and logins of the session on this proxy
    ///
    /// Fails with [`TshError::UnsupportedVersion`] on a tsh older than
    /// [`ClientOptions::min_version`].
    pub fn status(&self) -> Result<ProxyStatus, TshError> {
        let version = self.version()?;
        if !self.options.min_version.is_supported(&version) {
            return Err(TshError::UnsupportedVersion {
                found: version,
                minimum: self.options.min_version,
            });
        }

        let args = vec!["status".to_string(), self.proxy_flag()?];
        let output = self.capture(&args)?;
        let stdout = self.require_stdout(output, &args)?;
        Ok(ProxyStatus::parse(&stdout))
    }

    /// Open an interactive `tsh ssh` session as `username` on `hostname`
    ///
    /// The hostname is resolved through the loaded node list. Blocks until
    /// the remote session ends.
    pub fn connect(&self, username: &str, hostname: &str) -> Result<(), TshError> {
        let address = self
            .directory
            .lookup_address(hostname)
            .ok_or_else(|| TshError::HostNotFound(hostname.to_string()))?
            .to_string();

        let mut args = self.session_args("ssh")?;
        args.extend(["-l".to_string(), username.to_string(), address]);
        info!(host = %hostname, login = %username, "Connecting");
        self.run_interactive(&args)
    }

    fn session_args(&self, subcommand: &str) -> Result<Vec<String>, TshError> {
        Ok(vec![
            subcommand.to_string(),
            self.proxy_flag()?,
            self.auth_flag(),
        ])
    }

    /// Captured call; non-zero exit or any stderr output is a failure
    fn capture(&self, args: &[String]) -> Result<CommandOutput, TshError> {
        let binary = self.binary();
        debug!(command = %describe(&binary, args), "Running tsh");

        let output = self.executor.output(&binary, args)?;
        if !output.success() || !output.stderr.is_empty() {
            return Err(TshError::CommandFailed {
                command: describe(&binary, args),
                code: output.code,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }

    fn require_stdout(&self, output: CommandOutput, args: &[String]) -> Result<String, TshError> {
        if output.stdout.trim().is_empty() {
            return Err(TshError::EmptyOutput {
                command: describe(&self.binary(), args),
            });
        }
        Ok(output.stdout)
    }

    fn run_interactive(&self, args: &[String]) -> Result<(), TshError> {
        let binary = self.binary();
        debug!(command = %describe(&binary, args), "Running tsh interactively");

        match self.executor.interactive(&binary, args)? {
            Some(0) => Ok(()),
            code => Err(TshError::CommandFailed {
                command: describe(&binary, args),
                code,
                stderr: String::new(),
            }),
        }
    }
}
