//! Command-line flow: configure, show status, or pick a node and connect

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, warn};

use crate::cli::{Cli, Mode, NodeSource};
use crate::config::{save_proxy, Config, ConfigError};
use crate::data::{CacheError, NodeCache};
use crate::tsh::{HostDirectory, ProcessExecutor, ProxyStatus, TshClient};
use crate::ui::{ConfigPrompt, FuzzyPicker, HostPicker, Prompter};
use crate::util::{self, detect_tsh, ToolStatus, TSH_INSTALL_INSTRUCTIONS};

/// One run of tpot against a single environment
pub struct App {
    config_path: PathBuf,
    cache_path: PathBuf,
    env: String,
    picker: Box<dyn HostPicker>,
    prompt: Box<dyn ConfigPrompt>,
}

impl App {
    /// Paths under the initialized data directory
    pub fn new(env: &str) -> Self {
        Self::in_dir(&util::data_dir(), env)
    }

    /// Terminal UI with files under `data_dir`
    pub fn in_dir(data_dir: &Path, env: &str) -> Self {
        Self {
            config_path: util::config_path_in(data_dir),
            cache_path: util::node_cache_path_in(data_dir, env),
            env: env.to_string(),
            picker: Box::new(FuzzyPicker::new()),
            prompt: Box::new(Prompter::new()),
        }
    }

    pub fn with_picker(mut self, picker: impl HostPicker + 'static) -> Self {
        self.picker = Box::new(picker);
        self
    }

    pub fn with_prompt(mut self, prompt: impl ConfigPrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    pub fn run(&mut self, cli: &Cli) -> Result<()> {
        match cli.mode() {
            Mode::Configure => self.configure(),
            Mode::Status => {
                let client = self.client(&self.load_config()?)?;
                let status = client.status()?;
                print_status(&mut io::stdout().lock(), &client, &status)?;
                Ok(())
            }
            Mode::Connect(source) => self.connect(cli, source),
        }
    }

    fn configure(&mut self) -> Result<()> {
        let existing = match Config::load_from(&self.config_path) {
            Ok(config) => config.proxies.get(&self.env).cloned(),
            Err(ConfigError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };

        let proxy = self
            .prompt
            .proxy_config(&self.env, existing.as_ref())
            .context("Failed to read proxy configuration")?;
        save_proxy(&self.config_path, &self.env, &proxy)?;
        info!(env = %self.env, path = %self.config_path.display(), "Saved proxy configuration");
        println!("Saved {} to {}", self.env, self.config_path.display());
        Ok(())
    }

    fn load_config(&self) -> Result<Config> {
        let config = Config::load_from(&self.config_path).map_err(|e| match e {
            ConfigError::NotFound(path) => anyhow!(
                "Config not found at {}\nRun `tpot {} -c` to add a proxy",
                path.display(),
                self.env
            ),
            e => e.into(),
        })?;
        if !config.proxies.contains_key(&self.env) {
            let envs = config.envs();
            if envs.is_empty() {
                bail!("Env {} not found, no envs configured", self.env);
            }
            bail!("Env {} not found, available: {}", self.env, envs.join(", "));
        }
        Ok(config)
    }

    fn client(&self, config: &Config) -> Result<TshClient> {
        let target = config.proxy(&self.env)?;
        let options = config.client_options();

        match detect_tsh(target.tsh_path.as_deref(), &options.default_binary) {
            ToolStatus::Available(path) => info!(tsh = %path.display(), "Using tsh"),
            ToolStatus::NotFound => bail!("tsh not found in PATH\n{TSH_INSTALL_INSTRUCTIONS}"),
            ToolStatus::ConfiguredPathInvalid(path) => bail!(
                "Configured tsh_path {} is not an executable file\n{TSH_INSTALL_INSTRUCTIONS}",
                path.display()
            ),
        }

        let executor = ProcessExecutor::new().with_timeout(config.command_timeout);
        Ok(TshClient::new(target, Arc::new(executor)).with_options(options))
    }

    fn connect(&mut self, cli: &Cli, source: NodeSource) -> Result<()> {
        let config = self.load_config()?;
        let mut client = self.client(&config)?;

        // Joined on drop so the write finishes even on early return
        let mut pending = PendingSave::default();
        let nodes = match source {
            NodeSource::Cache => self.cached_nodes()?,
            NodeSource::Refresh => {
                let nodes = client.list_hosts()?;
                pending.spawn(NodeCache::new(nodes.clone()), self.cache_path.clone());
                nodes
            }
            NodeSource::Append => {
                let fresh = client.list_hosts()?;
                let cache = NodeCache::append(&self.cache_path, fresh);
                let nodes = cache.items.clone();
                pending.spawn(cache, self.cache_path.clone());
                nodes
            }
        };
        client.set_directory(nodes);

        let login = cli
            .login
            .clone()
            .or_else(|| client.target().login.clone())
            .ok_or_else(|| {
                anyhow!(
                    "No remote login for {}; pass -l <user> or set login in the config",
                    self.env
                )
            })?;

        loop {
            let Some(hostname) = self.picker.pick(client.directory())? else {
                bail!("Pick at least one host to login");
            };
            match client.connect(&login, &hostname) {
                Err(e) if e.is_host_not_found() => {
                    eprintln!("{e}");
                    continue;
                }
                result => return result.map_err(Into::into),
            }
        }
    }

    fn cached_nodes(&self) -> Result<HostDirectory> {
        match NodeCache::load(&self.cache_path) {
            Ok(cache) => Ok(cache.items),
            Err(CacheError::NotFound(path)) => bail!(
                "No cached nodes at {}\nRun `tpot {} -r` to fetch the node list",
                path.display(),
                self.env
            ),
            Err(e) => Err(anyhow!(e).context(format!(
                "Failed to load nodes, try `tpot {} -r`",
                self.env
            ))),
        }
    }
}

/// Cache write running next to the interactive session
#[derive(Default)]
struct PendingSave(Option<JoinHandle<()>>);

impl PendingSave {
    fn spawn(&mut self, cache: NodeCache, path: PathBuf) {
        self.0 = Some(thread::spawn(move || save_cache(&cache, &path)));
    }
}

impl Drop for PendingSave {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take() {
            if handle.join().is_err() {
                warn!("Node cache writer panicked");
            }
        }
    }
}

fn save_cache(cache: &NodeCache, path: &Path) {
    match cache.save(path) {
        Ok(()) => info!(count = cache.items.len(), path = %path.display(), "Saved node cache"),
        Err(e) => warn!(error = %e, path = %path.display(), "Failed to save node cache"),
    }
}

fn print_status(out: &mut impl Write, client: &TshClient, status: &ProxyStatus) -> io::Result<()> {
    let proxy = client
        .target()
        .proxy_host()
        .unwrap_or_else(|_| client.target().address.clone());
    writeln!(out, "Proxy:        {proxy}")?;
    writeln!(out, "Logged in as: {}", status.logged_in_as)?;
    writeln!(out, "Roles:        {}", status.roles.join(", "))?;
    writeln!(out, "Logins:       {}", status.logins.join(", "))?;
    Ok(())
}
