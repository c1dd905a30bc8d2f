use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use toml_edit::{DocumentMut, Item, Table};

use crate::tsh::{AuthSelector, ClientOptions, ProxyTarget, TimeZones, Version};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config not found at {0}")]
    NotFound(PathBuf),
    #[error("Env {0} not found")]
    EnvNotFound(String),
    #[error("Env {0} has neither auth_connector nor user_name")]
    MissingAuth(String),
    #[error("Invalid min_version {value:?}: {reason}")]
    InvalidVersion { value: String, reason: String },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to edit config: {0}")]
    Edit(#[from] toml_edit::TomlError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One `[proxies.<env>]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProxyConfig {
    /// Proxy URL, e.g. `https://teleport.example.com:3080`
    pub address: String,
    #[serde(default)]
    pub user_name: Option<String>,
    /// Takes precedence over `user_name` when set
    #[serde(default)]
    pub auth_connector: Option<String>,
    #[serde(default)]
    pub tsh_path: Option<PathBuf>,
    /// Remote login used by `connect`
    #[serde(default)]
    pub login: Option<String>,
}

impl ProxyConfig {
    fn to_target(&self, env: &str) -> Result<ProxyTarget, ConfigError> {
        let auth = match (non_empty(&self.auth_connector), non_empty(&self.user_name)) {
            (Some(connector), _) => AuthSelector::Connector(connector.to_string()),
            (None, Some(user)) => AuthSelector::User(user.to_string()),
            (None, None) => return Err(ConfigError::MissingAuth(env.to_string())),
        };

        Ok(ProxyTarget {
            address: self.address.clone(),
            auth,
            tsh_path: self.tsh_path.clone(),
            login: non_empty(&self.login)
                .or(non_empty(&self.user_name))
                .map(String::from),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub min_version: Option<String>,
    pub time_zones: Option<Vec<String>>,
    pub command_timeout_secs: Option<u64>,
    #[serde(default)]
    pub proxies: BTreeMap<String, ProxyConfig>,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Proxies by environment name
    pub proxies: BTreeMap<String, ProxyConfig>,
    /// Oldest tsh accepted for `status`
    pub min_version: Version,
    /// Zone abbreviations accepted in `Valid until` lines (empty = any)
    pub time_zones: TimeZones,
    /// Timeout for captured tsh calls; `None` waits indefinitely
    pub command_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        let options = ClientOptions::default();
        Self {
            proxies: BTreeMap::new(),
            min_version: options.min_version,
            time_zones: options.time_zones,
            command_timeout: None,
        }
    }
}

impl Config {
    /// Load configuration from `path`, merging with defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let toml_config: TomlConfig = toml::from_str(contents)?;
        let mut config = Config {
            proxies: toml_config.proxies,
            ..Config::default()
        };

        if let Some(value) = toml_config.min_version {
            config.min_version = value
                .parse()
                .map_err(|e: crate::tsh::TshError| ConfigError::InvalidVersion {
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
        }
        if let Some(zones) = toml_config.time_zones {
            config.time_zones = TimeZones::new(zones);
        }
        // 0 keeps the unbounded wait
        config.command_timeout = toml_config
            .command_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(config)
    }

    /// Resolve an environment into a client target
    pub fn proxy(&self, env: &str) -> Result<ProxyTarget, ConfigError> {
        self.proxies
            .get(env)
            .ok_or_else(|| ConfigError::EnvNotFound(env.to_string()))?
            .to_target(env)
    }

    /// Environment names in sorted order
    pub fn envs(&self) -> Vec<&str> {
        self.proxies.keys().map(String::as_str).collect()
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            min_version: self.min_version,
            time_zones: self.time_zones.clone(),
            ..ClientOptions::default()
        }
    }
}

/// Add or replace `[proxies.<env>]` in the config file
///
/// Reads the existing file (if any) and writes it back with every other
/// section and comment preserved.
pub fn save_proxy(path: &Path, env: &str, proxy: &ProxyConfig) -> Result<(), ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    let mut doc: DocumentMut = contents.parse()?;

    // Ensure [proxies] section exists
    if !doc.contains_key("proxies") {
        let mut proxies = Table::new();
        proxies.set_implicit(true);
        doc["proxies"] = Item::Table(proxies);
    }

    let mut section = Table::new();
    section["address"] = toml_edit::value(proxy.address.as_str());
    if let Some(user) = non_empty(&proxy.user_name) {
        section["user_name"] = toml_edit::value(user);
    }
    if let Some(connector) = non_empty(&proxy.auth_connector) {
        section["auth_connector"] = toml_edit::value(connector);
    }
    if let Some(path) = &proxy.tsh_path {
        section["tsh_path"] = toml_edit::value(path.to_string_lossy().to_string());
    }
    if let Some(login) = non_empty(&proxy.login) {
        section["login"] = toml_edit::value(login);
    }
    doc["proxies"][env] = Item::Table(section);

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, doc.to_string())?;

    tracing::info!(env, path = %path.display(), "Saved proxy config");
    Ok(())
}
