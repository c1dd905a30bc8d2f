//! Path utilities for tpot data directories

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Global storage for custom data directory path
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the data directory with an optional custom path.
/// Must be called early in main() before any other path functions are used.
/// If custom_path is None, uses the default ~/.tpot location.
pub fn init_data_dir(custom_path: Option<PathBuf>) {
    let path = custom_path.unwrap_or_else(default_data_dir);
    if DATA_DIR.set(path.clone()).is_err() {
        tracing::debug!(path = %path.display(), "Data directory already initialized");
    }
}

/// Get the default data directory path (~/.tpot)
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".tpot"))
        .unwrap_or_else(|| PathBuf::from(".tpot"))
}

/// Get the base tpot data directory.
/// Returns the custom path if set via init_data_dir(), otherwise ~/.tpot
pub fn data_dir() -> PathBuf {
    DATA_DIR.get().cloned().unwrap_or_else(default_data_dir)
}

/// Get the logs directory (~/.tpot/logs)
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Get the default log file path (~/.tpot/logs/tpot.log)
pub fn log_file_path() -> PathBuf {
    logs_dir().join("tpot.log")
}

/// Config file inside a data directory (<dir>/config.toml)
pub fn config_path_in(dir: &Path) -> PathBuf {
    dir.join("config.toml")
}

/// Node cache file for one environment (<dir>/nodes/<env>.json)
pub fn node_cache_path_in(dir: &Path, env: &str) -> PathBuf {
    dir.join("nodes").join(format!("{env}.json"))
}
