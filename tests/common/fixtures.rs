//! Canned tsh output and data directory helpers

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const VERSION_BANNER: &str = "Teleport v4.1.11 git:v4.1.11-0-g5ecf7f0b go1.13.2\n";

pub const STATUS_OUTPUT: &str = "\
> Profile URL:  https://proxy.example.com:3080
  Logged in as: alice
  Cluster:      example
  Roles:        admin, dev
  Logins:       root, ubuntu
  Valid until:  2099-01-01 00:00:00 +0000 UTC [valid for 8h0m0s]
  Extensions:   permit-agent-forwarding, permit-pty
";

pub const LISTING: &str = "\
Node Name     Address          Labels
------------- ---------------- ------
web-1         10.0.0.1:3022    env=staging
web-2         10.0.0.2:3022    env=staging
db-1          10.0.1.1:3022    env=staging
";

/// Scratch data directory with an optional config file
pub struct DataDir {
    pub dir: TempDir,
}

impl DataDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    pub fn node_cache_path(&self, env: &str) -> PathBuf {
        self.path().join("nodes").join(format!("{env}.json"))
    }

    pub fn write_config(&self, contents: &str) {
        fs::write(self.config_path(), contents).expect("Failed to write config");
    }

    /// Config with one `staging` proxy using `tsh_path`
    pub fn write_staging_config(&self, tsh_path: &Path) {
        self.write_config(&format!(
            "[proxies.staging]\n\
             address = \"https://proxy.example.com:3080\"\n\
             user_name = \"alice\"\n\
             tsh_path = \"{}\"\n\
             login = \"ubuntu\"\n",
            tsh_path.display()
        ));
    }
}
