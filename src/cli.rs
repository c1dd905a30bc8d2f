use std::path::PathBuf;

use clap::Parser;

const EXAMPLES: &str = "\
Examples:
  tpot staging     Show the node list of the staging environment
  tpot prod -c     Set up the configuration for the prod environment
  tpot prod -a     Fetch the latest node list and append it to the prod cache
  tpot prod -r     Replace the prod cache with the latest node list
  tpot prod -s     Show the tsh session status for prod";

#[derive(Debug, Parser)]
#[command(name = "tpot", version, about = "tpot is a tsh teleport wrapper")]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Environment name from the config file
    pub env: String,

    /// Refresh the node list from tsh
    #[arg(short, long)]
    pub refresh: bool,

    /// Fetch the node list and append new nodes to the cache
    #[arg(short, long, conflicts_with = "refresh")]
    pub append: bool,

    /// Add or update the configuration for the environment
    #[arg(short = 'c', long = "cfg", conflicts_with_all = ["refresh", "append", "status"])]
    pub cfg: bool,

    /// Show the session status instead of connecting
    #[arg(short, long, conflicts_with_all = ["refresh", "append"])]
    pub status: bool,

    /// Remote login user for the ssh session
    #[arg(short, long)]
    pub login: Option<String>,

    /// Data directory holding config, node cache and logs
    #[arg(long, env = "TPOT_HOME")]
    pub data_dir: Option<PathBuf>,
}

/// Where the node list comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSource {
    Cache,
    Refresh,
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Configure,
    Status,
    Connect(NodeSource),
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.cfg {
            Mode::Configure
        } else if self.status {
            Mode::Status
        } else if self.refresh {
            Mode::Connect(NodeSource::Refresh)
        } else if self.append {
            Mode::Connect(NodeSource::Append)
        } else {
            Mode::Connect(NodeSource::Cache)
        }
    }
}
