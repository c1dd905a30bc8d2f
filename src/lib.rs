pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod tsh;
pub mod ui;
pub mod util;

pub use app::App;
pub use cli::Cli;
pub use config::{Config, ProxyConfig};
pub use data::NodeCache;
pub use tsh::{
    AuthSelector, HostDirectory, HostEntry, ProxyStatus, ProxyTarget, TshClient, TshError, Version,
};
