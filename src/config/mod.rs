mod settings;

pub use settings::{save_proxy, Config, ConfigError, ProxyConfig, TomlConfig};
