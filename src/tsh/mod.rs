//! Wrapper around the Teleport `tsh` binary

pub mod client;
pub mod error;
pub mod executor;
pub mod mock;
pub mod nodes;
pub mod profile;
pub mod status;
pub mod version;

pub use client::{AuthSelector, ClientOptions, ProxyTarget, TshClient, DEFAULT_TSH_BINARY};
pub use error::TshError;
pub use executor::{CommandExecutor, CommandOutput, ProcessExecutor};
pub use nodes::{parse_directory, HostDirectory, HostEntry};
pub use profile::{has_valid_session, parse_profiles, SessionProfile, TimeZones};
pub use status::ProxyStatus;
pub use version::{Version, MIN_STATUS_VERSION};
