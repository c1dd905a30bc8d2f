//! tsh availability detection
//!
//! Resolves the binary the client will run so a missing or broken install is
//! reported with instructions before any command is attempted.

use std::path::{Path, PathBuf};

/// Shown when tsh cannot be found
pub const TSH_INSTALL_INSTRUCTIONS: &str = "\
Install the Teleport client (tsh):
  brew install teleport
  https://goteleport.com/docs/installation/
or set tsh_path for this proxy in the tpot config.";

/// Status of the tsh binary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToolStatus {
    /// Tool is available at the given path
    Available(PathBuf),
    /// Tool was not found in PATH
    #[default]
    NotFound,
    /// A path was configured but it's not an executable file
    ConfiguredPathInvalid(PathBuf),
}

/// Locate tsh
///
/// A configured path must exist and be executable; otherwise `binary_name`
/// is looked up in PATH.
pub fn detect_tsh(configured_path: Option<&Path>, binary_name: &Path) -> ToolStatus {
    if let Some(path) = configured_path {
        return if is_valid_executable(path) {
            ToolStatus::Available(path.to_path_buf())
        } else {
            ToolStatus::ConfiguredPathInvalid(path.to_path_buf())
        };
    }

    match which::which(binary_name) {
        Ok(path) => ToolStatus::Available(path),
        Err(e) => {
            tracing::debug!(binary = %binary_name.display(), error = %e, "tsh not found in PATH");
            ToolStatus::NotFound
        }
    }
}

/// Check if a path points to a valid executable
fn is_valid_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        true
    }
}
