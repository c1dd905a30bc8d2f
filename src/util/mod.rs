//! Utility modules

pub mod paths;
pub mod tools;

pub use paths::{
    config_path_in, data_dir, init_data_dir, log_file_path, logs_dir, node_cache_path_in,
};
pub use tools::{detect_tsh, ToolStatus, TSH_INSTALL_INSTRUCTIONS};
