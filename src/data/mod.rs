//! On-disk state

pub mod node_cache;

pub use node_cache::{CacheError, NodeCache};
