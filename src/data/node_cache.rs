//! Node list cache
//!
//! Keeps the last listing per environment so the picker can open instantly
//! without a tsh round trip. Refreshing is explicit (`-r` / `-a`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tsh::HostDirectory;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("No cached nodes at {0}")]
    NotFound(PathBuf),
    #[error("Corrupt node cache {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to encode node cache: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Cached node list stored on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCache {
    pub items: HostDirectory,
    /// When the list last came from tsh
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl NodeCache {
    pub fn new(items: HostDirectory) -> Self {
        Self {
            items,
            refreshed_at: Some(Utc::now()),
        }
    }

    /// Load cache from disk
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CacheError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&contents).map_err(|source| CacheError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save cache to disk
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Merge a fresh listing into the cache at `path`
    ///
    /// Cached nodes keep their order; fresh nodes with a hostname already in
    /// the cache are ignored. A missing or corrupt cache starts empty.
    pub fn append(path: &Path, fresh: HostDirectory) -> Self {
        let mut cache = match Self::load(path) {
            Ok(cache) => cache,
            Err(CacheError::NotFound(_)) => Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable node cache");
                Self::default()
            }
        };
        let added = cache.items.append_missing(fresh);
        cache.refreshed_at = Some(Utc::now());
        tracing::info!(added, total = cache.items.len(), "Appended nodes to cache");
        cache
    }
}
