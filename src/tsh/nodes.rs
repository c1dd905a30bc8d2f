//! `tsh ls` table scraping
//!
//! Older tsh releases have no machine-readable output for `ls`, so the table
//! is scraped: header, separator and indented continuation rows are skipped,
//! and only the first two populated columns (hostname, address) are kept.

use serde::{Deserialize, Serialize};

/// A single node from the listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostEntry {
    pub hostname: String,
    pub address: String,
}

impl HostEntry {
    pub fn new(hostname: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            address: address.into(),
        }
    }

    fn is_empty(&self) -> bool {
        self.hostname.is_empty() && self.address.is_empty()
    }
}

/// Nodes in listing order; duplicates are kept
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostDirectory {
    entries: Vec<HostEntry>,
}

impl HostDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: HostEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HostEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[HostEntry] {
        &self.entries
    }

    pub fn hostnames(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.hostname.as_str()).collect()
    }

    /// Address of the first entry with this hostname
    pub fn lookup_address(&self, hostname: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.hostname == hostname)
            .map(|e| e.address.as_str())
    }

    /// Append entries whose hostname is not already present
    ///
    /// Existing entries keep their position and address. Returns how many
    /// entries were added.
    pub fn append_missing(&mut self, fresh: HostDirectory) -> usize {
        let before = self.entries.len();
        for entry in fresh.entries {
            if self.lookup_address(&entry.hostname).is_none() {
                self.entries.push(entry);
            }
        }
        self.entries.len() - before
    }
}

impl From<Vec<HostEntry>> for HostDirectory {
    fn from(entries: Vec<HostEntry>) -> Self {
        Self { entries }
    }
}

impl IntoIterator for HostDirectory {
    type Item = HostEntry;
    type IntoIter = std::vec::IntoIter<HostEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a HostDirectory {
    type Item = &'a HostEntry;
    type IntoIter = std::slice::Iter<'a, HostEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Parse `tsh ls` table output
pub fn parse_directory(listing: &str) -> HostDirectory {
    let mut directory = HostDirectory::new();

    for line in listing.lines() {
        if is_noise(line) {
            continue;
        }

        let mut columns = line.split(' ').filter(|s| !s.is_empty());
        let entry = HostEntry {
            hostname: columns.next().unwrap_or_default().to_string(),
            address: columns.next().unwrap_or_default().to_string(),
        };

        if !entry.is_empty() {
            directory.push(entry);
        }
    }

    directory
}

fn is_noise(line: &str) -> bool {
    line.starts_with("Node") || line.starts_with("---") || line.starts_with(char::is_whitespace)
}
