//! Integration tests for the node cache
//!
//! Covers the refresh and append flows against real files.

use std::fs;

use tpot::tsh::parse_directory;
use tpot::{HostDirectory, HostEntry, NodeCache};

use super::common::fixtures::{DataDir, LISTING};

#[test]
fn test_refresh_replaces_cache() {
    let data = DataDir::new();
    let path = data.node_cache_path("staging");

    NodeCache::new(vec![HostEntry::new("old-1", "10.9.9.9:3022")].into())
        .save(&path)
        .unwrap();
    NodeCache::new(parse_directory(LISTING)).save(&path).unwrap();

    let loaded = NodeCache::load(&path).unwrap();
    assert_eq!(loaded.items.hostnames(), vec!["web-1", "web-2", "db-1"]);
    assert!(loaded.refreshed_at.is_some());
}

#[test]
fn test_append_keeps_cached_and_adds_new() {
    let data = DataDir::new();
    let path = data.node_cache_path("staging");

    let cached: HostDirectory = vec![
        HostEntry::new("web-1", "10.0.0.100:3022"),
        HostEntry::new("legacy", "10.0.9.1:3022"),
    ]
    .into();
    NodeCache::new(cached).save(&path).unwrap();

    let merged = NodeCache::append(&path, parse_directory(LISTING));
    assert_eq!(
        merged.items.hostnames(),
        vec!["web-1", "legacy", "web-2", "db-1"]
    );
    // Same hostname is not replaced
    assert_eq!(merged.items.lookup_address("web-1"), Some("10.0.0.100:3022"));
}

#[test]
fn test_append_without_cache_uses_fresh_listing() {
    let data = DataDir::new();
    let merged = NodeCache::append(&data.node_cache_path("dev"), parse_directory(LISTING));
    assert_eq!(merged.items.len(), 3);
}

#[test]
fn test_corrupt_cache_is_reported() {
    let data = DataDir::new();
    let path = data.node_cache_path("staging");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ not json").unwrap();

    let err = NodeCache::load(&path).unwrap_err();
    assert!(err.to_string().contains("Corrupt node cache"));

    // Append starts over instead of failing
    let merged = NodeCache::append(&path, parse_directory(LISTING));
    assert_eq!(merged.items.len(), 3);
}

#[test]
fn test_cache_file_is_a_plain_host_list() {
    let data = DataDir::new();
    let path = data.node_cache_path("staging");
    NodeCache::new(vec![HostEntry::new("web-1", "10.0.0.1:3022")].into())
        .save(&path)
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["items"][0]["hostname"], "web-1");
    assert_eq!(json["items"][0]["address"], "10.0.0.1:3022");
}
