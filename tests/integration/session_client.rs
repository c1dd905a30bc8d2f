//! Integration tests for the session client flow
//!
//! Drives `TshClient` through a scripted executor: session detection, login,
//! listing, status and connect, the way the binary strings them together.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tpot::tsh::mock::{MockExecutor, MockResponse};
use tpot::tsh::{AuthSelector, ClientOptions, ProxyTarget, TimeZones, TshClient, TshError};
use tpot::{Config, HostEntry};

use super::common::fixtures::{LISTING, STATUS_OUTPUT, VERSION_BANNER};

const WIB_PROFILE: &str = "\
> Profile URL:  https://proxy.example.com
  Logged in as: alice
  Valid until:  2099-01-01 00:00:00 +0000 WIB [valid for 8h0m0s]
";

fn client_for(address: &str, executor: &MockExecutor) -> TshClient {
    let target = ProxyTarget::new(address, AuthSelector::User("alice".to_string()));
    TshClient::new(target, Arc::new(executor.clone()))
}

/// A profile for the proxy origin covers a target address with a path
#[test]
fn test_session_detected_for_proxy_with_path() {
    let executor = MockExecutor::new().with_stdout("status", WIB_PROFILE);
    let client = client_for("https://proxy.example.com/webapi", &executor);

    let before = Utc.with_ymd_and_hms(2098, 12, 31, 23, 0, 0).unwrap();
    let after = Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 1).unwrap();
    assert!(client.is_logged_in_at(before));
    assert!(!client.is_logged_in_at(after));

    // Probe runs bare `tsh status`
    assert!(executor.calls_for("status").iter().all(|c| c.args == vec!["status"]));
}

#[test]
fn test_refresh_with_live_session_skips_login() {
    let executor = MockExecutor::new()
        .with_stdout("status", STATUS_OUTPUT)
        .with_stdout("ls", LISTING);
    let mut client = client_for("https://proxy.example.com:3080", &executor);

    let hosts = client.refresh_directory().unwrap();
    assert_eq!(hosts.hostnames(), vec!["web-1", "web-2", "db-1"]);
    assert!(executor.calls_for("login").is_empty());

    let ls = &executor.calls_for("ls")[0];
    assert_eq!(ls.args, vec!["ls", "--proxy=proxy.example.com:3080"]);
    assert!(!ls.interactive);
}

#[test]
fn test_refresh_without_session_logs_in_first() {
    let executor = MockExecutor::new()
        .with_stdout("status", "")
        .with_stdout("ls", LISTING);
    let client = client_for("https://proxy.example.com:3080", &executor);

    client.list_hosts().unwrap();

    let subcommands: Vec<String> = executor
        .calls()
        .iter()
        .filter_map(|c| c.subcommand().map(String::from))
        .collect();
    assert_eq!(subcommands, vec!["status", "login", "ls"]);

    let login = &executor.calls_for("login")[0];
    assert!(login.interactive);
    assert_eq!(
        login.args,
        vec!["login", "--proxy=proxy.example.com:3080", "--user=alice"]
    );
}

#[test]
fn test_failed_login_stops_listing() {
    let executor = MockExecutor::new()
        .with_stdout("status", "")
        .with_exit("login", 1);
    let client = client_for("https://proxy.example.com:3080", &executor);

    let err = client.list_hosts().unwrap_err();
    assert!(matches!(err, TshError::CommandFailed { code: Some(1), .. }));
    assert!(executor.calls_for("ls").is_empty());
}

#[test]
fn test_status_after_version_gate() {
    let executor = MockExecutor::new()
        .with_stdout("version", VERSION_BANNER)
        .with_stdout("status", STATUS_OUTPUT);
    let client = client_for("https://proxy.example.com:3080", &executor);

    let status = client.status().unwrap();
    assert_eq!(status.logged_in_as, "alice");
    assert_eq!(status.roles, vec!["admin", "dev"]);
    assert_eq!(status.logins, vec!["root", "ubuntu"]);
}

#[test]
fn test_status_rejects_old_tsh() {
    let executor = MockExecutor::new().with_stdout("version", "Teleport v2.6.0 git:v2.6.0\n");
    let client = client_for("https://proxy.example.com:3080", &executor);

    let err = client.status().unwrap_err();
    assert!(matches!(err, TshError::UnsupportedVersion { .. }));
    assert!(executor.calls_for("status").is_empty());
}

#[test]
fn test_connect_after_refresh() {
    let executor = MockExecutor::new()
        .with_stdout("status", STATUS_OUTPUT)
        .with_stdout("ls", LISTING);
    let mut client = client_for("https://proxy.example.com:3080", &executor);
    client.refresh_directory().unwrap();

    client.connect("ubuntu", "db-1").unwrap();

    let ssh = &executor.calls_for("ssh")[0];
    assert!(ssh.interactive);
    assert_eq!(
        ssh.args,
        vec![
            "ssh",
            "--proxy=proxy.example.com:3080",
            "--user=alice",
            "-l",
            "ubuntu",
            "10.0.1.1:3022"
        ]
    );
}

#[test]
fn test_connect_unknown_host_runs_nothing() {
    let executor = MockExecutor::new();
    let client = client_for("https://proxy.example.com:3080", &executor)
        .with_directory(vec![HostEntry::new("web-1", "10.0.0.1:3022")].into());

    let err = client.connect("ubuntu", "web-9").unwrap_err();
    assert!(err.is_host_not_found());
    assert!(executor.calls().is_empty());
}

#[test]
fn test_spawn_failure_reads_as_logged_out() {
    let executor = MockExecutor::new().with_response(
        "status",
        MockResponse::SpawnFailure("No such file or directory".to_string()),
    );
    let client = client_for("https://proxy.example.com:3080", &executor);
    assert!(!client.is_logged_in());
}

/// Options from the config file reach the client
#[test]
fn test_config_options_apply_to_client() {
    let config = Config::from_toml(
        r#"
min_version = "5.0.0"
time_zones = ["CET"]

[proxies.staging]
address = "https://proxy.example.com:3080"
auth_connector = "okta"
"#,
    )
    .unwrap();
    let options: ClientOptions = config.client_options();
    assert_eq!(options.time_zones, TimeZones::new(["CET"]));

    let executor = MockExecutor::new()
        .with_stdout("version", VERSION_BANNER)
        .with_stdout("status", "");
    let client = TshClient::new(config.proxy("staging").unwrap(), Arc::new(executor.clone()))
        .with_options(options);

    // v4.1.11 is below the configured minimum
    assert!(matches!(
        client.status(),
        Err(TshError::UnsupportedVersion { .. })
    ));

    client.ensure_logged_in().unwrap();
    assert_eq!(
        executor.calls_for("login")[0].args,
        vec!["login", "--proxy=proxy.example.com:3080", "--auth=okta"]
    );
}
