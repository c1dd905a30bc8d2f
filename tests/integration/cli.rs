//! End-to-end tests for the tpot binary
//!
//! Each test gets its own data directory through `TPOT_HOME`. Flows that
//! reach tsh use the scripted stand-in from `common::fake_tsh`; flows that
//! need the picker or prompts are in `app_flow`.

use assert_cmd::Command;
use predicates::prelude::*;

use super::common::fixtures::DataDir;

fn tpot(data: &DataDir) -> Command {
    let mut cmd = Command::cargo_bin("tpot").expect("tpot binary");
    cmd.env("TPOT_HOME", data.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_flags() {
    let data = DataDir::new();
    tpot(&data)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tsh teleport wrapper"))
        .stdout(predicate::str::contains("--refresh"))
        .stdout(predicate::str::contains("tpot prod -c"));
}

#[test]
fn test_missing_env_argument_fails() {
    let data = DataDir::new();
    tpot(&data).assert().failure();
}

#[test]
fn test_missing_config_suggests_cfg() {
    let data = DataDir::new();
    tpot(&data)
        .arg("staging")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config not found"))
        .stderr(predicate::str::contains("tpot staging -c"));
}

#[test]
fn test_unknown_env_lists_available() {
    let data = DataDir::new();
    data.write_config(
        "[proxies.staging]\naddress = \"https://proxy.example.com\"\nuser_name = \"alice\"\n",
    );
    tpot(&data)
        .arg("prod")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Env prod not found, available: staging"));
}

#[test]
fn test_invalid_tsh_path_shows_install_instructions() {
    let data = DataDir::new();
    data.write_staging_config(&data.path().join("no-such-tsh"));
    tpot(&data)
        .args(["staging", "-r"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an executable file"))
        .stderr(predicate::str::contains("Install the Teleport client"));
}

#[cfg(unix)]
mod with_fake_tsh {
    use super::*;
    use crate::integration::common::fake_tsh;

    fn setup() -> DataDir {
        let data = DataDir::new();
        let tsh = fake_tsh::install(data.path());
        data.write_staging_config(&tsh);
        data
    }

    #[test]
    fn test_status() {
        let data = setup();
        tpot(&data)
            .args(["staging", "-s"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Proxy:        proxy.example.com:3080"))
            .stdout(predicate::str::contains("Logged in as: alice"))
            .stdout(predicate::str::contains("Roles:        admin, dev"));

        let calls = fake_tsh::recorded_calls(data.path());
        assert_eq!(calls, vec!["version", "status --proxy=proxy.example.com:3080"]);
    }

    #[test]
    fn test_missing_cache_suggests_refresh() {
        let data = setup();
        tpot(&data)
            .arg("staging")
            .assert()
            .failure()
            .stderr(predicate::str::contains("tpot staging -r"));
    }
}
