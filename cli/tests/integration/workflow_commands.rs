//! Integration tests for the lifecycle commands' preconditions.
//!
//! Each test fails before any Compute Engine call, so no credentials are
//! needed.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn vmlc(config: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vmlc"));
    cmd.env("NO_COLOR", "1").env("VMLC_CONFIG", config);
    cmd
}

fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

#[test]
fn test_commands_without_profile_fail() {
    let (_dir, path) = temp_config_path();
    for args in [
        &["create"][..],
        &["start"],
        &["stop"],
        &["destroy"],
        &["status"],
        &["connect"],
    ] {
        vmlc(&path)
            .args(args)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("No active profile"));
    }
}

#[test]
fn test_json_error_goes_to_stdout() {
    let (_dir, path) = temp_config_path();
    let output = vmlc(&path)
        .args(["--json", "status"])
        .output()
        .expect("run vmlc");
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["error"], true);
    assert!(
        value["message"]
            .as_str()
            .unwrap()
            .contains("No active profile")
    );
}

#[test]
fn test_start_rejects_invalid_zone_override() {
    let (_dir, path) = temp_config_path();
    vmlc(&path)
        .args([
            "-y", "profile", "create", "--name", "dev", "--project", "my-project-1", "--instance",
            "dev-vm", "--user", "alice",
        ])
        .assert()
        .success();

    vmlc(&path)
        .args(["start", "--zone", "not a zone"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid zone"));
}

#[test]
fn test_create_missing_startup_script_fails() {
    let (dir, path) = temp_config_path();
    vmlc(&path)
        .args([
            "-y", "profile", "create", "--name", "dev", "--project", "my-project-1", "--instance",
            "dev-vm", "--user", "alice",
        ])
        .assert()
        .success();

    let script = dir.path().join("missing.sh");
    vmlc(&path)
        .args(["create", "--startup-script"])
        .arg(&script)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read startup script"));
}
