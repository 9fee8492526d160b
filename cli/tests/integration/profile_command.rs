//! Integration tests for `vmlc profile`.
//!
//! Every test runs non-interactively (`-y` plus flags) against a temp config.

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

fn create_profile(config: &str, name: &str, instance: &str) {
    vmlc(config)
        .args([
            "-y",
            "profile",
            "create",
            "--name",
            name,
            "--project",
            "my-project-1",
            "--instance",
            instance,
            "--user",
            "alice",
        ])
        .assert()
        .success();
}

#[test]
fn test_profile_create_writes_derived_fields() {
    let (_dir, path) = temp_config_path();
    vmlc(&path)
        .args([
            "-y",
            "profile",
            "create",
            "--name",
            "dev",
            "--project",
            "my-project-1",
            "--zone",
            "us-central1-a",
            "--instance",
            "dev-vm",
            "--user",
            "alice",
            "--machine-type",
            "e2-standard-2",
            "--disk-size",
            "50",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile 'dev' added."));

    let content = std::fs::read_to_string(&path).expect("config written");
    assert!(content.contains("active: dev"), "{content}");
    assert!(content.contains("region: us-central1"), "{content}");
    assert!(content.contains("image_base_name: dev-vm-image"), "{content}");
    assert!(content.contains("disk_size: 50"), "{content}");
}

#[test]
fn test_profile_create_defaults_zone_machine_and_disk() {
    let (_dir, path) = temp_config_path();
    create_profile(&path, "dev", "dev-vm");
    let content = std::fs::read_to_string(&path).expect("config written");
    assert!(content.contains("zone: europe-west1-b"), "{content}");
    assert!(content.contains("machine_type: e2-standard-4"), "{content}");
    assert!(content.contains("disk_size: 100"), "{content}");
}

#[test]
fn test_profile_create_rejects_invalid_project() {
    let (_dir, path) = temp_config_path();
    vmlc(&path)
        .args([
            "-y", "profile", "create", "--name", "dev", "--project", "Bad_Project", "--instance",
            "dev-vm", "--user", "alice",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid project id"));
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_profile_create_requires_name_without_prompts() {
    let (_dir, path) = temp_config_path();
    vmlc(&path)
        .args(["-y", "profile", "create", "--project", "my-project-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile name is required"));
}

#[test]
fn test_second_profile_keeps_first_active() {
    let (_dir, path) = temp_config_path();
    create_profile(&path, "dev", "dev-vm");
    create_profile(&path, "prod", "prod-vm");

    let output = vmlc(&path)
        .args(["--json", "profile", "show"])
        .output()
        .expect("run vmlc");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["active"], "dev");
    assert_eq!(value["profiles"]["prod"]["instance_name"], "prod-vm");
}

#[test]
fn test_profile_show_marks_active() {
    let (_dir, path) = temp_config_path();
    create_profile(&path, "dev", "dev-vm");
    vmlc(&path)
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* dev"))
        .stdout(predicate::str::contains("my-project-1"));
}

#[test]
fn test_profile_show_without_profiles_fails() {
    let (_dir, path) = temp_config_path();
    vmlc(&path)
        .args(["profile", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No profiles found"));
}

#[test]
fn test_profile_set_switches_active() {
    let (_dir, path) = temp_config_path();
    create_profile(&path, "dev", "dev-vm");
    create_profile(&path, "prod", "prod-vm");

    vmlc(&path)
        .args(["profile", "set", "prod"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Active profile set to 'prod'"));

    let content = std::fs::read_to_string(&path).expect("config");
    assert!(content.contains("active: prod"), "{content}");
}

#[test]
fn test_profile_set_unknown_fails() {
    let (_dir, path) = temp_config_path();
    create_profile(&path, "dev", "dev-vm");
    vmlc(&path)
        .args(["profile", "set", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'nope' not found."));
}

#[test]
fn test_profile_delete_active_clears_it() {
    let (_dir, path) = temp_config_path();
    create_profile(&path, "dev", "dev-vm");
    vmlc(&path)
        .args(["-y", "profile", "delete", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted profile 'dev'"));

    let content = std::fs::read_to_string(&path).expect("config");
    assert!(!content.contains("active:"), "{content}");
    assert!(!content.contains("dev-vm"), "{content}");
}

#[test]
fn test_profile_delete_all() {
    let (_dir, path) = temp_config_path();
    create_profile(&path, "dev", "dev-vm");
    create_profile(&path, "prod", "prod-vm");

    let output = vmlc(&path)
        .args(["-y", "--json", "profile", "delete", "--all"])
        .output()
        .expect("run vmlc");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["deleted"], serde_json::json!(["dev", "prod"]));
}

#[test]
fn test_profile_delete_all_and_name_conflict() {
    let (_dir, path) = temp_config_path();
    vmlc(&path)
        .args(["profile", "delete", "dev", "--all"])
        .assert()
        .code(2);
}
