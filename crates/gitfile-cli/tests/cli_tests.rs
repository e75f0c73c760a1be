//! Integration tests for the git-file binary.
//!
//! Every scenario here stays offline: it either fails before a clone is
//! attempted or never needs one.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{TempDir, tempdir};

const HTTPS_PROVIDER: &str = r#"url = "https://git.example.com/org/config.git"

[http]
username = "bot"
password = "token"
"#;

fn git_file(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("git-file"));
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

fn workspace(provider: &str) -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("provider.toml"), provider).unwrap();
    fs::write(
        dir.path().join("resource.toml"),
        "path = \"docs/readme.md\"\ncontent = \"hello\"\n",
    )
    .unwrap();
    dir
}

#[test]
fn test_help_output() {
    let dir = tempdir().unwrap();
    git_file(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("git-file"))
        .stdout(predicate::str::contains("import"));
}

#[test]
fn test_plan_without_state_creates() {
    let dir = workspace(HTTPS_PROVIDER);
    git_file(&dir)
        .args(["plan", "--resource", "resource.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("docs/readme.md"));

    assert!(!dir.path().join("git-file.state.json").exists());
}

#[test]
fn test_import_with_malformed_id() {
    let dir = workspace(HTTPS_PROVIDER);
    git_file(&dir)
        .args(["import", "docs/readme.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Git File Import Error: expected id to have format branch:path",
        ));
}

#[test]
fn test_unsupported_scheme_fails_create() {
    let dir = workspace("url = \"ftp://git.example.com/config.git\"\n");
    git_file(&dir)
        .args(["apply", "--resource", "resource.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Git File Create Error: scheme \"ftp\" is not supported",
        ));
}

#[test]
fn test_ssh_without_private_key_fails() {
    let dir = workspace("url = \"ssh://git@git.example.com/config.git\"\n\n[ssh]\nusername = \"git\"\n");
    git_file(&dir)
        .args(["apply", "--resource", "resource.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "ssh scheme cannot be used without private key",
        ));
}

#[test]
fn test_destroy_with_empty_state() {
    let dir = workspace(HTTPS_PROVIDER);
    git_file(&dir)
        .arg("destroy")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to destroy."));
}

#[test]
fn test_refresh_with_empty_state() {
    let dir = workspace(HTTPS_PROVIDER);
    git_file(&dir)
        .arg("refresh")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to refresh."));
}

#[test]
fn test_missing_provider_file() {
    let dir = tempdir().unwrap();
    git_file(&dir)
        .args(["--provider", "absent.toml", "refresh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn test_frozen_state_plans_no_op_offline() {
    let dir = workspace(&format!("ignore_updates = true\n{HTTPS_PROVIDER}"));
    fs::write(
        dir.path().join("git-file.state.json"),
        r#"{
  "resource": {
    "id": "docs/readme.md",
    "path": "docs/readme.md",
    "content": "prior",
    "author_name": "Terraform Provider Git",
    "message": "Write file with Terraform Provider Git."
  },
  "private": {}
}"#,
    )
    .unwrap();

    git_file(&dir)
        .args(["plan", "--resource", "resource.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no-op"))
        .stdout(predicate::str::contains("content change ignored"));
}
