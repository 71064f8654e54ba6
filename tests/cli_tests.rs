//! CLI surface tests: argument validation and token resolution.

use assert_cmd::Command;
use predicates::prelude::*;

fn uploader() -> Command {
    let mut cmd = Command::cargo_bin("ipa_uploader").expect("binary built");
    cmd.env_remove("GH_TOKEN").env_remove("GITHUB_TOKEN");
    cmd
}

#[test]
fn requires_owner_repo_and_binaries() {
    uploader()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--owner"));
}

#[test]
fn missing_token_is_a_clear_error_with_suggestions() {
    uploader()
        .args(["--owner", "acme", "--repo", "rocket", "Rocket.ipa"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GitHub token not provided"))
        .stdout(predicate::str::contains("Recovery suggestions"));
}

#[test]
fn unreadable_binary_fails_before_any_upload() {
    uploader()
        .args([
            "--owner",
            "acme",
            "--repo",
            "rocket",
            "--token",
            "t0ken",
            "/nonexistent/Rocket.ipa",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not open binary"));
}
