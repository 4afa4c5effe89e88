//! End-to-end tests of the CLI binary. These exercise argument handling
//! and input validation only; nothing here reaches the network.

use assert_cmd::Command;
use predicates::prelude::*;

fn extractor() -> Command {
    Command::cargo_bin("extractor").expect("binary builds")
}

#[test]
fn test_help_describes_the_tool() {
    extractor()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("base_url"))
        .stdout(predicate::str::contains("--detach"))
        .stdout(predicate::str::contains("--after"));
}

#[test]
fn test_version_flag_succeeds() {
    extractor().arg("--version").assert().success();
}

#[test]
fn test_missing_arguments_fail_with_usage() {
    extractor()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));

    extractor()
        .arg("https://example.com")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_rejects_non_http_base_url_without_network() {
    extractor()
        .args(["ftp://example.com", "posts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid extraction request"));
}

#[test]
fn test_rejects_malformed_post_type() {
    extractor()
        .args(["https://example.com", "posts/../secrets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid extraction request"));
}

#[test]
fn test_rejects_unparseable_after_date() {
    extractor()
        .args(["https://example.com", "posts", "--after", "last tuesday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --after date"));
}

#[test]
fn test_rejects_out_of_range_per_page() {
    extractor()
        .args(["https://example.com", "posts", "--per-page", "0"])
        .assert()
        .failure();

    extractor()
        .args(["https://example.com", "posts", "--per-page", "101"])
        .assert()
        .failure();
}
