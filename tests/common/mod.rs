//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get a fit command with a deterministic author
pub fn fit() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("fit"));
    cmd.env("FIT_AUTHOR", "alex");
    cmd
}

/// Helper to create a test project in a temp directory
pub fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fit()
        .current_dir(tmp.path())
        .args(["init", "--site", "HQ"])
        .assert()
        .success();
    tmp
}

/// Replace the scaffolded roster with a fixed cast:
/// kim (inspector, may create runs), lee (site manager), park (inspector),
/// root (admin). The default author "alex" stays an admin.
pub fn write_team(tmp: &TempDir) {
    fs::write(
        tmp.path().join(".fit/team.yaml"),
        r#"members:
  - name: alex
    roles: [site_manager]
    admin: true
  - name: kim
    roles: [inspector]
    can_create_runs: true
  - name: lee
    roles: [site_manager]
  - name: park
    roles: [inspector]
  - name: root
    admin: true
"#,
    )
    .unwrap();
}

/// Write a two-major category tree and return its path
pub fn write_tree(tmp: &TempDir) -> PathBuf {
    let path = tmp.path().join("tree.yaml");
    fs::write(
        &path,
        r#"majors:
  - name: "Electrical"
    middles:
      - name: "Switchgear"
        minors:
          - "Breaker condition"
          - "Cable jacketing"
  - name: "Fire Safety"
    middles:
      - name: ""
        minors:
          - ""
"#,
    )
    .unwrap();
    path
}

fn extract_token(stdout: &str, prefix: &str) -> String {
    stdout
        .lines()
        .flat_map(|l| l.split_whitespace())
        .find(|w| w.starts_with(prefix))
        .map(|s| s.trim_end_matches(['(', ')', ',']).to_string())
        .unwrap_or_default()
}

/// Helper to create a test template, returning its short ID
pub fn create_test_template(tmp: &TempDir, name: &str) -> String {
    let tree = write_tree(tmp);
    let output = fit()
        .current_dir(tmp.path())
        .args([
            "tpl",
            "new",
            "--tree",
            tree.to_str().unwrap(),
            "--name",
            name,
            "--target",
            "BLDG-A",
            "--period",
            "monthly",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    extract_token(&String::from_utf8_lossy(&output.stdout), "TPL-")
}

/// Helper to create a test run as the given actor, returning its short ID
pub fn create_test_run(tmp: &TempDir, template: &str, actor: &str) -> String {
    let output = fit()
        .current_dir(tmp.path())
        .args([
            "run",
            "new",
            "--template",
            template,
            "--date",
            "2026-08-08",
            "--as",
            actor,
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "run new failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    extract_token(&String::from_utf8_lossy(&output.stdout), "RUN-")
}

/// The single run file in the project, for direct inspection/tampering
pub fn run_file(tmp: &TempDir) -> PathBuf {
    let dir = tmp.path().join("runs");
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|p| p.to_string_lossy().ends_with(".fit.yaml"))
        .expect("no run file found")
}
