//! General CLI behavior tests

mod common;

use common::{create_test_run, create_test_template, fit, setup_test_project, write_team};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_init_creates_layout() {
    let tmp = setup_test_project();

    assert!(tmp.path().join(".fit/config.yaml").exists());
    assert!(tmp.path().join(".fit/team.yaml").exists());
    assert!(tmp.path().join(".fit/archive").is_dir());
    assert!(tmp.path().join("templates").is_dir());
    assert!(tmp.path().join("runs").is_dir());

    let config = fs::read_to_string(tmp.path().join(".fit/config.yaml")).unwrap();
    assert!(config.contains("site: \"HQ\""));
    assert!(config.contains("author: \"alex\""));
}

#[test]
fn test_init_twice_requires_force() {
    let tmp = setup_test_project();

    fit()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Already a FIT project"));

    fit()
        .current_dir(tmp.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_commands_outside_project_fail() {
    let tmp = tempfile::TempDir::new().unwrap();

    fit()
        .current_dir(tmp.path())
        .args(["tpl", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not inside a FIT project"));
}

#[test]
fn test_validate_reports_broken_entity() {
    let tmp = setup_test_project();
    create_test_template(&tmp, "Monthly electrical");

    fit()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 entity file(s) OK"));

    fs::write(
        tmp.path().join("templates/TPL-BROKEN.fit.yaml"),
        "name: [unclosed",
    )
    .unwrap();

    fit()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TPL-BROKEN"));
}

#[test]
fn test_run_list_filters_by_status() {
    let tmp = setup_test_project();
    write_team(&tmp);
    let tpl = create_test_template(&tmp, "Monthly electrical");
    let run = create_test_run(&tmp, &tpl, "kim");

    fit()
        .current_dir(tmp.path())
        .args(["run", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("draft"))
        .stdout(predicate::str::contains("1 run(s) found"));

    fit()
        .current_dir(tmp.path())
        .args(["run", "list", "--status", "submitted"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No runs found"));

    fit()
        .current_dir(tmp.path())
        .args(["submit", &run, "--approver", "lee", "--as", "kim", "-y"])
        .assert()
        .success();

    fit()
        .current_dir(tmp.path())
        .args(["run", "list", "--status", "submitted"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 run(s) found"));
}

#[test]
fn test_run_export_csv() {
    let tmp = setup_test_project();
    write_team(&tmp);
    let tpl = create_test_template(&tmp, "Monthly electrical");
    let run = create_test_run(&tmp, &tpl, "kim");

    fit()
        .current_dir(tmp.path())
        .args([
            "run",
            "save",
            &run,
            "--item",
            "item_001",
            "--result",
            "noncompliant",
            "--note",
            "crack",
            "--as",
            "kim",
        ])
        .assert()
        .success();

    fit()
        .current_dir(tmp.path())
        .args(["run", "export", &run])
        .assert()
        .success()
        .stdout(predicate::str::contains("item_key,item_text,category"))
        .stdout(predicate::str::contains("noncompliant"))
        .stdout(predicate::str::contains("crack"));

    fit()
        .current_dir(tmp.path())
        .args(["run", "export", &run, "--output", "out.csv"])
        .assert()
        .success();
    let csv = fs::read_to_string(tmp.path().join("out.csv")).unwrap();
    assert_eq!(csv.lines().count(), 4); // header + 3 items
}

#[test]
fn test_unknown_actor_is_rejected() {
    let tmp = setup_test_project();
    write_team(&tmp);
    let tpl = create_test_template(&tmp, "Monthly electrical");

    fit()
        .current_dir(tmp.path())
        .args([
            "run", "new", "--template", &tpl, "--date", "2026-08-08", "--as", "nobody",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not in the team roster"));
}

#[test]
fn test_completions_generate() {
    fit()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fit"));
}
