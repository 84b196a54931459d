//! Template authoring and tree codec tests

mod common;

use common::{create_test_template, fit, setup_test_project, write_tree};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_tpl_new_flattens_tree() {
    let tmp = setup_test_project();
    let tree = write_tree(&tmp);

    fit()
        .current_dir(tmp.path())
        .args([
            "tpl",
            "new",
            "--tree",
            tree.to_str().unwrap(),
            "--name",
            "Monthly electrical",
            "--target",
            "BLDG-A",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created template"))
        .stdout(predicate::str::contains("3 items"));
}

#[test]
fn test_tpl_show_lists_item_keys() {
    let tmp = setup_test_project();
    let id = create_test_template(&tmp, "Monthly electrical");

    fit()
        .current_dir(tmp.path())
        .args(["tpl", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("item_001"))
        .stdout(predicate::str::contains("Switchgear / Breaker condition"))
        .stdout(predicate::str::contains("item_003"))
        .stdout(predicate::str::contains("Fire Safety"));
}

#[test]
fn test_tpl_new_rejects_invalid_tree_with_positions() {
    let tmp = setup_test_project();
    let tree = tmp.path().join("bad.yaml");
    fs::write(
        &tree,
        r#"majors:
  - name: ""
    middles:
      - name: "ok"
        minors: ["a"]
  - name: "Fine"
    middles:
      - name: "broken"
        minors: []
"#,
    )
    .unwrap();

    fit()
        .current_dir(tmp.path())
        .args([
            "tpl",
            "new",
            "--tree",
            tree.to_str().unwrap(),
            "--name",
            "Bad",
            "--target",
            "BLDG-A",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("major 1 has no name"))
        .stderr(predicate::str::contains("major 2, middle 1 has no minor slots"));

    // all-or-nothing: no template file was written
    let templates: Vec<_> = fs::read_dir(tmp.path().join("templates"))
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert!(templates.is_empty());
}

#[test]
fn test_tpl_tree_rederives_editable_form() {
    let tmp = setup_test_project();
    let id = create_test_template(&tmp, "Monthly electrical");

    let output = fit()
        .current_dir(tmp.path())
        .args(["tpl", "tree", &id])
        .output()
        .unwrap();
    assert!(output.status.success());
    let yaml = String::from_utf8_lossy(&output.stdout);

    assert!(yaml.contains("Electrical"));
    assert!(yaml.contains("Switchgear"));
    assert!(yaml.contains("Breaker condition"));

    // the derived tree is valid input for a new template
    let derived = tmp.path().join("derived.yaml");
    fs::write(&derived, yaml.as_ref()).unwrap();
    fit()
        .current_dir(tmp.path())
        .args([
            "tpl",
            "new",
            "--tree",
            derived.to_str().unwrap(),
            "--name",
            "Derived copy",
            "--target",
            "BLDG-A",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 items"));
}

#[test]
fn test_tpl_deactivate_blocks_new_runs() {
    let tmp = setup_test_project();
    let id = create_test_template(&tmp, "Monthly electrical");

    fit()
        .current_dir(tmp.path())
        .args(["tpl", "deactivate", &id])
        .assert()
        .success();

    fit()
        .current_dir(tmp.path())
        .args(["run", "new", "--template", &id, "--date", "2026-08-08"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("deactivated"));
}

#[test]
fn test_tpl_list_counts() {
    let tmp = setup_test_project();
    create_test_template(&tmp, "Monthly electrical");

    fit()
        .current_dir(tmp.path())
        .args(["tpl", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Monthly electrical"))
        .stdout(predicate::str::contains("1 template(s) found"));
}

#[test]
fn test_tpl_scaffold_produces_usable_tree() {
    let tmp = setup_test_project();

    fit()
        .current_dir(tmp.path())
        .args(["tpl", "scaffold", "--output", "starter.yaml"])
        .assert()
        .success();

    fit()
        .current_dir(tmp.path())
        .args([
            "tpl",
            "new",
            "--tree",
            "starter.yaml",
            "--name",
            "From scaffold",
            "--target",
            "BLDG-A",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created template"));
}
