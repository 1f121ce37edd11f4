//! Spawns the compiled binary end to end: `init` → `new` → `build` →
//! `validate`, plus smoke tests for the commands that don't touch a
//! project tree.

use assert_cmd::Command;
use predicates::prelude::*;

fn loko() -> Command {
    Command::cargo_bin("loko").unwrap()
}

#[test]
fn init_rejects_a_second_run_in_the_same_directory() {
    let dir = tempfile::tempdir().unwrap();

    loko()
        .args(["--project", dir.path().to_str().unwrap(), "init", "acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("initialized"));

    loko()
        .args(["--project", dir.path().to_str().unwrap(), "init", "acme"])
        .assert()
        .failure();
}

#[test]
fn full_project_flow_scaffolds_builds_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().to_str().unwrap();

    loko().args(["--project", project, "init", "acme"]).assert().success();

    loko()
        .args(["--project", project, "new", "system", "Payments", "--technology", "Go"])
        .assert()
        .success()
        .stdout(predicate::str::contains("payments"));

    loko()
        .args([
            "--project",
            project,
            "new",
            "container",
            "API",
            "--parent",
            "payments",
            "--technology",
            "Go + Fiber",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("payments/api"));

    loko()
        .args([
            "--project",
            project,
            "new",
            "component",
            "Charge",
            "--parent",
            "payments/api",
            "--technology",
            "AWS Lambda",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("payments/api/charge"));

    loko()
        .args(["--project", project, "build", "--format", "markdown"])
        .assert()
        .success();
    assert!(dir.path().join("dist/docs.md").exists());

    loko()
        .args(["--project", project, "validate", "--check-drift"])
        .assert()
        .success();
}

#[test]
fn new_container_without_an_existing_system_fails() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().to_str().unwrap();
    loko().args(["--project", project, "init", "acme"]).assert().success();

    loko()
        .args(["--project", project, "new", "container", "API", "--parent", "payments"])
        .assert()
        .failure();
}

#[test]
fn doctor_reports_on_external_collaborators_without_failing() {
    // `d2`/`wkhtmltopdf` availability depends on the host; doctor itself
    // must always exit cleanly and describe what it found.
    loko()
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn version_prints_the_crate_version() {
    loko()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn completion_prints_a_shell_script() {
    loko()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("complete"));
}
