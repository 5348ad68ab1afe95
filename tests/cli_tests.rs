//! Command line tests for the release binary

mod common;

use assert_cmd::Command;
use common::TestRepo;
use predicates::prelude::*;
use tempfile::TempDir;

fn release_cmd() -> Command {
    let mut cmd = Command::cargo_bin("kodegen_scm_release").expect("binary builds");
    for var in [
        "RELEASE_USE_AUTOMATIC_VERSION",
        "RELEASE_RELEASE_VERSION",
        "RELEASE_NEW_VERSION",
        "RELEASE_PRE_COMMIT_TEXT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn steps_lists_canonical_order() {
    release_cmd()
        .arg("steps")
        .assert()
        .success()
        .stdout(predicate::str::contains(" 1. createAdapter"))
        .stdout(predicate::str::contains("16. release"))
        .stdout(predicate::str::contains("checkoutMergeToReleaseBranch").and(
            predicate::str::contains("(conditional)"),
        ));
}

#[test]
fn check_outside_repository_fails() {
    let dir = TempDir::new().unwrap();

    release_cmd()
        .args(["check", "-C"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No supported adapter"));
}

#[test]
fn missing_project_directory_is_rejected() {
    release_cmd()
        .args(["check", "-C", "/definitely/not/here"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Fatal error"))
        .stderr(predicate::str::contains("Invalid arguments"))
        .stdout(predicate::str::contains("--help"));
}

#[test]
fn check_reports_ready_repository() {
    let repo = TestRepo::new();

    release_cmd()
        .args(["check", "-C"])
        .arg(&repo.path)
        .assert()
        .success()
        .stdout(predicate::str::contains("is ready for release"));
}

#[test]
fn automatic_release_with_config_file() {
    let repo = TestRepo::new();
    repo.write(
        "release.toml",
        "[release]\ntag_template = \"v$version\"\n\n[release.git]\nrequire_branch = \"main\"\n",
    );
    repo.commit_all("Add release config");
    repo.git(&["push", "origin", "main"]);

    release_cmd()
        .args(["-y", "--pre-commit-text", "[ci skip]", "-C"])
        .arg(&repo.path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Released tag v1.4, next version is 1.5-SNAPSHOT"));

    assert_eq!(repo.origin_tags(), vec!["v1.4".to_string()]);
    let subject = repo.git(&["log", "-1", "--format=%s"]);
    assert_eq!(subject, "[ci skip] [Release] - new version commit: 'v1.5-SNAPSHOT'.");
}

#[test]
fn dirty_repository_release_fails_without_changes() {
    let repo = TestRepo::new();
    repo.write("x.txt", "scratch");
    let head = repo.head();

    release_cmd()
        .arg("-y")
        .arg("-C")
        .arg(&repo.path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unversioned files"));

    assert_eq!(repo.head(), head);
}
