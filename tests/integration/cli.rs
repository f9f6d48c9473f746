use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;

use assetweave::test_utils::TestWebapp;

use crate::common::basic_webapp;

fn assetweave(webapp: &TestWebapp) -> Command {
    let mut cmd = Command::cargo_bin("assetweave").unwrap();
    cmd.current_dir(webapp.root())
        .env("NO_COLOR", "1")
        .env_remove("ASSETWEAVE_CONFIG")
        .arg("--config")
        .arg(webapp.config_path());
    cmd
}

#[test]
#[serial]
fn test_build_writes_every_group_output() {
    let webapp = basic_webapp().unwrap();
    let destination = webapp.root().join("out");

    assetweave(&webapp)
        .arg("build")
        .arg("--destination")
        .arg(&destination)
        .assert()
        .success()
        .stdout(predicate::str::contains("all.js"))
        .stdout(predicate::str::contains("admin.css (no content)"));

    assert_eq!(
        std::fs::read_to_string(destination.join("all.js")).unwrap(),
        "var a = 1;\nvar b = 2;"
    );
    assert_eq!(
        std::fs::read_to_string(destination.join("all.css")).unwrap(),
        "body{color:red}.lib{margin:0}"
    );
    assert!(destination.join("admin.js").exists());
    assert!(!destination.join("admin.css").exists());
}

#[test]
#[serial]
fn test_build_selected_groups_with_overrides() {
    let webapp = basic_webapp().unwrap();
    let destination = webapp.root().join("out");

    assetweave(&webapp)
        .args(["build", "--groups", "all", "--no-minimize", "--set", "naming-strategy=noOp"])
        .arg("--destination")
        .arg(&destination)
        .assert()
        .success();

    let script = std::fs::read_to_string(destination.join("all.js")).unwrap();
    assert!(script.starts_with("// first"));
    assert!(!destination.join("admin.js").exists());
}

#[test]
#[serial]
fn test_build_accepts_spaced_group_list() {
    let webapp = basic_webapp().unwrap();
    let destination = webapp.root().join("out");

    assetweave(&webapp)
        .args(["build", "--groups", "all, admin"])
        .arg("--destination")
        .arg(&destination)
        .assert()
        .success();

    assert!(destination.join("all.js").exists());
    assert!(destination.join("admin.js").exists());
}

#[test]
#[serial]
fn test_build_reports_failing_groups() {
    let webapp = TestWebapp::builder()
        .unwrap()
        .with_file("js/ok.js", "var ok;")
        .with_group("good", &["/js/ok.js"], &[])
        .with_group("bad", &["/js/missing.js"], &[])
        .build()
        .unwrap();
    let destination = webapp.root().join("out");

    assetweave(&webapp)
        .arg("build")
        .arg("--destination")
        .arg(&destination)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("1 of 4 group output(s) failed"));

    assert!(destination.join("good.js").exists());
}

#[test]
#[serial]
fn test_build_rejects_unknown_alias_before_running() {
    let webapp = basic_webapp().unwrap();

    assetweave(&webapp)
        .args(["build", "--set", "post-processor-strategies=jsMinn"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("jsMinn"));
}

#[test]
#[serial]
fn test_aliases_lists_registered_strategies() {
    let webapp = basic_webapp().unwrap();

    assetweave(&webapp)
        .arg("aliases")
        .assert()
        .success()
        .stdout(predicate::str::contains("locator-strategies"))
        .stdout(predicate::str::contains("servletContext"))
        .stdout(predicate::str::contains("hashEncoder"));

    assetweave(&webapp)
        .args(["aliases", "hash-strategy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BLAKE3"))
        .stdout(predicate::str::contains("servletContext").not());

    assetweave(&webapp)
        .args(["aliases", "colours"])
        .assert()
        .failure();
}
