#![cfg(unix)]

mod common;

use common::{parse_json, prepare_project, stderr_of, stdout_of};

#[test]
fn no_arguments_prints_usage_and_exits_one() {
    let project = prepare_project("forkswap-usage");
    let assert = project
        .forkswap()
        .assert()
        .code(1);
    assert!(stderr_of(&assert).contains("Usage: forkswap <local|official|status>"));
}

#[test]
fn unknown_verb_prints_usage_and_exits_one() {
    let project = prepare_project("forkswap-unknown");
    let assert = project
        .forkswap()
        .arg("upgrade")
        .assert()
        .code(1);
    assert!(stderr_of(&assert).contains("Usage: forkswap <local|official|status>"));
    assert_eq!(project.installed(), "");
}

#[test]
fn help_exits_zero() {
    let project = prepare_project("forkswap-help");
    let assert = project
        .forkswap()
        .arg("--help")
        .assert()
        .success();
    assert!(stdout_of(&assert).contains("official"));
}

#[test]
fn status_without_package_is_a_user_error() {
    let project = prepare_project("forkswap-absent");
    let assert = project
        .forkswap()
        .arg("status")
        .assert()
        .code(1);
    assert!(stdout_of(&assert).contains("a2a is not installed"));
}

#[test]
fn local_switch_installs_fork_and_status_reports_it() {
    let project = prepare_project("forkswap-local");
    let before = project.read("pyproject.toml");

    let assert = project
        .forkswap()
        .arg("local")
        .assert()
        .success();
    assert!(stdout_of(&assert).contains("switched a2a to the local fork"));
    assert!(project.installed().starts_with("a2a-sdk-local 0.3.1.dev0"));
    assert_eq!(project.read("pyproject.toml"), before);

    let assert = project
        .forkswap()
        .arg("status")
        .assert()
        .success();
    assert!(stdout_of(&assert).contains("LOCAL VERSION"));
    assert!(stdout_of(&assert).contains("a2a-python"));
}

#[test]
fn legacy_verb_names_are_accepted() {
    let project = prepare_project("forkswap-alias");
    project
        .forkswap()
        .arg("switch-to-local")
        .assert()
        .success();
    project
        .forkswap()
        .arg("switch-to-official")
        .assert()
        .success();
    assert_eq!(project.installed(), "a2a-sdk 0.3.0 -");
}

#[test]
fn official_switch_rewrites_manifests_and_installs_release() {
    let project = prepare_project("forkswap-official");
    project.forkswap().arg("local").assert().success();

    let assert = project
        .forkswap()
        .arg("official")
        .assert()
        .success();
    assert!(stdout_of(&assert).contains("official a2a-sdk package"));

    let root = project.read("pyproject.toml");
    assert!(root.contains("\"a2a-sdk>=0.3.0\""));
    assert!(root.contains("# protocol SDK"));
    assert!(!root.contains("a2a-sdk-local"));
    let doc: toml_edit::DocumentMut = root.parse().expect("valid toml");
    let members = doc["tool"]["uv"]["workspace"]["members"]
        .as_array()
        .expect("members");
    assert_eq!(members.len(), 1);
    assert!(project
        .read("samples/python/pyproject.toml")
        .contains("\"a2a-sdk[http]\""));
    assert_eq!(project.installed(), "a2a-sdk 0.3.0 -");

    let assert = project
        .forkswap()
        .arg("status")
        .assert()
        .success();
    assert!(stdout_of(&assert).contains("OFFICIAL VERSION"));
}

#[test]
fn official_switch_is_idempotent() {
    let project = prepare_project("forkswap-idempotent");
    project.forkswap().arg("official").assert().success();
    let root = project.read("pyproject.toml");
    let samples = project.read("samples/python/pyproject.toml");

    let assert = project
        .forkswap()
        .args(["--json", "official"])
        .assert()
        .success();
    let payload = parse_json(&assert.get_output().stdout);
    assert_eq!(payload["details"]["manifests_changed"], 0);
    assert_eq!(project.read("pyproject.toml"), root);
    assert_eq!(project.read("samples/python/pyproject.toml"), samples);
}

#[test]
fn failed_install_exits_two_with_installer_output() {
    let project = prepare_project("forkswap-fail");
    let assert = project
        .forkswap()
        .env("FORKSWAP_FAKE_FAIL_INSTALL", "1")
        .arg("official")
        .assert()
        .code(2);
    assert!(stdout_of(&assert).contains("No matching distribution found"));
}

#[test]
fn dry_run_changes_nothing() {
    let project = prepare_project("forkswap-dry-run");
    let before = project.read("pyproject.toml");
    let assert = project
        .forkswap()
        .args(["--json", "official", "--dry-run"])
        .assert()
        .success();
    let payload = parse_json(&assert.get_output().stdout);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["details"]["dry_run"], true);
    assert_eq!(project.read("pyproject.toml"), before);
    assert_eq!(project.installed(), "");
}

#[test]
fn json_envelope_for_status() {
    let project = prepare_project("forkswap-json");
    project.forkswap().arg("local").assert().success();
    let assert = project
        .forkswap()
        .args(["status", "--json"])
        .assert()
        .success();
    let payload = parse_json(&assert.get_output().stdout);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["details"]["state"], "local");
    assert_eq!(payload["details"]["label"], "LOCAL VERSION");
    assert!(payload["message"]
        .as_str()
        .expect("message")
        .starts_with("forkswap status: LOCAL VERSION"));
}

#[test]
fn missing_checkout_is_a_user_error() {
    let project = prepare_project("forkswap-no-fork");
    let assert = project
        .forkswap()
        .env("FORKSWAP_LOCAL_PATH", "vendor/a2a-python")
        .arg("local")
        .assert()
        .code(1);
    assert!(stdout_of(&assert).contains("not found"));
    assert_eq!(project.installed(), "");
}

#[test]
fn missing_manifest_aborts_before_installing() {
    let project = prepare_project("forkswap-missing-manifest");
    project.forkswap().arg("local").assert().success();
    std::fs::remove_file(project.root.join("samples/python/pyproject.toml"))
        .expect("remove samples manifest");
    let before = project.read("pyproject.toml");

    let assert = project.forkswap().arg("official").assert().code(2);
    assert!(stdout_of(&assert).contains("samples/python/pyproject.toml"));
    assert_eq!(project.read("pyproject.toml"), before);
    assert!(project.installed().starts_with("a2a-sdk-local"));
}
