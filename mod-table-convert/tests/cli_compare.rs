use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mod-table-convert"));
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn reformatted_document_is_logically_equivalent() {
    cmd()
        .arg("compare")
        .arg(fixture("fixtures/action_types.xml"))
        .arg(fixture("fixtures/action_types_reformatted.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("equivalent"));
}

#[test]
fn strict_mode_reports_numeric_spelling_and_exits_five() {
    cmd()
        .arg("compare")
        .arg(fixture("fixtures/action_types.xml"))
        .arg(fixture("fixtures/action_types_reformatted.xml"))
        .args(["--mode", "strict"])
        .assert()
        .code(5)
        .stdout(predicate::str::contains("~ action_types.action[4]/@action_stage"))
        .stderr(predicate::str::contains("not equivalent"));
}

#[test]
fn summary_and_json_formats() {
    let left = fixture("fixtures/module_strings.xml");
    let right = fixture("fixtures/module_strings_empty_tags.xml");

    cmd()
        .arg("compare")
        .arg(&left)
        .arg(&right)
        .arg("--summary")
        .assert()
        .code(5)
        .stdout(predicate::str::contains("only_left=2"));

    let output = cmd()
        .arg("compare")
        .arg(&left)
        .arg(&right)
        .args(["--format", "json"])
        .output()
        .expect("command output");
    assert_eq!(output.status.code(), Some(5));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json report");
    assert_eq!(report["equivalent"], serde_json::Value::Bool(false));
    assert_eq!(report["differences"][0]["type"], "OnlyLeft");
}

#[test]
fn options_file_controls_boolean_literals() {
    let dir = tempdir().expect("tempdir");
    let left = dir.path().join("left.xml");
    let right = dir.path().join("right.xml");
    let options = dir.path().join("options.toml");
    fs::write(&left, r#"<settings is_global="true"/>"#).expect("write");
    fs::write(&right, r#"<settings is_global="yes"/>"#).expect("write");
    fs::write(
        &options,
        "[comparison]\ntrue_literals = [\"true\"]\nfalse_literals = [\"false\"]\n",
    )
    .expect("write");

    cmd().arg("compare").arg(&left).arg(&right).assert().success();
    cmd()
        .arg("compare")
        .arg(&left)
        .arg(&right)
        .arg("--options")
        .arg(&options)
        .assert()
        .code(5);
}

#[test]
fn malformed_input_exits_with_code_two() {
    let dir = tempdir().expect("tempdir");
    let broken = dir.path().join("broken.xml");
    fs::write(&broken, "<action_types><action></action_types>").expect("write");

    cmd()
        .arg("compare")
        .arg(fixture("fixtures/action_types.xml"))
        .arg(&broken)
        .assert()
        .code(2);
}
