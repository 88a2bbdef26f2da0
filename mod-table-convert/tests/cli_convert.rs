use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use mod_table_convert::workbook::{read_workbook, write_workbook, Sheet};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn path_as_str(path: &Path) -> &str {
    path.to_str().expect("utf8 path")
}

fn cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mod-table-convert"));
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn run_success(args: &[&str]) -> String {
    let output = cmd().args(args).output().expect("command output");
    assert!(
        output.status.success(),
        "command failed\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

#[test]
fn sounds_survive_xml_to_workbook_and_back() {
    let dir = tempdir().expect("tempdir");
    let source = fixture("fixtures/hard_coded_sounds.xml");
    let workbook = dir.path().join("sounds.xlsx");
    let back = dir.path().join("sounds.xml");

    let stdout = run_success(&[
        "convert",
        "--input",
        path_as_str(&source),
        "--output",
        path_as_str(&workbook),
    ]);
    assert!(stdout.contains("hard_coded_sounds model, 2 rows, 3 columns"));

    let sheet = read_workbook(&workbook, None).expect("workbook");
    assert_eq!(sheet.name, "hard_coded_sounds");
    assert_eq!(
        sheet.header,
        strings(&[
            "type",
            "hard_coded_sounds_hard_coded_sound_id",
            "hard_coded_sounds_hard_coded_sound_path"
        ])
    );
    assert_eq!(sheet.rows[0], strings(&["hard_coded_sound", "test_sound", "event:/test/path"]));

    run_success(&[
        "convert",
        "--input",
        path_as_str(&workbook),
        "--output",
        path_as_str(&back),
        "--model",
        "hard_coded_sounds",
    ]);

    let xml = fs::read_to_string(&back).expect("converted xml");
    assert!(xml.contains(r#"<hard_coded_sound id="silence" path=""/>"#));

    run_success(&[
        "compare",
        path_as_str(&source),
        path_as_str(&back),
        "--mode",
        "strict",
    ]);
}

#[test]
fn worksheet_name_can_be_chosen() {
    let dir = tempdir().expect("tempdir");
    let workbook = dir.path().join("skills.xlsx");

    run_success(&[
        "convert",
        "--input",
        path_as_str(&fixture("fixtures/skills.xml")),
        "--output",
        path_as_str(&workbook),
        "--worksheet",
        "Skills",
    ]);

    let sheet = read_workbook(&workbook, Some("Skills")).expect("named sheet");
    assert_eq!(sheet.header[0], "SkillData_id");

    cmd()
        .args([
            "convert",
            "--input",
            path_as_str(&workbook),
            "--output",
            path_as_str(&dir.path().join("skills.xml")),
            "--model",
            "skills",
            "--worksheet",
            "Missing",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("worksheet 'Missing' not found (available: Skills)"));
}

#[test]
fn validate_writes_nothing() {
    let dir = tempdir().expect("tempdir");
    let output = dir.path().join("skills.xlsx");

    let stdout = run_success(&[
        "convert",
        "--input",
        path_as_str(&fixture("fixtures/skills.xml")),
        "--output",
        path_as_str(&output),
        "--validate",
    ]);
    assert!(stdout.contains("valid skills document"));
    assert!(!output.exists());
}

#[test]
fn explicit_model_must_match_document() {
    let dir = tempdir().expect("tempdir");
    cmd()
        .args([
            "convert",
            "--input",
            path_as_str(&fixture("fixtures/action_types.xml")),
            "--output",
            path_as_str(&dir.path().join("out.xlsx")),
            "--model",
            "skills",
            "--validate",
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("expected <ArrayOfSkillData>"));
}

#[test]
fn malformed_xml_exits_with_code_two() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("broken.xml");
    fs::write(&input, "invalid xml content").expect("write");

    cmd()
        .args([
            "convert",
            "--input",
            path_as_str(&input),
            "--output",
            path_as_str(&dir.path().join("out.xlsx")),
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("malformed XML"));
    assert!(!dir.path().join("out.xlsx").exists());
}

#[test]
fn unknown_header_exits_with_code_four() {
    let dir = tempdir().expect("tempdir");
    let workbook = dir.path().join("actions.xlsx");
    let sheet = Sheet {
        name: "action_types".to_string(),
        header: strings(&["action_name", "action_colour"]),
        rows: vec![strings(&["act_jump", "red"])],
    };
    write_workbook(&workbook, &sheet).expect("write workbook");

    cmd()
        .args([
            "convert",
            "--input",
            path_as_str(&workbook),
            "--output",
            path_as_str(&dir.path().join("actions.xml")),
            "--model",
            "action_types",
        ])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("column 'action_colour' does not match any field"));
}

#[test]
fn workbook_input_requires_model() {
    let dir = tempdir().expect("tempdir");
    cmd()
        .args([
            "convert",
            "--input",
            path_as_str(&dir.path().join("in.xlsx")),
            "--output",
            path_as_str(&dir.path().join("out.xml")),
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--model is required"));
}

#[test]
fn same_or_unknown_extension_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let input = fixture("fixtures/action_types.xml");

    cmd()
        .args([
            "convert",
            "--input",
            path_as_str(&input),
            "--output",
            path_as_str(&dir.path().join("copy.xml")),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("same file type"));

    cmd()
        .args([
            "convert",
            "--input",
            path_as_str(&input),
            "--output",
            path_as_str(&dir.path().join("table.csv")),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file type"));
}
