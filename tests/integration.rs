use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_fortdoc")));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

// -- stdin mode --

#[test]
fn stdin_mode_produces_markdown() {
    let input = std::fs::read_to_string(fixture_path("math_utils.f90")).unwrap();
    let expected = std::fs::read_to_string(fixture_path("math_utils.expected.md")).unwrap();

    let assert = cmd().write_stdin(input).assert().success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(output, expected);
}

#[test]
fn stdin_text_mode_matches_tree_mode() {
    let input = std::fs::read_to_string(fixture_path("math_utils.f90")).unwrap();
    let expected = std::fs::read_to_string(fixture_path("math_utils.expected.md")).unwrap();

    let assert = cmd().arg("--text").write_stdin(input).assert().success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(output, expected);
}

#[test]
fn stdin_json_format() {
    let input = std::fs::read_to_string(fixture_path("math_utils.f90")).unwrap();

    let assert = cmd()
        .args(["-f", "json"])
        .write_stdin(input)
        .assert()
        .success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["modules"][0]["name"], "math_utils");
    assert_eq!(value["functions"][0]["attributes"][0], "elemental");
    assert_eq!(value["subroutines"][0]["args"][2]["name"], "c");
}

#[test]
fn stdin_warnings_go_to_stderr() {
    cmd()
        .write_stdin("module\nend module\n")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "line 1: skipping malformed module: missing name",
        ));
}

// -- file mode --

#[test]
fn file_mode_creates_output() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("math_utils.f90"))
        .assert()
        .success();

    let output = std::fs::read_to_string(dir.path().join("math_utils.md")).unwrap();
    let expected = std::fs::read_to_string(fixture_path("math_utils.expected.md")).unwrap();
    assert_eq!(output, expected);
}

#[test]
fn file_mode_multiple_files() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("math_utils.f90"))
        .arg(fixture_path("geometry.f90"))
        .assert()
        .success();

    assert!(dir.path().join("math_utils.md").exists());
    let geometry = std::fs::read_to_string(dir.path().join("geometry.md")).unwrap();
    assert!(geometry.contains("## Submodules\n\n### geometry_impl\n\n> submodule of `geometry`"));
    assert!(geometry.contains("#### Type-bound procedures"));
    assert!(geometry.contains("* **area** (procedure, pass(self)) → `circle_area`"));
}

#[test]
fn file_mode_directory_input() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(format!("{}/tests/fixtures", env!("CARGO_MANIFEST_DIR")))
        .assert()
        .success();

    assert!(dir.path().join("math_utils.md").exists());
    assert!(dir.path().join("geometry.md").exists());
    // golden files are not Fortran sources
    assert!(!dir.path().join("math_utils.expected.md").exists());
}

#[test]
fn file_mode_skips_empty_models() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let prog = src.path().join("main.f90");
    std::fs::write(&prog, "program main\n  print *, 'hi'\nend program main\n").unwrap();

    cmd()
        .args(["-o", out.path().to_str().unwrap()])
        .arg(prog.to_str().unwrap())
        .assert()
        .success();

    assert!(!out.path().join("main.md").exists());
}

#[test]
fn file_mode_requires_output() {
    cmd()
        .arg(fixture_path("math_utils.f90"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output is required"));
}

#[test]
fn file_mode_json_format() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "-f", "json"])
        .arg(fixture_path("geometry.f90"))
        .assert()
        .success();

    let output = std::fs::read_to_string(dir.path().join("geometry.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["types"][0]["name"], "circle");
    assert_eq!(value["types"][1]["visibility"], "private");
    assert_eq!(value["submodules"][0]["parent"], "geometry");
}

#[test]
fn doc_marks_enable_leading_docs() {
    let input = std::fs::read_to_string(fixture_path("geometry.f90")).unwrap();

    cmd()
        .args(["--doc-marks", "!,*,>,|"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("### area\n\n> `pure`\n\nArea of a circle"));
}

#[test]
fn invalid_doc_marks_fail() {
    cmd()
        .args(["--doc-marks", "!,*,>"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("exactly 4 variants"));
}

#[test]
fn invalid_format_fails() {
    cmd()
        .args(["-f", "html"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}
