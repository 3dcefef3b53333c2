// tests/cli_tests.rs

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
    "children": [{
        "name": "Pkg",
        "kind": 2,
        "children": [{
            "name": "Foo",
            "kind": 128,
            "children": [{ "name": "bar", "kind": 2048 }, { "name": "secret", "kind": 2048, "flags": { "isPrivate": true } }]
        }]
    }]
}"#;

fn workspace(spec: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("api.json"), SNAPSHOT).unwrap();
    std::fs::write(dir.path().join("spec.yml"), spec).unwrap();
    dir
}

fn audit(dir: &TempDir) -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("sdk-doc-audit")?;
    cmd.env("NO_COLOR", "1")
        .env_remove("SDK_DOC_AUDIT_CONFIG")
        .current_dir(dir.path())
        .arg("audit")
        .arg("--api")
        .arg("api.json")
        .arg("--spec")
        .arg("spec.yml");
    Ok(cmd)
}

#[test]
fn no_args_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("sdk-doc-audit")?;
    cmd.assert().failure().stderr(predicate::str::contains("Usage: sdk-doc-audit"));
    Ok(())
}

#[test]
fn undocumented_method_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = workspace("functions: []\n");
    audit(&dir)?
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Missing documentation (1):"))
        .stdout(predicate::str::contains("Pkg.Foo.bar"));
    assert!(dir.path().join("validation-report.json").exists());
    Ok(())
}

#[test]
fn warnings_only_pass_unless_strict() -> Result<(), Box<dyn std::error::Error>> {
    let spec = "functions:\n  - id: bar\n    $ref: Pkg.Foo.bar\n  - id: secret\n    $ref: Pkg.Foo.secret\n";
    let dir = workspace(spec);
    audit(&dir)?.assert().code(0).stdout(predicate::str::contains("Private APIs exposed (1):"));
    audit(&dir)?.arg("--strict").assert().code(1);
    Ok(())
}

#[test]
fn json_format_prints_report() -> Result<(), Box<dyn std::error::Error>> {
    let dir = workspace("functions: []\n");
    audit(&dir)?
        .args(["--format", "json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"missing_documentation\": 1"));
    Ok(())
}

#[test]
fn fix_adds_stub() -> Result<(), Box<dyn std::error::Error>> {
    let dir = workspace("functions: []\n");
    audit(&dir)?.arg("--fix").assert().stdout(predicate::str::contains("pkg-foo-bar"));
    let spec = std::fs::read_to_string(dir.path().join("spec.yml"))?;
    assert!(spec.contains("- id: pkg-foo-bar"));
    audit(&dir)?.assert().code(0);
    Ok(())
}

#[test]
fn invalid_spec_exits_with_two() -> Result<(), Box<dyn std::error::Error>> {
    let dir = workspace("functions: [\n");
    audit(&dir)?.assert().code(2).stderr(predicate::str::contains("YAML error"));
    assert!(!dir.path().join("validation-report.json").exists());
    Ok(())
}

#[test]
fn sections_command_writes_navigation() -> Result<(), Box<dyn std::error::Error>> {
    let dir = workspace("functions:\n  - id: sign-up\n    $ref: '@supabase/auth-js.GoTrueClient.signUp'\n");
    let mut cmd = Command::cargo_bin("sdk-doc-audit")?;
    cmd.current_dir(dir.path()).args(["sections", "--spec", "spec.yml", "--sections", "nav.json"]);
    cmd.assert().success().stdout(predicate::str::contains("nav.json"));

    let nav = std::fs::read_to_string(dir.path().join("nav.json"))?;
    assert!(nav.contains("\"title\": \"Auth\""));
    Ok(())
}
