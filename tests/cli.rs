//! End-to-end tests for the `formai` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

const CONTACT_FORM: &str = r#"{
  "schemaVersion": 1,
  "form": {
    "title": "Contact Us",
    "description": "We reply within a day",
    "elements": [
      {"id": "name", "type": "text", "label": "Name", "required": true},
      {"id": "topic", "type": "select", "label": "Topic", "options": ["Sales", "Support"]}
    ]
  }
}"#;

fn formai() -> Command {
    let mut cmd = Command::cargo_bin("formai").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("GEMINI_API_KEY")
        .env("NO_COLOR", "1");
    cmd
}

fn write_form(dir: &Path, name: &str, json: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn show_prints_numbered_elements() {
    let dir = tempdir().unwrap();
    let path = write_form(dir.path(), "contact.formai.json", CONTACT_FORM);

    formai()
        .arg("show")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Contact Us"))
        .stdout(predicate::str::contains("1. Name (text) *"))
        .stdout(predicate::str::contains("2. Topic (select)"))
        .stdout(predicate::str::contains("options: Sales, Support"));
}

#[test]
fn validate_accepts_well_formed_form() {
    let dir = tempdir().unwrap();
    let path = write_form(dir.path(), "contact.formai.json", CONTACT_FORM);

    formai()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
}

#[test]
fn validate_reports_issues_and_fails() {
    let dir = tempdir().unwrap();
    let path = write_form(
        dir.path(),
        "broken.formai.json",
        r#"{"title": "Broken", "elements": [{"id": "r", "type": "radio", "label": "Pick", "options": []}]}"#,
    );

    formai()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("options must contain at least one entry"))
        .stderr(predicate::str::contains("1 validation issue(s)"));
}

#[test]
fn add_appends_element() {
    let dir = tempdir().unwrap();
    let path = write_form(dir.path(), "contact.formai.json", CONTACT_FORM);

    formai()
        .args(["add", path.to_str().unwrap(), "--type", "select", "--label", "Country"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Dropdown element 'select-"));

    formai()
        .arg("show")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("3. Country (select)"))
        .stdout(predicate::str::contains("options: Option 1, Option 2"));
}

#[test]
fn show_missing_file_fails() {
    let dir = tempdir().unwrap();

    formai()
        .arg("show")
        .arg(dir.path().join("absent.formai.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open"));
}

#[test]
fn generate_without_api_key_fails_before_network() {
    formai()
        .args(["generate", "--description", "A feedback form for a workshop"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn add_rejects_unknown_element_type() {
    formai()
        .args(["add", "form.formai.json", "--type", "slider"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown element type 'slider'"));
}
