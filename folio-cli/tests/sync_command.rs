use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn write_export(dir: &Path) -> std::path::PathBuf {
    let export = json!({
        "locales": [
            { "code": "en-US", "default": true },
            { "code": "fr", "default": false }
        ],
        "contentTypes": [
            { "sys": { "id": "post" }, "name": "Post", "fields": [{ "id": "title" }] }
        ],
        "entries": [
            {
                "sys": { "id": "hello", "contentType": { "sys": { "id": "post" } } },
                "fields": { "title": { "en-US": "Hello", "fr": "Bonjour" } }
            }
        ]
    });
    let path = dir.join("export.json");
    fs::write(&path, serde_json::to_string_pretty(&export).unwrap()).unwrap();
    path
}

fn folio() -> Command {
    let mut cmd = Command::cargo_bin("folio").expect("folio binary");
    cmd.env("NO_COLOR", "1")
        .env_remove("FOLIO_CONFIG")
        .env_remove("FOLIO_DIRECTORY")
        .env_remove("FOLIO_SOURCE");
    cmd
}

#[test]
fn sync_writes_files_and_prints_summary() {
    let tmp = TempDir::new().unwrap();
    let export = write_export(tmp.path());
    let out = tmp.path().join("content");

    folio()
        .current_dir(tmp.path())
        .args(["sync", "--format", "json", "--source"])
        .arg(&export)
        .arg("--directory")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 created"))
        .stdout(predicate::str::contains("post"));

    let fr: Value =
        serde_json::from_str(&fs::read_to_string(out.join("post/hello@fr.json")).unwrap())
            .unwrap();
    assert_eq!(fr["title"], json!("Bonjour"));
    assert!(out.join("post/hello.json").exists());
}

#[test]
fn second_sync_has_nothing_to_do() {
    let tmp = TempDir::new().unwrap();
    let export = write_export(tmp.path());
    let out = tmp.path().join("content");

    folio()
        .current_dir(tmp.path())
        .arg("sync")
        .arg("--source")
        .arg(&export)
        .arg("--directory")
        .arg(&out)
        .assert()
        .success();

    folio()
        .current_dir(tmp.path())
        .arg("sync")
        .arg("--source")
        .arg(&export)
        .arg("--directory")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to do"));
}

#[test]
fn dry_run_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let export = write_export(tmp.path());
    let out = tmp.path().join("content");

    folio()
        .current_dir(tmp.path())
        .args(["sync", "--dry-run", "--source"])
        .arg(&export)
        .arg("--directory")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run]"));

    assert!(!out.exists());
}

#[test]
fn config_file_is_picked_up_from_working_directory() {
    let tmp = TempDir::new().unwrap();
    write_export(tmp.path());
    fs::write(
        tmp.path().join("folio.yaml"),
        "directory: site/content\nsource: export.json\nformat:\n  \"post\": markdown\n",
    )
    .unwrap();

    folio()
        .current_dir(tmp.path())
        .arg("sync")
        .assert()
        .success();

    assert!(tmp.path().join("site/content/post/hello.md").exists());
    assert!(tmp.path().join("site/content/post/hello@fr.md").exists());
}

#[test]
fn json_summary_is_machine_readable() {
    let tmp = TempDir::new().unwrap();
    let export = write_export(tmp.path());

    let output = folio()
        .current_dir(tmp.path())
        .args(["sync", "--json", "--source"])
        .arg(&export)
        .arg("--directory")
        .arg(tmp.path().join("out"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["totals"]["created"], json!(2));
    assert_eq!(summary["processed"], json!(2));
}

#[test]
fn missing_source_fails() {
    let tmp = TempDir::new().unwrap();
    folio()
        .current_dir(tmp.path())
        .args(["sync", "--directory", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no content source configured"));
}

#[test]
fn unknown_format_fails_before_writing() {
    let tmp = TempDir::new().unwrap();
    let export = write_export(tmp.path());
    let out = tmp.path().join("content");

    folio()
        .current_dir(tmp.path())
        .args(["sync", "--format", "docx", "--source"])
        .arg(&export)
        .arg("--directory")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));

    assert!(!out.exists());
}
