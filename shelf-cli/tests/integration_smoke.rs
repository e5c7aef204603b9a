//! End-to-end tests for the shelf binary
//!
//! Every test runs against its own temporary HOME and data directory.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn shelf(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("shelf").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("SHELF_CONFIG")
        .env_remove("SHELF_DATA_DIR")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir(home));
    cmd
}

fn data_dir(home: &TempDir) -> PathBuf {
    home.path().join("data")
}

fn add(home: &TempDir, title: &str, author: &str) {
    shelf(home).args(["add", title, author]).assert().success();
}

// === Library commands ===

#[test]
fn test_add_then_list() {
    let home = TempDir::new().unwrap();
    shelf(&home)
        .args(["add", "Dune", "Frank Herbert"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added #1: Dune by Frank Herbert"));

    shelf(&home)
        .arg("list")
        .assert()
        .success()
        .stdout("1. Dune by Frank Herbert\n");

    assert!(data_dir(&home).join("books.json").exists());
}

#[test]
fn test_add_blank_field_is_rejected() {
    let home = TempDir::new().unwrap();
    shelf(&home)
        .args(["add", "   ", "Herbert"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Title and author"));

    shelf(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No books yet"));
}

#[test]
fn test_edit_and_remove_by_position() {
    let home = TempDir::new().unwrap();
    add(&home, "Dune", "Herbert");
    add(&home, "Emma", "Austen");
    add(&home, "Ubik", "Dick");

    shelf(&home)
        .args(["edit", "1", "Dune", "Frank Herbert"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated #1: Dune by Frank Herbert"));

    shelf(&home)
        .args(["remove", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed Emma by Austen"));

    shelf(&home)
        .arg("list")
        .assert()
        .success()
        .stdout("1. Dune by Frank Herbert\n2. Ubik by Dick\n");
}

#[test]
fn test_position_out_of_range() {
    let home = TempDir::new().unwrap();
    add(&home, "Dune", "Herbert");

    shelf(&home)
        .args(["remove", "5"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No book at position 5"));

    shelf(&home)
        .args(["edit", "0", "A", "B"])
        .assert()
        .code(3);
}

#[test]
fn test_list_query_and_sort() {
    let home = TempDir::new().unwrap();
    add(&home, "Emma", "Austen");
    add(&home, "Dune", "Herbert");
    add(&home, "Persuasion", "Austen");

    // Positions are base order even when the view is re-sorted
    shelf(&home)
        .args(["list", "--query", "AUSTEN", "--order", "desc"])
        .assert()
        .success()
        .stdout("3. Persuasion by Austen\n1. Emma by Austen\n");

    shelf(&home)
        .args(["list", "--sort", "author"])
        .assert()
        .success()
        .stdout("1. Emma by Austen\n3. Persuasion by Austen\n2. Dune by Herbert\n");

    shelf(&home)
        .args(["list", "--query", "tolkien"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No books match"));
}

#[test]
fn test_list_json() {
    let home = TempDir::new().unwrap();
    add(&home, "Dune", "Herbert");

    let output = shelf(&home).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["position"], 1);
    assert_eq!(rows[0]["title"], "Dune");
    assert_eq!(rows[0]["author"], "Herbert");
    assert!(rows[0]["id"].is_string());
}

#[test]
fn test_config_view_defaults_apply_to_list() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("shelf.toml");
    fs::write(&config, "[view]\nsort_field = \"author\"\nsort_order = \"desc\"\n").unwrap();
    add(&home, "Dune", "Herbert");
    add(&home, "Emma", "Austen");

    shelf(&home)
        .arg("--config")
        .arg(&config)
        .arg("list")
        .assert()
        .success()
        .stdout("1. Dune by Herbert\n2. Emma by Austen\n");
}

// === Import / export ===

#[test]
fn test_csv_import_skips_existing_books() {
    let home = TempDir::new().unwrap();
    add(&home, "Dune", "Herbert");

    let csv = home.path().join("books.csv");
    fs::write(&csv, "Title,Author\nDune,Herbert\nFoundation,Asimov\n").unwrap();

    shelf(&home)
        .arg("import")
        .arg(&csv)
        .assert()
        .success()
        .stdout("1 books imported successfully.\n");

    shelf(&home)
        .arg("list")
        .assert()
        .success()
        .stdout("1. Dune by Herbert\n2. Foundation by Asimov\n");
}

#[test]
fn test_import_unsupported_extension() {
    let home = TempDir::new().unwrap();
    let notes = home.path().join("books.txt");
    fs::write(&notes, "Dune,Herbert").unwrap();

    shelf(&home)
        .arg("import")
        .arg(&notes)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported file type"));

    assert!(!data_dir(&home).join("books.json").exists());
}

#[test]
fn test_import_malformed_json() {
    let home = TempDir::new().unwrap();
    add(&home, "Dune", "Herbert");
    let bad = home.path().join("bad.json");
    fs::write(&bad, "{\"title\": \"Emma\"").unwrap();

    shelf(&home)
        .arg("import")
        .arg(&bad)
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Error importing file. Please check the format.",
        ));

    shelf(&home)
        .arg("list")
        .assert()
        .success()
        .stdout("1. Dune by Herbert\n");
}

#[test]
fn test_export_csv_to_stdout() {
    let home = TempDir::new().unwrap();
    add(&home, "Dune", "Herbert");
    add(&home, "Emma", "Austen");

    shelf(&home)
        .args(["export", "--format", "csv"])
        .assert()
        .success()
        .stdout("Title,Author\nDune,Herbert\nEmma,Austen\n");
}

#[test]
fn test_export_json_into_directory_round_trips() {
    let home = TempDir::new().unwrap();
    add(&home, "Dune", "Herbert");
    add(&home, "Emma", "Austen");

    let out = TempDir::new().unwrap();
    shelf(&home)
        .args(["export", "--format", "json", "--out"])
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 books"));

    let exported = out.path().join("books.json");
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&exported).unwrap()).unwrap();
    assert_eq!(value[1], serde_json::json!({"title": "Emma", "author": "Austen"}));

    let other = TempDir::new().unwrap();
    shelf(&other)
        .arg("import")
        .arg(&exported)
        .assert()
        .success()
        .stdout("2 books imported successfully.\n");
}

// === Config ===

#[test]
fn test_config_init_show_and_force() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("conf").join("config.toml");

    shelf(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config"));

    shelf(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("--force"));

    shelf(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "init", "--force"])
        .assert()
        .success();

    shelf(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("delete_fade_ms = 400"));
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let home = TempDir::new().unwrap();
    shelf(&home)
        .arg("--config")
        .arg(home.path().join("nope.toml"))
        .arg("list")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("does not exist"));
}

// === Help and completions ===

#[test]
fn test_top_level_help_lists_commands() {
    let home = TempDir::new().unwrap();
    shelf(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("tui"));
}

#[test]
fn test_export_help() {
    let home = TempDir::new().unwrap();
    shelf(&home)
        .args(["export", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Output format"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    shelf(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shelf"));
}
