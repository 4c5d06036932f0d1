//! CLI integration tests
//!
//! Run the binary against a temporary database and check the rows it leaves.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("rowmap.toml");
    std::fs::write(&path, body).unwrap();
    path
}

fn quiet_config(dir: &TempDir) -> PathBuf {
    let db = dir.path().join("blog.db");
    write_config(
        dir,
        &format!(
            "[database]\npath = {:?}\n\n[logging]\nprofile = \"test\"\n",
            db.to_str().unwrap()
        ),
    )
}

fn rowmap(dir: &TempDir, config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rowmap-cli"))
        .current_dir(dir.path())
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn count(db: &Path, table: &str) -> i64 {
    let conn = Connection::open(db).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn test_init_schema_creates_tables() {
    // Given: A config pointing at a fresh database
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir);

    // When
    let output = rowmap(&dir, &config, &["init-schema"]);

    // Then
    assert!(
        output.status.success(),
        "init-schema should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let conn = Connection::open(dir.path().join("blog.db")).unwrap();
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
             AND name IN ('authors', 'articles', 'comments')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 3);
}

#[test]
fn test_demo_runs_end_to_end() {
    // Given: An empty database
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir);

    // When: The demo runs
    let output = rowmap(&dir, &config, &["demo"]);

    // Then: It succeeds and reports each step
    assert!(
        output.status.success(),
        "demo should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Inserted author 1"));
    assert!(stdout.contains("Article 1 \"Premier article\" by Jean Bla"));
    assert!(stdout.contains("Author 1 is now Thierry Bla"));

    // And: The committed author was later removed by nick
    let db = dir.path().join("blog.db");
    assert_eq!(count(&db, "authors"), 1);
    assert_eq!(count(&db, "articles"), 1);
    assert_eq!(count(&db, "comments"), 1);
}

#[test]
fn test_authors_prints_translated_query() {
    // Given: A database populated by the demo
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir);
    assert!(rowmap(&dir, &config, &["demo"]).status.success());

    // When: Authors are listed with a filter
    let output = rowmap(
        &dir,
        &config,
        &["authors", "--first-name", "Thierry", "--min-id", "0", "--sql"],
    );

    // Then: The generated SELECT and the matching row are printed
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("WHERE firstname = 'Thierry'"));
    assert!(stdout.contains("AND id > 0"));
    assert!(stdout.contains("1\tThierry Bla\ttruc"));
}

#[test]
fn test_config_without_database_path_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "[database]\npath = \"\"\n");

    let output = rowmap(&dir, &config, &["init-schema"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing data in config file"));
}

#[test]
fn test_describe_prints_mapping_as_json() {
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir);

    let output = rowmap(&dir, &config, &["describe", "--table", "comments"]);

    assert!(
        output.status.success(),
        "describe should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"table\": \"comments\""));
    assert!(stdout.contains("\"related_table\": \"articles\""));
    assert!(stdout.contains("\"cardinality\": \"one\""));
    assert!(stdout.contains("\"direction\": \"child\""));
}

#[test]
fn test_describe_resolves_columns_and_properties() {
    // Given: The blog mapping
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir);

    // When: A relation column and a property are looked up
    let relation = rowmap(
        &dir,
        &config,
        &["describe", "--table", "articles", "--column", "author_id"],
    );
    let property = rowmap(
        &dir,
        &config,
        &["describe", "--table", "authors", "--property", "first_name"],
    );

    // Then
    assert!(relation.status.success());
    assert!(String::from_utf8_lossy(&relation.stdout).contains("\"property\": \"author\""));
    assert!(property.status.success());
    assert_eq!(String::from_utf8_lossy(&property.stdout).trim(), "firstname");
}

#[test]
fn test_describe_unknown_table_fails() {
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir);

    let output = rowmap(&dir, &config, &["describe", "--table", "ghosts"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Table ghosts is not registered"));
}
