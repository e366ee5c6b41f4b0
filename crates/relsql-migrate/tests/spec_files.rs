//! Loading migration specs from files.

use std::fs;

use relsql_core::{Layout, PostgresDialect, SqliteDialect};
use relsql_migrate::{load, migrate, MigrateError};
use serde_json::json;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, value: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

#[test]
fn test_create_from_file() {
    let dir = TempDir::new().unwrap();
    let migration = write(
        &dir,
        "people.json",
        &json!({"name": "people", "fields": [{"name": "id", "kind": "int"}]}),
    );

    let sql = migrate(None, Some(&migration), &SqliteDialect::new(), Layout::indented(2)).unwrap();
    assert_eq!(sql, "CREATE TABLE IF NOT EXISTS \"people\" (\n  \"id\" INTEGER\n);\n");
}

#[test]
fn test_modify_and_drop_from_files() {
    let dir = TempDir::new().unwrap();
    let definition = write(
        &dir,
        "people.json",
        &json!({"name": "people", "fields": [{"name": "id", "kind": "int"}]}),
    );
    let delta = write(
        &dir,
        "delta.json",
        &json!({"fields": {"change": {"id": {"default": 1}}}}),
    );

    let sql = migrate(
        Some(&definition),
        Some(&delta),
        &PostgresDialect::new(),
        Layout::inline(),
    )
    .unwrap();
    assert_eq!(sql, "ALTER TABLE \"people\" ALTER COLUMN \"id\" SET DEFAULT 1;\n");

    let sql = migrate(Some(&definition), None, &PostgresDialect::new(), Layout::inline()).unwrap();
    assert_eq!(sql, "DROP TABLE \"people\";\n");
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(matches!(load(&missing), Err(MigrateError::Io { .. })));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{not json").unwrap();
    let err = load(&broken).unwrap_err();
    assert!(matches!(err, MigrateError::Parse { .. }));
    assert!(err.to_string().contains("broken.json"));

    let shapeless = write(&dir, "shapeless.json", &json!({"fields": "nope"}));
    assert!(matches!(
        migrate(None, Some(&shapeless), &SqliteDialect::new(), Layout::inline()),
        Err(MigrateError::Sql(_))
    ));
    assert!(migrate(None, None, &SqliteDialect::new(), Layout::inline()).is_err());
}
