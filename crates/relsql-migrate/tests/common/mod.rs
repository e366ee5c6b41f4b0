#![allow(dead_code)]

use relsql_core::Layout;
use relsql_migrate::{MigrationDialect, Table};
use serde_json::{json, Value};

/// A table with a plain field, a field with its own store, a JSON field with
/// extracted keys, an injected field and one index of each kind.
pub fn people() -> Value {
    json!({
        "name": "people",
        "fields": [
            {"name": "id", "kind": "int", "none": false},
            {"name": "name", "store": "full_name", "kind": "str"},
            {"name": "meta", "kind": "dict", "extract": {"a": "int", "b": "str"}},
            {"name": "nick", "kind": "str", "inject": true}
        ],
        "index": {"by_name": ["full_name"]},
        "unique": {"ident": ["id"]}
    })
}

pub fn render(
    definition: Option<Value>,
    migration: Option<Value>,
    dialect: &dyn MigrationDialect,
    layout: Layout,
) -> String {
    let mut table = Table::from_json(definition, migration)
        .unwrap_or_else(|e| panic!("Failed to read migration\nError: {e}"));
    table
        .generate(dialect, layout)
        .unwrap_or_else(|e| panic!("Failed to generate {table:?}\nError: {e}"));
    table.sql().to_string()
}

/// Statements of a rendered migration, terminators removed.
pub fn statements(sql: &str) -> Vec<String> {
    sql.trim_end_matches(";\n")
        .split(";\n\n")
        .map(|statement| statement.trim_start().to_string())
        .collect()
}
