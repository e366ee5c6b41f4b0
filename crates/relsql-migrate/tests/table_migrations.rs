//! Table migrations across dialects.

mod common;

use common::{people, render, statements};
use relsql_core::{Layout, MySqlDialect, PostgresDialect, SqlError, SqliteDialect};
use relsql_migrate::{
    ColumnChange, ColumnSpec, MigrationDialect, Table, TableDefinition, TableDelta,
};
use serde_json::json;

#[test]
fn test_create_inline_vs_separate_indexes() {
    let mysql = render(None, Some(people()), &MySqlDialect::new(), Layout::inline());
    assert_eq!(statements(&mysql).len(), 1);
    assert!(mysql.contains("INDEX `by_name` (`full_name`),UNIQUE `ident` (`id`))"));

    let sqlite = render(None, Some(people()), &SqliteDialect::new(), Layout::inline());
    assert_eq!(
        statements(&sqlite),
        vec![
            String::from(
                "CREATE TABLE IF NOT EXISTS \"people\" (\
                 \"id\" INTEGER NOT NULL,\
                 \"full_name\" TEXT,\
                 \"meta\" TEXT,\
                 \"meta_a\" INTEGER,\
                 \"meta_b\" TEXT)"
            ),
            String::from("CREATE INDEX \"by_name\" ON \"people\" (\"full_name\")"),
            String::from("CREATE UNIQUE INDEX \"ident\" ON \"people\" (\"id\")"),
        ]
    );
}

#[test]
fn test_injected_fields_never_materialize() {
    for dialect in [
        &MySqlDialect::new() as &dyn MigrationDialect,
        &PostgresDialect::new(),
        &SqliteDialect::new(),
    ] {
        let sql = render(None, Some(people()), dialect, Layout::indented(2));
        assert!(!sql.contains("nick"), "{sql}");
    }

    let delta = json!({"fields": {"change": {"nick": {"kind": "int"}}, "remove": ["nick"]}});
    assert_eq!(
        render(Some(people()), Some(delta), &MySqlDialect::new(), Layout::inline()),
        ""
    );
}

#[test]
fn test_extract_keys_add_and_drop() {
    let delta = json!({"fields": {"change": {"meta": {"extract": {"a": "int", "c": "float"}}}}});
    let sql = render(Some(people()), Some(delta), &MySqlDialect::new(), Layout::inline());
    assert_eq!(sql, "ALTER TABLE `people` DROP `meta_b`,ADD `meta_c` DOUBLE;\n");
}

#[test]
fn test_store_rename_moves_extract_columns() {
    let delta = json!({"fields": {"change": {"meta": {"store": "info"}}}});
    let sql = render(Some(people()), Some(delta), &SqliteDialect::new(), Layout::inline());
    assert_eq!(
        statements(&sql),
        vec![
            String::from("ALTER TABLE \"people\" RENAME COLUMN \"meta\" TO \"info\""),
            String::from("ALTER TABLE \"people\" RENAME COLUMN \"meta_a\" TO \"info_a\""),
            String::from("ALTER TABLE \"people\" RENAME COLUMN \"meta_b\" TO \"info_b\""),
        ]
    );
}

#[test]
fn test_unknown_field_fails_before_output() {
    let delta = json!({
        "name": "persons",
        "fields": {"add": [{"name": "age", "kind": "int"}], "change": {"ghost": {"kind": "int"}}}
    });
    let mut table = Table::from_json(Some(people()), Some(delta)).unwrap();
    let err = table
        .generate(&PostgresDialect::new(), Layout::indented(2))
        .unwrap_err();
    assert_eq!(err.to_string(), "TABLE: field ghost not found");
    assert!(matches!(err, SqlError::UnknownField { .. }));
    assert!(table.sql().is_empty());
}

#[test]
fn test_sqlite_one_action_per_alter() {
    let delta = json!({
        "fields": {
            "add": [{"name": "age", "kind": "int"}, {"name": "tags", "kind": "list"}],
            "remove": ["id"]
        }
    });
    let sql = render(Some(people()), Some(delta), &SqliteDialect::new(), Layout::indented(2));
    assert_eq!(
        sql,
        "ALTER TABLE \"people\"\n  DROP COLUMN \"id\";\n\n\
         ALTER TABLE \"people\"\n  ADD COLUMN \"age\" INTEGER;\n\n\
         ALTER TABLE \"people\"\n  ADD COLUMN \"tags\" TEXT;\n"
    );
}

#[test]
fn test_postgres_rename_then_alter() {
    let delta = json!({
        "name": "persons",
        "schema": "archive",
        "fields": {"change": {"name": {"store": "label", "none": false}}},
        "unique": {"add": {"label": ["label"]}}
    });
    let sql = render(Some(people()), Some(delta), &PostgresDialect::new(), Layout::indented(2).at(1));
    assert_eq!(
        sql,
        "ALTER TABLE \"people\" SET SCHEMA \"archive\";\n\n  \
         ALTER TABLE \"archive\".\"people\" RENAME TO \"persons\";\n\n  \
         ALTER TABLE \"archive\".\"persons\" RENAME COLUMN \"full_name\" TO \"label\";\n\n  \
         ALTER TABLE \"archive\".\"persons\"\n    ALTER COLUMN \"label\" SET NOT NULL;\n\n  \
         CREATE UNIQUE INDEX \"label\" ON \"archive\".\"persons\" (\"label\");\n"
    );
}

#[test]
fn test_rename_into_dropped_column() {
    let delta = json!({"fields": {"change": {"name": {"store": "id"}}, "remove": ["id"]}});

    let sql = render(
        Some(people()),
        Some(delta.clone()),
        &PostgresDialect::new(),
        Layout::inline(),
    );
    assert_eq!(
        statements(&sql),
        vec![
            "ALTER TABLE \"people\" DROP COLUMN \"id\"",
            "ALTER TABLE \"people\" RENAME COLUMN \"full_name\" TO \"id\"",
        ]
    );

    let sql = render(Some(people()), Some(delta), &MySqlDialect::new(), Layout::inline());
    assert_eq!(
        sql,
        "ALTER TABLE `people` DROP `id`,CHANGE `full_name` `id` VARCHAR(255);\n"
    );
}

#[test]
fn test_logical_rename_keeps_stored_names() {
    let mut definition = people();
    definition["store"] = json!("tbl_people");
    let delta = json!({"name": "persons", "fields": {"change": {"name": {"name": "label"}}}});
    let sql = render(Some(definition), Some(delta), &MySqlDialect::new(), Layout::inline());
    assert_eq!(sql, "");
}

#[test]
fn test_typed_api() {
    let definition: TableDefinition = serde_json::from_value(people()).unwrap();
    let delta: TableDelta =
        serde_json::from_value(json!({"fields": {"change": {"id": {"default": 0}}}})).unwrap();

    let changes = relsql_migrate::diff(&definition, &delta).unwrap();
    let mut to = ColumnSpec::new("id", "int");
    to.none = Some(false);
    to.default = Some(json!(0));
    let mut from = to.clone();
    from.default = None;
    assert_eq!(changes.columns, vec![ColumnChange::Alter { from, to }]);

    let mut table = Table::modify(definition.clone(), delta);
    table.generate(&MySqlDialect::new(), Layout::inline()).unwrap();
    assert_eq!(
        table.sql(),
        "ALTER TABLE `people` CHANGE `id` `id` BIGINT NOT NULL DEFAULT 0;\n"
    );

    let mut table = Table::drop(definition);
    table.generate(&PostgresDialect::new(), Layout::inline()).unwrap();
    assert_eq!(table.sql(), "DROP TABLE \"people\";\n");
}
