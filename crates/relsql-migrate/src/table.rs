//! Table DDL: create, modify and drop.

use relsql_core::{Layout, Result, SqlError, TableName};
use serde_json::Value;
use tracing::{debug, warn};

use crate::dialect::{Ddl, MigrationDialect};
use crate::diff::{diff, ColumnChange, ColumnSpec};
use crate::schema::{TableDefinition, TableDelta, TableMigration};

/// A table migration.
///
/// With only a migration the table is created from it, with a definition
/// and a delta the table is altered, and with only a definition it is
/// dropped.
#[derive(Debug, Clone)]
pub struct Table {
    definition: Option<TableDefinition>,
    migration: Option<TableMigration>,
    sql: String,
}

impl Table {
    /// Creates a migration from its parts.
    #[must_use]
    pub const fn new(
        definition: Option<TableDefinition>,
        migration: Option<TableMigration>,
    ) -> Self {
        Self {
            definition,
            migration,
            sql: String::new(),
        }
    }

    /// Creates `definition`.
    #[must_use]
    pub const fn create(definition: TableDefinition) -> Self {
        Self::new(None, Some(TableMigration::Create(definition)))
    }

    /// Applies `delta` to `definition`.
    #[must_use]
    pub const fn modify(definition: TableDefinition, delta: TableDelta) -> Self {
        Self::new(Some(definition), Some(TableMigration::Change(delta)))
    }

    /// Drops `definition`.
    #[must_use]
    pub const fn drop(definition: TableDefinition) -> Self {
        Self::new(Some(definition), None)
    }

    /// Reads a migration from JSON documents.
    ///
    /// # Errors
    ///
    /// [`SqlError::MalformedSpec`] when neither document is given or one does
    /// not have the expected shape.
    pub fn from_json(definition: Option<Value>, migration: Option<Value>) -> Result<Self> {
        let definition = definition.map(parse::<TableDefinition>).transpose()?;
        let migration = match (&definition, migration) {
            (_, None) => None,
            (None, Some(migration)) => Some(TableMigration::Create(parse(migration)?)),
            (Some(_), Some(migration)) => Some(TableMigration::Change(parse(migration)?)),
        };
        if definition.is_none() && migration.is_none() {
            return Err(malformed("nothing to migrate"));
        }
        Ok(Self::new(definition, migration))
    }

    /// The current definition.
    #[must_use]
    pub const fn definition(&self) -> Option<&TableDefinition> {
        self.definition.as_ref()
    }

    /// The requested migration.
    #[must_use]
    pub const fn migration(&self) -> Option<&TableMigration> {
        self.migration.as_ref()
    }

    /// Generates the DDL.
    ///
    /// # Errors
    ///
    /// [`SqlError::UnknownField`] when a delta names a field or index the
    /// definition lacks, [`SqlError::MalformedSpec`] for an impossible
    /// combination of definition and migration. On error [`Table::sql`] is
    /// empty, even after an earlier success.
    pub fn generate(&mut self, dialect: &dyn MigrationDialect, layout: Layout) -> Result<()> {
        self.sql.clear();
        let (operation, statements) = match (&self.definition, &self.migration) {
            (None, Some(TableMigration::Create(definition))) => {
                ("create", create_statements(definition, dialect, layout))
            }
            (Some(definition), Some(TableMigration::Change(delta))) => {
                ("modify", modify_statements(definition, delta, dialect, layout)?)
            }
            (Some(definition), None) => ("drop", vec![drop_statement(definition, dialect)]),
            (Some(_), Some(TableMigration::Create(_))) => {
                return Err(malformed("a created table has no current definition"))
            }
            (None, _) => return Err(malformed("a delta needs the current definition")),
        };

        debug!(
            operation,
            dialect = dialect.name(),
            statements = statements.len(),
            "generated table DDL"
        );

        self.sql = if statements.is_empty() {
            String::new()
        } else {
            format!("{};\n", statements.join(&format!(";\n\n{}", layout.current())))
        };
        Ok(())
    }

    /// The generated DDL, empty until [`Table::generate`] succeeds.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

fn parse<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|err| malformed(err.to_string()))
}

fn malformed(message: impl Into<String>) -> SqlError {
    SqlError::MalformedSpec {
        node: "TABLE",
        message: message.into(),
    }
}

fn table_of(definition: &TableDefinition) -> TableName {
    TableName::new(definition.store(), definition.schema.clone())
}

fn create_statements(
    definition: &TableDefinition,
    dialect: &dyn MigrationDialect,
    layout: Layout,
) -> Vec<String> {
    let table = table_of(definition);

    let mut inside: Vec<String> = definition
        .fields
        .iter()
        .filter(|field| !field.inject)
        .flat_map(ColumnSpec::all_of)
        .map(|column| dialect.column_definition(&column))
        .collect();

    let mut indexes = Vec::new();
    for (unique, named) in [(false, &definition.index), (true, &definition.unique)] {
        for (name, columns) in named {
            if dialect.inline_indexes() {
                inside.push(dialect.inline_index(name, columns, unique));
            } else {
                indexes.push(dialect.create_index(&table, name, columns, unique));
            }
        }
    }

    let line = if layout.is_inline() { "" } else { "\n" };
    let next = layout.next();
    let mut statements = vec![format!(
        "CREATE TABLE IF NOT EXISTS {} ({line}{next}{}{line})",
        dialect.table_name(&table),
        inside.join(&format!(",{line}{next}"))
    )];
    statements.extend(indexes);
    statements
}

fn modify_statements(
    definition: &TableDefinition,
    delta: &TableDelta,
    dialect: &dyn MigrationDialect,
    layout: Layout,
) -> Result<Vec<String>> {
    let changes = diff(definition, delta)?;
    let mut statements = Vec::new();
    let mut table = changes.table.clone();

    if let Some(schema) = &changes.schema {
        if let Some(sql) = dialect.move_table(&table, schema) {
            statements.push(sql);
            table.schema = Some(schema.clone());
        } else {
            warn!(
                table = %table.name,
                schema = %schema,
                dialect = dialect.name(),
                "schemas not supported, move skipped"
            );
        }
    }

    if let Some(name) = &changes.rename {
        statements.push(dialect.rename_table(&table, name));
        table.name.clone_from(name);
    }

    // Drops go first so a rename may reuse a dropped column's name.
    let (drops, others): (Vec<&ColumnChange>, Vec<&ColumnChange>) = changes
        .columns
        .iter()
        .partition(|change| matches!(change, ColumnChange::Drop(_)));
    let steps: Vec<Ddl> = drops
        .into_iter()
        .chain(others)
        .flat_map(|change| dialect.column_change(&table, change))
        .chain(
            changes
                .indexes
                .iter()
                .flat_map(|change| dialect.index_change(&table, change)),
        )
        .collect();

    let line = if layout.is_inline() { "" } else { "\n" };
    let alter = format!(
        "ALTER TABLE {}{}{}",
        dialect.table_name(&table),
        if line.is_empty() { " " } else { line },
        layout.next()
    );
    let separator = format!(",{line}{}", layout.next());
    let multi = dialect.multi_action_alter();

    // Pending actions are flushed ahead of every standalone statement.
    let mut actions: Vec<String> = Vec::new();
    let mut indexes = Vec::new();
    for step in steps {
        match step {
            Ddl::Statement(sql) => {
                if !actions.is_empty() {
                    statements.push(format!("{alter}{}", actions.join(&separator)));
                    actions.clear();
                }
                statements.push(sql);
            }
            Ddl::Action(action) if multi => actions.push(action),
            Ddl::Action(action) => statements.push(format!("{alter}{action}")),
            Ddl::Index(sql) => indexes.push(sql),
        }
    }

    if !actions.is_empty() {
        statements.push(format!("{alter}{}", actions.join(&separator)));
    }
    statements.extend(indexes);
    Ok(statements)
}

fn drop_statement(definition: &TableDefinition, dialect: &dyn MigrationDialect) -> String {
    format!("DROP TABLE {}", dialect.table_name(&table_of(definition)))
}

#[cfg(test)]
mod tests {
    use relsql_core::{MySqlDialect, PostgresDialect, SqliteDialect};
    use serde_json::json;

    use super::*;
    use crate::schema::FieldDefinition;

    fn render(table: &mut Table, dialect: &dyn MigrationDialect, layout: Layout) -> String {
        table.generate(dialect, layout).unwrap();
        table.sql().to_string()
    }

    fn people() -> Value {
        json!({
            "name": "people",
            "fields": [
                {"name": "id", "kind": "int", "none": false},
                {"name": "name", "kind": "str", "default": ""},
                {"name": "meta", "kind": "dict", "extract": {"b": "str", "a": "int"}},
                {"name": "nick", "kind": "str", "inject": true}
            ],
            "index": {"by_name": ["name"]},
            "unique": {"ident": ["id"]}
        })
    }

    #[test]
    fn test_create_inline_indexes() {
        let mut table = Table::from_json(None, Some(people())).unwrap();
        assert_eq!(
            render(&mut table, &MySqlDialect::new(), Layout::inline()),
            "CREATE TABLE IF NOT EXISTS `people` (\
             `id` BIGINT NOT NULL,\
             `name` VARCHAR(255) DEFAULT '',\
             `meta` JSON,\
             `meta_a` BIGINT,\
             `meta_b` VARCHAR(255),\
             INDEX `by_name` (`name`),\
             UNIQUE `ident` (`id`));\n"
        );
    }

    #[test]
    fn test_create_indented() {
        let mut table = Table::from_json(None, Some(people())).unwrap();
        assert_eq!(
            render(&mut table, &PostgresDialect::new(), Layout::indented(2)),
            "CREATE TABLE IF NOT EXISTS \"people\" (\n\
             \x20 \"id\" BIGINT NOT NULL,\n\
             \x20 \"name\" VARCHAR(255) DEFAULT '',\n\
             \x20 \"meta\" JSONB,\n\
             \x20 \"meta_a\" BIGINT,\n\
             \x20 \"meta_b\" VARCHAR(255)\n\
             );\n\n\
             CREATE INDEX \"by_name\" ON \"people\" (\"name\");\n\n\
             CREATE UNIQUE INDEX \"ident\" ON \"people\" (\"id\");\n"
        );
    }

    #[test]
    fn test_create_nested_count() {
        let mut table = Table::create(TableDefinition::new("t").field(FieldDefinition::new("a", "int")));
        assert_eq!(
            render(&mut table, &SqliteDialect::new(), Layout::indented(2).at(1)),
            "CREATE TABLE IF NOT EXISTS \"t\" (\n    \"a\" INTEGER\n);\n"
        );
    }

    #[test]
    fn test_modify_mysql() {
        let delta = json!({
            "fields": {
                "add": [{"name": "age", "kind": "int"}],
                "change": {"name": {"store": "label"}},
                "remove": ["meta"]
            },
            "index": {"rename": {"by_name": "by_label"}},
            "unique": {"add": {"both": ["id", "label"]}}
        });
        let mut table = Table::from_json(Some(people()), Some(delta)).unwrap();
        assert_eq!(
            render(&mut table, &MySqlDialect::new(), Layout::inline()),
            "ALTER TABLE `people` \
             DROP `meta`,\
             DROP `meta_a`,\
             DROP `meta_b`,\
             ADD `age` BIGINT,\
             CHANGE `name` `label` VARCHAR(255) DEFAULT '',\
             RENAME INDEX `by_name` TO `by_label`,\
             ADD UNIQUE `both` (`id`,`label`);\n"
        );
    }

    #[test]
    fn test_modify_indented_with_rename() {
        let delta = json!({
            "name": "persons",
            "fields": {"add": [{"name": "age", "kind": "int"}, {"name": "x", "kind": "int"}]}
        });
        let mut table = Table::from_json(Some(people()), Some(delta)).unwrap();
        assert_eq!(
            render(&mut table, &MySqlDialect::new(), Layout::indented(2)),
            "RENAME TABLE `people` TO `persons`;\n\n\
             ALTER TABLE `persons`\n\
             \x20 ADD `age` BIGINT,\n\
             \x20 ADD `x` BIGINT;\n"
        );
    }

    #[test]
    fn test_modify_postgres() {
        let delta = json!({
            "schema": "archive",
            "fields": {"change": {"id": {"name": "ident", "kind": "str"}}},
            "index": {"remove": ["by_name"]}
        });
        let mut table = Table::from_json(Some(people()), Some(delta)).unwrap();
        assert_eq!(
            render(&mut table, &PostgresDialect::new(), Layout::inline()),
            "ALTER TABLE \"people\" SET SCHEMA \"archive\";\n\n\
             ALTER TABLE \"archive\".\"people\" RENAME COLUMN \"id\" TO \"ident\";\n\n\
             ALTER TABLE \"archive\".\"people\" \
             ALTER COLUMN \"ident\" TYPE VARCHAR(255) USING \"ident\"::VARCHAR(255);\n\n\
             DROP INDEX \"archive\".\"by_name\";\n"
        );
    }

    #[test]
    fn test_modify_sqlite_one_action_per_alter() {
        let delta = json!({
            "schema": "archive",
            "fields": {
                "add": [{"name": "age", "kind": "int"}],
                "change": {"name": {"store": "label", "none": false}},
                "remove": ["meta"]
            },
            "unique": {"rename": {"ident": "key"}}
        });
        let mut table = Table::from_json(Some(people()), Some(delta)).unwrap();
        assert_eq!(
            render(&mut table, &SqliteDialect::new(), Layout::inline()),
            "ALTER TABLE \"people\" DROP COLUMN \"meta\";\n\n\
             ALTER TABLE \"people\" DROP COLUMN \"meta_a\";\n\n\
             ALTER TABLE \"people\" DROP COLUMN \"meta_b\";\n\n\
             ALTER TABLE \"people\" ADD COLUMN \"age\" INTEGER;\n\n\
             ALTER TABLE \"people\" RENAME COLUMN \"name\" TO \"label\";\n\n\
             -- SQLite does not support altering column \"label\", table recreation required;\n\n\
             DROP INDEX \"ident\";\n\n\
             CREATE UNIQUE INDEX \"key\" ON \"people\" (\"id\");\n"
        );
    }

    #[test]
    fn test_modify_nothing() {
        let mut table = Table::from_json(Some(people()), Some(json!({}))).unwrap();
        assert_eq!(render(&mut table, &MySqlDialect::new(), Layout::inline()), "");
    }

    #[test]
    fn test_unknown_field_produces_nothing() {
        let delta = json!({
            "fields": {"add": [{"name": "age", "kind": "int"}], "remove": ["nope"]}
        });
        let mut table = Table::from_json(Some(people()), Some(delta)).unwrap();
        let err = table.generate(&MySqlDialect::new(), Layout::inline()).unwrap_err();
        assert_eq!(
            err,
            SqlError::UnknownField {
                node: "TABLE",
                field: String::from("nope"),
            }
        );
        assert_eq!(table.sql(), "");
    }

    #[test]
    fn test_drop() {
        let mut definition = people();
        definition["store"] = json!("tbl_people");
        definition["schema"] = json!("app");
        let mut table = Table::from_json(Some(definition), None).unwrap();
        assert_eq!(
            render(&mut table, &MySqlDialect::new(), Layout::indented(2)),
            "DROP TABLE `app`.`tbl_people`;\n"
        );
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            Table::from_json(None, None),
            Err(SqlError::MalformedSpec { node: "TABLE", .. })
        ));
        assert!(matches!(
            Table::from_json(None, Some(json!({"fields": []}))),
            Err(SqlError::MalformedSpec { .. })
        ));
        let mut table = Table::new(None, Some(TableMigration::Change(TableDelta::default())));
        assert!(table.generate(&MySqlDialect::new(), Layout::inline()).is_err());
    }
}
