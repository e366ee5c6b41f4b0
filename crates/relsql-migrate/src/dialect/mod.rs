//! DDL generation per database.
//!
//! [`MigrationDialect`] extends the query [`Dialect`] with what table
//! migrations need: column types, column definitions and the statements for
//! each column and index change. It is implemented directly on the query
//! dialects, so one dialect value drives both.

mod mysql;
mod postgres;
mod sqlite;

use relsql_core::{Dialect, MySqlDialect, PostgresDialect, SqliteDialect, SqlValue, TableName};
use serde_json::Value;

use crate::diff::{ColumnChange, ColumnSpec, IndexChange};

/// One rendered piece of a migration, by where it lands in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ddl {
    /// A statement of its own, emitted ahead of the table's `ALTER TABLE`.
    Statement(String),
    /// An action inside `ALTER TABLE <table> ...`.
    Action(String),
    /// An index statement, emitted after the table's `ALTER TABLE`.
    Index(String),
}

/// Trait for database-specific DDL generation.
pub trait MigrationDialect: Dialect {
    /// Column type for a field kind.
    fn column_type(&self, kind: &str) -> String;

    /// Whether indexes are declared inside `CREATE TABLE` and `ALTER TABLE`.
    fn inline_indexes(&self) -> bool {
        false
    }

    /// Whether one `ALTER TABLE` may carry several actions.
    fn multi_action_alter(&self) -> bool {
        true
    }

    /// Quoted, schema-qualified table name.
    fn table_name(&self, table: &TableName) -> String {
        match &table.schema {
            Some(schema) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(&table.name)
            ),
            None => self.quote_identifier(&table.name),
        }
    }

    /// Literal for a column default.
    fn default_literal(&self, value: &Value) -> String {
        SqlValue::from_json(value).to_sql_inline()
    }

    /// Full column definition.
    fn column_definition(&self, column: &ColumnSpec) -> String {
        let mut sql = self.quote_identifier(&column.store);
        sql.push(' ');
        sql.push_str(&self.column_type(&column.kind));

        if column.none == Some(false) {
            sql.push_str(" NOT NULL");
        }

        if let Some(default) = &column.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.default_literal(default));
        }

        sql
    }

    /// Parenthesized, quoted column list of an index.
    fn index_columns(&self, columns: &[String]) -> String {
        let quoted: Vec<String> = columns.iter().map(|c| self.quote_identifier(c)).collect();
        format!("({})", quoted.join(","))
    }

    /// Index declared inside a table definition.
    fn inline_index(&self, name: &str, columns: &[String], unique: bool) -> String {
        format!(
            "{} {} {}",
            if unique { "UNIQUE" } else { "INDEX" },
            self.quote_identifier(name),
            self.index_columns(columns)
        )
    }

    /// Standalone `CREATE INDEX`.
    fn create_index(
        &self,
        table: &TableName,
        name: &str,
        columns: &[String],
        unique: bool,
    ) -> String {
        format!(
            "CREATE {}INDEX {} ON {} {}",
            if unique { "UNIQUE " } else { "" },
            self.quote_identifier(name),
            self.table_name(table),
            self.index_columns(columns)
        )
    }

    /// Standalone index rename. Indexes live in their table's schema.
    fn rename_index(&self, table: &TableName, from: &str, to: &str) -> Vec<String> {
        vec![format!(
            "ALTER INDEX {} RENAME TO {}",
            self.table_name(&TableName::new(from, table.schema.clone())),
            self.quote_identifier(to)
        )]
    }

    /// Standalone `DROP INDEX`.
    fn drop_index(&self, table: &TableName, name: &str) -> String {
        format!(
            "DROP INDEX {}",
            self.table_name(&TableName::new(name, table.schema.clone()))
        )
    }

    /// Statement moving a table into `schema`, if the database has schemas.
    fn move_table(&self, table: &TableName, schema: &str) -> Option<String>;

    /// Statement renaming a table within its schema.
    fn rename_table(&self, table: &TableName, name: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.table_name(table),
            self.quote_identifier(name)
        )
    }

    /// Adding a column.
    fn add_column(&self, column: &ColumnSpec) -> Ddl {
        Ddl::Action(format!("ADD COLUMN {}", self.column_definition(column)))
    }

    /// Changing a column from one spec to another.
    fn alter_column(&self, table: &TableName, from: &ColumnSpec, to: &ColumnSpec) -> Vec<Ddl>;

    /// Dropping a column.
    fn drop_column(&self, column: &ColumnSpec) -> Ddl {
        Ddl::Action(format!("DROP COLUMN {}", self.quote_identifier(&column.store)))
    }

    /// Renders one column change against `table`.
    fn column_change(&self, table: &TableName, change: &ColumnChange) -> Vec<Ddl> {
        match change {
            ColumnChange::Add(column) => vec![self.add_column(column)],
            ColumnChange::Alter { from, to } => self.alter_column(table, from, to),
            ColumnChange::Drop(column) => vec![self.drop_column(column)],
        }
    }

    /// Renders one index change against `table`.
    fn index_change(&self, table: &TableName, change: &IndexChange) -> Vec<Ddl> {
        match change {
            IndexChange::Add {
                name,
                columns,
                unique,
            } => vec![Ddl::Index(self.create_index(table, name, columns, *unique))],
            IndexChange::Rename { from, to, .. } => self
                .rename_index(table, from, to)
                .into_iter()
                .map(Ddl::Index)
                .collect(),
            IndexChange::Drop { name, .. } => vec![Ddl::Index(self.drop_index(table, name))],
        }
    }
}

/// Looks up a migration dialect by name.
#[must_use]
pub fn dialect_for(name: &str) -> Option<Box<dyn MigrationDialect>> {
    match name.to_ascii_lowercase().as_str() {
        "mysql" => Some(Box::new(MySqlDialect::new())),
        "postgres" | "postgresql" => Some(Box::new(PostgresDialect::new())),
        "sqlite" => Some(Box::new(SqliteDialect::new())),
        _ => None,
    }
}
