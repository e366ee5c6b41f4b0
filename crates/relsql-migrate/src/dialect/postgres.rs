//! PostgreSQL migrations.
//!
//! Indexes are separate statements. Column renames are their own
//! `ALTER TABLE ... RENAME COLUMN`; type, default and null changes become
//! `ALTER COLUMN` actions on the new name.

use relsql_core::{Dialect, PostgresDialect, TableName};

use super::{Ddl, MigrationDialect};
use crate::diff::ColumnSpec;

impl MigrationDialect for PostgresDialect {
    fn column_type(&self, kind: &str) -> String {
        match kind {
            "bool" => String::from("BOOLEAN"),
            "int" => String::from("BIGINT"),
            "float" => String::from("DOUBLE PRECISION"),
            "str" => String::from("VARCHAR(255)"),
            "list" | "dict" => String::from("JSONB"),
            other => other.to_string(),
        }
    }

    fn move_table(&self, table: &TableName, schema: &str) -> Option<String> {
        Some(format!(
            "ALTER TABLE {} SET SCHEMA {}",
            self.table_name(table),
            self.quote_identifier(schema)
        ))
    }

    fn alter_column(&self, table: &TableName, from: &ColumnSpec, to: &ColumnSpec) -> Vec<Ddl> {
        let mut steps = Vec::new();
        let column = self.quote_identifier(&to.store);

        if from.store != to.store {
            steps.push(Ddl::Statement(format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {column}",
                self.table_name(table),
                self.quote_identifier(&from.store)
            )));
        }

        if from.kind != to.kind {
            let kind = self.column_type(&to.kind);
            steps.push(Ddl::Action(format!(
                "ALTER COLUMN {column} TYPE {kind} USING {column}::{kind}"
            )));
        }

        if from.default != to.default {
            steps.push(Ddl::Action(match &to.default {
                Some(default) => format!(
                    "ALTER COLUMN {column} SET DEFAULT {}",
                    self.default_literal(default)
                ),
                None => format!("ALTER COLUMN {column} DROP DEFAULT"),
            }));
        }

        if from.none != to.none {
            steps.push(Ddl::Action(if to.none == Some(false) {
                format!("ALTER COLUMN {column} SET NOT NULL")
            } else {
                format!("ALTER COLUMN {column} DROP NOT NULL")
            }));
        }

        steps
    }
}
