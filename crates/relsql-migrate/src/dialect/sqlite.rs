//! SQLite migrations.
//!
//! SQLite has limited ALTER TABLE support: one action per statement, no
//! schemas to move between and no way to change a column's type, default or
//! nullability in place. Those changes are emitted as comments since they
//! require the table recreation strategy. Index renames drop and recreate
//! the index.

use relsql_core::{Dialect, SqliteDialect, TableName};

use super::{Ddl, MigrationDialect};
use crate::diff::{ColumnSpec, IndexChange};

impl MigrationDialect for SqliteDialect {
    fn column_type(&self, kind: &str) -> String {
        match kind {
            "bool" | "int" => String::from("INTEGER"),
            "float" => String::from("REAL"),
            "str" | "list" | "dict" => String::from("TEXT"),
            other => other.to_string(),
        }
    }

    fn multi_action_alter(&self) -> bool {
        false
    }

    fn move_table(&self, _table: &TableName, _schema: &str) -> Option<String> {
        None
    }

    fn alter_column(&self, _table: &TableName, from: &ColumnSpec, to: &ColumnSpec) -> Vec<Ddl> {
        let mut steps = Vec::new();

        if from.store != to.store {
            steps.push(Ddl::Action(format!(
                "RENAME COLUMN {} TO {}",
                self.quote_identifier(&from.store),
                self.quote_identifier(&to.store)
            )));
        }

        if from.kind != to.kind || from.default != to.default || from.none != to.none {
            steps.push(Ddl::Statement(format!(
                "-- SQLite does not support altering column {}, table recreation required",
                self.quote_identifier(&to.store)
            )));
        }

        steps
    }

    fn index_change(&self, table: &TableName, change: &IndexChange) -> Vec<Ddl> {
        match change {
            IndexChange::Add {
                name,
                columns,
                unique,
            } => vec![Ddl::Index(self.create_index(table, name, columns, *unique))],
            IndexChange::Rename {
                from,
                to,
                columns,
                unique,
            } => vec![
                Ddl::Index(self.drop_index(table, from)),
                Ddl::Index(self.create_index(table, to, columns, *unique)),
            ],
            IndexChange::Drop { name, .. } => vec![Ddl::Index(self.drop_index(table, name))],
        }
    }
}
