//! MySQL migrations.
//!
//! Indexes are declared inline and every change to a table goes into a
//! single `ALTER TABLE`. Column changes use `CHANGE`, which restates the
//! whole column.

use relsql_core::{Dialect, MySqlDialect, TableName};

use super::{Ddl, MigrationDialect};
use crate::diff::{ColumnSpec, IndexChange};

impl MigrationDialect for MySqlDialect {
    fn column_type(&self, kind: &str) -> String {
        match kind {
            "bool" => String::from("BOOLEAN"),
            "int" => String::from("BIGINT"),
            "float" => String::from("DOUBLE"),
            "str" => String::from("VARCHAR(255)"),
            "list" | "dict" => String::from("JSON"),
            other => other.to_string(),
        }
    }

    fn inline_indexes(&self) -> bool {
        true
    }

    fn move_table(&self, table: &TableName, schema: &str) -> Option<String> {
        Some(format!(
            "RENAME TABLE {} TO {}",
            self.table_name(table),
            self.table_name(&TableName::new(table.name.clone(), Some(schema.to_string())))
        ))
    }

    fn rename_table(&self, table: &TableName, name: &str) -> String {
        format!(
            "RENAME TABLE {} TO {}",
            self.table_name(table),
            self.table_name(&TableName::new(name, table.schema.clone()))
        )
    }

    fn add_column(&self, column: &ColumnSpec) -> Ddl {
        Ddl::Action(format!("ADD {}", self.column_definition(column)))
    }

    fn alter_column(&self, _table: &TableName, from: &ColumnSpec, to: &ColumnSpec) -> Vec<Ddl> {
        if from == to {
            return Vec::new();
        }
        vec![Ddl::Action(format!(
            "CHANGE {} {}",
            self.quote_identifier(&from.store),
            self.column_definition(to)
        ))]
    }

    fn drop_column(&self, column: &ColumnSpec) -> Ddl {
        Ddl::Action(format!("DROP {}", self.quote_identifier(&column.store)))
    }

    fn index_change(&self, _table: &TableName, change: &IndexChange) -> Vec<Ddl> {
        let action = match change {
            IndexChange::Add {
                name,
                columns,
                unique,
            } => format!("ADD {}", self.inline_index(name, columns, *unique)),
            IndexChange::Rename { from, to, .. } => format!(
                "RENAME INDEX {} TO {}",
                self.quote_identifier(from),
                self.quote_identifier(to)
            ),
            IndexChange::Drop { name, .. } => {
                format!("DROP INDEX {}", self.quote_identifier(name))
            }
        };
        vec![Ddl::Action(action)]
    }
}
