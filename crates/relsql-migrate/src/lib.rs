//! Table migrations rendered as DDL.
//!
//! `relsql-migrate` turns a declarative description of a table into
//! `CREATE TABLE`, `ALTER TABLE` and `DROP TABLE` statements:
//! - **Schema** - serde types for a table definition and the delta applied
//!   to it
//! - **Diff** - the physical column, index and table changes a delta makes
//! - **Dialect** - database-specific DDL for each change
//! - **Table** - assembles the statements, indentation aware
//!
//! # Example
//!
//! ```rust
//! use relsql_core::{Layout, MySqlDialect};
//! use relsql_migrate::{FieldDefinition, Table, TableDefinition};
//!
//! let definition = TableDefinition::new("people")
//!     .field(FieldDefinition::new("id", "int").none(false))
//!     .unique("ident", &["id"]);
//!
//! let mut table = Table::create(definition);
//! table.generate(&MySqlDialect::new(), Layout::inline()).unwrap();
//!
//! assert_eq!(
//!     table.sql(),
//!     "CREATE TABLE IF NOT EXISTS `people` (`id` BIGINT NOT NULL,UNIQUE `ident` (`id`));\n"
//! );
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Create a table
//! relsql-migrate --dialect postgres --migration people.json
//!
//! # Alter it, indented
//! relsql-migrate --indent 2 --definition people.json --migration delta.json
//!
//! # Drop it
//! relsql-migrate --dialect sqlite --definition people.json
//! ```

use std::path::Path;

use relsql_core::Layout;
use serde_json::Value;

pub mod dialect;
pub mod diff;
pub mod error;
pub mod schema;
pub mod table;

pub use dialect::{dialect_for, Ddl, MigrationDialect};
pub use diff::{diff, ChangeSet, ColumnChange, ColumnSpec, IndexChange};
pub use error::{MigrateError, Result};
pub use schema::{
    FieldDefinition, FieldDelta, FieldsDelta, IndexDelta, TableDefinition, TableDelta,
    TableMigration,
};
pub use table::Table;

/// Reads a JSON spec file.
///
/// # Errors
///
/// [`MigrateError::Io`] if the file cannot be read, [`MigrateError::Parse`]
/// if it is not JSON.
pub fn load(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path).map_err(|source| MigrateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| MigrateError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the given spec files and renders the migration.
///
/// # Errors
///
/// Any load error, or the table's generation error.
pub fn migrate(
    definition: Option<&Path>,
    migration: Option<&Path>,
    dialect: &dyn MigrationDialect,
    layout: Layout,
) -> Result<String> {
    let definition = definition.map(load).transpose()?;
    let migration = migration.map(load).transpose()?;

    let mut table = Table::from_json(definition, migration)?;
    table.generate(dialect, layout)?;
    Ok(table.sql().to_string())
}
