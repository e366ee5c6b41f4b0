//! # relsql-core
//!
//! Indentation-aware SQL rendering with ordered bound parameters.
//!
//! This crate provides:
//! - Leaf expressions (values, lists, column and table names) and wrappers
//! - Criteria: comparisons, pattern matches, membership, ranges, JSON
//!   containment and null tests, with JSON-path addressing of columns
//! - Clauses (`WHERE`, `ORDER BY`, `LIMIT`, `VALUES`, ...) assembled from
//!   positional and named arguments
//! - Dialects for generic SQL, MySQL, PostgreSQL and SQLite
//!
//! Every node renders to SQL text with placeholders plus the values for
//! those placeholders, in order. Values are never inlined.
//!
//! ```rust
//! use relsql_core::{Args, Clause, ClauseKind, GenericDialect, Layout, Node, SqlValue};
//!
//! let mut clause = Clause::with(
//!     ClauseKind::Where,
//!     Args::new().arg("people").named("stuff", "things"),
//! )
//! .unwrap();
//! clause.generate(&GenericDialect::new(), Layout::inline()).unwrap();
//!
//! assert_eq!(clause.sql(), "WHERE %s AND `stuff`=%s");
//! assert_eq!(
//!     clause.args(),
//!     &[SqlValue::from("people"), SqlValue::from("things")]
//! );
//! ```
//!
//! ## JSON paths
//!
//! A `__` in a field name addresses a path inside a JSON column:
//!
//! ```rust
//! use relsql_core::{Criterion, GenericDialect, Layout, Node};
//!
//! let mut criterion = Criterion::eq("totes__a", "maigoats");
//! criterion.generate(&GenericDialect::new(), Layout::inline()).unwrap();
//!
//! assert_eq!(criterion.sql(), "`totes`#>>%s=%s");
//! ```

pub mod args;
pub mod clause;
pub mod criterion;
pub mod dialect;
pub mod error;
pub mod expression;
pub mod node;
pub mod value;

pub use args::{Arg, Args};
pub use clause::{Chain, Clause, ClauseKind, ClauseSpec, Limit, Statement, Values};
pub use criterion::{op, Criterion, CriterionKind, CriterionSpec, IsNull, Logic, Operand};
pub use dialect::{Dialect, GenericDialect, MySqlDialect, PostgresDialect, SqliteDialect};
pub use error::{Result, SqlError};
pub use expression::{
    As, Assign, ColumnName, Direction, ListStyle, Name, Order, Sql, TableName, Value, ValueList,
};
pub use node::{express, express_node, fill, Generated, Layout, Node};
pub use value::{json_list, SqlValue, ToSqlValue};
