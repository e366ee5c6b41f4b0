//! SQL Dialect support.
//!
//! Different databases quote identifiers, mark placeholders and address JSON
//! content differently. This module provides a trait for dialect-specific
//! behavior, with defaults matching [`GenericDialect`].

mod generic;
mod mysql;
mod postgres;
mod sqlite;

pub use generic::GenericDialect;
pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::criterion::{CriterionKind, CriterionSpec};
use crate::node::fill;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '`'
    }

    /// Returns the parameter placeholder.
    fn parameter_placeholder(&self) -> &'static str {
        "%s"
    }

    /// Quotes an identifier, doubling embedded quote characters.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let escaped = name.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }

    /// Template extracting a path from a JSON column, with `{}` for the
    /// column and the path placeholder.
    ///
    /// `jsonify` selects the operator returning JSON rather than text.
    fn json_extract(&self, jsonify: bool) -> &'static str {
        if jsonify {
            "{}#>{}"
        } else {
            "{}#>>{}"
        }
    }

    /// Encodes a JSON path for binding. Integer segments index arrays.
    fn json_path(&self, path: &[String]) -> String {
        let mut encoded = String::from("$");
        for segment in path {
            if segment.parse::<i64>().is_ok() {
                encoded.push_str(&format!("[{segment}]"));
            } else {
                encoded.push_str(&format!(".\"{}\"", segment.replace('"', "\\\"")));
            }
        }
        encoded
    }

    /// Template normalizing a JSON `null` extracted from a path to SQL NULL.
    fn json_null(&self) -> Option<&'static str> {
        None
    }

    /// Rendering descriptor of a criterion kind.
    fn criterion(&self, kind: CriterionKind) -> CriterionSpec {
        kind.spec()
    }

    /// Renders a column with a JSON path.
    fn json_column(&self, column: &str, jsonify: bool) -> String {
        fill(
            self.json_extract(jsonify),
            &[column, self.parameter_placeholder()],
        )
    }
}
