//! SQLite dialect.
//!
//! `CONTAINS` and `LENGTHS` keep their generic spelling; connections are
//! expected to register them as application-defined functions.

use super::Dialect;

/// SQLite: double-quoted identifiers, `?` placeholders, `->>` JSON extraction.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn identifier_quote(&self) -> char {
        '"'
    }

    fn parameter_placeholder(&self) -> &'static str {
        "?"
    }

    fn json_extract(&self, jsonify: bool) -> &'static str {
        if jsonify {
            "{}->{}"
        } else {
            "{}->>{}"
        }
    }
}
