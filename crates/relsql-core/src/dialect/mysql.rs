//! MySQL dialect.

use super::Dialect;
use crate::criterion::{CriterionKind, CriterionSpec};

/// MySQL: backtick identifiers, `%s` placeholders, `->>` JSON extraction.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn json_extract(&self, jsonify: bool) -> &'static str {
        if jsonify {
            "{}->{}"
        } else {
            "{}->>{}"
        }
    }

    // `->>` yields the string 'null' for a JSON null.
    fn json_null(&self) -> Option<&'static str> {
        Some("NULLIF({},'null')")
    }

    fn criterion(&self, kind: CriterionKind) -> CriterionSpec {
        let spec = kind.spec();
        match kind {
            CriterionKind::Contains => CriterionSpec {
                operand: "JSON_CONTAINS({},{})",
                invert: Some("NOT JSON_CONTAINS({},{})"),
                ..spec
            },
            CriterionKind::Lengths => CriterionSpec {
                operand: "JSON_LENGTH({})=JSON_LENGTH({})",
                invert: Some("JSON_LENGTH({})!=JSON_LENGTH({})"),
                ..spec
            },
            _ => spec,
        }
    }
}
