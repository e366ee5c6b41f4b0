//! PostgreSQL dialect.

use super::Dialect;
use crate::criterion::{CriterionKind, CriterionSpec};

/// PostgreSQL: double-quoted identifiers, `%s` placeholders and `#>>` JSON
/// extraction with `{a,b}` text-array paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn path_segment(segment: &str) -> String {
    let plain = !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    if plain {
        segment.to_string()
    } else {
        format!(
            "\"{}\"",
            segment.replace('\\', "\\\\").replace('"', "\\\"")
        )
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn identifier_quote(&self) -> char {
        '"'
    }

    fn json_path(&self, path: &[String]) -> String {
        let segments: Vec<String> = path.iter().map(|s| path_segment(s)).collect();
        format!("{{{}}}", segments.join(","))
    }

    // Comparisons over a path compare jsonb to jsonb.
    fn criterion(&self, kind: CriterionKind) -> CriterionSpec {
        let spec = kind.spec();
        match kind {
            CriterionKind::Eq
            | CriterionKind::Gt
            | CriterionKind::Gte
            | CriterionKind::Lt
            | CriterionKind::Lte => CriterionSpec {
                jsonpath: true,
                ..spec
            },
            CriterionKind::Contains => CriterionSpec {
                operand: "{} @> {}::jsonb",
                invert: Some("NOT {} @> {}::jsonb"),
                ..spec
            },
            CriterionKind::Lengths => CriterionSpec {
                operand: "jsonb_array_length({})=jsonb_array_length({}::jsonb)",
                invert: Some("jsonb_array_length({})!=jsonb_array_length({}::jsonb)"),
                ..spec
            },
            _ => spec,
        }
    }
}
