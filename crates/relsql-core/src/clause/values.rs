//! `VALUES` rows for inserts.

use std::rc::Weak;

use tracing::warn;

use super::{chain, value, Binding, Chain, Statement};
use crate::args::{Arg, Args};
use crate::dialect::Dialect;
use crate::error::{Result, SqlError};
use crate::expression::{ListStyle, ValueList};
use crate::node::{express_node, Generated, Layout, Node};
use crate::value::SqlValue;

/// `VALUES (a,b),(c,d)`.
///
/// The field list is fixed by the first `field` call or the first named row,
/// and every row must match it. Without field names, the first row fixes the
/// row width.
#[derive(Debug, Default)]
pub struct Values {
    fields: Option<Vec<String>>,
    arity: Option<usize>,
    rows: Vec<ValueList>,
    binding: Binding,
    generated: Generated,
}

impl Values {
    /// Creates an empty clause.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the clause and adds one row.
    ///
    /// # Errors
    ///
    /// Fails as [`Values::add`] does.
    pub fn with(args: Args) -> Result<Self> {
        let mut values = Self::new();
        values.add(args)?;
        Ok(values)
    }

    /// The established fields.
    #[must_use]
    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Binds the clause to its owning statement.
    pub fn bind(&mut self, statement: Weak<dyn Statement>) -> &mut Self {
        self.binding.set(statement);
        self
    }

    /// Establishes the field list. Only the first call has any effect; it is
    /// forwarded to the bound statement.
    pub fn field(&mut self, fields: Vec<String>) -> &mut Self {
        if self.fields.is_some() {
            return self;
        }
        if let Some(statement) = self.binding.upgrade() {
            statement.field(&fields);
        }
        self.fields = Some(fields);
        self
    }

    /// Adds one row, either positionally or by field name.
    ///
    /// # Errors
    ///
    /// Returns `ShapeConflict` when both positional and named values are
    /// given, `MissingField` when a named row lacks an established field,
    /// `ArityMismatch` when the row width differs from the established one,
    /// and `TypeViolation` for values that cannot be bound.
    pub fn add(&mut self, args: Args) -> Result<Chain<'_, Self>> {
        let (positional, mut named) = args.into_parts();
        if !positional.is_empty() && !named.is_empty() {
            return Err(SqlError::shape("VALUES", "add list or dict but not both"));
        }

        let mut establish = None;
        let row: Vec<Arg> = if named.is_empty() {
            positional
        } else {
            let fields = match &self.fields {
                Some(fields) => fields.clone(),
                None => {
                    let keys: Vec<String> = named.keys().cloned().collect();
                    establish = Some(keys.clone());
                    keys
                }
            };
            let keys: Vec<String> = named.keys().cloned().collect();
            let mut row = Vec::with_capacity(fields.len());
            for field in &fields {
                let arg = named.remove(field).ok_or_else(|| SqlError::MissingField {
                    node: "VALUES",
                    field: field.clone(),
                    keys: keys.clone(),
                })?;
                row.push(arg);
            }
            if !named.is_empty() {
                warn!(
                    ignored = ?named.keys().collect::<Vec<_>>(),
                    "VALUES keys not among the fields"
                );
            }
            row
        };

        if row.is_empty() {
            return Ok(chain(self.binding.upgrade(), self));
        }

        let expected = self
            .fields
            .as_ref()
            .or(establish.as_ref())
            .map(Vec::len)
            .or(self.arity);
        if let Some(expected) = expected {
            if row.len() != expected {
                return Err(SqlError::ArityMismatch {
                    node: "VALUES",
                    values: format!(
                        "[{}]",
                        row.iter().map(Arg::describe).collect::<Vec<_>>().join(", ")
                    ),
                    fields: self.fields.clone().or(establish).unwrap_or_else(|| {
                        (0..expected).map(|index| index.to_string()).collect()
                    }),
                });
            }
        }

        let width = row.len();
        let nodes = row.into_iter().map(value).collect::<Result<Vec<_>>>()?;

        if let Some(fields) = establish {
            self.field(fields);
        }
        self.arity.get_or_insert(width);
        self.rows.push(ValueList::new(ListStyle::Bare, nodes));
        Ok(chain(self.binding.upgrade(), self))
    }
}

impl Node for Values {
    fn generate(&mut self, dialect: &dyn Dialect, layout: Layout) -> Result<()> {
        self.generated.clear();
        let mut parts = Vec::new();
        let mut args = Vec::new();
        let rows = layout.nested();
        for row in &mut self.rows {
            express_node(row, dialect, rows, &mut parts, &mut args)?;
        }
        if parts.is_empty() {
            return Ok(());
        }

        let sql = if layout.is_inline() {
            format!("VALUES ({})", parts.join("),("))
        } else {
            let open = format!("(\n{}", rows.next());
            let close = format!("\n{})", rows.current());
            format!(
                "VALUES\n{}{open}{}{close}",
                rows.current(),
                parts.join(&format!("{close},{open}"))
            )
        };
        self.generated.set(sql, args);
        Ok(())
    }

    fn sql(&self) -> &str {
        &self.generated.sql
    }

    fn args(&self) -> &[SqlValue] {
        &self.generated.args
    }

    fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
