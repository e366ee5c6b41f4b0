//! `LIMIT` with its two integer slots.

use std::rc::Weak;

use super::{chain, Binding, Chain, Statement};
use crate::args::{Arg, Args};
use crate::dialect::Dialect;
use crate::error::{Result, SqlError};
use crate::node::{Generated, Layout, Node};
use crate::value::SqlValue;

/// `LIMIT <total> OFFSET <offset>`.
///
/// Positional values fill `total` then `offset`. Always rendered on one
/// line.
#[derive(Debug, Default)]
pub struct Limit {
    total: Option<i64>,
    offset: Option<i64>,
    binding: Binding,
    generated: Generated,
}

fn integer(slot: &str, arg: &Arg) -> Result<i64> {
    match arg {
        Arg::Value(SqlValue::Int(value)) => Ok(*value),
        _ => Err(SqlError::TypeViolation {
            node: "LIMIT",
            message: format!("LIMIT {slot} must be int"),
        }),
    }
}

impl Limit {
    /// Creates an empty limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a limit and adds `args` to it.
    ///
    /// # Errors
    ///
    /// Fails as [`Limit::add`] does.
    pub fn with(args: Args) -> Result<Self> {
        let mut limit = Self::new();
        limit.add(args)?;
        Ok(limit)
    }

    /// The row count.
    #[must_use]
    pub const fn total(&self) -> Option<i64> {
        self.total
    }

    /// The row offset.
    #[must_use]
    pub const fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Binds the clause to its owning statement.
    pub fn bind(&mut self, statement: Weak<dyn Statement>) -> &mut Self {
        self.binding.set(statement);
        self
    }

    /// Fills the slots.
    ///
    /// Named `total` and `offset` fill their slot; positional values fill
    /// whichever is still free, total first.
    ///
    /// # Errors
    ///
    /// Returns `Overfill` when a slot is already set or there are more
    /// values than free slots, `TypeViolation` for non-integer values and
    /// `ShapeConflict` for an unknown named argument.
    pub fn add(&mut self, args: Args) -> Result<Chain<'_, Self>> {
        let (positional, mut named) = args.into_parts();
        let mut total = self.total;
        let mut offset = self.offset;

        let free = usize::from(total.is_none()) + usize::from(offset.is_none());
        if positional.len() > free {
            return Err(SqlError::Overfill { node: "LIMIT" });
        }

        if let Some(arg) = named.remove("total") {
            if total.is_some() {
                return Err(SqlError::Overfill { node: "LIMIT" });
            }
            total = Some(integer("total", &arg)?);
        }
        if let Some(arg) = named.remove("offset") {
            if offset.is_some() {
                return Err(SqlError::Overfill { node: "LIMIT" });
            }
            offset = Some(integer("offset", &arg)?);
        }
        if let Some(key) = named.keys().next() {
            return Err(SqlError::shape(
                "LIMIT",
                format!("unknown argument {key}, expected total or offset"),
            ));
        }

        for arg in &positional {
            if total.is_none() {
                total = Some(integer("total", arg)?);
            } else if offset.is_none() {
                offset = Some(integer("offset", arg)?);
            } else {
                return Err(SqlError::Overfill { node: "LIMIT" });
            }
        }

        self.total = total;
        self.offset = offset;
        Ok(chain(self.binding.upgrade(), self))
    }
}

impl Node for Limit {
    fn generate(&mut self, dialect: &dyn Dialect, _layout: Layout) -> Result<()> {
        let placeholder = dialect.parameter_placeholder();
        let mut parts = Vec::new();
        let mut args = Vec::new();
        if let Some(total) = self.total {
            parts.push(format!("LIMIT {placeholder}"));
            args.push(SqlValue::Int(total));
        }
        if let Some(offset) = self.offset {
            parts.push(format!("OFFSET {placeholder}"));
            args.push(SqlValue::Int(offset));
        }
        self.generated.set(parts.join(" "), args);
        Ok(())
    }

    fn sql(&self) -> &str {
        &self.generated.sql
    }

    fn args(&self) -> &[SqlValue] {
        &self.generated.args
    }

    fn is_empty(&self) -> bool {
        self.total.is_none() && self.offset.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{GenericDialect, SqliteDialect};

    fn render(limit: &mut Limit, layout: Layout) -> (String, Vec<SqlValue>) {
        limit.generate(&GenericDialect::new(), layout).unwrap();
        (limit.sql().to_string(), limit.args().to_vec())
    }

    #[test]
    fn test_positional() {
        let mut limit = Limit::with(Args::new().arg(10).arg(5)).unwrap();
        let expected = (
            String::from("LIMIT %s OFFSET %s"),
            vec![SqlValue::Int(10), SqlValue::Int(5)],
        );
        assert_eq!(render(&mut limit, Layout::inline()), expected);
        assert_eq!(render(&mut limit, Layout::indented(2).at(3)), expected);
    }

    #[test]
    fn test_named_and_partial() {
        let mut limit = Limit::with(Args::new().named("offset", 5)).unwrap();
        assert_eq!(
            render(&mut limit, Layout::inline()),
            (String::from("OFFSET %s"), vec![SqlValue::Int(5)])
        );
        limit.add(Args::new().arg(10)).unwrap();
        assert_eq!(limit.total(), Some(10));
        assert_eq!(render(&mut limit, Layout::inline()).0, "LIMIT %s OFFSET %s");

        let mut limit = Limit::with(Args::new().arg(10)).unwrap();
        assert_eq!(render(&mut limit, Layout::inline()).0, "LIMIT %s");

        let mut limit = Limit::with(Args::new().arg(10)).unwrap();
        limit.generate(&SqliteDialect::new(), Layout::inline()).unwrap();
        assert_eq!(limit.sql(), "LIMIT ?");
    }

    #[test]
    fn test_overfill() {
        let mut limit = Limit::with(Args::new().arg(10).arg(5)).unwrap();
        let err = limit.add(Args::new().arg(1)).unwrap_err();
        assert_eq!(err, SqlError::Overfill { node: "LIMIT" });
        assert_eq!(err.to_string(), "LIMIT: cannot add when LIMIT set");

        assert!(Limit::with(Args::new().arg(1).arg(2).arg(3)).is_err());

        let mut limit = Limit::with(Args::new().named("total", 1)).unwrap();
        assert!(matches!(
            limit.add(Args::new().named("total", 2)),
            Err(SqlError::Overfill { .. })
        ));
        assert_eq!(limit.total(), Some(1));
    }

    #[test]
    fn test_type_violation() {
        let err = Limit::with(Args::new().arg("ten")).unwrap_err();
        assert_eq!(
            err,
            SqlError::TypeViolation {
                node: "LIMIT",
                message: String::from("LIMIT total must be int"),
            }
        );

        let mut limit = Limit::new();
        let err = limit.add(Args::new().arg(10).arg(1.5)).unwrap_err();
        assert!(err.to_string().contains("LIMIT offset must be int"));
        assert!(limit.is_empty());
    }

    #[test]
    fn test_unknown_named() {
        let err = Limit::with(Args::new().named("rows", 1)).unwrap_err();
        assert!(matches!(err, SqlError::ShapeConflict { node: "LIMIT", .. }));
    }
}
