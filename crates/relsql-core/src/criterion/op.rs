//! Operator-suffix parsing for named arguments.
//!
//! `stuff=1` is an equality, `stuff__gt=1` a comparison, `stuff__not_in=[..]`
//! an inverted membership and `stuff__a__null=true` a null test on path `a`.

use super::{Criterion, CriterionKind, IsNull, Operand};
use crate::args::Arg;
use crate::error::{Result, SqlError};
use crate::expression::{ColumnName, Value};
use crate::node::Node;
use crate::value::SqlValue;

const SUFFIXES: &[(&str, CriterionKind)] = &[
    ("eq", CriterionKind::Eq),
    ("gt", CriterionKind::Gt),
    ("gte", CriterionKind::Gte),
    ("lt", CriterionKind::Lt),
    ("lte", CriterionKind::Lte),
    ("like", CriterionKind::Like),
    ("start", CriterionKind::Start),
    ("end", CriterionKind::End),
    ("in", CriterionKind::In),
    ("between", CriterionKind::Between),
    ("has", CriterionKind::Contains),
    ("length", CriterionKind::Lengths),
];

enum Suffix {
    Criterion(CriterionKind, bool),
    Null(bool),
}

fn suffix(name: &str) -> Option<Suffix> {
    let (invert, bare) = name
        .strip_prefix("not_")
        .map_or((false, name), |bare| (true, bare));
    match bare {
        "null" => Some(Suffix::Null(invert)),
        "ne" => Some(Suffix::Criterion(CriterionKind::Eq, !invert)),
        _ => SUFFIXES
            .iter()
            .find(|(text, _)| *text == bare)
            .map(|(_, kind)| Suffix::Criterion(*kind, invert)),
    }
}

pub(super) fn operand(node: &'static str, value: Arg) -> Result<Operand> {
    match value {
        Arg::Value(value) => Ok(Operand::Value(Value::new(value))),
        Arg::List(values) => Ok(Operand::List(values.into_iter().map(Value::new).collect())),
        Arg::Node(node) => Ok(Operand::Node(node)),
        Arg::Order(direction) => Err(SqlError::TypeViolation {
            node,
            message: format!("{} is not a comparable value", direction.as_str()),
        }),
    }
}

/// Builds a predicate from a named argument.
///
/// Without a recognized suffix a list value means membership, anything else
/// equality. An unrecognized suffix is part of the JSON path.
///
/// # Errors
///
/// Returns `TypeViolation` when the value cannot be an operand.
pub fn op(name: &str, value: Arg) -> Result<Box<dyn Node>> {
    let parsed = name
        .rsplit_once("__")
        .and_then(|(field, tail)| suffix(tail).map(|parsed| (field, parsed)));

    let (field, parsed) = match parsed {
        Some(found) => found,
        None => {
            let kind = if matches!(value, Arg::List(_)) {
                CriterionKind::In
            } else {
                CriterionKind::Eq
            };
            (name, Suffix::Criterion(kind, false))
        }
    };

    match parsed {
        Suffix::Null(invert) => match value {
            Arg::Value(SqlValue::Bool(null)) => {
                Ok(Box::new(IsNull::new(ColumnName::parse(field), null != invert)))
            }
            _ => Err(SqlError::TypeViolation {
                node: "NULL",
                message: String::from("null test takes a bool"),
            }),
        },
        Suffix::Criterion(kind, invert) => {
            let criterion = Criterion::from_operands(
                kind,
                Operand::Column(ColumnName::parse(field)),
                operand(kind.name(), value)?,
            );
            Ok(Box::new(if invert {
                criterion.invert()
            } else {
                criterion
            }))
        }
    }
}
