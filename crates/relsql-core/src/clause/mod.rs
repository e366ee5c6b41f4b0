//! Clauses: ordered groups of expressions under an optional keyword.
//!
//! Each [`ClauseKind`] maps to an immutable [`ClauseSpec`] that says how raw
//! arguments become nodes and how the nodes are joined. [`Limit`] and
//! [`Values`] have their own slot and row rules.
//!
//! A clause may be bound to the statement that owns it, in which case `add`
//! hands the statement back for chaining.

mod limit;
mod values;

pub use limit::Limit;
pub use values::Values;

use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::args::{Arg, Args};
use crate::criterion::op;
use crate::dialect::Dialect;
use crate::error::{Result, SqlError};
use crate::expression::{
    As, Assign, ColumnName, Direction, ListStyle, Name, Order, Sql, TableName, Value, ValueList,
};
use crate::node::{express, Generated, Layout, Node};
use crate::value::SqlValue;

/// A statement that owns clauses.
///
/// Statements themselves are composed elsewhere; clauses only need to hand
/// one back from `add` and to announce a field list.
pub trait Statement {
    /// Receives the field list established by a `VALUES` clause.
    fn field(&self, fields: &[String]);
}

/// What `add` returns: the bound statement if it is still alive, else the
/// clause itself.
pub enum Chain<'a, C> {
    /// The clause, for further calls.
    Clause(&'a mut C),
    /// The statement the clause is bound to.
    Statement(Rc<dyn Statement>),
}

impl<'a, C> Chain<'a, C> {
    /// Returns the bound statement, if any.
    #[must_use]
    pub fn statement(&self) -> Option<&Rc<dyn Statement>> {
        match self {
            Self::Statement(statement) => Some(statement),
            Self::Clause(_) => None,
        }
    }

    /// Returns the clause, if no statement is bound.
    pub fn clause(self) -> Option<&'a mut C> {
        match self {
            Self::Clause(clause) => Some(clause),
            Self::Statement(_) => None,
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for Chain<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clause(clause) => f.debug_tuple("Clause").field(clause).finish(),
            Self::Statement(_) => f.debug_tuple("Statement").finish(),
        }
    }
}

/// Non-owning link from a clause to its statement.
#[derive(Default, Clone)]
pub(crate) struct Binding(Option<Weak<dyn Statement>>);

impl Binding {
    pub(crate) fn set(&mut self, statement: Weak<dyn Statement>) {
        self.0 = Some(statement);
    }

    pub(crate) fn upgrade(&self) -> Option<Rc<dyn Statement>> {
        self.0.as_ref().and_then(Weak::upgrade)
    }
}

pub(crate) fn chain<C>(statement: Option<Rc<dyn Statement>>, clause: &mut C) -> Chain<'_, C> {
    match statement {
        Some(statement) => Chain::Statement(statement),
        None => Chain::Clause(clause),
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Binding")
            .field(&self.upgrade().is_some())
            .finish()
    }
}

type Build = fn(Arg) -> Result<Box<dyn Node>>;
type Pair = fn(String, Arg) -> Result<Box<dyn Node>>;

/// Configuration of a clause kind.
#[derive(Debug, Clone, Copy)]
pub struct ClauseSpec {
    /// Keyword, or `None` for unnamed clauses.
    pub keyword: Option<&'static str>,
    /// Name used in errors.
    pub label: &'static str,
    /// Builds a node from a positional argument.
    pub positional: Option<Build>,
    /// Builds a node from a named argument's value.
    pub value: Option<Build>,
    /// Builds a node from a named argument.
    pub pair: Option<Pair>,
    /// Joins children.
    pub delimiter: &'static str,
}

/// Clause kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    /// Leading statement options, e.g. `DISTINCT`.
    Options,
    /// Selected fields.
    Fields,
    /// `FROM`.
    From,
    /// `WHERE`.
    Where,
    /// `GROUP BY`.
    GroupBy,
    /// `HAVING`.
    Having,
    /// `ORDER BY`.
    OrderBy,
    /// `SET`.
    Set,
}

fn not_text(node: &'static str, arg: &Arg) -> SqlError {
    SqlError::TypeViolation {
        node,
        message: format!("expected a name, got {}", arg.describe()),
    }
}

fn raw_sql(arg: Arg) -> Result<Box<dyn Node>> {
    match arg {
        Arg::Value(SqlValue::Text(text)) => Ok(Box::new(Sql::new(text))),
        other => Err(not_text("SQL", &other)),
    }
}

fn column(arg: Arg) -> Result<Box<dyn Node>> {
    match arg.as_text() {
        Some(text) => Ok(Box::new(ColumnName::parse(text))),
        None => Err(not_text("FIELD", &arg)),
    }
}

fn table(arg: Arg) -> Result<Box<dyn Node>> {
    match arg.as_text() {
        Some(text) => Ok(Box::new(TableName::parse(text))),
        None => Err(not_text("TABLE", &arg)),
    }
}

fn name(arg: Arg) -> Result<Box<dyn Node>> {
    match arg.as_text() {
        Some(text) => Ok(Box::new(Name::new(text))),
        None => Err(not_text("NAME", &arg)),
    }
}

fn order(arg: Arg) -> Result<Box<dyn Node>> {
    match arg.as_text() {
        Some(text) => Ok(Box::new(Order::new(text, None))),
        None => Err(not_text("ORDER", &arg)),
    }
}

pub(crate) fn value(arg: Arg) -> Result<Box<dyn Node>> {
    match arg {
        Arg::Value(value) => Ok(Box::new(Value::new(value))),
        Arg::List(values) => Ok(Box::new(ValueList::of(ListStyle::Parenthesized, values))),
        Arg::Node(node) => Ok(node),
        Arg::Order(direction) => Err(SqlError::TypeViolation {
            node: "VALUE",
            message: format!("{} is not a value", direction.as_str()),
        }),
    }
}

fn pair_as(label: String, arg: Arg) -> Result<Box<dyn Node>> {
    match arg {
        Arg::Node(node) => Ok(Box::new(As::new(label, node))),
        other => Err(SqlError::shape("AS", format!("cannot label {}", other.describe()))),
    }
}

fn pair_order(field: String, arg: Arg) -> Result<Box<dyn Node>> {
    let direction = match &arg {
        Arg::Order(direction) => Some(*direction),
        Arg::Value(SqlValue::Text(text)) => Direction::parse(text),
        _ => None,
    };
    direction.map_or_else(
        || {
            Err(SqlError::TypeViolation {
                node: "ORDER",
                message: format!("{} is not a direction", arg.describe()),
            })
        },
        |direction| Ok(Box::new(Order::new(field, Some(direction))) as Box<dyn Node>),
    )
}

fn pair_op(field: String, arg: Arg) -> Result<Box<dyn Node>> {
    op(&field, arg)
}

fn pair_assign(field: String, arg: Arg) -> Result<Box<dyn Node>> {
    Ok(Box::new(Assign::new(field, value(arg)?)))
}

const OPTIONS: ClauseSpec = ClauseSpec {
    keyword: None,
    label: "OPTIONS",
    positional: Some(raw_sql),
    value: None,
    pair: None,
    delimiter: " ",
};

const FIELDS: ClauseSpec = ClauseSpec {
    keyword: None,
    label: "FIELDS",
    positional: Some(column),
    value: Some(column),
    pair: Some(pair_as),
    delimiter: ",",
};

const FROM: ClauseSpec = ClauseSpec {
    keyword: Some("FROM"),
    label: "FROM",
    positional: Some(table),
    value: Some(table),
    pair: Some(pair_as),
    delimiter: ",",
};

const WHERE: ClauseSpec = ClauseSpec {
    keyword: Some("WHERE"),
    label: "WHERE",
    positional: Some(value),
    value: None,
    pair: Some(pair_op),
    delimiter: " AND ",
};

const GROUP_BY: ClauseSpec = ClauseSpec {
    keyword: Some("GROUP BY"),
    label: "GROUP BY",
    positional: Some(name),
    value: None,
    pair: None,
    delimiter: ",",
};

const HAVING: ClauseSpec = ClauseSpec {
    keyword: Some("HAVING"),
    label: "HAVING",
    positional: Some(value),
    value: None,
    pair: Some(pair_op),
    delimiter: " AND ",
};

const ORDER_BY: ClauseSpec = ClauseSpec {
    keyword: Some("ORDER BY"),
    label: "ORDER BY",
    positional: Some(order),
    value: None,
    pair: Some(pair_order),
    delimiter: ",",
};

const SET: ClauseSpec = ClauseSpec {
    keyword: Some("SET"),
    label: "SET",
    positional: None,
    value: None,
    pair: Some(pair_assign),
    delimiter: ",",
};

impl ClauseKind {
    /// The kind's configuration.
    #[must_use]
    pub const fn spec(self) -> ClauseSpec {
        match self {
            Self::Options => OPTIONS,
            Self::Fields => FIELDS,
            Self::From => FROM,
            Self::Where => WHERE,
            Self::GroupBy => GROUP_BY,
            Self::Having => HAVING,
            Self::OrderBy => ORDER_BY,
            Self::Set => SET,
        }
    }
}

/// A clause of a given kind.
#[derive(Debug)]
pub struct Clause {
    kind: ClauseKind,
    expressions: Vec<Box<dyn Node>>,
    binding: Binding,
    generated: Generated,
}

impl Clause {
    /// Creates an empty clause.
    #[must_use]
    pub fn new(kind: ClauseKind) -> Self {
        Self {
            kind,
            expressions: Vec::new(),
            binding: Binding::default(),
            generated: Generated::default(),
        }
    }

    /// Creates a clause and adds `args` to it.
    ///
    /// # Errors
    ///
    /// Fails as [`Clause::add`] does.
    pub fn with(kind: ClauseKind, args: Args) -> Result<Self> {
        let mut clause = Self::new(kind);
        clause.add(args)?;
        Ok(clause)
    }

    /// `OPTIONS`.
    #[must_use]
    pub fn options() -> Self {
        Self::new(ClauseKind::Options)
    }

    /// Selected fields.
    #[must_use]
    pub fn fields() -> Self {
        Self::new(ClauseKind::Fields)
    }

    /// `FROM`.
    #[must_use]
    pub fn from() -> Self {
        Self::new(ClauseKind::From)
    }

    /// `WHERE`.
    #[must_use]
    pub fn where_() -> Self {
        Self::new(ClauseKind::Where)
    }

    /// `GROUP BY`.
    #[must_use]
    pub fn group_by() -> Self {
        Self::new(ClauseKind::GroupBy)
    }

    /// `HAVING`.
    #[must_use]
    pub fn having() -> Self {
        Self::new(ClauseKind::Having)
    }

    /// `ORDER BY`.
    #[must_use]
    pub fn order_by() -> Self {
        Self::new(ClauseKind::OrderBy)
    }

    /// `SET`.
    #[must_use]
    pub fn set() -> Self {
        Self::new(ClauseKind::Set)
    }

    /// The clause kind.
    #[must_use]
    pub const fn kind(&self) -> ClauseKind {
        self.kind
    }

    /// Number of expressions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    /// Binds the clause to its owning statement.
    pub fn bind(&mut self, statement: Weak<dyn Statement>) -> &mut Self {
        self.binding.set(statement);
        self
    }

    /// Adds expressions.
    ///
    /// Positional arguments go through the kind's positional constructor,
    /// named ones (in sorted key order) through its value and pair
    /// constructors. Nodes are used as given. Nothing is appended unless
    /// every argument is accepted.
    ///
    /// # Errors
    ///
    /// Returns `ShapeConflict` when the kind takes no positional or no
    /// named arguments, and `TypeViolation` when an argument has the wrong
    /// type for its constructor.
    pub fn add(&mut self, args: Args) -> Result<Chain<'_, Self>> {
        let spec = self.kind.spec();
        let (positional, named) = args.into_parts();
        let mut added: Vec<Box<dyn Node>> = Vec::with_capacity(positional.len() + named.len());

        for arg in positional {
            added.push(match arg {
                Arg::Node(node) => node,
                other => {
                    let build = spec.positional.ok_or_else(|| {
                        SqlError::shape(spec.label, "no positional arguments allowed")
                    })?;
                    build(other)?
                }
            });
        }

        for (key, arg) in named {
            let pair = spec
                .pair
                .ok_or_else(|| SqlError::shape(spec.label, "no named arguments allowed"))?;
            let arg = match (spec.value, arg) {
                (Some(build), arg) if !arg.is_node() => Arg::Node(build(arg)?),
                (_, arg) => arg,
            };
            added.push(pair(key, arg)?);
        }

        self.expressions.extend(added);
        Ok(chain(self.binding.upgrade(), self))
    }
}

impl Node for Clause {
    fn generate(&mut self, dialect: &dyn Dialect, layout: Layout) -> Result<()> {
        self.generated.clear();
        let spec = self.kind.spec();
        let mut parts = Vec::new();
        let mut args = Vec::new();
        express(
            &mut self.expressions,
            dialect,
            layout.nested(),
            &mut parts,
            &mut args,
        )?;
        if parts.is_empty() {
            return Ok(());
        }
        debug!(clause = spec.label, expressions = parts.len(), "generating clause");

        let body = layout.join(&parts, spec.delimiter);
        let sql = match spec.keyword {
            Some(keyword) if layout.is_inline() => format!("{keyword} {body}"),
            Some(keyword) => format!("{keyword}\n{}{body}", layout.next()),
            None => format!("{}{body}", layout.unit()),
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
        self.expressions.is_empty()
    }
}
