//! Predicates over a left operand and a right operand.
//!
//! Every [`CriterionKind`] is rendered by the one [`Criterion`] renderer,
//! driven by the kind's [`CriterionSpec`]. Dialects can swap descriptors via
//! [`Dialect::criterion`].

mod op;

pub use op::op;

use tracing::trace;

use crate::args::Args;
use crate::dialect::Dialect;
use crate::error::{Result, SqlError};
use crate::expression::{ColumnName, ListStyle, Value, ValueList};
use crate::node::{express, fill, Generated, Layout, Node};
use crate::value::{json_list, SqlValue};

/// Predicate kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CriterionKind {
    /// Equality.
    Eq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Substring match.
    Like,
    /// Prefix match.
    Start,
    /// Suffix match.
    End,
    /// Membership in a list.
    In,
    /// Inclusive range.
    Between,
    /// JSON containment.
    Contains,
    /// Equal JSON lengths.
    Lengths,
}

/// Rendering descriptor of a criterion kind.
///
/// Templates contain two `{}` markers, left then right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CriterionSpec {
    /// Default template.
    pub operand: &'static str,
    /// Template when inverted. Inverting without one is an error.
    pub invert: Option<&'static str>,
    /// A left operand with a JSON path jsonifies both sides.
    pub jsonpath: bool,
    /// Template wrapping each side.
    pub cast: Option<&'static str>,
    /// Render right before left.
    pub reverse: bool,
    /// Result for an empty right list. Only list kinds set it.
    pub empty: Option<bool>,
    /// Template applied to the right value, for pattern matches.
    pub pattern: Option<&'static str>,
    /// Bind the right operand as one JSON literal.
    pub encode: bool,
    /// How a right list renders.
    pub list: ListStyle,
}

const fn comparison(operand: &'static str, invert: Option<&'static str>) -> CriterionSpec {
    CriterionSpec {
        operand,
        invert,
        jsonpath: false,
        cast: None,
        reverse: false,
        empty: None,
        pattern: None,
        encode: false,
        list: ListStyle::Parenthesized,
    }
}

const fn pattern(pattern: &'static str) -> CriterionSpec {
    CriterionSpec {
        operand: "{} LIKE {}",
        invert: Some("{} NOT LIKE {}"),
        jsonpath: false,
        cast: None,
        reverse: false,
        empty: None,
        pattern: Some(pattern),
        encode: false,
        list: ListStyle::Parenthesized,
    }
}

const fn collection(operand: &'static str, invert: &'static str, list: ListStyle) -> CriterionSpec {
    CriterionSpec {
        operand,
        invert: Some(invert),
        jsonpath: false,
        cast: None,
        reverse: false,
        empty: Some(false),
        pattern: None,
        encode: false,
        list,
    }
}

const fn json(operand: &'static str) -> CriterionSpec {
    CriterionSpec {
        operand,
        invert: None,
        jsonpath: false,
        cast: None,
        reverse: false,
        empty: None,
        pattern: None,
        encode: true,
        list: ListStyle::Parenthesized,
    }
}

const EQ: CriterionSpec = comparison("{}={}", Some("{}!={}"));
const GT: CriterionSpec = comparison("{}>{}", None);
const GTE: CriterionSpec = comparison("{}>={}", None);
const LT: CriterionSpec = comparison("{}<{}", None);
const LTE: CriterionSpec = comparison("{}<={}", None);
const LIKE: CriterionSpec = pattern("%{}%");
const START: CriterionSpec = pattern("{}%");
const END: CriterionSpec = pattern("%{}");
const IN: CriterionSpec = collection("{} IN {}", "{} NOT IN {}", ListStyle::Parenthesized);
const BETWEEN: CriterionSpec = collection("{} BETWEEN {}", "{} NOT BETWEEN {}", ListStyle::Range);
const CONTAINS: CriterionSpec = json("CONTAINS({},JSON({}))");
const LENGTHS: CriterionSpec = json("LENGTHS({},JSON({}))");

impl CriterionKind {
    /// Name used in errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Gt => "GT",
            Self::Gte => "GTE",
            Self::Lt => "LT",
            Self::Lte => "LTE",
            Self::Like => "LIKE",
            Self::Start => "START",
            Self::End => "END",
            Self::In => "IN",
            Self::Between => "BETWEEN",
            Self::Contains => "CONTAINS",
            Self::Lengths => "LENGTHS",
        }
    }

    /// Generic descriptor.
    #[must_use]
    pub const fn spec(self) -> CriterionSpec {
        match self {
            Self::Eq => EQ,
            Self::Gt => GT,
            Self::Gte => GTE,
            Self::Lt => LT,
            Self::Lte => LTE,
            Self::Like => LIKE,
            Self::Start => START,
            Self::End => END,
            Self::In => IN,
            Self::Between => BETWEEN,
            Self::Contains => CONTAINS,
            Self::Lengths => LENGTHS,
        }
    }
}

/// One side of a criterion.
#[derive(Debug)]
pub enum Operand {
    /// A column reference.
    Column(ColumnName),
    /// A bound value.
    Value(Value),
    /// A list of bound values.
    List(Vec<Value>),
    /// Any other node, rendered as is.
    Node(Box<dyn Node>),
}

/// Per-render adjustments applied to an operand.
#[derive(Debug, Clone, Copy)]
struct Shape {
    jsonify: bool,
    pattern: Option<&'static str>,
    encode: bool,
    list: ListStyle,
}

impl Operand {
    fn has_path(&self) -> bool {
        matches!(self, Self::Column(column) if column.has_path())
    }

    fn is_empty_list(&self) -> bool {
        matches!(self, Self::List(values) if values.is_empty())
    }

    fn render(
        &mut self,
        dialect: &dyn Dialect,
        layout: Layout,
        shape: Shape,
    ) -> Result<(String, Vec<SqlValue>)> {
        let mut node: Box<dyn Node> = match self {
            Self::Column(column) => {
                let mut column = column.clone();
                column.jsonify |= shape.jsonify;
                Box::new(column)
            }
            Self::Value(value) => Box::new(shaped_value(value, shape)),
            Self::List(values) => {
                if shape.encode {
                    let raw: Vec<SqlValue> = values.iter().map(|v| v.value.clone()).collect();
                    Box::new(Value::new(json_list(&raw)))
                } else {
                    Box::new(ValueList::new(
                        shape.list,
                        values
                            .iter()
                            .map(|value| Box::new(shaped_value(value, shape)) as Box<dyn Node>)
                            .collect(),
                    ))
                }
            }
            Self::Node(node) => {
                node.generate(dialect, layout)?;
                return Ok((node.sql().to_string(), node.args().to_vec()));
            }
        };
        node.generate(dialect, layout)?;
        Ok((node.sql().to_string(), node.args().to_vec()))
    }
}

fn shaped_value(value: &Value, shape: Shape) -> Value {
    if shape.encode {
        return Value::new(value.value.to_json_text());
    }
    let mut value = value.clone();
    value.jsonify |= shape.jsonify;
    if let Some(pattern) = shape.pattern {
        let text = match &value.value {
            SqlValue::Text(text) => text.clone(),
            other => other.to_json().to_string(),
        };
        value.value = SqlValue::Text(fill(pattern, &[text.as_str()]));
    }
    value
}

impl From<ColumnName> for Operand {
    fn from(column: ColumnName) -> Self {
        Self::Column(column)
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Box<dyn Node>> for Operand {
    fn from(node: Box<dyn Node>) -> Self {
        Self::Node(node)
    }
}

impl<T: Into<SqlValue>> From<Vec<T>> for Operand {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Value::new).collect())
    }
}

macro_rules! operand_from_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Operand {
                fn from(value: $ty) -> Self {
                    Self::Value(Value::new(value))
                }
            }
        )*
    };
}

operand_from_value!(SqlValue, bool, i64, i32, u32, f64, String, &str);

/// A binary predicate.
#[derive(Debug)]
pub struct Criterion {
    kind: CriterionKind,
    left: Operand,
    right: Operand,
    invert: bool,
    jsonify: bool,
    generated: Generated,
}

impl Criterion {
    /// Creates a criterion over a column.
    ///
    /// A string left operand is parsed with [`ColumnName::parse`], so
    /// `totes__a` addresses path `a` inside column `totes`.
    #[must_use]
    pub fn new(
        kind: CriterionKind,
        left: impl Into<ColumnName>,
        right: impl Into<Operand>,
    ) -> Self {
        Self::from_operands(kind, Operand::Column(left.into()), right.into())
    }

    /// Creates a criterion from exactly one named argument, `field__path`
    /// naming the left column.
    ///
    /// # Errors
    ///
    /// [`SqlError::ShapeConflict`] unless `args` holds a single named value,
    /// [`SqlError::TypeViolation`] when that value is not comparable.
    pub fn named(kind: CriterionKind, args: Args) -> Result<Self> {
        let (positional, named) = args.into_parts();
        let mut entries = named.into_iter();
        match (positional.is_empty(), entries.next(), entries.next()) {
            (true, Some((name, value)), None) => Ok(Self::from_operands(
                kind,
                Operand::Column(ColumnName::parse(&name)),
                op::operand(kind.name(), value)?,
            )),
            _ => Err(SqlError::shape(
                kind.name(),
                "takes exactly one named argument",
            )),
        }
    }

    /// Creates a criterion over arbitrary operands.
    #[must_use]
    pub fn from_operands(kind: CriterionKind, left: Operand, right: Operand) -> Self {
        Self {
            kind,
            left,
            right,
            invert: false,
            jsonify: false,
            generated: Generated::default(),
        }
    }

    /// `left=right`.
    #[must_use]
    pub fn eq(left: impl Into<ColumnName>, right: impl Into<Operand>) -> Self {
        Self::new(CriterionKind::Eq, left, right)
    }

    /// `left>right`.
    #[must_use]
    pub fn gt(left: impl Into<ColumnName>, right: impl Into<Operand>) -> Self {
        Self::new(CriterionKind::Gt, left, right)
    }

    /// `left>=right`.
    #[must_use]
    pub fn gte(left: impl Into<ColumnName>, right: impl Into<Operand>) -> Self {
        Self::new(CriterionKind::Gte, left, right)
    }

    /// `left<right`.
    #[must_use]
    pub fn lt(left: impl Into<ColumnName>, right: impl Into<Operand>) -> Self {
        Self::new(CriterionKind::Lt, left, right)
    }

    /// `left<=right`.
    #[must_use]
    pub fn lte(left: impl Into<ColumnName>, right: impl Into<Operand>) -> Self {
        Self::new(CriterionKind::Lte, left, right)
    }

    /// `left LIKE %right%`.
    #[must_use]
    pub fn like(left: impl Into<ColumnName>, right: impl Into<Operand>) -> Self {
        Self::new(CriterionKind::Like, left, right)
    }

    /// `left LIKE right%`.
    #[must_use]
    pub fn start(left: impl Into<ColumnName>, right: impl Into<Operand>) -> Self {
        Self::new(CriterionKind::Start, left, right)
    }

    /// `left LIKE %right`.
    #[must_use]
    pub fn end(left: impl Into<ColumnName>, right: impl Into<Operand>) -> Self {
        Self::new(CriterionKind::End, left, right)
    }

    /// `left IN (right...)`.
    #[must_use]
    pub fn in_(left: impl Into<ColumnName>, right: impl Into<Operand>) -> Self {
        Self::new(CriterionKind::In, left, right)
    }

    /// `left BETWEEN low AND high`.
    #[must_use]
    pub fn between(left: impl Into<ColumnName>, right: impl Into<Operand>) -> Self {
        Self::new(CriterionKind::Between, left, right)
    }

    /// JSON containment of right in left.
    #[must_use]
    pub fn contains(left: impl Into<ColumnName>, right: impl Into<Operand>) -> Self {
        Self::new(CriterionKind::Contains, left, right)
    }

    /// Equal JSON lengths.
    #[must_use]
    pub fn lengths(left: impl Into<ColumnName>, right: impl Into<Operand>) -> Self {
        Self::new(CriterionKind::Lengths, left, right)
    }

    /// Renders the inverted template.
    #[must_use]
    pub fn invert(mut self) -> Self {
        self.invert = !self.invert;
        self
    }

    /// Treats the left column name literally, without a JSON path.
    #[must_use]
    pub fn extracted(mut self) -> Self {
        if let Operand::Column(column) = &mut self.left {
            column.unsplit();
        }
        self
    }

    /// JSON-encodes both sides.
    #[must_use]
    pub fn jsonify(mut self) -> Self {
        self.jsonify = true;
        self
    }

    /// The predicate kind.
    #[must_use]
    pub const fn kind(&self) -> CriterionKind {
        self.kind
    }

    /// The left operand.
    #[must_use]
    pub const fn left(&self) -> &Operand {
        &self.left
    }

    /// The right operand.
    #[must_use]
    pub const fn right(&self) -> &Operand {
        &self.right
    }

    /// Whether the inverted template is used.
    #[must_use]
    pub const fn is_inverted(&self) -> bool {
        self.invert
    }
}

impl Node for Criterion {
    fn generate(&mut self, dialect: &dyn Dialect, layout: Layout) -> Result<()> {
        self.generated.clear();
        let spec = dialect.criterion(self.kind);
        let template = if self.invert {
            spec.invert
                .ok_or(SqlError::InvalidInversion {
                    node: self.kind.name(),
                })?
        } else {
            spec.operand
        };

        if let Some(empty) = spec.empty {
            if self.right.is_empty_list() {
                self.generated.set(
                    dialect.parameter_placeholder().to_string(),
                    vec![SqlValue::Bool(empty != self.invert)],
                );
                return Ok(());
            }
        }

        if let (ListStyle::Range, Operand::List(values)) = (spec.list, &self.right) {
            if values.len() != 2 {
                return Err(SqlError::ArityMismatch {
                    node: self.kind.name(),
                    values: serde_json::Value::Array(
                        values.iter().map(|v| v.value.to_json()).collect(),
                    )
                    .to_string(),
                    fields: vec![String::from("low"), String::from("high")],
                });
            }
        }

        let jsonify = self.jsonify || (spec.jsonpath && self.left.has_path());
        trace!(kind = self.kind.name(), jsonify, "generating criterion");

        let left = self.left.render(
            dialect,
            layout,
            Shape {
                jsonify,
                pattern: None,
                encode: false,
                list: spec.list,
            },
        )?;
        let right = self.right.render(
            dialect,
            layout,
            Shape {
                jsonify,
                pattern: spec.pattern,
                encode: spec.encode,
                list: spec.list,
            },
        )?;

        let (first, second) = if spec.reverse {
            (right, left)
        } else {
            (left, right)
        };
        let wrap = |sql: &str| spec.cast.map_or_else(|| sql.to_string(), |cast| fill(cast, &[sql]));
        let (first_sql, second_sql) = (wrap(&first.0), wrap(&second.0));
        let sql = fill(template, &[first_sql.as_str(), second_sql.as_str()]);
        let mut args = first.1;
        args.extend(second.1);
        self.generated.set(sql, args);
        Ok(())
    }

    fn sql(&self) -> &str {
        &self.generated.sql
    }

    fn args(&self) -> &[SqlValue] {
        &self.generated.args
    }
}

/// `left IS NULL` or `left IS NOT NULL`.
#[derive(Debug)]
pub struct IsNull {
    left: ColumnName,
    null: bool,
    generated: Generated,
}

impl IsNull {
    /// Tests `left` for NULL, or for NOT NULL when `null` is false.
    #[must_use]
    pub fn new(left: impl Into<ColumnName>, null: bool) -> Self {
        Self {
            left: left.into(),
            null,
            generated: Generated::default(),
        }
    }

    /// Treats the column name literally, without a JSON path.
    #[must_use]
    pub fn extracted(mut self) -> Self {
        self.left.unsplit();
        self
    }
}

impl Node for IsNull {
    fn generate(&mut self, dialect: &dyn Dialect, layout: Layout) -> Result<()> {
        self.generated.clear();
        self.left.generate(dialect, layout)?;
        let left = match dialect.json_null() {
            Some(wrapper) if self.left.has_path() => fill(wrapper, &[self.left.sql()]),
            _ => self.left.sql().to_string(),
        };
        let test = if self.null { "IS NULL" } else { "IS NOT NULL" };
        self.generated
            .set(format!("{left} {test}"), self.left.args().to_vec());
        Ok(())
    }

    fn sql(&self) -> &str {
        &self.generated.sql
    }

    fn args(&self) -> &[SqlValue] {
        &self.generated.args
    }
}

/// A parenthesized `AND`/`OR` group.
#[derive(Debug)]
pub struct Logic {
    operator: &'static str,
    expressions: Vec<Box<dyn Node>>,
    generated: Generated,
}

impl Logic {
    /// `(a AND b ...)`.
    #[must_use]
    pub fn and(expressions: Vec<Box<dyn Node>>) -> Self {
        Self::new(" AND ", expressions)
    }

    /// `(a OR b ...)`.
    #[must_use]
    pub fn or(expressions: Vec<Box<dyn Node>>) -> Self {
        Self::new(" OR ", expressions)
    }

    fn new(operator: &'static str, expressions: Vec<Box<dyn Node>>) -> Self {
        Self {
            operator,
            expressions,
            generated: Generated::default(),
        }
    }

    /// Appends an expression.
    #[must_use]
    pub fn with(mut self, expression: impl Node + 'static) -> Self {
        self.expressions.push(Box::new(expression));
        self
    }
}

impl Node for Logic {
    fn generate(&mut self, dialect: &dyn Dialect, layout: Layout) -> Result<()> {
        self.generated.clear();
        if self.expressions.is_empty() {
            return Ok(());
        }
        let mut parts = Vec::new();
        let mut args = Vec::new();
        express(
            &mut self.expressions,
            dialect,
            layout.nested(),
            &mut parts,
            &mut args,
        )?;
        let sql = layout.parenthesize(&layout.join(&parts, self.operator));
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
