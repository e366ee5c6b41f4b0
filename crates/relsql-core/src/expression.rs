//! Leaf and wrapper expressions.
//!
//! These are the nodes clauses and criteria are assembled from: raw SQL,
//! bound values, value lists, column/table/plain names and the small wrappers
//! (`AS`, `ORDER`, assignment) built on top of them.

use crate::dialect::Dialect;
use crate::error::Result;
use crate::node::{express, express_node, Generated, Layout, Node};
use crate::value::SqlValue;

/// Raw SQL text with its own bound values, rendered verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Sql {
    text: String,
    values: Vec<SqlValue>,
    generated: Generated,
}

impl Sql {
    /// Creates raw SQL without values.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_args(text, Vec::new())
    }

    /// Creates raw SQL with values for its placeholders.
    #[must_use]
    pub fn with_args(text: impl Into<String>, values: Vec<SqlValue>) -> Self {
        Self {
            text: text.into(),
            values,
            generated: Generated::default(),
        }
    }
}

impl Node for Sql {
    fn generate(&mut self, _dialect: &dyn Dialect, _layout: Layout) -> Result<()> {
        self.generated.set(self.text.clone(), self.values.clone());
        Ok(())
    }

    fn sql(&self) -> &str {
        &self.generated.sql
    }

    fn args(&self) -> &[SqlValue] {
        &self.generated.args
    }
}

/// A single bound value.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    /// The value.
    pub value: SqlValue,
    /// Bind the value as JSON text.
    pub jsonify: bool,
    generated: Generated,
}

impl Value {
    /// Creates a bound value.
    #[must_use]
    pub fn new(value: impl Into<SqlValue>) -> Self {
        Self {
            value: value.into(),
            jsonify: false,
            generated: Generated::default(),
        }
    }

    /// Binds the value as JSON text.
    #[must_use]
    pub fn jsonified(mut self) -> Self {
        self.jsonify = true;
        self
    }
}

impl Node for Value {
    fn generate(&mut self, dialect: &dyn Dialect, _layout: Layout) -> Result<()> {
        let bound = if self.jsonify {
            self.value.to_json_text()
        } else {
            self.value.clone()
        };
        self.generated
            .set(dialect.parameter_placeholder().to_string(), vec![bound]);
        Ok(())
    }

    fn sql(&self) -> &str {
        &self.generated.sql
    }

    fn args(&self) -> &[SqlValue] {
        &self.generated.args
    }
}

/// How a [`ValueList`] wraps its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    /// `(a,b,c)`, one item per line when indented.
    Parenthesized,
    /// `a,b,c` without parentheses.
    Bare,
    /// `a AND b`, the bounds of a range.
    Range,
}

/// An ordered list of expressions.
#[derive(Debug)]
pub struct ValueList {
    style: ListStyle,
    expressions: Vec<Box<dyn Node>>,
    generated: Generated,
}

impl ValueList {
    /// Creates a list from nodes.
    #[must_use]
    pub fn new(style: ListStyle, expressions: Vec<Box<dyn Node>>) -> Self {
        Self {
            style,
            expressions,
            generated: Generated::default(),
        }
    }

    /// Creates a list of bound values.
    #[must_use]
    pub fn of<I, V>(style: ListStyle, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        Self::new(
            style,
            values
                .into_iter()
                .map(|value| Box::new(Value::new(value)) as Box<dyn Node>)
                .collect(),
        )
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expressions.len()
    }
}

impl Node for ValueList {
    fn generate(&mut self, dialect: &dyn Dialect, layout: Layout) -> Result<()> {
        self.generated.clear();
        let mut parts = Vec::new();
        let mut args = Vec::new();
        express(
            &mut self.expressions,
            dialect,
            layout.nested(),
            &mut parts,
            &mut args,
        )?;
        let sql = match self.style {
            ListStyle::Parenthesized => layout.parenthesize(&layout.join(&parts, ",")),
            ListStyle::Bare => layout.join(&parts, ","),
            ListStyle::Range => parts.join(" AND "),
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

/// A column reference, optionally qualified and optionally addressing a
/// path inside a JSON column.
///
/// `people.stuff.things` is schema `people`, table `stuff`, column `things`.
/// `totes__a__0` is column `totes` with JSON path `["a", "0"]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnName {
    /// Column name.
    pub name: String,
    /// Table qualifier.
    pub table: Option<String>,
    /// Schema qualifier.
    pub schema: Option<String>,
    /// JSON path inside the column.
    pub path: Vec<String>,
    /// Extract JSON rather than text at the path.
    pub jsonify: bool,
    generated: Generated,
}

impl ColumnName {
    /// Parses a column reference, splitting a `__` JSON path.
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        let mut segments = spec.split("__");
        let head = segments.next().unwrap_or_default();
        let mut column = Self::extracted(head);
        column.path = segments.map(String::from).collect();
        column
    }

    /// Parses a column reference without splitting a JSON path.
    #[must_use]
    pub fn extracted(spec: &str) -> Self {
        let mut parts: Vec<&str> = spec.split('.').collect();
        let name = parts.pop().unwrap_or_default().to_string();
        let table = parts.pop().map(String::from);
        let schema = if parts.is_empty() {
            None
        } else {
            Some(parts.join("."))
        };
        Self {
            name,
            table,
            schema,
            ..Self::default()
        }
    }

    /// Folds the JSON path back into the column name.
    pub fn unsplit(&mut self) {
        for segment in self.path.drain(..) {
            self.name.push_str("__");
            self.name.push_str(&segment);
        }
    }

    /// Returns true when a JSON path is present.
    #[must_use]
    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    fn quoted(&self, dialect: &dyn Dialect) -> String {
        let name = if self.name == "*" {
            self.name.clone()
        } else {
            dialect.quote_identifier(&self.name)
        };
        [self.schema.as_deref(), self.table.as_deref()]
            .into_iter()
            .flatten()
            .map(|part| dialect.quote_identifier(part))
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl From<&str> for ColumnName {
    fn from(spec: &str) -> Self {
        Self::parse(spec)
    }
}

impl From<String> for ColumnName {
    fn from(spec: String) -> Self {
        Self::parse(&spec)
    }
}

impl Node for ColumnName {
    fn generate(&mut self, dialect: &dyn Dialect, _layout: Layout) -> Result<()> {
        let quoted = self.quoted(dialect);
        if self.path.is_empty() {
            self.generated.set(quoted, Vec::new());
        } else {
            self.generated.set(
                dialect.json_column(&quoted, self.jsonify),
                vec![SqlValue::Text(dialect.json_path(&self.path))],
            );
        }
        Ok(())
    }

    fn sql(&self) -> &str {
        &self.generated.sql
    }

    fn args(&self) -> &[SqlValue] {
        &self.generated.args
    }
}

/// A table reference, optionally schema qualified.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableName {
    /// Table name.
    pub name: String,
    /// Schema qualifier.
    pub schema: Option<String>,
    generated: Generated,
}

impl TableName {
    /// Creates a table reference.
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Option<String>) -> Self {
        Self {
            name: name.into(),
            schema,
            generated: Generated::default(),
        }
    }

    /// Parses `schema.table` or `table`.
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        match spec.rsplit_once('.') {
            Some((schema, name)) => Self::new(name, Some(schema.to_string())),
            None => Self::new(spec, None),
        }
    }

    /// Renders the quoted reference.
    #[must_use]
    pub fn quoted(&self, dialect: &dyn Dialect) -> String {
        match &self.schema {
            Some(schema) => format!(
                "{}.{}",
                dialect.quote_identifier(schema),
                dialect.quote_identifier(&self.name)
            ),
            None => dialect.quote_identifier(&self.name),
        }
    }
}

impl Node for TableName {
    fn generate(&mut self, dialect: &dyn Dialect, _layout: Layout) -> Result<()> {
        self.generated.set(self.quoted(dialect), Vec::new());
        Ok(())
    }

    fn sql(&self) -> &str {
        &self.generated.sql
    }

    fn args(&self) -> &[SqlValue] {
        &self.generated.args
    }
}

/// A plain quoted identifier.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Name {
    /// The identifier.
    pub name: String,
    generated: Generated,
}

impl Name {
    /// Creates an identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generated: Generated::default(),
        }
    }
}

impl Node for Name {
    fn generate(&mut self, dialect: &dyn Dialect, _layout: Layout) -> Result<()> {
        self.generated
            .set(dialect.quote_identifier(&self.name), Vec::new());
        Ok(())
    }

    fn sql(&self) -> &str {
        &self.generated.sql
    }

    fn args(&self) -> &[SqlValue] {
        &self.generated.args
    }
}

/// `<expression> AS <label>`.
#[derive(Debug)]
pub struct As {
    label: Name,
    expression: Box<dyn Node>,
    generated: Generated,
}

impl As {
    /// Labels an expression.
    #[must_use]
    pub fn new(label: impl Into<String>, expression: Box<dyn Node>) -> Self {
        Self {
            label: Name::new(label),
            expression,
            generated: Generated::default(),
        }
    }
}

impl Node for As {
    fn generate(&mut self, dialect: &dyn Dialect, layout: Layout) -> Result<()> {
        self.generated.clear();
        let mut parts = Vec::new();
        let mut args = Vec::new();
        express_node(self.expression.as_mut(), dialect, layout, &mut parts, &mut args)?;
        express_node(&mut self.label, dialect, layout, &mut parts, &mut args)?;
        self.generated.set(parts.join(" AS "), args);
        Ok(())
    }

    fn sql(&self) -> &str {
        &self.generated.sql
    }

    fn args(&self) -> &[SqlValue] {
        &self.generated.args
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    /// SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Parses `asc`/`desc`, case insensitive.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if text.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }
}

/// A sort key: a column and an optional direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    column: ColumnName,
    direction: Option<Direction>,
    generated: Generated,
}

impl Order {
    /// Creates a sort key.
    #[must_use]
    pub fn new(column: impl Into<ColumnName>, direction: Option<Direction>) -> Self {
        Self {
            column: column.into(),
            direction,
            generated: Generated::default(),
        }
    }
}

impl Node for Order {
    fn generate(&mut self, dialect: &dyn Dialect, layout: Layout) -> Result<()> {
        self.generated.clear();
        self.column.generate(dialect, layout)?;
        let sql = match self.direction {
            Some(direction) => format!("{} {}", self.column.sql(), direction.as_str()),
            None => self.column.sql().to_string(),
        };
        self.generated.set(sql, self.column.args().to_vec());
        Ok(())
    }

    fn sql(&self) -> &str {
        &self.generated.sql
    }

    fn args(&self) -> &[SqlValue] {
        &self.generated.args
    }
}

/// `<column>=<expression>`, as used by `SET`.
#[derive(Debug)]
pub struct Assign {
    column: ColumnName,
    expression: Box<dyn Node>,
    generated: Generated,
}

impl Assign {
    /// Creates an assignment.
    #[must_use]
    pub fn new(column: impl Into<ColumnName>, expression: Box<dyn Node>) -> Self {
        Self {
            column: column.into(),
            expression,
            generated: Generated::default(),
        }
    }
}

impl Node for Assign {
    fn generate(&mut self, dialect: &dyn Dialect, layout: Layout) -> Result<()> {
        self.generated.clear();
        let mut parts = Vec::new();
        let mut args = Vec::new();
        express_node(&mut self.column, dialect, layout, &mut parts, &mut args)?;
        express_node(self.expression.as_mut(), dialect, layout, &mut parts, &mut args)?;
        self.generated.set(parts.join("="), args);
        Ok(())
    }

    fn sql(&self) -> &str {
        &self.generated.sql
    }

    fn args(&self) -> &[SqlValue] {
        &self.generated.args
    }
}
