//! The node contract shared by every renderable piece.
//!
//! A node renders itself with [`Node::generate`], after which [`Node::sql`]
//! and [`Node::args`] hold the text and the values for its placeholders, in
//! the order the placeholders appear. Generating again overwrites both.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::Result;
use crate::value::SqlValue;

/// Indentation parameters for rendering.
///
/// `indent == 0` renders everything on one line. Otherwise nested content is
/// placed on new lines, padded with `pad` repeated `indent * level` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Width of one indentation step.
    pub indent: usize,
    /// Current nesting depth.
    pub count: usize,
    /// Padding character.
    pub pad: char,
}

impl Default for Layout {
    fn default() -> Self {
        Self::inline()
    }
}

impl Layout {
    /// Single-line rendering.
    #[must_use]
    pub const fn inline() -> Self {
        Self {
            indent: 0,
            count: 0,
            pad: ' ',
        }
    }

    /// Multi-line rendering with the given indent width, at depth zero.
    #[must_use]
    pub const fn indented(indent: usize) -> Self {
        Self {
            indent,
            count: 0,
            pad: ' ',
        }
    }

    /// Returns the layout at the given depth.
    #[must_use]
    pub const fn at(self, count: usize) -> Self {
        Self { count, ..self }
    }

    /// Returns the layout one level deeper.
    #[must_use]
    pub const fn nested(self) -> Self {
        self.at(self.count + 1)
    }

    /// Returns the layout with a different pad character.
    #[must_use]
    pub const fn with_pad(self, pad: char) -> Self {
        Self { pad, ..self }
    }

    /// True when rendering on a single line.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        self.indent == 0
    }

    /// Padding for the given level.
    #[must_use]
    pub fn padding(&self, level: usize) -> String {
        std::iter::repeat(self.pad)
            .take(self.indent * level)
            .collect()
    }

    /// One indentation step.
    #[must_use]
    pub fn unit(&self) -> String {
        self.padding(1)
    }

    /// Padding of the current depth.
    #[must_use]
    pub fn current(&self) -> String {
        self.padding(self.count)
    }

    /// Padding of the next depth.
    #[must_use]
    pub fn next(&self) -> String {
        self.padding(self.count + 1)
    }

    /// Joins rendered parts.
    ///
    /// Inline, the delimiter is used as is. Indented, its trailing whitespace
    /// is replaced by a newline and the next depth's padding.
    #[must_use]
    pub fn join(&self, parts: &[String], delimiter: &str) -> String {
        if self.is_inline() {
            parts.join(delimiter)
        } else {
            parts.join(&format!("{}\n{}", delimiter.trim_end(), self.next()))
        }
    }

    /// Wraps already joined content in parentheses.
    #[must_use]
    pub fn parenthesize(&self, body: &str) -> String {
        if self.is_inline() {
            format!("({body})")
        } else {
            format!("(\n{}{body}\n{})", self.next(), self.current())
        }
    }
}

/// Generated text and parameters of a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generated {
    /// Rendered SQL.
    pub sql: String,
    /// Values for the placeholders in `sql`, in order.
    pub args: Vec<SqlValue>,
}

impl Generated {
    /// Replaces the generated state.
    pub fn set(&mut self, sql: String, args: Vec<SqlValue>) {
        self.sql = sql;
        self.args = args;
    }

    /// Clears the generated state.
    pub fn clear(&mut self) {
        self.sql.clear();
        self.args.clear();
    }
}

/// A renderable piece of SQL.
pub trait Node: fmt::Debug {
    /// Renders the node, replacing any previous output.
    fn generate(&mut self, dialect: &dyn Dialect, layout: Layout) -> Result<()>;

    /// SQL produced by the last `generate`.
    fn sql(&self) -> &str;

    /// Values produced by the last `generate`.
    fn args(&self) -> &[SqlValue];

    /// True when the node has nothing to render.
    fn is_empty(&self) -> bool {
        false
    }
}

/// Generates one node and appends its output.
pub fn express_node(
    node: &mut dyn Node,
    dialect: &dyn Dialect,
    layout: Layout,
    sql: &mut Vec<String>,
    args: &mut Vec<SqlValue>,
) -> Result<()> {
    node.generate(dialect, layout)?;
    sql.push(node.sql().to_string());
    args.extend_from_slice(node.args());
    Ok(())
}

/// Generates each node in order, collecting fragments and args in encounter order.
pub fn express(
    nodes: &mut [Box<dyn Node>],
    dialect: &dyn Dialect,
    layout: Layout,
    sql: &mut Vec<String>,
    args: &mut Vec<SqlValue>,
) -> Result<()> {
    for node in nodes.iter_mut() {
        express_node(node.as_mut(), dialect, layout, sql, args)?;
    }
    Ok(())
}

/// Substitutes `parts` into the `{}` markers of `template`, left to right.
///
/// Only the template is scanned, never the inserted text.
#[must_use]
pub fn fill(template: &str, parts: &[&str]) -> String {
    let extra: usize = parts.iter().copied().map(str::len).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut pieces = template.split("{}");
    if let Some(first) = pieces.next() {
        out.push_str(first);
    }
    for (index, piece) in pieces.enumerate() {
        if let Some(part) = parts.get(index) {
            out.push_str(part);
        }
        out.push_str(piece);
    }
    out
}
