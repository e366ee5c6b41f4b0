//! Arguments accepted by clause `add` calls.
//!
//! Callers hand clauses raw values, value lists, sort directions or ready
//! nodes, positionally or by name. Clauses normalize them into nodes.

use std::collections::BTreeMap;

use crate::expression::Direction;
use crate::node::Node;
use crate::value::SqlValue;

/// One argument.
#[derive(Debug)]
pub enum Arg {
    /// A scalar value.
    Value(SqlValue),
    /// An ordered list of values.
    List(Vec<SqlValue>),
    /// A sort direction.
    Order(Direction),
    /// A node, used verbatim.
    Node(Box<dyn Node>),
}

impl Arg {
    /// Wraps a node.
    #[must_use]
    pub fn node(node: impl Node + 'static) -> Self {
        Self::Node(Box::new(node))
    }

    /// Returns true for node arguments.
    #[must_use]
    pub const fn is_node(&self) -> bool {
        matches!(self, Self::Node(_))
    }

    /// Returns the text of a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Value(SqlValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Value(value) => value.to_json().to_string(),
            Self::List(values) => {
                serde_json::Value::Array(values.iter().map(SqlValue::to_json).collect())
                    .to_string()
            }
            Self::Order(direction) => direction.as_str().to_string(),
            Self::Node(node) => format!("{node:?}"),
        }
    }
}

macro_rules! arg_from_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Self::Value(SqlValue::from(value))
                }
            }
        )*
    };
}

arg_from_value!(bool, i64, i32, u32, f64, String, &str);

impl From<SqlValue> for Arg {
    fn from(value: SqlValue) -> Self {
        Self::Value(value)
    }
}

impl<T: Into<SqlValue>> From<Vec<T>> for Arg {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Direction> for Arg {
    fn from(direction: Direction) -> Self {
        Self::Order(direction)
    }
}

impl From<Box<dyn Node>> for Arg {
    fn from(node: Box<dyn Node>) -> Self {
        Self::Node(node)
    }
}

/// Positional and named arguments for one `add` call.
///
/// Named arguments are visited in sorted key order.
#[derive(Debug, Default)]
pub struct Args {
    positional: Vec<Arg>,
    named: BTreeMap<String, Arg>,
}

impl Args {
    /// Creates an empty argument set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positional: Vec::new(),
            named: BTreeMap::new(),
        }
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Arg>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a named argument.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    /// Builds positional arguments from a sequence.
    #[must_use]
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Arg>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            named: BTreeMap::new(),
        }
    }

    /// Builds named arguments from a mapping.
    #[must_use]
    pub fn from_map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Arg>,
    {
        Self {
            positional: Vec::new(),
            named: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Number of arguments, positional and named.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    /// True when no arguments were given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<Arg>, BTreeMap<String, Arg>) {
        (self.positional, self.named)
    }
}
