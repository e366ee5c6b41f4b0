//! Error type for SQL builder usage errors.
//!
//! Every variant names the node that rejected the call (`LIMIT`, `VALUES`,
//! `EQ`, `TABLE`, ...). Validation happens before anything is appended, so a
//! failed call leaves the node as it was.

/// Errors raised while building or generating SQL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SqlError {
    /// A criterion without an inversion template was asked to invert.
    #[error("{node}: no invert without INVERT operand")]
    InvalidInversion {
        /// The criterion kind.
        node: &'static str,
    },

    /// A clause received more values than it has free slots.
    #[error("{node}: cannot add when {node} set")]
    Overfill {
        /// The clause name.
        node: &'static str,
    },

    /// A value had the wrong type for its slot.
    #[error("{node}: {message}")]
    TypeViolation {
        /// The offending node.
        node: &'static str,
        /// What was expected.
        message: String,
    },

    /// Arguments were passed in a shape the node does not accept.
    #[error("{node}: {message}")]
    ShapeConflict {
        /// The offending node.
        node: &'static str,
        /// What was wrong with the shape.
        message: String,
    },

    /// A row's length disagrees with the established field count.
    #[error("{node}: wrong values {values} for fields {fields:?}")]
    ArityMismatch {
        /// The offending node.
        node: &'static str,
        /// The rejected values, rendered for the message.
        values: String,
        /// The established fields.
        fields: Vec<String>,
    },

    /// A named row omitted an established field.
    #[error("{node}: missing field {field} in {keys:?}")]
    MissingField {
        /// The offending node.
        node: &'static str,
        /// The field that is missing.
        field: String,
        /// The keys that were supplied.
        keys: Vec<String>,
    },

    /// A migration references a field the definition does not have.
    #[error("{node}: field {field} not found")]
    UnknownField {
        /// The offending node.
        node: &'static str,
        /// The unknown field name.
        field: String,
    },

    /// A migration spec could not be read.
    #[error("{node}: malformed spec: {message}")]
    MalformedSpec {
        /// The offending node.
        node: &'static str,
        /// Deserialization message.
        message: String,
    },
}

impl SqlError {
    /// Returns the name of the node that raised the error.
    #[must_use]
    pub const fn node(&self) -> &'static str {
        match self {
            Self::InvalidInversion { node }
            | Self::Overfill { node }
            | Self::TypeViolation { node, .. }
            | Self::ShapeConflict { node, .. }
            | Self::ArityMismatch { node, .. }
            | Self::MissingField { node, .. }
            | Self::UnknownField { node, .. }
            | Self::MalformedSpec { node, .. } => node,
        }
    }

    pub(crate) fn shape(node: &'static str, message: impl Into<String>) -> Self {
        Self::ShapeConflict {
            node,
            message: message.into(),
        }
    }
}

/// Result type for SQL builder operations.
pub type Result<T> = std::result::Result<T, SqlError>;
