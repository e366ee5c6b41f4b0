//! Error types for the migration tool.

use std::path::PathBuf;

use relsql_core::SqlError;

/// Errors that can occur while loading specs and generating DDL.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// The migration could not be rendered.
    #[error(transparent)]
    Sql(#[from] SqlError),

    /// IO error reading a spec file.
    #[error("IO error reading '{path}': {source}")]
    Io {
        /// Path of the spec file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A spec file is not valid JSON.
    #[error("Failed to parse spec file '{path}': {source}")]
    Parse {
        /// Path of the spec file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
