//! Error handling for export parsing and statistics.
//!
//! Provides error types with context for file access, section boundary
//! detection, column schema drift and value casting failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiaDashError {
    #[error("Cannot access export file: {path}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed export '{source_name}': {reason}")]
    MalformedInput { source_name: String, reason: String },

    #[error("Schema mismatch in {section} section: missing column '{column}'")]
    Schema { section: String, column: String },

    #[error("Cast failed in {section} section, row {row}, column '{column}': {value:?}")]
    Cast {
        section: String,
        column: String,
        row: usize,
        value: String,
    },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DiaDashError {
    /// Create a file access error for the given path
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed input error
    pub fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a schema error for a missing column
    pub fn schema(section: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Schema {
            section: section.into(),
            column: column.into(),
        }
    }

    /// Create a cast error for a single value
    pub fn cast(
        section: impl Into<String>,
        column: impl Into<String>,
        row: usize,
        value: impl Into<String>,
    ) -> Self {
        Self::Cast {
            section: section.into(),
            column: column.into(),
            row,
            value: value.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True when the export could not be opened or read.
    ///
    /// Callers downgrade this case to an absent dataset.
    pub fn is_file_access(&self) -> bool {
        matches!(self, Self::FileAccess { .. })
    }
}

pub type Result<T> = std::result::Result<T, DiaDashError>;
