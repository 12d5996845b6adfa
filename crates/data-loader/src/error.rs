//! Error types for the data-loader crate.

use thiserror::Error;

/// Errors that can occur while loading transactions or building a rating matrix
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in a transaction file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A field or parameter had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// The same label appears twice on one axis of a rating matrix
    #[error("Duplicate {axis} label: {label}")]
    DuplicateLabel { axis: String, label: String },

    /// Dense rows handed to a matrix constructor don't match its labels
    #[error("Expected {expected} cells but found {found} in row {row}")]
    ShapeMismatch {
        expected: usize,
        found: usize,
        row: usize,
    },

    /// Referenced label doesn't exist in the matrix
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
