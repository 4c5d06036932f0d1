//! Error handling for rowmap-sqlite
//!
//! Wraps rowmap-core MapError with driver-specific helpers

use rowmap_core::errors::{binding, binding_caused_by, driver, MapError};

/// Result type alias using MapError
pub type Result<T> = std::result::Result<T, MapError>;

/// Wrap a rusqlite error; it reaches the caller unchanged as the error source
pub fn from_rusqlite(err: rusqlite::Error) -> MapError {
    driver(err)
}

/// Create an error for a named parameter the statement does not declare
pub fn unknown_parameter(name: &str) -> MapError {
    binding(name, "parameter not found in statement")
}

/// Create an error for a column whose storage class has no engine value
pub fn unsupported_column(column: &str, storage: &str) -> MapError {
    binding(column, format!("{} columns are not supported", storage))
}

/// Create an error for a text cell that is not valid UTF-8
pub fn invalid_text(column: &str, err: std::str::Utf8Error) -> MapError {
    binding_caused_by(column, "text column is not valid UTF-8", err)
}
