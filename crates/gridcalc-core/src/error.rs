//! Error types for gridcalc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gridcalc-core
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row number does not fit the coordinate type
    #[error("Row number out of bounds in '{0}'")]
    RowOutOfBounds(String),

    /// Column letters do not fit the coordinate type
    #[error("Column letters out of bounds in '{0}'")]
    ColumnOutOfBounds(String),
}
