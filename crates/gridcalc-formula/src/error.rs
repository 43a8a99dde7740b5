//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type Result<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula evaluation
///
/// These never escape [`evaluate`](crate::evaluate): they are turned into
/// error results whose message is the `Display` text below.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormulaError {
    /// Function name not present in the registry
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// The cell lies on a cycle of formula references
    #[error("Circular reference")]
    CircularReference,

    /// A range covers more cells than the configured limit
    #[error("Range too large: {range} covers {cells} cells (limit {limit})")]
    RangeTooLarge {
        range: String,
        cells: u64,
        limit: u64,
    },
}
