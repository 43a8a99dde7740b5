//! # gridcalc-core
//!
//! Core data structures for the gridcalc formula engine.
//!
//! This crate provides the fundamental types used throughout gridcalc:
//! - [`CellCoordinate`] and [`CellRange`] - Cell addressing and ranges
//! - [`Grid`] - The caller-owned snapshot of raw cell text
//! - [`CellSource`] - Read access to cell text, implemented by [`Grid`]
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{parse_cell_ref, CellCoordinate, Grid};
//!
//! let grid = Grid::from(vec![vec!["1", "2"], vec!["3", "4"]]);
//!
//! let b2 = parse_cell_ref("B2").unwrap();
//! assert_eq!(b2, CellCoordinate::new(1, 1));
//! assert_eq!(grid.get_at(b2), Some("4"));
//! ```

pub mod cell;
pub mod error;

// Re-exports for convenience
pub use cell::{
    column_to_index, index_to_column, parse_cell_ref, CellCoordinate, CellRange,
    CellRangeIterator, CellSource, Grid,
};
pub use error::{Error, Result};
