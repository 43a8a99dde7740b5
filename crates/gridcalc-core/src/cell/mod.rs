//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellCoordinate`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A range of cells (e.g., "A1:B10")
//! - [`Grid`] and [`CellSource`] - The raw text being evaluated

mod address;
mod grid;

pub use address::{
    column_to_index, index_to_column, parse_cell_ref, CellCoordinate, CellRange,
    CellRangeIterator,
};
pub use grid::{CellSource, Grid};
