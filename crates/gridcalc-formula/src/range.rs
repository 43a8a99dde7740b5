//! Reference and range expansion
//!
//! Turns argument text such as `A1` or `A1:B3` into the values present in a
//! [`CellSource`], in row-major order, together with the coordinates read.

use crate::value::Dependencies;
use gridcalc_core::{CellCoordinate, CellRange, CellSource};

/// Values gathered from a reference, plus the cells they came from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeValues {
    /// Raw text of each present cell, in range order
    pub values: Vec<String>,
    /// Coordinates of the present cells, in range order
    pub touched: Dependencies,
}

impl RangeValues {
    /// Number of present cells
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

/// Parse reference text (`A1` or `A1:B3`) into a range
///
/// Surrounding whitespace is ignored. The range is not normalized, so
/// `B3:A1` parses but covers no cells.
pub fn parse_reference(text: &str) -> Option<CellRange> {
    CellRange::parse(text.trim()).ok()
}

/// Expand a reference against a cell source
///
/// Absent cells are skipped rather than read as empty text. Text that does
/// not parse as a reference, and reversed ranges, expand to nothing.
pub fn expand_range(text: &str, source: &dyn CellSource) -> RangeValues {
    match parse_reference(text) {
        Some(range) => expand(&range, source),
        None => RangeValues::default(),
    }
}

pub(crate) fn expand(range: &CellRange, source: &dyn CellSource) -> RangeValues {
    let mut expanded = RangeValues::default();
    for coord in range.cells() {
        if let Some(text) = source.cell_text(coord) {
            expanded.values.push(text.into_owned());
            expanded.touched.insert(coord);
        }
    }
    expanded
}

/// Every coordinate a reference covers, present or not
pub fn reference_footprint(text: &str) -> Vec<CellCoordinate> {
    parse_reference(text)
        .map(|range| range.cells().collect())
        .unwrap_or_default()
}
