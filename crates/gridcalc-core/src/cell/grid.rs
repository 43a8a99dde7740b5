//! Raw text grid
//!
//! The grid is the caller's snapshot of the table being edited: rows of
//! optional text cells. An absent cell (`None`, or a column past the end of
//! a short row) is distinct from a present empty string.

use std::borrow::Cow;

use super::CellCoordinate;

/// Read access to cell text by coordinate
///
/// Formula evaluation only ever reads through this trait, so hosts can
/// plug in their own storage and the engine can layer computed values over
/// a caller's grid.
pub trait CellSource {
    /// Text of the cell at `coord`, or `None` if the cell is absent
    fn cell_text(&self, coord: CellCoordinate) -> Option<Cow<'_, str>>;
}

impl<T: CellSource + ?Sized> CellSource for &T {
    fn cell_text(&self, coord: CellCoordinate) -> Option<Cow<'_, str>> {
        (**self).cell_text(coord)
    }
}

/// A row-major grid of optional text cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    rows: Vec<Vec<Option<String>>>,
}

impl Grid {
    /// Create an empty grid
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Build a grid from rows of optional cells
    pub fn from_rows<R, C, S>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|cell| cell.map(Into::into)).collect())
                .collect(),
        }
    }

    /// Get the text at (row, col), if present
    pub fn get(&self, row: u32, col: u32) -> Option<&str> {
        self.rows
            .get(row as usize)?
            .get(col as usize)?
            .as_deref()
    }

    /// Get the text at a coordinate, if present
    pub fn get_at(&self, coord: CellCoordinate) -> Option<&str> {
        self.get(coord.row, coord.col)
    }

    /// Set or remove the text at (row, col), growing the grid as needed
    pub fn set(&mut self, row: u32, col: u32, text: Option<String>) {
        if text.is_none() && self.get(row, col).is_none() {
            return;
        }
        let (row, col) = (row as usize, col as usize);
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, None);
        }
        cells[col] = text;
    }

    /// Number of rows (including rows with no present cells)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Iterate over present cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellCoordinate, &str)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().filter_map(move |(c, cell)| {
                cell.as_deref()
                    .map(|text| (CellCoordinate::new(r as u32, c as u32), text))
            })
        })
    }
}

impl CellSource for Grid {
    fn cell_text(&self, coord: CellCoordinate) -> Option<Cow<'_, str>> {
        self.get_at(coord).map(Cow::Borrowed)
    }
}

impl From<Vec<Vec<Option<String>>>> for Grid {
    fn from(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }
}

impl From<Vec<Vec<&str>>> for Grid {
    /// Every cell given is present
    fn from(rows: Vec<Vec<&str>>) -> Self {
        Self::from_rows(rows.into_iter().map(|row| row.into_iter().map(Some)))
    }
}
