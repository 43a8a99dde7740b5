//! Cell coordinate and range types

use crate::error::{Error, Result};
use lazy_regex::regex_captures;
use std::fmt;
use std::str::FromStr;

/// A structural cell coordinate
///
/// Both axes are 0-based. In A1 notation the column is written in
/// bijective base-26 letters (A-Z, AA-AZ, BA-...) and the row is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellCoordinate {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., Z=25, AA=26)
    pub col: u32,
}

impl CellCoordinate {
    /// Create a new coordinate
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse an A1-style reference, reporting why it was rejected
    ///
    /// Only the strict `^[A-Z]+[1-9][0-9]*$` shape is accepted: column
    /// letters are uppercase, there are no `$` markers and no surrounding
    /// whitespace.
    ///
    /// # Examples
    /// ```
    /// use gridcalc_core::CellCoordinate;
    ///
    /// let coord = CellCoordinate::parse("B12").unwrap();
    /// assert_eq!(coord.row, 11);
    /// assert_eq!(coord.col, 1);
    ///
    /// assert!(CellCoordinate::parse("b12").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let (_, letters, digits) = regex_captures!(r"^([A-Z]+)([1-9][0-9]*)$", s)
            .ok_or_else(|| Error::InvalidAddress(format!("'{}' is not an A1 reference", s)))?;

        let col = column_to_index(letters).ok_or_else(|| Error::ColumnOutOfBounds(s.into()))?;

        let row: u32 = digits
            .parse()
            .map_err(|_| Error::RowOutOfBounds(s.into()))?;

        // Rows are 1-based in text; the regex rules out 0
        Ok(Self { row: row - 1, col })
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", index_to_column(self.col), u64::from(self.row) + 1)
    }
}

impl fmt::Display for CellCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellCoordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parse an A1-style reference, returning `None` for anything malformed
///
/// This is the lenient entry point used during formula evaluation, where a
/// reference that does not parse simply resolves to nothing.
pub fn parse_cell_ref(text: &str) -> Option<CellCoordinate> {
    CellCoordinate::parse(text).ok()
}

/// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
///
/// Returns `None` for empty input, anything other than `A`-`Z`, or a
/// column that does not fit in a `u32`.
pub fn column_to_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }

    let mut col: u64 = 0;
    for b in letters.bytes() {
        if !b.is_ascii_uppercase() {
            return None;
        }
        col = col
            .checked_mul(26)?
            .checked_add(u64::from(b - b'A') + 1)?;
    }

    u32::try_from(col - 1).ok()
}

/// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
pub fn index_to_column(col: u32) -> String {
    let mut result = Vec::new();
    let mut n = u64::from(col) + 1; // 1-based for calculation

    while n > 0 {
        n -= 1;
        result.push((n % 26) as u8 + b'A');
        n /= 26;
    }

    result.reverse();
    // Only ASCII uppercase letters were pushed
    result.into_iter().map(char::from).collect()
}

/// A rectangular range of cells (e.g., "A1:B10")
///
/// Ranges are kept exactly as written. When `end` precedes `start` on
/// either axis the range covers no cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// First corner as written
    pub start: CellCoordinate,
    /// Second corner as written
    pub end: CellCoordinate,
}

impl CellRange {
    /// Create a new cell range (not normalized)
    pub fn new(start: CellCoordinate, end: CellCoordinate) -> Self {
        Self { start, end }
    }

    /// Create a single-cell range
    pub fn single(coord: CellCoordinate) -> Self {
        Self {
            start: coord,
            end: coord,
        }
    }

    /// Parse a range from `A1:B10` notation, or a single `A1` reference
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((start, end)) => {
                let start = CellCoordinate::parse(start)
                    .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
                let end = CellCoordinate::parse(end)
                    .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
                Ok(Self::new(start, end))
            }
            None => Ok(Self::single(CellCoordinate::parse(s)?)),
        }
    }

    /// Whether the range covers no cells (written bottom-right to top-left)
    pub fn is_empty(&self) -> bool {
        self.end.row < self.start.row || self.end.col < self.start.col
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            u64::from(self.end.row - self.start.row) + 1
        }
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            u64::from(self.end.col - self.start.col) + 1
        }
    }

    /// Get the total number of cells in the range
    pub fn cell_count(&self) -> u64 {
        self.row_count().saturating_mul(self.col_count())
    }

    /// Check if a cell is within this range
    pub fn contains(&self, coord: &CellCoordinate) -> bool {
        coord.row >= self.start.row
            && coord.row <= self.end.row
            && coord.col >= self.start.col
            && coord.col <= self.end.col
    }

    /// Iterate over all coordinates in the range (row by row)
    pub fn cells(&self) -> CellRangeIterator {
        CellRangeIterator {
            range: *self,
            current_row: self.start.row,
            current_col: self.start.col,
            done: self.is_empty(),
        }
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Iterator over coordinates in a range
pub struct CellRangeIterator {
    range: CellRange,
    current_row: u32,
    current_col: u32,
    done: bool,
}

impl Iterator for CellRangeIterator {
    type Item = CellCoordinate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let coord = CellCoordinate::new(self.current_row, self.current_col);

        // Move to next cell without stepping past the range bounds
        if self.current_col < self.range.end.col {
            self.current_col += 1;
        } else if self.current_row < self.range.end.row {
            self.current_col = self.range.start.col;
            self.current_row += 1;
        } else {
            self.done = true;
        }

        Some(coord)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let cols = self.range.col_count();
        let remaining = u64::from(self.range.end.row - self.current_row) * cols
            + u64::from(self.range.end.col - self.current_col)
            + 1;
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_index_to_column() {
        assert_eq!(index_to_column(0), "A");
        assert_eq!(index_to_column(1), "B");
        assert_eq!(index_to_column(25), "Z");
        assert_eq!(index_to_column(26), "AA");
        assert_eq!(index_to_column(27), "AB");
        assert_eq!(index_to_column(51), "AZ");
        assert_eq!(index_to_column(52), "BA");
        assert_eq!(index_to_column(701), "ZZ");
        assert_eq!(index_to_column(702), "AAA");
        assert_eq!(index_to_column(16383), "XFD");
    }

    #[test]
    fn test_column_to_index() {
        assert_eq!(column_to_index("A"), Some(0));
        assert_eq!(column_to_index("Z"), Some(25));
        assert_eq!(column_to_index("AA"), Some(26));
        assert_eq!(column_to_index("AZ"), Some(51));
        assert_eq!(column_to_index("BA"), Some(52));
        assert_eq!(column_to_index("AAA"), Some(702));

        // Uppercase only
        assert_eq!(column_to_index("a"), None);
        assert_eq!(column_to_index(""), None);
        assert_eq!(column_to_index("A1"), None);

        // Does not fit in u32
        assert_eq!(column_to_index("ZZZZZZZZZZZZ"), None);
    }

    #[test]
    fn test_column_round_trip_small_indices() {
        for i in 0..=1000 {
            assert_eq!(column_to_index(&index_to_column(i)), Some(i));
        }
    }

    #[test]
    fn test_column_round_trip_extremes() {
        assert_eq!(column_to_index(&index_to_column(u32::MAX)), Some(u32::MAX));
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some(CellCoordinate::new(0, 0)));
        assert_eq!(parse_cell_ref("Z1"), Some(CellCoordinate::new(0, 25)));
        assert_eq!(parse_cell_ref("AA1"), Some(CellCoordinate::new(0, 26)));
        assert_eq!(parse_cell_ref("B12"), Some(CellCoordinate::new(11, 1)));
    }

    #[test]
    fn test_parse_cell_ref_rejects() {
        assert_eq!(parse_cell_ref("a1"), None);
        assert_eq!(parse_cell_ref("1A"), None);
        assert_eq!(parse_cell_ref(""), None);
        assert_eq!(parse_cell_ref("A"), None);
        assert_eq!(parse_cell_ref("A0"), None);
        assert_eq!(parse_cell_ref("A01"), None);
        assert_eq!(parse_cell_ref("$A$1"), None);
        assert_eq!(parse_cell_ref(" A1"), None);
        assert_eq!(parse_cell_ref("A1 "), None);
        assert_eq!(parse_cell_ref("A99999999999"), None);
    }

    #[test]
    fn test_parse_errors_carry_reason() {
        assert!(matches!(
            CellCoordinate::parse("a1"),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            CellCoordinate::parse("A99999999999"),
            Err(Error::RowOutOfBounds(_))
        ));
        assert!(matches!(
            CellCoordinate::parse("ZZZZZZZZZZZZ1"),
            Err(Error::ColumnOutOfBounds(_))
        ));
    }

    #[test]
    fn test_cell_coordinate_display() {
        assert_eq!(CellCoordinate::new(0, 0).to_string(), "A1");
        assert_eq!(CellCoordinate::new(99, 2).to_string(), "C100");
        assert_eq!(CellCoordinate::new(0, 26).to_string(), "AA1");
    }

    #[test]
    fn test_cell_range_parse() {
        let range = CellRange::parse("A1:B2").unwrap();
        assert_eq!(range.start, CellCoordinate::new(0, 0));
        assert_eq!(range.end, CellCoordinate::new(1, 1));

        // Single cell
        let range = CellRange::parse("C3").unwrap();
        assert_eq!(range.start, CellCoordinate::new(2, 2));
        assert_eq!(range.end, CellCoordinate::new(2, 2));

        assert!(matches!(
            CellRange::parse("A1:b2"),
            Err(Error::InvalidRange(_))
        ));
        assert!(CellRange::parse("A1:B2:C3").is_err());
    }

    #[test]
    fn test_cell_range_is_not_normalized() {
        let range = CellRange::parse("B3:A1").unwrap();
        assert_eq!(range.start, CellCoordinate::new(2, 1));
        assert!(range.is_empty());
        assert_eq!(range.cell_count(), 0);
        assert_eq!(range.cells().count(), 0);

        // Reversed on one axis only
        let range = CellRange::parse("B1:A3").unwrap();
        assert!(range.is_empty());
        assert_eq!(range.cells().next(), None);
    }

    #[test]
    fn test_cell_range_contains() {
        let range = CellRange::parse("B2:D4").unwrap();

        assert!(range.contains(&CellCoordinate::new(1, 1))); // B2
        assert!(range.contains(&CellCoordinate::new(3, 3))); // D4
        assert!(range.contains(&CellCoordinate::new(2, 2))); // C3

        assert!(!range.contains(&CellCoordinate::new(0, 0))); // A1
        assert!(!range.contains(&CellCoordinate::new(4, 1))); // B5
    }

    #[test]
    fn test_cell_range_iterator() {
        let range = CellRange::parse("A1:B2").unwrap();
        let iter = range.cells();
        assert_eq!(iter.size_hint(), (4, Some(4)));
        let cells: Vec<_> = iter.collect();

        assert_eq!(
            cells,
            vec![
                CellCoordinate::new(0, 0), // A1
                CellCoordinate::new(0, 1), // B1
                CellCoordinate::new(1, 0), // A2
                CellCoordinate::new(1, 1), // B2
            ]
        );
    }

    #[test]
    fn test_cell_range_iterator_at_axis_limit() {
        let corner = CellCoordinate::new(u32::MAX, u32::MAX);
        let cells: Vec<_> = CellRange::single(corner).cells().collect();
        assert_eq!(cells, vec![corner]);
    }

    proptest! {
        #[test]
        fn prop_column_letters_round_trip(index in 0u32..=u32::MAX) {
            prop_assert_eq!(column_to_index(&index_to_column(index)), Some(index));
        }

        #[test]
        fn prop_a1_string_round_trip(row in 0u32..u32::MAX, col in 0u32..=u32::MAX) {
            let coord = CellCoordinate::new(row, col);
            prop_assert_eq!(parse_cell_ref(&coord.to_a1_string()), Some(coord));
        }
    }
}
