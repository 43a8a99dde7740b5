//! Formula syntax tree
//!
//! The grammar is deliberately flat: a formula is a single function call
//! over one reference argument, a bare cell reference, or literal text.

use gridcalc_core::CellCoordinate;

/// Parsed formula
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormulaExpr {
    /// Text that is not a call or a reference; echoed back as the value
    Literal(String),

    /// A bare cell reference such as `=B2`
    Reference(CellCoordinate),

    /// `NAME(ARGS)`; `name` is canonical uppercase, `args` is the raw text
    /// between the parentheses
    Call { name: String, args: String },
}

impl FormulaExpr {
    /// Every cell this formula can read, whether or not it currently has content
    ///
    /// Unparseable or reversed ranges cover nothing.
    pub fn references(&self) -> Vec<CellCoordinate> {
        match self {
            FormulaExpr::Literal(_) => Vec::new(),
            FormulaExpr::Reference(coord) => vec![*coord],
            FormulaExpr::Call { args, .. } => crate::range::reference_footprint(args),
        }
    }

    /// Number of cells [`references`](Self::references) would return
    pub fn reference_count(&self) -> u64 {
        match self {
            FormulaExpr::Literal(_) => 0,
            FormulaExpr::Reference(_) => 1,
            FormulaExpr::Call { args, .. } => crate::range::parse_reference(args)
                .map(|range| range.cell_count())
                .unwrap_or(0),
        }
    }
}
