//! # gridcalc
//!
//! A small formula engine for grid and table editors.
//!
//! Cells hold plain text; some of them hold formulas such as
//! `=SUM(A1:B3)`. The engine evaluates formulas against the host's grid,
//! caches the results and tracks which cells each formula reads so that an
//! edit dirties only the results it can affect.
//!
//! ## Features
//!
//! - Spreadsheet-style A1 references and rectangular ranges
//! - Built-in SUM, AVG, MIN, MAX, COUNT and CONCAT, plus custom functions
//! - Cached results with transitive invalidation
//! - Circular reference detection
//!
//! ## Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let grid = Grid::from(vec![
//!     vec!["10", "apples"],
//!     vec!["32", "pears"],
//! ]);
//!
//! let mut engine = FormulaEngine::new();
//! engine.set_formula(2, 0, "=SUM(A1:A2)");
//! engine.set_formula(2, 1, "=CONCAT(B1:B2)");
//!
//! assert_eq!(engine.recompute(2, 0, &grid).value, FormulaValue::Number(42.0));
//! assert_eq!(engine.recompute(2, 1, &grid).value.to_string(), "applespears");
//! ```

pub mod engine;
pub mod options;
pub mod prelude;

pub use engine::{CellState, FormulaEngine, RecomputeStats};
pub use options::{EngineOptions, InvalidationMode};

// Re-export core types
pub use gridcalc_core::{
    column_to_index, index_to_column, parse_cell_ref, CellCoordinate, CellRange, CellSource,
    Error, Grid, Result,
};

// Re-export formula types
pub use gridcalc_formula::{
    evaluate, parse_formula, EvaluationContext, FormulaError, FormulaExpr, FormulaResult,
    FormulaValue, FunctionDef, FunctionRegistry, RangeValues,
};
