//! # gridcalc-formula
//!
//! Formula parser and evaluator for gridcalc.
//!
//! This crate provides:
//! - Formula parsing (`NAME(ARGS)` calls, bare references, literal text)
//! - Reference and range expansion against a [`CellSource`](gridcalc_core::CellSource)
//! - Built-in aggregate functions (SUM, AVG, MIN, MAX, COUNT, CONCAT)
//! - Dependency tracking for recalculation
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::Grid;
//! use gridcalc_formula::{evaluate, FormulaValue};
//!
//! let grid = Grid::from(vec![vec!["foo"], vec!["bar"]]);
//! let result = evaluate("=CONCAT(A1:A2)", &grid);
//! assert_eq!(result.value, FormulaValue::String("foobar".into()));
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod range;
pub mod value;

pub use ast::FormulaExpr;
pub use dependency::DependencyGraph;
pub use error::{FormulaError, Result};
pub use evaluator::{
    evaluate, evaluate_expr, evaluate_with, EvaluationContext, DEFAULT_MAX_RANGE_CELLS,
};
pub use functions::{FunctionDef, FunctionImpl, FunctionRegistry};
pub use parser::parse_formula;
pub use range::{expand_range, reference_footprint, RangeValues};
pub use value::{coerce_number, parse_float, Dependencies, FormulaResult, FormulaValue};
