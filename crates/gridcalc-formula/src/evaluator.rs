//! Formula evaluator
//!
//! Evaluates parsed formulas against a [`CellSource`]. Evaluation is total:
//! every failure becomes an error [`FormulaResult`].

use crate::ast::FormulaExpr;
use crate::error::{FormulaError, Result};
use crate::functions::FunctionRegistry;
use crate::parser::parse_formula;
use crate::range::{self, RangeValues};
use crate::value::{Dependencies, FormulaResult, FormulaValue};
use gridcalc_core::{CellSource, Grid};

/// Default upper bound on the number of cells a single range may cover
pub const DEFAULT_MAX_RANGE_CELLS: u64 = 1_000_000;

static EMPTY_GRID: Grid = Grid::new();

/// Context for formula evaluation
pub struct EvaluationContext<'a> {
    /// Where cell text is read from
    pub source: &'a dyn CellSource,
    /// Functions available to `NAME(...)` calls
    pub functions: &'a FunctionRegistry,
    /// Ranges covering more cells than this are rejected
    pub max_range_cells: u64,
}

impl<'a> EvaluationContext<'a> {
    /// Create a context over `source` with the built-in functions
    pub fn new(source: &'a dyn CellSource) -> Self {
        Self {
            source,
            functions: FunctionRegistry::builtin(),
            max_range_cells: DEFAULT_MAX_RANGE_CELLS,
        }
    }

    /// Create a context over an empty grid (for testing)
    pub fn simple() -> EvaluationContext<'static> {
        EvaluationContext::new(&EMPTY_GRID)
    }

    /// Use a different function registry
    pub fn with_functions(mut self, functions: &'a FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    /// Use a different range size limit
    pub fn with_max_range_cells(mut self, max_range_cells: u64) -> Self {
        self.max_range_cells = max_range_cells;
        self
    }

    /// Expand reference text, enforcing the range size limit
    pub fn expand_range(&self, text: &str) -> Result<RangeValues> {
        let Some(range) = range::parse_reference(text) else {
            return Ok(RangeValues::default());
        };

        let cells = range.cell_count();
        if cells > self.max_range_cells {
            return Err(FormulaError::RangeTooLarge {
                range: range.to_a1_string(),
                cells,
                limit: self.max_range_cells,
            });
        }

        Ok(range::expand(&range, self.source))
    }
}

/// Evaluate formula text against a cell source with the built-in functions
///
/// # Example
/// ```rust
/// use gridcalc_core::Grid;
/// use gridcalc_formula::{evaluate, FormulaValue};
///
/// let grid = Grid::from(vec![vec!["1"], vec!["2"], vec!["3"]]);
/// let result = evaluate("=SUM(A1:A3)", &grid);
///
/// assert_eq!(result.value, FormulaValue::Number(6.0));
/// assert_eq!(result.dependencies.len(), 3);
/// ```
pub fn evaluate(formula: &str, source: &dyn CellSource) -> FormulaResult {
    evaluate_with(formula, &EvaluationContext::new(source))
}

/// Evaluate formula text with an explicit context
pub fn evaluate_with(formula: &str, ctx: &EvaluationContext) -> FormulaResult {
    evaluate_expr(&parse_formula(formula), ctx)
}

/// Evaluate an already parsed formula
pub fn evaluate_expr(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult {
    match try_evaluate(expr, ctx) {
        Ok(result) => result,
        Err(e) => {
            log::trace!("formula evaluation failed: {}", e);
            FormulaResult::from_error(&e)
        }
    }
}

fn try_evaluate(expr: &FormulaExpr, ctx: &EvaluationContext) -> Result<FormulaResult> {
    match expr {
        FormulaExpr::Literal(text) => Ok(FormulaResult::literal(text.as_str())),

        FormulaExpr::Reference(coord) => {
            let value = match ctx.source.cell_text(*coord) {
                Some(text) => FormulaValue::from_cell_text(&text),
                None => FormulaValue::String(String::new()),
            };
            let mut dependencies = Dependencies::new();
            dependencies.insert(*coord);
            Ok(FormulaResult::new(value, dependencies))
        }

        FormulaExpr::Call { name, args } => evaluate_function(name, args, ctx),
    }
}

/// Evaluate a function call
fn evaluate_function(name: &str, args: &str, ctx: &EvaluationContext) -> Result<FormulaResult> {
    let func = ctx
        .functions
        .get(name)
        .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

    let range = ctx.expand_range(args)?;
    let value = (func.implementation)(&range, ctx)?;

    Ok(FormulaResult::new(value, range.touched))
}
