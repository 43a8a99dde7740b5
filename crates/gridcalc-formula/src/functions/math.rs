//! Numeric aggregates
//!
//! Every value is coerced with [`coerce_number`]: text that does not start
//! with a number counts as 0 instead of raising an error.

use crate::error::Result;
use crate::evaluator::EvaluationContext;
use crate::range::RangeValues;
use crate::value::{coerce_number, FormulaValue};

fn numbers(range: &RangeValues) -> impl Iterator<Item = f64> + '_ {
    range.iter().map(coerce_number)
}

/// Sum starting from +0; `Iterator::sum` for floats starts from -0
fn total(range: &RangeValues) -> f64 {
    numbers(range).fold(0.0, |acc, n| acc + n)
}

/// SUM function
pub fn fn_sum(range: &RangeValues, _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Number(total(range)))
}

/// AVG function
///
/// Divides by the number of present cells, numeric or not. An empty range
/// averages to 0.
pub fn fn_avg(range: &RangeValues, _ctx: &EvaluationContext) -> Result<FormulaValue> {
    if range.is_empty() {
        return Ok(FormulaValue::Number(0.0));
    }
    Ok(FormulaValue::Number(total(range) / range.len() as f64))
}

/// MIN function (0 for an empty range)
pub fn fn_min(range: &RangeValues, _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let min = numbers(range).reduce(f64::min);
    Ok(FormulaValue::Number(min.unwrap_or(0.0)))
}

/// MAX function (0 for an empty range)
pub fn fn_max(range: &RangeValues, _ctx: &EvaluationContext) -> Result<FormulaValue> {
    let max = numbers(range).reduce(f64::max);
    Ok(FormulaValue::Number(max.unwrap_or(0.0)))
}
