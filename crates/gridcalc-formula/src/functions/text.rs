//! Text functions

use crate::error::Result;
use crate::evaluator::EvaluationContext;
use crate::range::RangeValues;
use crate::value::FormulaValue;

/// CONCAT(range) - Joins the raw cell texts in range order, no separator
pub fn fn_concat(range: &RangeValues, _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::String(range.values.concat()))
}
