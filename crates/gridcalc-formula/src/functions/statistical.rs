//! Counting functions

use crate::error::Result;
use crate::evaluator::EvaluationContext;
use crate::range::RangeValues;
use crate::value::FormulaValue;

/// COUNT(range) - Counts the populated cells in a range
///
/// Every present cell counts, whether or not its text is numeric; absent
/// cells never reach the range so they are not counted.
pub fn fn_count(range: &RangeValues, _ctx: &EvaluationContext) -> Result<FormulaValue> {
    Ok(FormulaValue::Number(range.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_count_includes_text_and_empty_strings() {
        let range = RangeValues {
            values: vec!["1".into(), "apple".into(), String::new()],
            ..Default::default()
        };
        let result = fn_count(&range, &EvaluationContext::simple()).unwrap();
        assert_eq!(result, FormulaValue::Number(3.0));
    }

    #[test]
    fn test_count_empty() {
        let result = fn_count(&RangeValues::default(), &EvaluationContext::simple()).unwrap();
        assert_eq!(result, FormulaValue::Number(0.0));
    }
}
