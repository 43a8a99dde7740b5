//! Formula values and evaluation results

use crate::error::FormulaError;
use gridcalc_core::CellCoordinate;
use indexmap::IndexSet;
use std::fmt;

/// Insertion-ordered set of cells read during an evaluation
pub type Dependencies = IndexSet<CellCoordinate>;

/// Value produced by a formula
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FormulaValue {
    Number(f64),
    String(String),
    Boolean(bool),
}

impl FormulaValue {
    /// Interpret cell text: numbers become `Number`, anything else stays text
    pub fn from_cell_text(text: &str) -> Self {
        match parse_number_exact(text) {
            Some(n) => FormulaValue::Number(n),
            None => FormulaValue::String(text.to_string()),
        }
    }
}

impl fmt::Display for FormulaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaValue::Number(n) => f.write_str(&format_number(*n)),
            FormulaValue::String(s) => f.write_str(s),
            FormulaValue::Boolean(true) => f.write_str("TRUE"),
            FormulaValue::Boolean(false) => f.write_str("FALSE"),
        }
    }
}

impl From<f64> for FormulaValue {
    fn from(n: f64) -> Self {
        FormulaValue::Number(n)
    }
}

impl From<String> for FormulaValue {
    fn from(s: String) -> Self {
        FormulaValue::String(s)
    }
}

impl From<&str> for FormulaValue {
    fn from(s: &str) -> Self {
        FormulaValue::String(s.to_string())
    }
}

impl From<bool> for FormulaValue {
    fn from(b: bool) -> Self {
        FormulaValue::Boolean(b)
    }
}

/// Outcome of evaluating one formula
///
/// Expected failures (unknown function, circular reference, ...) are
/// carried here as `error = true` with a message rather than as `Err`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormulaResult {
    pub value: FormulaValue,
    pub error: bool,
    pub error_message: Option<String>,
    pub dependencies: Dependencies,
}

impl FormulaResult {
    /// Successful result
    pub fn new(value: impl Into<FormulaValue>, dependencies: Dependencies) -> Self {
        Self {
            value: value.into(),
            error: false,
            error_message: None,
            dependencies,
        }
    }

    /// Text echoed back unchanged, with no dependencies
    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(FormulaValue::String(text.into()), Dependencies::new())
    }

    /// Error result with value 0
    pub fn from_error(err: &FormulaError) -> Self {
        Self {
            value: FormulaValue::Number(0.0),
            error: true,
            error_message: Some(err.to_string()),
            dependencies: Dependencies::new(),
        }
    }

    /// Result for a cell on a dependency cycle
    pub fn circular() -> Self {
        Self::from_error(&FormulaError::CircularReference)
    }

    pub fn is_error(&self) -> bool {
        self.error
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

/// Parse the longest numeric prefix of `text`, the way browsers' `parseFloat` does
///
/// Leading whitespace is skipped; trailing garbage is ignored (`"12px"` is
/// 12). Returns `None` when no number starts the text.
pub fn parse_float(text: &str) -> Option<f64> {
    numeric_prefix(text.trim_start()).map(|(n, _)| n)
}

/// Numeric value of cell text for aggregation: [`parse_float`], or 0
pub fn coerce_number(text: &str) -> f64 {
    match parse_float(text) {
        Some(n) if !n.is_nan() => n,
        _ => 0.0,
    }
}

/// Parse text that is a number in its entirety (surrounding whitespace allowed)
pub fn parse_number_exact(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    match numeric_prefix(trimmed) {
        Some((n, len)) if len == trimmed.len() => Some(n),
        _ => None,
    }
}

/// Returns the number and the byte length it occupies
fn numeric_prefix(s: &str) -> Option<(f64, usize)> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut end = 0;

    let negative = bytes.first() == Some(&b'-');
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        let n = if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        return Some((n, end + "Infinity".len()));
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end - int_start;

    let mut frac_digits = 0;
    if end < len && bytes[end] == b'.' {
        let mut j = end + 1;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        frac_digits = j - (end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end = j;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut j = end + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    // "5." is a number but not every float parser accepts the bare dot
    let numeric = s[..end].strip_suffix('.').unwrap_or(&s[..end]);
    numeric.parse::<f64>().ok().map(|n| (n, end))
}

/// Render a number the way the table UI expects to paint it
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // Also folds -0
        return "0".to_string();
    }

    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let s = format!("{:e}", n);
        match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => s,
        }
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_float_prefixes() {
        assert_eq!(parse_float("42"), Some(42.0));
        assert_eq!(parse_float("  3.5"), Some(3.5));
        assert_eq!(parse_float("12px"), Some(12.0));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("5."), Some(5.0));
        assert_eq!(parse_float("-7.25e2xyz"), Some(-725.0));
        assert_eq!(parse_float("1e"), Some(1.0));
        assert_eq!(parse_float("1e+"), Some(1.0));
        assert_eq!(parse_float("+8"), Some(8.0));
        assert_eq!(parse_float("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_float("0x10"), Some(0.0));
    }

    #[test]
    fn test_parse_float_rejects() {
        assert_eq!(parse_float(""), None);
        assert_eq!(parse_float("x"), None);
        assert_eq!(parse_float("."), None);
        assert_eq!(parse_float("-"), None);
        assert_eq!(parse_float("e5"), None);
        assert_eq!(parse_float("inf"), None);
    }

    #[test]
    fn test_coerce_number_defaults_to_zero() {
        assert_eq!(coerce_number("x"), 0.0);
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("10"), 10.0);
    }

    #[test]
    fn test_parse_number_exact() {
        assert_eq!(parse_number_exact(" 12 "), Some(12.0));
        assert_eq!(parse_number_exact("1.5e3"), Some(1500.0));
        assert_eq!(parse_number_exact("12px"), None);
        assert_eq!(parse_number_exact(""), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(6.0), "6");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(FormulaValue::Number(6.0).to_string(), "6");
        assert_eq!(FormulaValue::from("foo").to_string(), "foo");
        assert_eq!(FormulaValue::Boolean(true).to_string(), "TRUE");
    }

    #[test]
    fn test_from_cell_text() {
        assert_eq!(FormulaValue::from_cell_text("42"), FormulaValue::Number(42.0));
        assert_eq!(
            FormulaValue::from_cell_text("42 apples"),
            FormulaValue::String("42 apples".into())
        );
    }

    #[test]
    fn test_error_result() {
        let result = FormulaResult::from_error(&FormulaError::UnknownFunction("NOPE".into()));
        assert!(result.is_error());
        assert_eq!(result.value, FormulaValue::Number(0.0));
        assert_eq!(result.error_message(), Some("Unknown function: NOPE"));
        assert!(result.dependencies.is_empty());

        assert_eq!(
            FormulaResult::circular().error_message(),
            Some("Circular reference")
        );
    }
}
