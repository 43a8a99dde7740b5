//! Formula parser
//!
//! Recognizes the `NAME(ARGS)` call shape. There is no operator grammar:
//! text such as `=A1+B1` does not match and is echoed back as a literal.
//! An arithmetic layer would sit beside this as its own parser feeding the
//! same function registry.

use crate::ast::FormulaExpr;
use gridcalc_core::parse_cell_ref;
use lazy_regex::regex_captures;

/// Parse formula text into a [`FormulaExpr`]
///
/// A single leading `=` is stripped. Parsing never fails: anything that is
/// neither a call nor a bare cell reference becomes a literal.
///
/// # Example
/// ```rust
/// use gridcalc_formula::{parse_formula, FormulaExpr};
///
/// let expr = parse_formula("=sum(A1:A3)");
/// assert_eq!(
///     expr,
///     FormulaExpr::Call { name: "SUM".into(), args: "A1:A3".into() }
/// );
///
/// assert_eq!(parse_formula("hello"), FormulaExpr::Literal("hello".into()));
/// ```
pub fn parse_formula(formula: &str) -> FormulaExpr {
    let body = formula.strip_prefix('=').unwrap_or(formula);

    if let Some((_, name, args)) = regex_captures!(r"^([A-Za-z0-9_]+)\((.*)\)$", body) {
        return FormulaExpr::Call {
            name: name.to_ascii_uppercase(),
            args: args.to_string(),
        };
    }

    if let Some(coord) = parse_cell_ref(body) {
        return FormulaExpr::Reference(coord);
    }

    FormulaExpr::Literal(body.to_string())
}
