//! Built-in aggregate functions
//!
//! Functions are looked up by name in a [`FunctionRegistry`]. Adding a
//! function means registering a [`FunctionDef`]; the dispatcher never
//! changes.

pub mod math;
pub mod statistical;
pub mod text;

use crate::error::Result;
use crate::evaluator::EvaluationContext;
use crate::range::RangeValues;
use crate::value::FormulaValue;
use ahash::AHashMap;
use std::fmt;
use std::sync::OnceLock;

/// Function implementation signature
///
/// Functions receive the expanded argument range. The cells it touched are
/// recorded as dependencies by the caller, not by the function.
pub type FunctionImpl = fn(&RangeValues, &EvaluationContext) -> Result<FormulaValue>;

/// Function definition
#[derive(Clone, Copy)]
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// One-line summary
    pub description: &'static str,
    /// Implementation
    pub implementation: FunctionImpl,
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Function registry
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

/// Built-in registry shared by every evaluation that does not bring its own
static BUILTIN_FUNCTIONS: OnceLock<FunctionRegistry> = OnceLock::new();

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_builtin_functions();
        registry
    }

    /// Create a registry with no functions
    pub fn empty() -> Self {
        Self::default()
    }

    /// The process-wide built-in registry
    pub fn builtin() -> &'static FunctionRegistry {
        BUILTIN_FUNCTIONS.get_or_init(FunctionRegistry::new)
    }

    /// Look up a function by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_ascii_uppercase())
    }

    /// Whether a function is registered under `name` (case-insensitive)
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Register a function, replacing any existing one with the same name
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_ascii_uppercase(), def);
    }

    /// Registered names in alphabetical order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn register_builtin_functions(&mut self) {
        self.register(FunctionDef {
            name: "SUM",
            description: "Sum of the numeric values in the range; text counts as 0",
            implementation: math::fn_sum,
        });

        self.register(FunctionDef {
            name: "AVG",
            description: "SUM divided by the number of present cells; 0 for an empty range",
            implementation: math::fn_avg,
        });

        self.register(FunctionDef {
            name: "MIN",
            description: "Smallest numeric value; 0 for an empty range",
            implementation: math::fn_min,
        });

        self.register(FunctionDef {
            name: "MAX",
            description: "Largest numeric value; 0 for an empty range",
            implementation: math::fn_max,
        });

        self.register(FunctionDef {
            name: "COUNT",
            description: "Number of present cells in the range",
            implementation: statistical::fn_count,
        });

        self.register(FunctionDef {
            name: "CONCAT",
            description: "Cell texts joined in range order without a separator",
            implementation: text::fn_concat,
        });
    }
}
