//! Prelude module - common imports for gridcalc users
//!
//! ```rust
//! use gridcalc::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellCoordinate,
    CellRange,
    CellSource,
    // Engine types
    CellState,
    EngineOptions,
    // Formula types
    FormulaEngine,
    FormulaResult,
    FormulaValue,
    Grid,
    InvalidationMode,
    RecomputeStats,
};
