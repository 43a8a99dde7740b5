//! Engine configuration

use gridcalc_formula::DEFAULT_MAX_RANGE_CELLS;

/// How far a change propagates through cached results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvalidationMode {
    /// Dirty the changed cell and every cell that reads it, transitively
    #[default]
    Transitive,
    /// Dirty only the changed cell; readers keep serving their cached
    /// results until they are changed themselves
    DirectOnly,
}

/// Options for the formula engine
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineOptions {
    /// Invalidation strategy used by `set_formula`, `remove_formula` and `cell_changed`
    pub invalidation: InvalidationMode,
    /// Maximum number of cells a single range may cover (default: 1,000,000)
    ///
    /// Larger ranges evaluate to a `Range too large` error result. Set to
    /// `u64::MAX` to accept any range; aggregates then never error.
    pub max_range_cells: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            invalidation: InvalidationMode::Transitive,
            max_range_cells: DEFAULT_MAX_RANGE_CELLS,
        }
    }
}
