//! Formula engine with result caching
//!
//! The engine owns the formulas of a grid, caches their results and keeps a
//! dependency graph so that editing one cell dirties exactly the cached
//! results that could have read it.
//!
//! # Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut grid = Grid::from(vec![vec!["1", "2"]]);
//! let mut engine = FormulaEngine::new();
//! engine.set_formula(1, 0, "=SUM(A1:B1)");
//!
//! let result = engine.recompute(1, 0, &grid);
//! assert_eq!(result.value, FormulaValue::Number(3.0));
//! assert_eq!(engine.cell_state(1, 0), CellState::Clean);
//!
//! // The host edits B1 and tells the engine
//! grid.set(0, 1, Some("5".into()));
//! engine.cell_changed(0, 1);
//! assert_eq!(engine.cell_state(1, 0), CellState::Dirty);
//! assert_eq!(engine.recompute(1, 0, &grid).value, FormulaValue::Number(6.0));
//! ```

use crate::options::{EngineOptions, InvalidationMode};
use ahash::AHashMap;
use gridcalc_core::{CellCoordinate, CellSource};
use gridcalc_formula::{
    evaluate_expr, evaluate_with, parse_formula, DependencyGraph, EvaluationContext, FormulaExpr,
    FormulaResult, FunctionDef, FunctionRegistry,
};
use std::borrow::Cow;

/// Cache state of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// No formula
    Empty,
    /// Formula without a valid cached result
    Dirty,
    /// Formula with a valid cached result
    Clean,
}

/// Statistics from a recompute pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecomputeStats {
    /// Total number of formula cells in the engine
    pub formula_count: usize,
    /// Number of cells evaluated (cycle members are poisoned, not evaluated)
    pub cells_calculated: usize,
    /// Number of cells found on a dependency cycle
    pub circular_references: usize,
    /// Number of evaluated cells whose result is an error
    pub errors: usize,
}

/// A stored formula and its parsed form
#[derive(Debug, Clone)]
struct FormulaCell {
    text: String,
    expr: FormulaExpr,
}

/// Formula store, result cache and dependency graph for one grid
///
/// A formula cell is Dirty exactly when it has no cache entry.
#[derive(Debug, Clone)]
pub struct FormulaEngine {
    options: EngineOptions,
    functions: FunctionRegistry,
    formulas: AHashMap<CellCoordinate, FormulaCell>,
    cache: AHashMap<CellCoordinate, FormulaResult>,
    graph: DependencyGraph,
}

impl FormulaEngine {
    /// Create an engine with default options and the built-in functions
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    /// Create an engine with custom options
    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            options,
            functions: FunctionRegistry::new(),
            formulas: AHashMap::new(),
            cache: AHashMap::new(),
            graph: DependencyGraph::new(),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Register an additional function for this engine
    ///
    /// Cached results are kept; cells already showing
    /// `Unknown function: NAME` stay that way until they are dirtied.
    pub fn register_function(&mut self, def: FunctionDef) {
        self.functions.register(def);
    }

    /// Store formula text for a cell and dirty everything that reads it
    pub fn set_formula(&mut self, row: u32, col: u32, formula: impl Into<String>) {
        let coord = CellCoordinate::new(row, col);
        let text = formula.into();
        log::debug!("set formula {} = {:?}", coord, text);

        let expr = parse_formula(&text);
        self.formulas.insert(coord, FormulaCell { text, expr });
        self.rebuild_edges(coord);
        self.invalidate(coord);
    }

    /// Stored formula text for a cell
    pub fn get_formula(&self, row: u32, col: u32) -> Option<&str> {
        self.formulas
            .get(&CellCoordinate::new(row, col))
            .map(|cell| cell.text.as_str())
    }

    /// Remove a cell's formula, returning its text
    pub fn remove_formula(&mut self, row: u32, col: u32) -> Option<String> {
        let coord = CellCoordinate::new(row, col);
        let removed = self.formulas.remove(&coord)?;
        log::debug!("remove formula {}", coord);

        self.graph.remove_precedents(coord);
        self.invalidate(coord);
        Some(removed.text)
    }

    /// Tell the engine the host edited a plain value at this cell
    pub fn cell_changed(&mut self, row: u32, col: u32) {
        self.invalidate(CellCoordinate::new(row, col));
    }

    /// Evaluate formula text against the grid without touching the cache
    pub fn evaluate(&self, formula: &str, grid: &impl CellSource) -> FormulaResult {
        evaluate_with(formula, &self.context(grid))
    }

    /// Result for a cell, evaluating whatever is dirty along the way
    ///
    /// A cell without a formula yields the grid's own text as a literal,
    /// which is not cached.
    pub fn recompute(&mut self, row: u32, col: u32, grid: &impl CellSource) -> FormulaResult {
        let coord = CellCoordinate::new(row, col);
        if !self.formulas.contains_key(&coord) {
            let text = grid.cell_text(coord).map(Cow::into_owned);
            return FormulaResult::literal(text.unwrap_or_default());
        }

        if !self.cache.contains_key(&coord) {
            let mut stats = RecomputeStats::default();
            self.recompute_dirty(&[coord], grid, &mut stats);
        }

        match self.cache.get(&coord) {
            Some(result) => result.clone(),
            // A dirty root always ends up cached; evaluate directly rather
            // than fail if that ever changes
            None => self.evaluate_cell(coord, grid),
        }
    }

    /// Recompute every dirty formula cell
    pub fn recompute_all(&mut self, grid: &impl CellSource) -> RecomputeStats {
        let mut stats = RecomputeStats {
            formula_count: self.formulas.len(),
            ..Default::default()
        };

        let roots = self.dirty_cells();
        if !roots.is_empty() {
            self.recompute_dirty(&roots, grid, &mut stats);
        }

        log::debug!(
            "recomputed {} of {} formula cells ({} circular, {} errors)",
            stats.cells_calculated,
            stats.formula_count,
            stats.circular_references,
            stats.errors
        );
        stats
    }

    /// Drop every formula, cached result and dependency edge
    pub fn clear(&mut self) {
        log::debug!("clear {} formulas", self.formulas.len());
        self.formulas.clear();
        self.cache.clear();
        self.graph.clear();
    }

    pub fn cell_state(&self, row: u32, col: u32) -> CellState {
        let coord = CellCoordinate::new(row, col);
        if !self.formulas.contains_key(&coord) {
            CellState::Empty
        } else if self.cache.contains_key(&coord) {
            CellState::Clean
        } else {
            CellState::Dirty
        }
    }

    pub fn is_dirty(&self, row: u32, col: u32) -> bool {
        self.cell_state(row, col) == CellState::Dirty
    }

    /// Cached result, if the cell is Clean
    pub fn cached_result(&self, row: u32, col: u32) -> Option<&FormulaResult> {
        self.cache.get(&CellCoordinate::new(row, col))
    }

    /// Formula cells that read this cell directly
    pub fn dependents(&self, row: u32, col: u32) -> Vec<CellCoordinate> {
        self.graph
            .get_dependents(CellCoordinate::new(row, col))
            .collect()
    }

    /// Cells this cell's formula reads directly
    pub fn precedents(&self, row: u32, col: u32) -> Vec<CellCoordinate> {
        self.graph
            .get_precedents(CellCoordinate::new(row, col))
            .collect()
    }

    pub fn formula_count(&self) -> usize {
        self.formulas.len()
    }

    /// Formula cells without a cached result, in row-major order
    pub fn dirty_cells(&self) -> Vec<CellCoordinate> {
        let mut dirty: Vec<CellCoordinate> = self
            .formulas
            .keys()
            .filter(|coord| !self.cache.contains_key(coord))
            .copied()
            .collect();
        dirty.sort_unstable();
        dirty
    }

    /// Every formula cell with its text, in row-major order
    pub fn formulas(&self) -> Vec<(CellCoordinate, &str)> {
        let mut formulas: Vec<(CellCoordinate, &str)> = self
            .formulas
            .iter()
            .map(|(coord, cell)| (*coord, cell.text.as_str()))
            .collect();
        formulas.sort_unstable_by_key(|(coord, _)| *coord);
        formulas
    }

    fn context<'a>(&'a self, source: &'a dyn CellSource) -> EvaluationContext<'a> {
        EvaluationContext::new(source)
            .with_functions(&self.functions)
            .with_max_range_cells(self.options.max_range_cells)
    }

    /// Dirty `coord` and, in transitive mode, everything downstream of it
    fn invalidate(&mut self, coord: CellCoordinate) {
        self.cache.remove(&coord);
        if self.options.invalidation == InvalidationMode::DirectOnly {
            return;
        }

        let cache = &mut self.cache;
        let mut invalidated = 0usize;
        // Already-dirty cells have dirty dependents, so the walk stops there
        self.graph.walk_dependents(coord, |dependent| {
            let was_clean = cache.remove(&dependent).is_some();
            if was_clean {
                log::trace!("invalidate {}", dependent);
                invalidated += 1;
            }
            was_clean
        });

        if invalidated > 0 {
            log::trace!("{} invalidated {} dependents", coord, invalidated);
        }
    }

    /// Point a formula cell's edges at every cell its reference covers
    fn rebuild_edges(&mut self, coord: CellCoordinate) {
        let Some(cell) = self.formulas.get(&coord) else {
            return;
        };

        // Oversized ranges evaluate to an error without reading anything
        let footprint = if cell.expr.reference_count() <= self.options.max_range_cells {
            cell.expr.references()
        } else {
            Vec::new()
        };
        self.graph.set_precedents(coord, footprint);
    }

    /// Add edges for cells a result read that the footprint does not
    /// already cover
    fn record_touched(&mut self, coord: CellCoordinate, result: &FormulaResult) {
        for &touched in &result.dependencies {
            if !self.graph.reads(coord, touched) {
                self.graph.add_dependency(touched, coord);
            }
        }
    }

    /// Evaluate the dirty precedent closure of `roots`, precedents first
    fn recompute_dirty(
        &mut self,
        roots: &[CellCoordinate],
        grid: &dyn CellSource,
        stats: &mut RecomputeStats,
    ) {
        let groups = {
            let formulas = &self.formulas;
            let cache = &self.cache;
            self.graph.evaluation_groups(roots, |coord| {
                formulas.contains_key(&coord) && !cache.contains_key(&coord)
            })
        };
        log::debug!("recompute pass over {} groups", groups.len());

        for group in groups {
            if self.graph.is_cycle(&group) {
                log::warn!(
                    "circular reference between {}",
                    group
                        .iter()
                        .map(CellCoordinate::to_a1_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                stats.circular_references += group.len();
                for coord in group {
                    self.cache.insert(coord, FormulaResult::circular());
                }
                continue;
            }

            for coord in group {
                let result = self.evaluate_cell(coord, grid);
                log::trace!("evaluated {} = {}", coord, result.value);

                stats.cells_calculated += 1;
                if result.error {
                    stats.errors += 1;
                }

                self.record_touched(coord, &result);
                self.cache.insert(coord, result);
            }
        }
    }

    /// Evaluate one stored formula against the grid overlaid with cached results
    fn evaluate_cell(&self, coord: CellCoordinate, grid: &dyn CellSource) -> FormulaResult {
        let Some(cell) = self.formulas.get(&coord) else {
            let text = grid.cell_text(coord).map(Cow::into_owned);
            return FormulaResult::literal(text.unwrap_or_default());
        };

        let view = ComputedView {
            grid,
            formulas: &self.formulas,
            cache: &self.cache,
        };
        evaluate_expr(&cell.expr, &self.context(&view))
    }
}

impl Default for FormulaEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The host's grid with formula cells replaced by their computed values
struct ComputedView<'a> {
    grid: &'a dyn CellSource,
    formulas: &'a AHashMap<CellCoordinate, FormulaCell>,
    cache: &'a AHashMap<CellCoordinate, FormulaResult>,
}

impl CellSource for ComputedView<'_> {
    fn cell_text(&self, coord: CellCoordinate) -> Option<Cow<'_, str>> {
        if self.formulas.contains_key(&coord) {
            if let Some(result) = self.cache.get(&coord) {
                return Some(Cow::Owned(result.value.to_string()));
            }
        }
        self.grid.cell_text(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcalc_core::Grid;
    use gridcalc_formula::FormulaValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FormulaEngine>();
    }

    #[test]
    fn test_set_and_get_formula() {
        let mut engine = FormulaEngine::new();
        assert_eq!(engine.get_formula(0, 0), None);
        assert_eq!(engine.cell_state(0, 0), CellState::Empty);

        engine.set_formula(0, 0, "=SUM(B1:B2)");
        assert_eq!(engine.get_formula(0, 0), Some("=SUM(B1:B2)"));
        assert_eq!(engine.cell_state(0, 0), CellState::Dirty);
        assert_eq!(engine.formula_count(), 1);
    }

    #[test]
    fn test_edges_follow_footprint() {
        let mut engine = FormulaEngine::new();
        engine.set_formula(0, 2, "=SUM(A1:B1)");

        assert_eq!(
            engine.precedents(0, 2),
            vec![CellCoordinate::new(0, 0), CellCoordinate::new(0, 1)]
        );
        assert_eq!(engine.dependents(0, 1), vec![CellCoordinate::new(0, 2)]);

        // Re-setting replaces the edges
        engine.set_formula(0, 2, "=COUNT(D5)");
        assert_eq!(engine.precedents(0, 2), vec![CellCoordinate::new(4, 3)]);
        assert!(engine.dependents(0, 1).is_empty());
    }

    #[test]
    fn test_recompute_caches() {
        let grid = Grid::from(vec![vec!["4", "6"]]);
        let mut engine = FormulaEngine::new();
        engine.set_formula(1, 0, "=AVG(A1:B1)");

        let result = engine.recompute(1, 0, &grid);
        assert_eq!(result.value, FormulaValue::Number(5.0));
        assert_eq!(engine.cached_result(1, 0), Some(&result));

        // A clean cell serves its cache even if the grid changed behind its back
        let other = Grid::from(vec![vec!["0", "0"]]);
        assert_eq!(engine.recompute(1, 0, &other).value, FormulaValue::Number(5.0));
    }

    #[test]
    fn test_recompute_without_formula_echoes_grid() {
        let grid = Grid::from(vec![vec!["hello"]]);
        let mut engine = FormulaEngine::new();

        assert_eq!(
            engine.recompute(0, 0, &grid).value,
            FormulaValue::String("hello".into())
        );
        assert_eq!(
            engine.recompute(3, 3, &grid).value,
            FormulaValue::String(String::new())
        );
        assert!(engine.cached_result(0, 0).is_none());
    }

    #[test]
    fn test_formula_cells_read_computed_values() {
        // A1 holds raw formula text in the host grid
        let grid = Grid::from(vec![vec!["=SUM(B1:C1)", "2", "3"]]);
        let mut engine = FormulaEngine::new();
        engine.set_formula(0, 0, "=SUM(B1:C1)");
        engine.set_formula(1, 0, "=SUM(A1:C1)");

        assert_eq!(engine.recompute(1, 0, &grid).value, FormulaValue::Number(10.0));
        // A1 was computed on the way
        assert_eq!(engine.cell_state(0, 0), CellState::Clean);
    }

    #[test]
    fn test_evaluate_does_not_touch_cache() {
        let grid = Grid::from(vec![vec!["1", "2"]]);
        let engine = FormulaEngine::new();

        let result = engine.evaluate("=MAX(A1:B1)", &grid);
        assert_eq!(result.value, FormulaValue::Number(2.0));
        assert!(engine.dirty_cells().is_empty());
        assert_eq!(engine.formula_count(), 0);
    }

    #[test]
    fn test_remove_formula_dirties_dependents() {
        let grid = Grid::from(vec![vec!["7"]]);
        let mut engine = FormulaEngine::new();
        engine.set_formula(0, 1, "=A1");
        engine.set_formula(0, 2, "=SUM(B1)");
        engine.recompute_all(&grid);
        assert_eq!(engine.cached_result(0, 2).map(|r| r.value.clone()), Some(FormulaValue::Number(7.0)));

        assert_eq!(engine.remove_formula(0, 1), Some("=A1".to_string()));
        assert_eq!(engine.remove_formula(0, 1), None);
        assert_eq!(engine.cell_state(0, 1), CellState::Empty);
        assert_eq!(engine.cell_state(0, 2), CellState::Dirty);

        // B1 is now an absent grid cell
        assert_eq!(engine.recompute(0, 2, &grid).value, FormulaValue::Number(0.0));
    }

    #[test]
    fn test_direct_only_mode_leaves_dependents_clean() {
        let mut grid = Grid::from(vec![vec!["1"]]);
        let mut engine = FormulaEngine::with_options(EngineOptions {
            invalidation: InvalidationMode::DirectOnly,
            ..Default::default()
        });
        engine.set_formula(0, 1, "=A1");
        engine.set_formula(0, 2, "=SUM(B1)");
        engine.recompute_all(&grid);

        grid.set(0, 0, Some("2".into()));
        engine.set_formula(0, 1, "=SUM(A1)");
        assert_eq!(engine.cell_state(0, 1), CellState::Dirty);
        assert_eq!(engine.cell_state(0, 2), CellState::Clean);

        // Stale until C1 itself is dirtied
        assert_eq!(engine.recompute(0, 2, &grid).value, FormulaValue::Number(1.0));
        assert_eq!(engine.recompute(0, 1, &grid).value, FormulaValue::Number(2.0));
    }

    #[test]
    fn test_recompute_keeps_footprint_edges() {
        let grid = Grid::from(vec![vec!["1"]]);
        let mut engine = FormulaEngine::new();
        engine.set_formula(0, 2, "=SUM(A1:B2)");
        let footprint = engine.precedents(0, 2);

        engine.recompute(0, 2, &grid);
        assert_eq!(engine.precedents(0, 2), footprint);
        // B2 is absent but still wired to its reader
        assert_eq!(engine.dependents(1, 1), vec![CellCoordinate::new(0, 2)]);
    }

    #[test]
    fn test_oversized_range_has_no_edges() {
        let mut engine = FormulaEngine::with_options(EngineOptions {
            max_range_cells: 10,
            ..Default::default()
        });
        engine.set_formula(0, 0, "=SUM(B1:B100)");
        assert!(engine.precedents(0, 0).is_empty());

        let result = engine.recompute(0, 0, &Grid::new());
        assert!(result.error);
        assert_eq!(
            result.error_message(),
            Some("Range too large: B1:B100 covers 100 cells (limit 10)")
        );
    }

    #[test]
    fn test_recompute_all_stats() {
        let grid = Grid::from(vec![vec!["1", "2"]]);
        let mut engine = FormulaEngine::new();
        engine.set_formula(1, 0, "=SUM(A1:B1)");
        engine.set_formula(1, 1, "=NOPE(A1)");
        engine.set_formula(2, 0, "=A3");

        let stats = engine.recompute_all(&grid);
        assert_eq!(
            stats,
            RecomputeStats {
                formula_count: 3,
                cells_calculated: 2,
                circular_references: 1,
                errors: 1,
            }
        );
        assert!(engine.dirty_cells().is_empty());

        // Nothing left to do
        let stats = engine.recompute_all(&grid);
        assert_eq!(stats.cells_calculated, 0);
        assert_eq!(stats.formula_count, 3);
    }

    #[test]
    fn test_register_function() {
        fn fn_first(
            range: &gridcalc_formula::RangeValues,
            _ctx: &EvaluationContext,
        ) -> gridcalc_formula::Result<FormulaValue> {
            Ok(range
                .iter()
                .next()
                .map(FormulaValue::from)
                .unwrap_or_else(|| FormulaValue::String(String::new())))
        }

        let grid = Grid::from(vec![vec!["x", "y"]]);
        let mut engine = FormulaEngine::new();
        engine.register_function(FunctionDef {
            name: "FIRST",
            description: "First present value in the range",
            implementation: fn_first,
        });

        assert_eq!(
            engine.evaluate("=FIRST(A1:B1)", &grid).value,
            FormulaValue::String("x".into())
        );
        assert!(engine.functions().contains("first"));
    }

    #[test]
    fn test_clear() {
        let grid = Grid::from(vec![vec!["1"]]);
        let mut engine = FormulaEngine::new();
        engine.set_formula(0, 1, "=A1");
        engine.recompute_all(&grid);

        engine.clear();
        assert_eq!(engine.formula_count(), 0);
        assert_eq!(engine.cell_state(0, 1), CellState::Empty);
        assert!(engine.cached_result(0, 1).is_none());
        assert!(engine.dependents(0, 0).is_empty());
    }

    #[test]
    fn test_formulas_sorted() {
        let mut engine = FormulaEngine::new();
        engine.set_formula(2, 0, "=C");
        engine.set_formula(0, 1, "=B");
        engine.set_formula(0, 0, "=A");

        assert_eq!(
            engine.formulas(),
            vec![
                (CellCoordinate::new(0, 0), "=A"),
                (CellCoordinate::new(0, 1), "=B"),
                (CellCoordinate::new(2, 0), "=C"),
            ]
        );
    }
}
