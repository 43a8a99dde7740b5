//! Dependency tracking for formula recalculation

use ahash::{AHashMap, AHashSet};
use gridcalc_core::CellCoordinate;
use indexmap::IndexSet;
use std::collections::VecDeque;

type CellSet = IndexSet<CellCoordinate, ahash::RandomState>;

/// Dependency graph for formula cells
///
/// Edges run from a formula cell to the cells it reads (its precedents),
/// with the inverse kept alongside (dependents) so invalidation can walk
/// from a changed cell to every formula that reads it.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Cell → Cells that depend on it (dependents)
    dependents: AHashMap<CellCoordinate, CellSet>,
    /// Cell → Cells it depends on (precedents)
    precedents: AHashMap<CellCoordinate, CellSet>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency: dependent depends on precedent
    pub fn add_dependency(&mut self, precedent: CellCoordinate, dependent: CellCoordinate) {
        self.dependents
            .entry(precedent)
            .or_default()
            .insert(dependent);
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Replace every outgoing edge of `cell` with edges to `precedents`
    ///
    /// Incoming edges (other formulas reading `cell`) are left alone.
    pub fn set_precedents<I>(&mut self, cell: CellCoordinate, precedents: I)
    where
        I: IntoIterator<Item = CellCoordinate>,
    {
        self.remove_precedents(cell);
        for precedent in precedents {
            self.add_dependency(precedent, cell);
        }
    }

    /// Remove every outgoing edge of `cell`
    pub fn remove_precedents(&mut self, cell: CellCoordinate) {
        let Some(precedents) = self.precedents.remove(&cell) else {
            return;
        };
        for precedent in precedents {
            if let Some(deps) = self.dependents.get_mut(&precedent) {
                deps.swap_remove(&cell);
                if deps.is_empty() {
                    self.dependents.remove(&precedent);
                }
            }
        }
    }

    /// Whether `cell` has an edge to `precedent`
    pub fn reads(&self, cell: CellCoordinate, precedent: CellCoordinate) -> bool {
        self.precedents
            .get(&cell)
            .is_some_and(|set| set.contains(&precedent))
    }

    /// Get cells that depend on the given cell
    pub fn get_dependents(&self, cell: CellCoordinate) -> impl Iterator<Item = CellCoordinate> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get cells that the given cell depends on, in the order they were added
    pub fn get_precedents(&self, cell: CellCoordinate) -> impl Iterator<Item = CellCoordinate> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Breadth-first walk over transitive dependents of `start`
    ///
    /// `visit` is called once per reached cell (never for `start` itself
    /// unless it depends on itself) and returns whether the walk should
    /// continue through that cell. Returning `false` for cells already
    /// handled keeps the walk linear on diamonds and finite on cycles.
    pub fn walk_dependents<F>(&self, start: CellCoordinate, mut visit: F)
    where
        F: FnMut(CellCoordinate) -> bool,
    {
        let mut seen = AHashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(cell) = queue.pop_front() {
            for dependent in self.get_dependents(cell) {
                if seen.insert(dependent) && visit(dependent) {
                    queue.push_back(dependent);
                }
            }
        }
    }

    /// Group the precedent closure of `roots` into strongly connected
    /// components, ordered so every group comes after the groups it reads
    ///
    /// Only cells accepted by `include` are visited or returned; the walk
    /// does not pass through rejected cells. A group with more than one
    /// member, or a single member that reads itself, is a cycle (see
    /// [`is_cycle`](Self::is_cycle)). Members within a group are sorted.
    pub fn evaluation_groups<F>(
        &self,
        roots: &[CellCoordinate],
        mut include: F,
    ) -> Vec<Vec<CellCoordinate>>
    where
        F: FnMut(CellCoordinate) -> bool,
    {
        // Iterative Tarjan: components are emitted once everything they
        // reach has been emitted, which is exactly precedents-first order.
        let mut groups = Vec::new();
        let mut index: AHashMap<CellCoordinate, usize> = AHashMap::new();
        let mut on_stack = AHashSet::new();
        let mut component = Vec::new();
        let mut counter = 0usize;

        for &root in roots {
            if index.contains_key(&root) || !include(root) {
                continue;
            }

            // (cell, next precedent position, own index, lowlink)
            let mut work = vec![(root, 0usize, counter, counter)];
            index.insert(root, counter);
            counter += 1;
            component.push(root);
            on_stack.insert(root);

            while let Some(frame) = work.last_mut() {
                let cell = frame.0;
                let precedent = self
                    .precedents
                    .get(&cell)
                    .and_then(|set| set.get_index(frame.1))
                    .copied();

                if let Some(precedent) = precedent {
                    frame.1 += 1;
                    match index.get(&precedent).copied() {
                        Some(seen) => {
                            if on_stack.contains(&precedent) {
                                frame.3 = frame.3.min(seen);
                            }
                        }
                        None => {
                            if include(precedent) {
                                index.insert(precedent, counter);
                                work.push((precedent, 0, counter, counter));
                                counter += 1;
                                component.push(precedent);
                                on_stack.insert(precedent);
                            }
                        }
                    }
                    continue;
                }

                let (cell, _, own, low) = *frame;
                work.pop();
                if let Some(parent) = work.last_mut() {
                    parent.3 = parent.3.min(low);
                }

                if low == own {
                    let mut group = Vec::new();
                    while let Some(member) = component.pop() {
                        on_stack.remove(&member);
                        group.push(member);
                        if member == cell {
                            break;
                        }
                    }
                    group.sort_unstable();
                    groups.push(group);
                }
            }
        }

        groups
    }

    /// Whether a group from [`evaluation_groups`](Self::evaluation_groups)
    /// is a dependency cycle
    pub fn is_cycle(&self, group: &[CellCoordinate]) -> bool {
        match group {
            [] => false,
            [cell] => self
                .precedents
                .get(cell)
                .is_some_and(|set| set.contains(cell)),
            _ => true,
        }
    }

    /// Number of cells with outgoing edges
    pub fn len(&self) -> usize {
        self.precedents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precedents.is_empty()
    }

    /// Clear the entire graph
    pub fn clear(&mut self) {
        self.dependents.clear();
        self.precedents.clear();
    }
}
