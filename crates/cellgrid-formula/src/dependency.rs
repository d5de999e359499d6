//! Dependency tracking between cells
//!
//! Edges run both ways: each formula cell lists its precedents (the cells it reads), and
//! each referenced cell knows its dependents (the cells reading it). The forward edges
//! drive cycle detection; the reverse edges drive cache invalidation.

use ahash::{AHashMap, AHashSet};
use cellgrid_core::Position;

/// Dependency graph for formula cells
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Cell → cells that depend on it (dependents)
    dependents: AHashMap<Position, AHashSet<Position>>,
    /// Cell → cells it depends on (precedents), sorted and unique
    precedents: AHashMap<Position, Vec<Position>>,
}

/// Step of the iterative depth-first search
enum Visit {
    Enter(Position),
    Exit(Position),
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the precedents of `cell`, updating the reverse index
    ///
    /// Returns the former precedents that no longer have `cell` as a dependent.
    pub fn set_precedents(&mut self, cell: Position, references: &[Position]) -> Vec<Position> {
        let old = self.precedents.remove(&cell).unwrap_or_default();

        let mut dropped = Vec::new();
        for precedent in old {
            if references.contains(&precedent) {
                continue;
            }
            if let Some(deps) = self.dependents.get_mut(&precedent) {
                deps.remove(&cell);
                if deps.is_empty() {
                    self.dependents.remove(&precedent);
                }
            }
            dropped.push(precedent);
        }

        for &precedent in references {
            self.dependents.entry(precedent).or_default().insert(cell);
        }
        if !references.is_empty() {
            self.precedents.insert(cell, references.to_vec());
        }

        dropped
    }

    /// Get cells the given cell depends on
    pub fn precedents(&self, cell: Position) -> &[Position] {
        self.precedents.get(&cell).map_or(&[], Vec::as_slice)
    }

    /// Get cells that directly depend on the given cell
    pub fn dependents(&self, cell: Position) -> impl Iterator<Item = Position> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Check whether any formula references the given cell
    pub fn has_dependents(&self, cell: Position) -> bool {
        self.dependents.contains_key(&cell)
    }

    /// Check whether giving `origin` these references would close a cycle
    ///
    /// Walks forward from `references` with an explicit stack. Reaching `origin`, or
    /// re-entering a cell whose search is still in progress, is a cycle.
    pub fn would_create_cycle(&self, origin: Position, references: &[Position]) -> bool {
        let mut in_progress = AHashSet::new();
        let mut finished = AHashSet::new();
        let mut stack: Vec<Visit> = references.iter().rev().map(|&p| Visit::Enter(p)).collect();

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Exit(pos) => {
                    in_progress.remove(&pos);
                    finished.insert(pos);
                }
                Visit::Enter(pos) => {
                    if pos == origin || in_progress.contains(&pos) {
                        log::trace!("cycle through {} back to {}", pos, origin);
                        return true;
                    }
                    if finished.contains(&pos) {
                        continue;
                    }

                    in_progress.insert(pos);
                    stack.push(Visit::Exit(pos));
                    stack.extend(self.precedents(pos).iter().rev().map(|&p| Visit::Enter(p)));
                }
            }
        }

        false
    }

    /// Visit every cell that transitively depends on `cell`, each at most once
    ///
    /// `visit` returns whether the walk should continue past the visited cell.
    pub fn walk_dependents<F>(&self, cell: Position, mut visit: F)
    where
        F: FnMut(Position) -> bool,
    {
        let mut seen = AHashSet::new();
        let mut stack: Vec<Position> = self.dependents(cell).collect();

        while let Some(pos) = stack.pop() {
            if !seen.insert(pos) {
                continue;
            }
            if visit(pos) {
                stack.extend(self.dependents(pos));
            }
        }
    }

    /// Get all cells that transitively depend on `cell`, sorted
    pub fn transitive_dependents(&self, cell: Position) -> Vec<Position> {
        let mut result = Vec::new();
        self.walk_dependents(cell, |pos| {
            result.push(pos);
            true
        });
        result.sort_unstable();
        result
    }
}
