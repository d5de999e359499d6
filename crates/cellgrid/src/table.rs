//! The table: a sparse grid of cells with dependency-aware caching
//!
//! Cells live in a hash map keyed by [`Position`]. Formula references are tracked in a
//! [`DependencyGraph`], which serves two purposes:
//!
//! - rejecting an edit that would make a formula (transitively) read itself
//! - dropping the cached results of every cell that reads an edited one
//!
//! Formula results are computed on first read and cached until an edit upstream
//! invalidates them.
//!
//! # Example
//!
//! ```rust
//! use cellgrid::prelude::*;
//!
//! let mut table = Table::new();
//! table.set_cell(Position::from_a1("A1"), "12").unwrap();
//! table.set_cell(Position::from_a1("B1"), "=A1+1").unwrap();
//! assert_eq!(table.value(Position::from_a1("B1")).unwrap(), Value::from(13.0));
//!
//! table.set_cell(Position::from_a1("A1"), "22").unwrap();
//! assert_eq!(table.value(Position::from_a1("B1")).unwrap(), Value::from(23.0));
//! ```

use crate::cell::{Cell, CellContent, FormulaCell};
use ahash::{AHashMap, AHashSet};
use cellgrid_core::{Error, Position, Result, Size, Value};
use cellgrid_formula::{CellLookup, DependencyGraph};

/// Counters describing the work a table has done
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    /// Number of formula evaluations (cache misses)
    pub formulas_evaluated: usize,
    /// Number of cached results dropped because an upstream cell changed
    pub caches_invalidated: usize,
}

/// A grid of cells
#[derive(Debug, Default)]
pub struct Table {
    /// Cell storage; also holds empty placeholders for referenced positions
    cells: AHashMap<Position, Cell>,
    /// Formula references in both directions
    graph: DependencyGraph,
    /// Evaluations happen behind `&self`, so this counter needs interior mutability
    formulas_evaluated: std::cell::Cell<usize>,
    caches_invalidated: usize,
}

/// Read-only handle to a cell in a [`Table`]
#[derive(Debug, Clone, Copy)]
pub struct CellView<'a> {
    table: &'a Table,
    pos: Position,
    cell: &'a Cell,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text of a cell
    ///
    /// The text is classified as empty, plain text or (when it starts with `=`) a
    /// formula. On error the table is left unchanged:
    ///
    /// - [`Error::InvalidPosition`] if `pos` is outside the grid
    /// - [`Error::FormulaParse`] if the formula is malformed
    /// - [`Error::CircularDependency`] if the formula would read its own cell
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<()> {
        check_position(pos)?;

        let unchanged = match self.cells.get(&pos) {
            Some(cell) => cell.content.text() == text,
            None => text.is_empty(),
        };
        if unchanged {
            return Ok(());
        }

        let content = CellContent::parse(text).map_err(|e| {
            log::debug!("rejected {}: {}", pos, e);
            e
        })?;

        if self.graph.would_create_cycle(pos, content.referenced_cells()) {
            log::debug!("rejected {}: circular dependency", pos);
            return Err(Error::CircularDependency(pos));
        }

        log::debug!("set {} to {:?}", pos, text);
        self.commit(pos, content);
        Ok(())
    }

    /// Get a handle to a cell, or `None` if nothing exists at `pos`
    ///
    /// A position that has never been set but is referenced by a formula has an empty
    /// cell. A cleared cell is `None` even while formulas still read it.
    pub fn get_cell(&self, pos: Position) -> Result<Option<CellView<'_>>> {
        check_position(pos)?;
        Ok(self
            .cells
            .get(&pos)
            .filter(|cell| !cell.cleared)
            .map(|cell| CellView {
                table: self,
                pos,
                cell,
            }))
    }

    /// Reset a cell to empty
    ///
    /// The cell is removed unless some formula still references it, in which case it
    /// stays readable as empty but [`get_cell`](Self::get_cell) reports it absent.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        check_position(pos)?;

        if self.cells.get(&pos).map_or(false, |cell| !cell.cleared) {
            log::debug!("cleared {}", pos);
            self.commit(pos, CellContent::Empty);
        }
        Ok(())
    }

    /// Smallest rectangle anchored at A1 containing every non-empty cell
    pub fn printable_size(&self) -> Size {
        self.cells
            .iter()
            .filter(|(_, cell)| !cell.content.is_empty())
            .fold(Size::default(), |size, (pos, _)| Size {
                rows: size.rows.max(pos.row + 1),
                cols: size.cols.max(pos.col + 1),
            })
    }

    /// Value of the cell at `pos`; absent cells read as empty text
    pub fn value(&self, pos: Position) -> Result<Value> {
        check_position(pos)?;
        Ok(self.value_at(pos).unwrap_or_default())
    }

    /// Text of the cell at `pos`; absent cells read as empty text
    pub fn text(&self, pos: Position) -> Result<String> {
        check_position(pos)?;
        Ok(self.text_at(pos))
    }

    pub(crate) fn text_at(&self, pos: Position) -> String {
        self.cells
            .get(&pos)
            .map(|cell| cell.content.text())
            .unwrap_or_default()
    }

    /// Number of stored cells, including empty placeholders
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Work counters since the table was created
    pub fn stats(&self) -> TableStats {
        TableStats {
            formulas_evaluated: self.formulas_evaluated.get(),
            caches_invalidated: self.caches_invalidated,
        }
    }

    /// Install new content at `pos` and bring the graph and caches in line with it
    fn commit(&mut self, pos: Position, content: CellContent) {
        let references = content.referenced_cells().to_vec();
        let dropped = self.graph.set_precedents(pos, &references);

        for &reference in &references {
            self.cells.entry(reference).or_default();
        }

        let now_empty = content.is_empty();
        let cell = self.cells.entry(pos).or_default();
        cell.content = content;
        cell.cleared = now_empty;
        self.invalidate_dependents(pos);

        if now_empty {
            self.prune(pos);
        }
        for precedent in dropped {
            self.prune(precedent);
        }
    }

    /// Drop the cached results of every cell that transitively reads `pos`
    ///
    /// A cached formula only ever reads cached formulas, so the walk stops at dependents
    /// that hold no cache.
    fn invalidate_dependents(&mut self, pos: Position) {
        let Self { cells, graph, .. } = self;
        let mut invalidated = 0;

        graph.walk_dependents(pos, |dependent| {
            let had_cache = cells
                .get_mut(&dependent)
                .map_or(false, Cell::invalidate_cache);
            if had_cache {
                invalidated += 1;
            }
            had_cache
        });

        if invalidated > 0 {
            log::trace!("invalidated {} cached values downstream of {}", invalidated, pos);
        }
        self.caches_invalidated += invalidated;
    }

    /// Remove an empty cell nothing references
    fn prune(&mut self, pos: Position) {
        let removable = !self.graph.has_dependents(pos)
            && self.cells.get(&pos).map_or(false, |cell| cell.content.is_empty());
        if removable {
            log::trace!("pruned empty cell {}", pos);
            self.cells.remove(&pos);
        }
    }

    /// Value of a stored cell, evaluating its formula if the result is not cached
    fn cell_value(&self, pos: Position, cell: &Cell) -> Value {
        match &cell.content {
            CellContent::Formula(formula) => {
                if let Some(value) = formula.cached_value() {
                    return value.clone();
                }
                self.warm_precedents(pos);
                self.evaluate_formula(pos, formula)
            }
            other => other.literal_value().unwrap_or_default(),
        }
    }

    fn evaluate_formula(&self, pos: Position, cell: &FormulaCell) -> Value {
        cell.value_or_init(|formula| {
            self.formulas_evaluated.set(self.formulas_evaluated.get() + 1);
            log::trace!("evaluating {} = {}", pos, formula.expression());
            formula.evaluate(self)
        })
    }

    /// Evaluate the uncached formulas `pos` reads, deepest first
    ///
    /// Each evaluation then finds its operands cached, so reading the end of a long
    /// chain of formulas does not recurse once per link.
    fn warm_precedents(&self, pos: Position) {
        let mut order = Vec::new();
        let mut seen = AHashSet::new();
        let mut stack = vec![(pos, false)];

        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                order.push(current);
                continue;
            }
            if !seen.insert(current) {
                continue;
            }

            stack.push((current, true));
            for &precedent in self.graph.precedents(current) {
                if !seen.contains(&precedent) && self.needs_evaluation(precedent) {
                    stack.push((precedent, false));
                }
            }
        }

        // `pos` itself comes last and is evaluated by the caller
        order.pop();
        for current in order {
            if let Some(formula) = self.cells.get(&current).and_then(|c| c.content.as_formula()) {
                self.evaluate_formula(current, formula);
            }
        }
    }

    fn needs_evaluation(&self, pos: Position) -> bool {
        self.cells
            .get(&pos)
            .and_then(|cell| cell.content.as_formula())
            .map_or(false, |formula| formula.cached_value().is_none())
    }
}

impl CellLookup for Table {
    fn value_at(&self, pos: Position) -> Option<Value> {
        self.cells.get(&pos).map(|cell| self.cell_value(pos, cell))
    }
}

impl<'a> CellView<'a> {
    /// Where this cell is
    pub fn position(&self) -> Position {
        self.pos
    }

    /// The cell's content
    pub fn content(&self) -> &'a CellContent {
        &self.cell.content
    }

    /// The cell's value, evaluating its formula if needed
    pub fn value(&self) -> Value {
        self.table.cell_value(self.pos, self.cell)
    }

    /// The cell's text; formulas are shown canonically with a leading `=`
    pub fn text(&self) -> String {
        self.cell.content.text()
    }

    /// Cells the formula reads, ascending; empty for non-formula cells
    pub fn referenced_cells(&self) -> &'a [Position] {
        self.cell.content.referenced_cells()
    }

    /// Cells whose formulas read this one directly, ascending
    pub fn dependents(&self) -> Vec<Position> {
        let mut dependents: Vec<Position> = self.table.graph.dependents(self.pos).collect();
        dependents.sort_unstable();
        dependents
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        self.cell.content.is_empty()
    }
}

fn check_position(pos: Position) -> Result<()> {
    if pos.is_valid() {
        Ok(())
    } else {
        Err(Error::InvalidPosition(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgrid_core::FormulaError;
    use pretty_assertions::assert_eq;

    fn pos(name: &str) -> Position {
        Position::from_a1(name)
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new();
        assert_eq!(table.printable_size(), Size::new(0, 0));
        assert!(table.get_cell(pos("A1")).unwrap().is_none());
        assert_eq!(table.value(pos("A1")).unwrap(), Value::empty());
        assert_eq!(table.cell_count(), 0);
    }

    #[test]
    fn test_references_create_placeholders() {
        let mut table = Table::new();
        table.set_cell(pos("A1"), "=B2+C3").unwrap();

        let b2 = table.get_cell(pos("B2")).unwrap().unwrap();
        assert!(b2.is_empty());
        assert_eq!(b2.dependents(), vec![pos("A1")]);

        // Placeholders do not count towards the printable area
        assert_eq!(table.printable_size(), Size::new(1, 1));
        assert_eq!(table.cell_count(), 3);
    }

    #[test]
    fn test_orphaned_placeholders_are_pruned() {
        let mut table = Table::new();
        table.set_cell(pos("A1"), "=B2+C3").unwrap();
        table.set_cell(pos("A1"), "=B2").unwrap();

        assert!(table.get_cell(pos("C3")).unwrap().is_none());
        assert!(table.get_cell(pos("B2")).unwrap().is_some());

        table.clear_cell(pos("A1")).unwrap();
        assert_eq!(table.cell_count(), 0);
    }

    #[test]
    fn test_same_text_keeps_cache() {
        let mut table = Table::new();
        table.set_cell(pos("A1"), "2").unwrap();
        table.set_cell(pos("B1"), "=A1*A1").unwrap();
        assert_eq!(table.value(pos("B1")).unwrap(), Value::from(4.0));

        table.set_cell(pos("A1"), "2").unwrap();
        assert_eq!(table.value(pos("B1")).unwrap(), Value::from(4.0));
        assert_eq!(table.stats().formulas_evaluated, 1);
        assert_eq!(table.stats().caches_invalidated, 0);
    }

    #[test]
    fn test_invalidation_stops_at_uncached_cells() {
        let mut table = Table::new();
        table.set_cell(pos("A1"), "1").unwrap();
        table.set_cell(pos("A2"), "=A1").unwrap();
        table.set_cell(pos("A3"), "=A2").unwrap();

        assert_eq!(table.value(pos("A3")).unwrap(), Value::from(1.0));
        table.set_cell(pos("A1"), "2").unwrap();
        assert_eq!(table.stats().caches_invalidated, 2);

        // Nothing is cached now, so a second edit has nothing to drop
        table.set_cell(pos("A1"), "3").unwrap();
        assert_eq!(table.stats().caches_invalidated, 2);
        assert_eq!(table.value(pos("A3")).unwrap(), Value::from(3.0));
    }

    #[test]
    fn test_diamond_evaluates_each_cell_once() {
        let mut table = Table::new();
        table.set_cell(pos("A1"), "3").unwrap();
        table.set_cell(pos("B1"), "=A1*2").unwrap();
        table.set_cell(pos("C1"), "=A1+1").unwrap();
        table.set_cell(pos("D1"), "=B1+C1").unwrap();

        assert_eq!(table.value(pos("D1")).unwrap(), Value::from(10.0));
        assert_eq!(table.stats().formulas_evaluated, 3);
    }

    #[test]
    fn test_error_values_flow_downstream() {
        let mut table = Table::new();
        table.set_cell(pos("A1"), "=1/0").unwrap();
        table.set_cell(pos("A2"), "=A1+1").unwrap();
        table.set_cell(pos("A3"), "text").unwrap();
        table.set_cell(pos("A4"), "=A3").unwrap();

        assert_eq!(
            table.value(pos("A2")).unwrap(),
            Value::Error(FormulaError::Arithmetic)
        );
        assert_eq!(
            table.value(pos("A4")).unwrap(),
            Value::Error(FormulaError::Value)
        );
    }

    #[test]
    fn test_cell_view() {
        let mut table = Table::new();
        table.set_cell(pos("C2"), "= B1 + A1 ").unwrap();

        let cell = table.get_cell(pos("C2")).unwrap().unwrap();
        assert_eq!(cell.position(), pos("C2"));
        assert_eq!(cell.text(), "=B1+A1");
        assert_eq!(cell.referenced_cells(), &[pos("A1"), pos("B1")]);
        assert_eq!(cell.value(), Value::from(0.0));
        assert!(cell.dependents().is_empty());
    }

    #[test]
    fn test_invalid_positions() {
        let mut table = Table::new();
        let outside = Position::new(cellgrid_core::MAX_ROWS, 0);

        assert_eq!(
            table.set_cell(outside, "1"),
            Err(Error::InvalidPosition(outside))
        );
        assert!(table.get_cell(Position::NONE).is_err());
        assert!(table.clear_cell(Position::new(0, -1)).is_err());
        assert!(table.value(outside).is_err());
        assert!(table.text(outside).is_err());
    }
}
