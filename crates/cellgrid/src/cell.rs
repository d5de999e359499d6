//! Cell contents and their cached values

use cellgrid_core::{Position, Result, Value, ESCAPE_SIGN, FORMULA_SIGN};
use cellgrid_formula::Formula;
use std::cell::OnceCell;

/// What a cell holds
#[derive(Debug, Clone, Default)]
pub enum CellContent {
    /// Nothing; reads as empty text
    #[default]
    Empty,

    /// Literal text, stored exactly as entered
    Text(String),

    /// A formula and its lazily computed result
    Formula(FormulaCell),
}

impl CellContent {
    /// Classify raw cell text
    ///
    /// - `""` is [`Empty`](Self::Empty)
    /// - `=` followed by at least one character is a formula; a malformed one is a
    ///   [`FormulaParse`](cellgrid_core::Error::FormulaParse) error
    /// - anything else, including a lone `=`, is text
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Ok(CellContent::Empty);
        }

        match text.strip_prefix(FORMULA_SIGN) {
            Some(expression) if !expression.is_empty() => {
                let formula = Formula::parse(expression)?;
                Ok(CellContent::Formula(FormulaCell::new(formula)))
            }
            _ => Ok(CellContent::Text(text.to_string())),
        }
    }

    /// The round-trippable source text
    pub fn text(&self) -> String {
        match self {
            CellContent::Empty => String::new(),
            CellContent::Text(text) => text.clone(),
            CellContent::Formula(cell) => format!("{}{}", FORMULA_SIGN, cell.formula.expression()),
        }
    }

    /// Cells this content reads, ascending and unique
    pub fn referenced_cells(&self) -> &[Position] {
        match self {
            CellContent::Formula(cell) => cell.formula.referenced_cells(),
            CellContent::Empty | CellContent::Text(_) => &[],
        }
    }

    /// Check if this is [`Empty`](Self::Empty)
    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Empty)
    }

    /// Get the formula cell if this is one
    pub fn as_formula(&self) -> Option<&FormulaCell> {
        match self {
            CellContent::Formula(cell) => Some(cell),
            _ => None,
        }
    }

    /// Value of non-formula content; `None` for formulas, which need evaluating
    pub(crate) fn literal_value(&self) -> Option<Value> {
        match self {
            CellContent::Empty => Some(Value::empty()),
            CellContent::Text(text) => {
                let shown = text.strip_prefix(ESCAPE_SIGN).unwrap_or(text);
                Some(Value::text(shown))
            }
            CellContent::Formula(_) => None,
        }
    }
}

/// A formula together with its cached result
#[derive(Debug, Clone)]
pub struct FormulaCell {
    formula: Formula,
    cache: OnceCell<Value>,
}

impl FormulaCell {
    fn new(formula: Formula) -> Self {
        Self {
            formula,
            cache: OnceCell::new(),
        }
    }

    /// The parsed formula
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// The cached result, if it is still valid
    pub fn cached_value(&self) -> Option<&Value> {
        self.cache.get()
    }

    /// Return the cached result, computing and storing it first if needed
    pub(crate) fn value_or_init<F>(&self, evaluate: F) -> Value
    where
        F: FnOnce(&Formula) -> Value,
    {
        self.cache.get_or_init(|| evaluate(&self.formula)).clone()
    }

    fn invalidate(&mut self) -> bool {
        self.cache.take().is_some()
    }
}

/// A single table entry
#[derive(Debug, Clone, Default)]
pub(crate) struct Cell {
    pub(crate) content: CellContent,
    /// Emptied by a clear but kept because formulas still read it; hidden from `get_cell`
    pub(crate) cleared: bool,
}

impl Cell {
    /// Drop the cached formula result; returns whether there was one
    pub(crate) fn invalidate_cache(&mut self) -> bool {
        match &mut self.content {
            CellContent::Formula(cell) => cell.invalidate(),
            CellContent::Empty | CellContent::Text(_) => false,
        }
    }
}
