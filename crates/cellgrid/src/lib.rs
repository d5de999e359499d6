//! # cellgrid
//!
//! A reactive grid of cells. Each cell holds nothing, literal text, or a formula over
//! other cells; formula results are computed on demand and cached until an upstream
//! edit invalidates them.
//!
//! ## Features
//!
//! - Arithmetic formulas (`+ - * /`, unary signs, parentheses, A1 references)
//! - Rejection of edits that would introduce a circular reference
//! - Lazy evaluation with per-cell caching and targeted invalidation
//! - Printing of values or texts over the printable area
//!
//! ## Example
//!
//! ```rust
//! use cellgrid::prelude::*;
//!
//! let mut table = Table::new();
//!
//! table.set_cell(Position::from_a1("A1"), "12").unwrap();
//! table.set_cell(Position::from_a1("B1"), "=A1*2").unwrap();
//! table.set_cell(Position::from_a1("C1"), "'=not a formula").unwrap();
//!
//! assert_eq!(table.value(Position::from_a1("B1")).unwrap(), Value::from(24.0));
//! assert_eq!(table.printable_size(), Size::new(1, 3));
//!
//! // A1 = B1 would close a loop
//! let err = table.set_cell(Position::from_a1("A1"), "=B1").unwrap_err();
//! assert!(err.is_circular());
//! ```

pub mod cell;
pub mod prelude;
pub mod print;
pub mod table;

pub use cell::{CellContent, FormulaCell};
pub use print::{PrintMode, PrintOptions};
pub use table::{CellView, Table, TableStats};

// Re-export core types
pub use cellgrid_core::{
    Error, FormulaError, Position, Result, Size, Value, ESCAPE_SIGN, FORMULA_SIGN, MAX_COLS,
    MAX_ROWS,
};

// Re-export formula types
pub use cellgrid_formula::{CellLookup, Formula, FormulaExpr, ParseError};
