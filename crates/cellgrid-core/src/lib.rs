//! # cellgrid-core
//!
//! Core data types shared by the cellgrid crates:
//! - [`Position`] and [`Size`] - grid coordinates and bounding boxes
//! - [`Value`] and [`FormulaError`] - what a cell evaluates to
//! - [`Error`] - structural failures rejected at the mutation boundary
//!
//! ## Example
//!
//! ```rust
//! use cellgrid_core::{Position, Value};
//!
//! let pos = Position::from_a1("B3");
//! assert_eq!(pos, Position::new(2, 1));
//! assert_eq!(pos.to_string(), "B3");
//!
//! assert_eq!(Value::from(12.0).to_string(), "12");
//! ```

pub mod error;
pub mod position;
pub mod value;

pub use error::{Error, Result};
pub use position::{Position, Size};
pub use value::{FormulaError, Value};

/// Number of rows in a table
pub const MAX_ROWS: i32 = 16_384;

/// Number of columns in a table
pub const MAX_COLS: i32 = 16_384;

/// Leading character marking a cell text as a formula
pub const FORMULA_SIGN: char = '=';

/// Leading character marking a cell text as literal, even if it looks like a formula
pub const ESCAPE_SIGN: char = '\'';
