//! # cellgrid-formula
//!
//! Formula support for cellgrid.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Formula evaluation (AST → value) against a [`CellLookup`]
//! - Reference extraction and canonical re-serialisation ([`Formula`])
//! - A dependency graph with cycle detection and reverse-dependency walks
//!
//! ## Example
//!
//! ```rust
//! use cellgrid_core::{Position, Value};
//! use cellgrid_formula::Formula;
//!
//! let formula = Formula::parse("A1 * (2 + B1)").unwrap();
//! assert_eq!(formula.expression(), "A1*(2+B1)");
//! assert_eq!(formula.referenced_cells(), &[Position::new(0, 0), Position::new(0, 1)]);
//!
//! let lookup = |_pos: Position| Some(Value::from(3.0));
//! assert_eq!(formula.evaluate(&lookup), Value::from(15.0));
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use dependency::DependencyGraph;
pub use error::{ParseError, ParseResult};
pub use evaluator::{evaluate, CellLookup};
pub use formula::Formula;
pub use parser::parse_formula;
