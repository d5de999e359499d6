//! Error types for cellgrid-core

use crate::position::Position;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Structural failures of a table operation.
///
/// Every variant is reported before any state changes, so a failed edit leaves the table
/// exactly as it was. Arithmetic faults during evaluation are not errors; they are
/// [`FormulaError`](crate::FormulaError) values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Position outside the fixed grid bounds
    #[error("Invalid position: ({}, {})", .0.row, .0.col)]
    InvalidPosition(Position),

    /// Formula text that does not parse
    #[error("Formula parse error: {0}")]
    FormulaParse(String),

    /// Edit that would make a cell depend on itself
    #[error("Circular dependency detected involving cell {0}")]
    CircularDependency(Position),
}

impl Error {
    /// Check whether this is a cycle rejection rather than a syntax or bounds problem
    pub fn is_circular(&self) -> bool {
        matches!(self, Error::CircularDependency(_))
    }
}
