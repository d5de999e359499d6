//! Prelude module - common imports for cellgrid users
//!
//! ```rust
//! use cellgrid::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellContent,
    CellView,
    // Error types
    Error,
    FormulaError,
    // Grid types
    Position,
    // Printing
    PrintMode,
    PrintOptions,
    Result,
    Size,
    // Main types
    Table,
    TableStats,
    Value,
};
