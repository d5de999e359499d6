//! Parsed formulas

use crate::ast::FormulaExpr;
use crate::error::{ParseError, ParseResult};
use crate::evaluator::{evaluate, CellLookup};
use crate::parser::parse_formula;
use cellgrid_core::{Position, Value};
use std::str::FromStr;

/// A parsed formula together with the cells it references
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    expr: FormulaExpr,
    /// Distinct in-grid references, sorted by the position order
    referenced: Vec<Position>,
}

impl Formula {
    /// Parse an expression (formula text without the leading `=`)
    pub fn parse(expression: &str) -> ParseResult<Self> {
        let expr = parse_formula(expression)?;

        let mut referenced = expr.references();
        referenced.sort_unstable();
        referenced.dedup();

        Ok(Self { expr, referenced })
    }

    /// Evaluate against the given cells; faults become [`Value::Error`]
    pub fn evaluate(&self, lookup: &dyn CellLookup) -> Value {
        evaluate(&self.expr, lookup)
    }

    /// Canonical expression text, re-parseable into the same tree
    pub fn expression(&self) -> String {
        self.expr.to_string()
    }

    /// Cells the formula mentions, deduplicated and in ascending position order
    pub fn referenced_cells(&self) -> &[Position] {
        &self.referenced
    }

    /// The underlying expression tree
    pub fn ast(&self) -> &FormulaExpr {
        &self.expr
    }
}

impl FromStr for Formula {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        Self::parse(s)
    }
}
