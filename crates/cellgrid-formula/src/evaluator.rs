//! Formula evaluator
//!
//! Evaluates formula ASTs to produce values. Evaluation never fails: arithmetic faults
//! and unreadable operands become [`Value::Error`] results.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use cellgrid_core::{FormulaError, Position, Value};

/// Read access to the cells a formula refers to
///
/// `value_at` returns the current value of the cell at `pos`, computing it first if it
/// is a formula whose result is not cached. `None` means no cell exists there.
pub trait CellLookup {
    fn value_at(&self, pos: Position) -> Option<Value>;
}

impl<F> CellLookup for F
where
    F: Fn(Position) -> Option<Value>,
{
    fn value_at(&self, pos: Position) -> Option<Value> {
        self(pos)
    }
}

/// Evaluate a formula expression
pub fn evaluate(expr: &FormulaExpr, lookup: &dyn CellLookup) -> Value {
    match evaluate_number(expr, lookup) {
        Ok(n) => Value::Number(n),
        Err(e) => Value::Error(e),
    }
}

fn evaluate_number(expr: &FormulaExpr, lookup: &dyn CellLookup) -> Result<f64, FormulaError> {
    match expr {
        FormulaExpr::Number(n) => Ok(*n),

        FormulaExpr::CellRef(pos) => match lookup.value_at(*pos) {
            Some(value) => to_number(&value),
            None => Ok(0.0),
        },

        FormulaExpr::InvalidRef(_) => Err(FormulaError::Ref),

        FormulaExpr::UnaryOp { op, operand } => {
            let value = evaluate_number(operand, lookup)?;
            Ok(match op {
                UnaryOperator::Plus => value,
                UnaryOperator::Negate => -value,
            })
        }

        FormulaExpr::BinaryOp { op, left, right } => {
            // Evaluate operands first; the first error wins
            let l = evaluate_number(left, lookup)?;
            let r = evaluate_number(right, lookup)?;
            evaluate_binary_op(*op, l, r)
        }
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(op: BinaryOperator, l: f64, r: f64) -> Result<f64, FormulaError> {
    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => {
            if r == 0.0 {
                return Err(FormulaError::Arithmetic);
            }
            l / r
        }
    };

    if result.is_finite() {
        Ok(result)
    } else {
        Err(FormulaError::Arithmetic)
    }
}

/// Read a cell value as a formula operand
///
/// Empty text is zero, text that is entirely a finite number is that number, any other
/// text is #VALUE!, and errors propagate unchanged.
pub fn to_number(value: &Value) -> Result<f64, FormulaError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Text(s) if s.is_empty() => Ok(0.0),
        Value::Text(s) => match s.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(FormulaError::Value),
        },
        Value::Error(e) => Err(*e),
    }
}
