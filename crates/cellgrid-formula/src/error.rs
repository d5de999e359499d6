//! Formula error types

use thiserror::Error;

/// Result type for formula parsing
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors that can occur while parsing formula text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Nothing to parse
    #[error("Empty formula")]
    Empty,

    /// Character that starts no token
    #[error("Unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    /// Malformed numeric literal
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),

    /// Word that is neither a cell reference nor anything else the grammar knows
    #[error("Unknown identifier '{0}'")]
    UnknownIdentifier(String),

    /// Token in the wrong place
    #[error("Expected {expected}, got {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },

    /// Well-formed expression followed by more input
    #[error("Unexpected characters after expression: '{0}'")]
    TrailingInput(String),

    /// Parentheses or unary operators nested beyond the supported depth
    #[error("Expression nested deeper than {0} levels")]
    TooDeep(usize),

    /// More binary operators than one formula may hold
    #[error("Formula has more than {0} operators")]
    TooManyOperators(usize),
}

impl From<ParseError> for cellgrid_core::Error {
    fn from(e: ParseError) -> Self {
        cellgrid_core::Error::FormulaParse(e.to_string())
    }
}
