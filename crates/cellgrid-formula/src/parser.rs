//! Formula parser
//!
//! A recursive descent parser for arithmetic formulas with proper operator precedence.
//! The grammar covers numeric literals, `+ - * /`, unary `+ -`, parentheses and
//! A1-style cell references.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{ParseError, ParseResult};
use cellgrid_core::Position;

/// Deepest nesting of parentheses and unary operators accepted
const MAX_NESTING: usize = 256;

/// Most binary operators accepted in one formula
///
/// Operator chains build a tree as deep as they are long, and evaluation, printing and
/// reference collection all walk that tree recursively.
const MAX_OPERATORS: usize = 1024;

/// Parse formula text (without the leading `=`) into an AST
///
/// # Example
/// ```rust
/// use cellgrid_formula::parse_formula;
///
/// let ast = parse_formula("1+2").unwrap();
/// let ast = parse_formula("(A1 + B2) / 4").unwrap();
/// assert!(parse_formula("1+").is_err());
/// ```
pub fn parse_formula(formula: &str) -> ParseResult<FormulaExpr> {
    let mut parser = FormulaParser::new(formula)?;

    if matches!(parser.current_token(), Token::Eof) {
        return Err(ParseError::Empty);
    }

    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if !matches!(parser.current_token(), Token::Eof) {
        return Err(ParseError::TrailingInput(
            parser.input[parser.token_start..].to_string(),
        ));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Number(f64),

    // References like A1 (validity against the grid is checked later)
    CellRef(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,

    // Delimiters
    LeftParen,
    RightParen,

    // End of input
    Eof,
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    token_start: usize,
    current_token: Token,
    depth: usize,
    operators: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> ParseResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            token_start: 0,
            current_token: Token::Eof,
            depth: 0,
            operators: 0,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> ParseResult<()> {
        self.skip_whitespace();
        self.token_start = self.pos;
        self.current_token = self.scan_token()?;
        Ok(())
    }

    fn scan_token(&mut self) -> ParseResult<Token> {
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        // Single-character tokens
        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        // Number
        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        // Cell reference
        if c.is_ascii_alphabetic() {
            return self.scan_reference();
        }

        Err(ParseError::UnexpectedChar {
            ch: c,
            offset: self.pos,
        })
    }

    fn scan_number(&mut self) -> ParseResult<Token> {
        let start = self.pos;

        // Integer part
        self.skip_digits();

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            self.skip_digits();
        }

        // Exponent part
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            self.skip_digits();
        }

        let num_str = &self.input[start..self.pos];
        match num_str.parse::<f64>() {
            Ok(num) if num.is_finite() => Ok(Token::Number(num)),
            _ => Err(ParseError::InvalidNumber(num_str.to_string())),
        }
    }

    fn scan_reference(&mut self) -> ParseResult<Token> {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| c.is_ascii_alphanumeric()) {
            self.advance();
        }

        let text = &self.input[start..self.pos];
        if Self::is_cell_reference(text) {
            Ok(Token::CellRef(text.to_string()))
        } else {
            Err(ParseError::UnknownIdentifier(text.to_string()))
        }
    }

    /// Uppercase letters followed by digits, nothing else
    fn is_cell_reference(text: &str) -> bool {
        let letters = text.bytes().take_while(u8::is_ascii_uppercase).count();
        let digits = &text[letters..];
        letters > 0 && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_digits(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, char::is_whitespace) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        &self.current_token
    }

    fn consume(&mut self) -> ParseResult<Token> {
        let token = std::mem::replace(&mut self.current_token, Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: Token, description: &'static str) -> ParseResult<()> {
        if *self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(self.unexpected(description))
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        let found = match self.current_token() {
            Token::Eof => "end of formula".to_string(),
            _ => format!("'{}'", &self.input[self.token_start..self.pos]),
        };
        ParseError::UnexpectedToken { expected, found }
    }

    fn enter(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError::TooDeep(MAX_NESTING));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn count_operator(&mut self) -> ParseResult<()> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(ParseError::TooManyOperators(MAX_OPERATORS));
        }
        Ok(())
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division: *, /
    // 3. Unary: +, -
    // 4. Primary: literals, references, parentheses

    fn parse_expression(&mut self) -> ParseResult<FormulaExpr> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> ParseResult<FormulaExpr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume()?;
            self.count_operator()?;
            let right = self.parse_multiplicative()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<FormulaExpr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume()?;
            self.count_operator()?;
            let right = self.parse_unary()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<FormulaExpr> {
        let op = match self.current_token() {
            Token::Minus => UnaryOperator::Negate,
            Token::Plus => UnaryOperator::Plus,
            _ => return self.parse_primary(),
        };

        self.consume()?;
        self.enter()?;
        let operand = self.parse_unary()?;
        self.leave();

        Ok(FormulaExpr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> ParseResult<FormulaExpr> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.consume()?;
                Ok(FormulaExpr::Number(n))
            }

            Token::CellRef(text) => {
                self.consume()?;
                Ok(Self::cell_reference(text))
            }

            Token::LeftParen => {
                self.consume()?;
                self.enter()?;
                let expr = self.parse_expression()?;
                self.leave();
                self.expect(Token::RightParen, "')'")?;
                Ok(expr)
            }

            _ => Err(self.unexpected("a number, a cell reference or '('")),
        }
    }

    fn cell_reference(text: String) -> FormulaExpr {
        let pos = Position::from_a1(&text);
        if pos.is_valid() {
            FormulaExpr::CellRef(pos)
        } else {
            FormulaExpr::InvalidRef(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("42").unwrap(), FormulaExpr::Number(42.0));
        assert_eq!(parse_formula("3.25").unwrap(), FormulaExpr::Number(3.25));
        assert_eq!(parse_formula(".5").unwrap(), FormulaExpr::Number(0.5));
        assert_eq!(parse_formula("1e10").unwrap(), FormulaExpr::Number(1e10));
        assert_eq!(parse_formula("2E-3").unwrap(), FormulaExpr::Number(2e-3));
    }

    #[test]
    fn test_parse_arithmetic_precedence() {
        // Should parse as 1+(2*3)
        let ast = parse_formula("1+2*3").unwrap();
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Add);
            assert_eq!(*left, FormulaExpr::Number(1.0));
            assert!(matches!(
                *right,
                FormulaExpr::BinaryOp {
                    op: BinaryOperator::Multiply,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_left_associative() {
        let ast = parse_formula("8-2-1").unwrap();
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Subtract);
            assert_eq!(*right, FormulaExpr::Number(1.0));
            assert!(matches!(
                *left,
                FormulaExpr::BinaryOp {
                    op: BinaryOperator::Subtract,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_parentheses() {
        let ast = parse_formula("(1+2)*3").unwrap();
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Multiply);
            assert!(matches!(
                *left,
                FormulaExpr::BinaryOp {
                    op: BinaryOperator::Add,
                    ..
                }
            ));
            assert_eq!(*right, FormulaExpr::Number(3.0));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_unary() {
        let ast = parse_formula("-5").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(FormulaExpr::Number(5.0)),
            }
        );

        let ast = parse_formula("+-A1").unwrap();
        assert!(matches!(
            ast,
            FormulaExpr::UnaryOp {
                op: UnaryOperator::Plus,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_cell_reference() {
        assert_eq!(
            parse_formula("B2").unwrap(),
            FormulaExpr::CellRef(Position::new(1, 1))
        );
        assert_eq!(
            parse_formula("ZZZZ1").unwrap(),
            FormulaExpr::InvalidRef("ZZZZ1".into())
        );
        assert_eq!(
            parse_formula("A0").unwrap(),
            FormulaExpr::InvalidRef("A0".into())
        );
    }

    #[test]
    fn test_parse_whitespace() {
        assert_eq!(
            parse_formula("  1 +\t2 ").unwrap(),
            parse_formula("1+2").unwrap()
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_formula(""), Err(ParseError::Empty));
        assert_eq!(parse_formula("   "), Err(ParseError::Empty));
        assert_eq!(
            parse_formula("1+"),
            Err(ParseError::UnexpectedToken {
                expected: "a number, a cell reference or '('",
                found: "end of formula".into(),
            })
        );
        assert_eq!(
            parse_formula("(1+2"),
            Err(ParseError::UnexpectedToken {
                expected: "')'",
                found: "end of formula".into(),
            })
        );
        assert_eq!(
            parse_formula("1 2"),
            Err(ParseError::TrailingInput("2".into()))
        );
        assert_eq!(
            parse_formula("1)"),
            Err(ParseError::TrailingInput(")".into()))
        );
        assert_eq!(
            parse_formula("a1"),
            Err(ParseError::UnknownIdentifier("a1".into()))
        );
        assert_eq!(
            parse_formula("SUM"),
            Err(ParseError::UnknownIdentifier("SUM".into()))
        );
        assert_eq!(
            parse_formula("1^2"),
            Err(ParseError::UnexpectedChar { ch: '^', offset: 1 })
        );
        assert_eq!(
            parse_formula("1e"),
            Err(ParseError::InvalidNumber("1e".into()))
        );
        assert!(parse_formula("*3").is_err());
    }

    #[test]
    fn test_parse_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        assert_eq!(parse_formula(&deep), Err(ParseError::TooDeep(MAX_NESTING)));

        let ok = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(parse_formula(&ok).unwrap(), FormulaExpr::Number(1.0));
    }

    #[test]
    fn test_parse_operator_limit() {
        let terms = |n: usize| vec!["1"; n].join("+");

        let at_limit = parse_formula(&terms(MAX_OPERATORS + 1)).unwrap();
        assert!(at_limit.references().is_empty());

        assert_eq!(
            parse_formula(&terms(MAX_OPERATORS + 2)),
            Err(ParseError::TooManyOperators(MAX_OPERATORS))
        );
        // Operators inside parentheses count too
        let grouped = format!("({})*2", terms(MAX_OPERATORS + 1));
        assert_eq!(
            parse_formula(&grouped),
            Err(ParseError::TooManyOperators(MAX_OPERATORS))
        );
    }
}
