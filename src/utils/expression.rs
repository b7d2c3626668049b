//! Arithmetic evaluator for `.calculate`.
//!
//! Grammar:
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := ('+' | '-') factor | number | '(' expr ')'
//! ```

use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

/// Longest expression accepted, in bytes
pub const MAX_EXPRESSION_LEN: usize = 1000;

/// Deepest nesting of parentheses and unary signs
pub const MAX_DEPTH: usize = 100;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("expression is empty")]
    Empty,

    #[error("only numbers and +, -, *, /, ( ) are allowed, found '{0}'")]
    InvalidCharacter(char),

    #[error("malformed number '{0}'")]
    BadNumber(String),

    #[error("unexpected '{0}'")]
    UnexpectedToken(char),

    #[error("expression ended unexpectedly")]
    UnexpectedEnd,

    #[error("division by zero")]
    DivisionByZero,

    #[error("expression is longer than {} characters", MAX_EXPRESSION_LEN)]
    TooLong,

    #[error("expression is nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,
}

/// Whether a character may appear in a calculator expression at all
pub fn is_allowed(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.') || c.is_whitespace()
}

/// Evaluate an arithmetic expression
pub fn evaluate(input: &str) -> Result<f64, ExpressionError> {
    if input.len() > MAX_EXPRESSION_LEN {
        return Err(ExpressionError::TooLong);
    }
    if let Some(bad) = input.chars().find(|c| !is_allowed(*c)) {
        return Err(ExpressionError::InvalidCharacter(bad));
    }
    if input.trim().is_empty() {
        return Err(ExpressionError::Empty);
    }

    let mut parser = Parser {
        chars: input.chars().peekable(),
        depth: 0,
    };
    let value = parser.expr()?;

    match parser.peek() {
        None => Ok(value),
        Some(c) => Err(ExpressionError::UnexpectedToken(c)),
    }
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&mut self) -> Option<char> {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
        self.chars.peek().copied()
    }

    fn expr(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some('+') => {
                    self.chars.next();
                    value += self.term()?;
                }
                Some('-') => {
                    self.chars.next();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.factor()?;
        loop {
            match self.peek() {
                Some('*') => {
                    self.chars.next();
                    value *= self.factor()?;
                }
                Some('/') => {
                    self.chars.next();
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(ExpressionError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    fn factor(&mut self) -> Result<f64, ExpressionError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExpressionError::TooDeep);
        }
        self.depth += 1;
        let value = self.factor_inner();
        self.depth -= 1;
        value
    }

    fn factor_inner(&mut self) -> Result<f64, ExpressionError> {
        match self.peek() {
            Some('-') => {
                self.chars.next();
                Ok(-self.factor()?)
            }
            Some('+') => {
                self.chars.next();
                self.factor()
            }
            Some('(') => {
                self.chars.next();
                let value = self.expr()?;
                match self.peek() {
                    Some(')') => {
                        self.chars.next();
                        Ok(value)
                    }
                    Some(c) => Err(ExpressionError::UnexpectedToken(c)),
                    None => Err(ExpressionError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(ExpressionError::UnexpectedToken(c)),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }

    fn number(&mut self) -> Result<f64, ExpressionError> {
        let mut literal = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_ascii_digit() || *c == '.') {
            literal.push(c);
        }
        literal
            .parse()
            .map_err(|_| ExpressionError::BadNumber(literal))
    }
}
