use std::ops::Range;
use crate::{
    parser::{
        error::{kind, Error},
        token::{Float, Int, Name},
        Parse,
        Parser,
    },
    try_parse_catch_fatal,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An integer literal, such as `3` or `144`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LitInt {
    /// The value of the integer literal.
    pub value: i64,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl Parse for LitInt {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let token = input.try_parse::<Int>()?;
        let value = token.lexeme.parse().map_err(|_| {
            Error::new_fatal(vec![token.span.clone()], kind::InvalidNumber {
                lexeme: token.lexeme.clone(),
            })
        })?;
        Ok(Self {
            value,
            span: token.span,
        })
    }
}

/// A decimal literal, such as `3.14` or `0.5`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LitFloat {
    /// The value of the decimal literal.
    pub value: f64,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl Parse for LitFloat {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let token = input.try_parse::<Float>()?;
        let value = token.lexeme.parse().map_err(|_| {
            Error::new_fatal(vec![token.span.clone()], kind::InvalidNumber {
                lexeme: token.lexeme.clone(),
            })
        })?;
        Ok(Self {
            value,
            span: token.span,
        })
    }
}

/// A symbol / identifier literal representing a bare variable, such as `x`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LitSym {
    /// The name of the symbol.
    pub name: String,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl Parse for LitSym {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let token = input.try_parse::<Name>()?;
        Ok(Self {
            name: token.lexeme,
            span: token.span,
        })
    }
}

/// Represents a literal value: an integer, a decimal, or a bare variable.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Literal {
    /// An integer literal, such as `3` or `144`.
    Int(LitInt),

    /// A decimal literal, such as `3.14` or `0.5`.
    Float(LitFloat),

    /// A symbol / identifier literal representing a bare variable, such as `x`.
    Sym(LitSym),
}

impl Literal {
    /// Returns the span of the literal.
    pub fn span(&self) -> Range<usize> {
        match self {
            Literal::Int(num) => num.span.clone(),
            Literal::Float(num) => num.span.clone(),
            Literal::Sym(name) => name.span.clone(),
        }
    }
}

impl Parse for Literal {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let _ = try_parse_catch_fatal!(
            input.try_parse::<LitInt>().map(Literal::Int),
            input.try_parse::<LitFloat>().map(Literal::Float),
        );
        input.try_parse::<LitSym>().map(Literal::Sym)
    }
}
