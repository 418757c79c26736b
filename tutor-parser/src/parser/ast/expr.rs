use std::ops::Range;
use crate::{
    parser::{
        ast::{
            binary::Binary,
            fraction::Frac,
            literal::Literal,
            mixed::Mixed,
            paren::Paren,
            unary::Unary,
        },
        error::{kind, Error},
        token::{CloseParen, Command},
        Parse,
        Parser,
        Precedence,
    },
    try_parse_catch_fatal,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The commands that have a meaning in the expression grammar. Any other command is rejected by
/// name, rather than as a generic token error.
const GRAMMAR_COMMANDS: &[&str] = &[r"\frac", r"\left", r"\right", r"\cdot", r"\times", r"\div"];

/// Represents a general arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// A literal value.
    Literal(Literal),

    /// A parenthesized expression, such as `(1 + 2)`.
    Paren(Paren),

    /// A two-argument fraction, such as `\frac{1}{7}`.
    Frac(Frac),

    /// A mixed number, such as `1 2/3`.
    Mixed(Mixed),

    /// A unary operation, such as `-(1 + 2)`.
    Unary(Unary),

    /// A binary operation, such as `1 + 2`.
    Binary(Binary),
}

impl Expr {
    /// Returns the span of the expression.
    pub fn span(&self) -> Range<usize> {
        match self {
            Expr::Literal(literal) => literal.span(),
            Expr::Paren(paren) => paren.span(),
            Expr::Frac(frac) => frac.span(),
            Expr::Mixed(mixed) => mixed.span(),
            Expr::Unary(unary) => unary.span(),
            Expr::Binary(binary) => binary.span(),
        }
    }
}

impl Parse for Expr {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        if input.clone().try_parse::<CloseParen>().is_ok() {
            return Err(input.error_fatal(kind::UnclosedParenthesis { opening: false }));
        }

        let lhs = input.try_parse_with_fn(Unary::parse_or_lower)?;
        Binary::parse_expr(input, lhs, Precedence::Any)
    }
}

/// Represents a primary expression.
///
/// Primary expressions are the simplest expressions, and are the building blocks of more complex
/// expressions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Primary {
    /// A literal value.
    Literal(Literal),

    /// A parenthesized expression, such as `(1 + 2)`.
    Paren(Paren),

    /// A two-argument fraction, such as `\frac{1}{7}`.
    Frac(Frac),

    /// A mixed number, such as `1 2/3`.
    Mixed(Mixed),
}

impl Primary {
    /// Returns the span of the primary expression.
    pub fn span(&self) -> Range<usize> {
        match self {
            Primary::Literal(literal) => literal.span(),
            Primary::Paren(paren) => paren.span(),
            Primary::Frac(frac) => frac.span(),
            Primary::Mixed(mixed) => mixed.span(),
        }
    }
}

impl Parse for Primary {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        // fractions and mixed numbers can begin with tokens that also start literals, so they are
        // tried first
        let _ = try_parse_catch_fatal!(
            input.try_parse::<Frac>().map(Self::Frac),
            input.try_parse::<Mixed>().map(Self::Mixed),
            input.try_parse::<Literal>().map(Self::Literal),
        );

        // a command that survived the attempts above and is not part of the grammar is reported
        // by name
        if let Ok(command) = input.clone().try_parse::<Command>() {
            if !GRAMMAR_COMMANDS.contains(&command.lexeme.as_str()) {
                return Err(input.error_fatal(kind::UnknownCommand { name: command.lexeme }));
            }
        }

        input.try_parse::<Paren>().map(Self::Paren)
    }
}

impl From<Primary> for Expr {
    fn from(primary: Primary) -> Self {
        match primary {
            Primary::Literal(literal) => Self::Literal(literal),
            Primary::Paren(paren) => Self::Paren(paren),
            Primary::Frac(frac) => Self::Frac(frac),
            Primary::Mixed(mixed) => Self::Mixed(mixed),
        }
    }
}
