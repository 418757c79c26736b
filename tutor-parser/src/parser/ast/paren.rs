use std::ops::Range;
use crate::{
    parser::{
        ast::expr::Expr,
        error::{kind, Error},
        token::{CloseParen, Command, OpenParen},
        Parse,
        Parser,
    },
    try_parse_catch_fatal,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A parenthesized expression. Parentheses sized with `\left(` / `\right)` are parsed into the
/// exact same node; the sizing commands are transparent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Paren {
    /// The inner expression.
    pub expr: Box<Expr>,

    /// The region of the source code that this expression was parsed from.
    pub span: Range<usize>,
}

impl Paren {
    /// Returns the span of the parenthesized expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Parses a `\left( ... \right)` delimited group.
    fn parse_sized(input: &mut Parser) -> Result<Self, Error> {
        let left = input.try_parse::<Command>()?;
        if left.lexeme != r"\left" {
            return Err(Error::new(vec![left.span], kind::NonFatal));
        }

        let _open = input.try_parse::<OpenParen>()?;
        let expr = input.try_parse::<Expr>()?;
        let right = input
            .try_parse::<Command>()
            .ok()
            .filter(|command| command.lexeme == r"\right")
            .ok_or_else(|| Error::new_fatal(vec![left.span.clone()], kind::UnmatchedLeftDelimiter))?;
        let close = input.try_parse::<CloseParen>().map_err(|_| {
            Error::new_fatal(vec![right.span.clone()], kind::UnclosedParenthesis { opening: true })
        })?;

        Ok(Self {
            expr: Box::new(expr),
            span: left.span.start..close.span.end,
        })
    }
}

impl Parse for Paren {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let _ = try_parse_catch_fatal!(input.try_parse_with_fn(Self::parse_sized));

        let open = input.try_parse::<OpenParen>()?;
        if input.clone().try_parse::<CloseParen>().is_ok() {
            return Err(Error::new_fatal(vec![open.span], kind::EmptyParenthesis));
        }

        let expr = input.try_parse::<Expr>()?;
        let close = input.try_parse::<CloseParen>().map_err(|_| {
            Error::new_fatal(vec![open.span.clone()], kind::UnclosedParenthesis { opening: true })
        })?;
        Ok(Self {
            expr: Box::new(expr),
            span: open.span.start..close.span.end,
        })
    }
}
