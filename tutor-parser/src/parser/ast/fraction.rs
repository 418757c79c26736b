use std::ops::Range;
use crate::parser::{
    ast::expr::Expr,
    error::{kind, Error},
    token::{CloseBrace, Command, OpenBrace},
    Parse,
    Parser,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A two-argument fraction written as `\frac{numerator}{denominator}`.
///
/// Both arguments are full expressions at this stage; deciding whether the fraction is a plain
/// literal fraction or a quotient of subexpressions is left to consumers of the tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frac {
    /// The numerator of the fraction.
    pub numerator: Box<Expr>,

    /// The denominator of the fraction.
    pub denominator: Box<Expr>,

    /// The region of the source code that this fraction was parsed from.
    pub span: Range<usize>,
}

impl Frac {
    /// Returns the span of the fraction.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Parses one brace-delimited fraction argument, `{ expr }`.
    fn parse_arg(input: &mut Parser) -> Result<(Expr, Range<usize>), Error> {
        let open = match input.try_parse::<OpenBrace>() {
            Ok(open) => open,
            Err(mut err) => {
                // once `\frac` has been seen, a missing argument can never parse as anything else
                err.fatal = true;
                return Err(err);
            },
        };
        let expr = input.try_parse::<Expr>().map_err(|mut err| {
            err.fatal = true;
            err
        })?;
        let close = input.try_parse::<CloseBrace>().map_err(|_| {
            Error::new_fatal(vec![open.span.clone()], kind::UnclosedBrace)
        })?;
        Ok((expr, open.span.start..close.span.end))
    }
}

impl Parse for Frac {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let command = input.try_parse::<Command>()?;
        if command.lexeme != r"\frac" {
            return Err(Error::new(vec![command.span], kind::NonFatal));
        }

        let (numerator, _) = Self::parse_arg(input)?;
        let (denominator, den_span) = Self::parse_arg(input)?;

        Ok(Self {
            numerator: Box::new(numerator),
            denominator: Box::new(denominator),
            span: command.span.start..den_span.end,
        })
    }
}
