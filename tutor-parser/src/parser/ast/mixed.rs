use std::ops::Range;
use crate::parser::{
    error::{kind, Error},
    token,
    Parse,
    Parser,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A mixed number such as `1 2/3`: a whole part followed by a fraction, separated by a single
/// space. The tokenizer guarantees all three parts are plain integers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mixed {
    /// The whole part of the mixed number.
    pub whole: i64,

    /// The numerator of the fractional part.
    pub numerator: i64,

    /// The denominator of the fractional part.
    pub denominator: i64,

    /// The region of the source code that this mixed number was parsed from.
    pub span: Range<usize>,
}

impl Mixed {
    /// Returns the span of the mixed number.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }
}

impl Parse for Mixed {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let token = input.try_parse::<token::MixedNum>()?;
        let invalid = || {
            Error::new_fatal(vec![token.span.clone()], kind::InvalidNumber {
                lexeme: token.lexeme.clone(),
            })
        };

        // the token is guaranteed to look like `W N/D`
        let (whole, frac) = token.lexeme.split_once(' ').ok_or_else(|| invalid())?;
        let (numerator, denominator) = frac.split_once('/').ok_or_else(|| invalid())?;

        Ok(Self {
            whole: whole.parse().map_err(|_| invalid())?,
            numerator: numerator.parse().map_err(|_| invalid())?,
            denominator: denominator.parse().map_err(|_| invalid())?,
            span: token.span.clone(),
        })
    }
}
