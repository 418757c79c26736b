use std::ops::Range;
use crate::parser::{
    ast::{expr::Expr, unary::Unary},
    error::Error,
    token::op::BinOp,
    Parser,
    Precedence,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A binary expression, such as `1 + 2`. Binary expressions can include nested expressions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Binary {
    /// The left-hand side of the binary expression.
    pub lhs: Box<Expr>,

    /// The operator of the binary expression.
    pub op: BinOp,

    /// The right-hand side of the binary expression.
    pub rhs: Box<Expr>,

    /// The region of the source code that this binary expression was parsed from.
    pub span: Range<usize>,
}

impl Binary {
    /// Returns the span of the binary expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Parses a (possibly nested) binary expression on top of an already-parsed left-hand side,
    /// consuming operators of at least the given precedence.
    ///
    /// All binary operators in the grammar are left-associative; an operator of strictly higher
    /// precedence binds to the right-hand side before the surrounding node is built, which is how
    /// `1 + 2 * 3` becomes `1 + (2 * 3)`.
    pub fn parse_expr(input: &mut Parser, mut lhs: Expr, precedence: Precedence) -> Result<Expr, Error> {
        loop {
            // clone the input stream to emulate peeking
            let mut ahead = input.clone();
            let Ok(op) = ahead.try_parse::<BinOp>() else { break };
            if op.precedence() < precedence {
                break;
            }
            input.set_cursor(&ahead);

            let mut rhs = Unary::parse_or_lower(input)?;
            loop {
                let mut ahead = input.clone();
                let Ok(next_op) = ahead.try_parse::<BinOp>() else { break };
                if next_op.precedence() > op.precedence() {
                    rhs = Self::parse_expr(input, rhs, next_op.precedence())?;
                } else {
                    break;
                }
            }

            let span = lhs.span().start..rhs.span().end;
            lhs = Expr::Binary(Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
                span,
            });
        }

        Ok(lhs)
    }
}
