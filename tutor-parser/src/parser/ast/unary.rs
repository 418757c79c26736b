use std::ops::Range;
use crate::parser::{
    ast::{
        expr::{Expr, Primary},
        literal::{LitFloat, LitInt, Literal},
    },
    error::Error,
    token::op::UnaryOp,
    Parse, Parser,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A unary expression, such as `-(1 + 2)`.
///
/// Negation of a bare numeric literal never produces this node; the sign folds directly into the
/// literal's value, so `-3` parses as the integer literal `-3`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Unary {
    /// The operator of the unary expression.
    pub op: UnaryOp,

    /// The operand of the unary expression.
    pub arg: Box<Expr>,

    /// The region of the source code that this unary expression was parsed from.
    pub span: Range<usize>,
}

impl Unary {
    /// Returns the span of the unary expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Parses a unary expression, or lower precedence expressions.
    pub fn parse_or_lower(input: &mut Parser) -> Result<Expr, Error> {
        if let Ok(expr) = input.try_parse_with_fn(Self::parse_negation) {
            return Ok(expr);
        }
        Primary::parse(input).map(Into::into)
    }

    /// Parses a negated expression, folding the sign into bare numeric literals.
    fn parse_negation(input: &mut Parser) -> Result<Expr, Error> {
        let op = input.try_parse::<UnaryOp>()?;
        let operand = Self::parse_or_lower(input)?;
        let span = op.span.start..operand.span().end;

        Ok(match operand {
            Expr::Literal(Literal::Int(num)) => Expr::Literal(Literal::Int(LitInt {
                value: -num.value,
                span,
            })),
            Expr::Literal(Literal::Float(num)) => Expr::Literal(Literal::Float(LitFloat {
                value: -num.value,
                span,
            })),
            operand => Expr::Unary(Unary {
                op,
                arg: Box::new(operand),
                span,
            }),
        })
    }
}
