//! A span-less representation of expressions for navigation and rewriting.
//!
//! The [`Expr`](tutor_parser::parser::ast::Expr) type produced by [`tutor_parser`] is convenient
//! for parsing, but carries source spans and explicit parenthesis nodes that only matter for
//! error reporting. This module defines a separate [`MathExpr`] tree that drops both, and
//! normalizes the shape of the expression while converting:
//!
//! - parenthesized groups are unwrapped (grouping is implied by the tree structure, and
//!   [`to_latex`](fmt::to_latex) re-inserts parentheses from operator precedence),
//! - a `\frac{..}{..}` whose arguments are both a bare integer or variable becomes a [`Frac`]
//!   leaf holding two [`FracPart`] literals, while any other fraction becomes a division
//!   [`Binary`] node over full subexpressions.
//!
//! The two fraction encodings deliberately coexist: `\frac{1}{7}` is a *literal fraction* a
//! student manipulates as a single value, while `(1+2)/3` is a *quotient* of subexpressions.
//! Code that navigates or rewrites the tree pattern-matches on which encoding it has; a
//! [`Frac`] leaf can never hold a compound subexpression.
//!
//! The derived [`PartialEq`] implements strict structural equality: same variant, same values,
//! same children. It is used to compare denominators during rule matching and to verify
//! round-trips in tests, and never falls back to comparing serialized text.

pub mod fmt;
pub mod navigate;
pub mod path;

use serde::Serialize;
use thiserror::Error;
use tutor_error::ErrorKind as _;
use tutor_parser::parser::{
    ast::{self, Literal},
    token::op::BinOpKind,
    Parser,
};

pub use fmt::{to_latex, Latex};

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    /// The symbol used to render the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    /// Returns the precedence of the operator. Higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
        }
    }

    /// Returns true if the operands of the operator can be swapped freely.
    pub fn is_commutative(&self) -> bool {
        matches!(self, Self::Add | Self::Mul)
    }
}

impl From<BinOpKind> for BinOp {
    fn from(kind: BinOpKind) -> Self {
        match kind {
            BinOpKind::Add => Self::Add,
            BinOpKind::Sub => Self::Sub,
            BinOpKind::Mul => Self::Mul,
            BinOpKind::Div => Self::Div,
        }
    }
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnaryOp {
    Neg,
}

/// One part of a literal fraction: a bare integer or a bare variable, never a compound
/// subexpression.
#[derive(Debug, Clone, PartialEq)]
pub enum FracPart {
    /// An integer part, such as the `1` and `7` of `\frac{1}{7}`.
    Int(i64),

    /// A variable part, such as the `x` of `\frac{x}{7}`.
    Sym(String),
}

impl FracPart {
    /// Wraps the part in a synthesized leaf node, so navigation can hand out fraction parts as
    /// ordinary expressions.
    pub fn to_expr(&self) -> MathExpr {
        match self {
            Self::Int(value) => MathExpr::Integer(*value),
            Self::Sym(name) => MathExpr::Symbol(name.clone()),
        }
    }

    /// The inverse of [`FracPart::to_expr`]: accepts exactly the bare leaves that can live inside
    /// a literal fraction.
    pub fn from_expr(expr: &MathExpr) -> Option<Self> {
        match expr {
            MathExpr::Integer(value) => Some(Self::Int(*value)),
            MathExpr::Symbol(name) => Some(Self::Sym(name.clone())),
            _ => None,
        }
    }
}

/// A literal fraction leaf, such as `\frac{1}{7}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frac {
    /// The numerator of the fraction.
    pub numerator: FracPart,

    /// The denominator of the fraction.
    pub denominator: FracPart,
}

/// A mixed number, such as `1 2/3`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mixed {
    /// The whole part of the mixed number.
    pub whole: i64,

    /// The numerator of the fractional part.
    pub numerator: i64,

    /// The denominator of the fractional part.
    pub denominator: i64,
}

/// A binary operation over two full subexpressions. With [`BinOp::Div`], this is the second
/// fraction encoding: a quotient whose operands may be arbitrary expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    /// The operator of the binary operation.
    pub op: BinOp,

    /// The left-hand side of the binary operation.
    pub lhs: Box<MathExpr>,

    /// The right-hand side of the binary operation.
    pub rhs: Box<MathExpr>,
}

/// A unary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    /// The operator of the unary operation.
    pub op: UnaryOp,

    /// The operand of the unary operation.
    pub arg: Box<MathExpr>,
}

/// A mathematical expression, normalized for navigation and rewriting.
///
/// See the [module-level documentation](self) for how this differs from the parse tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MathExpr {
    /// An integer literal, such as `3` or `-12`.
    Integer(i64),

    /// A decimal literal, such as `3.14`.
    Float(f64),

    /// A bare variable, such as `x`.
    Symbol(String),

    /// A literal fraction leaf, such as `\frac{1}{7}`.
    Frac(Frac),

    /// A mixed number, such as `1 2/3`.
    Mixed(Mixed),

    /// A binary operation, such as `1 + 2` or the quotient `(1+2)/3`.
    Binary(Binary),

    /// A unary operation, such as `-(1 + 2)`.
    Unary(Unary),
}

impl MathExpr {
    /// A short human-readable name for the node variant, used in navigation errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "decimal",
            Self::Symbol(_) => "variable",
            Self::Frac(_) => "fraction",
            Self::Mixed(_) => "mixed number",
            Self::Binary(_) => "binary operation",
            Self::Unary(_) => "unary operation",
        }
    }

    /// If the expression is an integer literal, returns its value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns true if the expression is an integer literal. Decimals are **not** integers, even
    /// when their fractional part is zero; they parse from different tokens and stay distinct.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer(_))
    }

    /// Returns true if the expression carries a denominator: a literal fraction, a mixed number,
    /// or a quotient of subexpressions.
    pub fn is_fraction_like(&self) -> bool {
        match self {
            Self::Frac(_) | Self::Mixed(_) => true,
            Self::Binary(binary) => binary.op == BinOp::Div,
            _ => false,
        }
    }

    /// Returns the denominator of a fraction-like expression as a node of its own.
    pub fn denominator(&self) -> Option<MathExpr> {
        match self {
            Self::Frac(frac) => Some(frac.denominator.to_expr()),
            Self::Mixed(mixed) => Some(MathExpr::Integer(mixed.denominator)),
            Self::Binary(binary) if binary.op == BinOp::Div => Some((*binary.rhs).clone()),
            _ => None,
        }
    }
}

impl From<ast::Expr> for MathExpr {
    fn from(expr: ast::Expr) -> Self {
        match expr {
            ast::Expr::Literal(Literal::Int(num)) => Self::Integer(num.value),
            ast::Expr::Literal(Literal::Float(num)) => Self::Float(num.value),
            ast::Expr::Literal(Literal::Sym(sym)) => Self::Symbol(sym.name),
            ast::Expr::Paren(paren) => (*paren.expr).into(),
            ast::Expr::Frac(frac) => lower_frac(*frac.numerator, *frac.denominator),
            ast::Expr::Mixed(mixed) => Self::Mixed(Mixed {
                whole: mixed.whole,
                numerator: mixed.numerator,
                denominator: mixed.denominator,
            }),
            ast::Expr::Unary(unary) => Self::Unary(Unary {
                op: UnaryOp::Neg,
                arg: Box::new((*unary.arg).into()),
            }),
            ast::Expr::Binary(binary) => Self::Binary(Binary {
                op: binary.op.kind.into(),
                lhs: Box::new((*binary.lhs).into()),
                rhs: Box::new((*binary.rhs).into()),
            }),
        }
    }
}

/// Lowers a parsed `\frac{..}{..}` into the matching fraction encoding: a [`Frac`] leaf when
/// both arguments are bare literals, a division [`Binary`] otherwise.
fn lower_frac(numerator: ast::Expr, denominator: ast::Expr) -> MathExpr {
    match (frac_atom(&numerator), frac_atom(&denominator)) {
        (Some(num), Some(den)) => MathExpr::Frac(Frac {
            numerator: num,
            denominator: den,
        }),
        _ => MathExpr::Binary(Binary {
            op: BinOp::Div,
            lhs: Box::new(numerator.into()),
            rhs: Box::new(denominator.into()),
        }),
    }
}

/// Extracts the bare literal a fraction argument reduces to, if any.
fn frac_atom(expr: &ast::Expr) -> Option<FracPart> {
    match expr {
        ast::Expr::Literal(Literal::Int(num)) => Some(FracPart::Int(num.value)),
        ast::Expr::Literal(Literal::Sym(sym)) => Some(FracPart::Sym(sym.name.clone())),
        _ => None,
    }
}

/// A structured parse failure: the one-line reason and the byte offset it points at.
///
/// This is the only shape in which parse problems leave the expression layer; the parser's
/// span-and-report machinery never crosses into matching or orchestration.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{message} (at offset {position})")]
pub struct ParseFailed {
    /// The human-readable reason the parse failed.
    pub message: String,

    /// The byte offset into the source where the failure begins.
    pub position: usize,
}

/// Parses an expression into its normalized [`MathExpr`] form.
pub fn parse_latex(source: &str) -> Result<MathExpr, ParseFailed> {
    let mut parser = Parser::new(source);
    match parser.try_parse_full::<ast::Expr>() {
        Ok(expr) => Ok(expr.into()),
        Err(err) => Err(ParseFailed {
            message: err.kind.message(),
            position: err.position(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn parens_unwrap_during_lowering() {
        let expr = parse_latex("(1 + 2) * 3").unwrap();
        assert_eq!(expr, MathExpr::Binary(Binary {
            op: BinOp::Mul,
            lhs: Box::new(MathExpr::Binary(Binary {
                op: BinOp::Add,
                lhs: Box::new(MathExpr::Integer(1)),
                rhs: Box::new(MathExpr::Integer(2)),
            })),
            rhs: Box::new(MathExpr::Integer(3)),
        }));
    }

    #[test]
    fn literal_fraction_becomes_a_leaf() {
        let expr = parse_latex(r"\frac{1}{7}").unwrap();
        assert_eq!(expr, MathExpr::Frac(Frac {
            numerator: FracPart::Int(1),
            denominator: FracPart::Int(7),
        }));
    }

    #[test]
    fn symbolic_fraction_becomes_a_leaf() {
        let expr = parse_latex(r"\frac{x}{7}").unwrap();
        assert_eq!(expr, MathExpr::Frac(Frac {
            numerator: FracPart::Sym("x".to_string()),
            denominator: FracPart::Int(7),
        }));
    }

    #[test]
    fn compound_fraction_becomes_a_quotient() {
        let expr = parse_latex(r"\frac{1+2}{3}").unwrap();
        assert_eq!(expr, MathExpr::Binary(Binary {
            op: BinOp::Div,
            lhs: Box::new(MathExpr::Binary(Binary {
                op: BinOp::Add,
                lhs: Box::new(MathExpr::Integer(1)),
                rhs: Box::new(MathExpr::Integer(2)),
            })),
            rhs: Box::new(MathExpr::Integer(3)),
        }));
    }

    #[test]
    fn slash_fraction_is_a_quotient() {
        let expr = parse_latex("1/7").unwrap();
        assert_eq!(expr, MathExpr::Binary(Binary {
            op: BinOp::Div,
            lhs: Box::new(MathExpr::Integer(1)),
            rhs: Box::new(MathExpr::Integer(7)),
        }));
    }

    #[test]
    fn mixed_number_lowering() {
        let expr = parse_latex("1 2/3").unwrap();
        assert_eq!(expr, MathExpr::Mixed(Mixed {
            whole: 1,
            numerator: 2,
            denominator: 3,
        }));
    }

    #[test]
    fn denominators_compare_structurally_across_encodings() {
        // a literal fraction and a quotient with the same denominator agree
        let leaf = parse_latex(r"\frac{1}{7}").unwrap();
        let quotient = parse_latex("3/7").unwrap();
        assert_eq!(leaf.denominator(), quotient.denominator());

        let other = parse_latex("2/5").unwrap();
        assert_ne!(leaf.denominator(), other.denominator());
    }

    #[test]
    fn parse_failure_is_structured() {
        let err = parse_latex("1 +").unwrap_err();
        assert_eq!(err.position, 3);
        assert!(!err.message.is_empty());
    }
}
