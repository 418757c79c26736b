//! LaTeX serialization of expressions.
//!
//! Rendering is the inverse of parsing for trees without redundant grouping: parentheses are
//! inserted exactly when a child binds looser than its parent, or equally tight when the child
//! is the right operand of a non-commutative operator (`-`, `/`). Literal fraction leaves render
//! as `\frac{..}{..}`; quotients of subexpressions render with an infix `/`, so each fraction
//! encoding reads back as itself.

use std::fmt::{Display, Formatter, Result};
use super::{Binary, FracPart, MathExpr};

/// The precedence of unary negation. Binds tighter than any binary operator.
const NEG_PRECEDENCE: u8 = 3;

/// A trait for types that can be formatted as LaTeX.
pub trait Latex {
    /// Format the value as LaTeX.
    fn fmt_latex(&self, f: &mut Formatter) -> Result;

    /// Wraps the value in a [`LatexFormatter`], which implements [`Display`].
    fn as_display(&self) -> LatexFormatter<'_, Self> {
        LatexFormatter(self)
    }
}

/// A wrapper type that implements [`Display`] for any type that implements [`Latex`].
pub struct LatexFormatter<'a, T: ?Sized>(&'a T);

impl<T: ?Sized> Display for LatexFormatter<'_, T>
where
    T: Latex,
{
    fn fmt(&self, f: &mut Formatter) -> Result {
        self.0.fmt_latex(f)
    }
}

/// Serializes the expression to its LaTeX form.
pub fn to_latex(expr: &MathExpr) -> String {
    expr.as_display().to_string()
}

impl Latex for FracPart {
    fn fmt_latex(&self, f: &mut Formatter) -> Result {
        match self {
            Self::Int(value) => write!(f, "{}", value),
            Self::Sym(name) => write!(f, "{}", name),
        }
    }
}

impl Latex for MathExpr {
    fn fmt_latex(&self, f: &mut Formatter) -> Result {
        match self {
            Self::Integer(value) => write!(f, "{}", value),
            Self::Float(value) => {
                // keep the decimal point so the literal reads back as a decimal
                if value.fract() == 0.0 {
                    write!(f, "{:.1}", value)
                } else {
                    write!(f, "{}", value)
                }
            },
            Self::Symbol(name) => write!(f, "{}", name),
            Self::Frac(frac) => {
                write!(f, "\\frac{{")?;
                frac.numerator.fmt_latex(f)?;
                write!(f, "}}{{")?;
                frac.denominator.fmt_latex(f)?;
                write!(f, "}}")
            },
            Self::Mixed(mixed) => {
                write!(f, "{} {}/{}", mixed.whole, mixed.numerator, mixed.denominator)
            },
            Self::Unary(unary) => {
                write!(f, "-")?;
                if precedence_of(&unary.arg).is_some_and(|prec| prec < NEG_PRECEDENCE) {
                    write!(f, "(")?;
                    unary.arg.fmt_latex(f)?;
                    write!(f, ")")
                } else {
                    unary.arg.fmt_latex(f)
                }
            },
            Self::Binary(binary) => {
                fmt_child(f, binary, &binary.lhs, false)?;
                write!(f, "{}", binary.op.symbol())?;
                fmt_child(f, binary, &binary.rhs, true)
            },
        }
    }
}

/// Formats one operand of a binary node, parenthesizing it when required.
fn fmt_child(f: &mut Formatter, parent: &Binary, child: &MathExpr, is_rhs: bool) -> Result {
    if needs_parens(parent, child, is_rhs) {
        write!(f, "(")?;
        child.fmt_latex(f)?;
        write!(f, ")")
    } else {
        child.fmt_latex(f)
    }
}

/// A child needs parentheses when it binds looser than its parent, or equally tight while being
/// the right operand of a non-commutative operator.
fn needs_parens(parent: &Binary, child: &MathExpr, is_rhs: bool) -> bool {
    let Some(child_prec) = precedence_of(child) else {
        return false;
    };
    let parent_prec = parent.op.precedence();
    child_prec < parent_prec
        || (child_prec == parent_prec && is_rhs && !parent.op.is_commutative())
}

/// Returns the precedence of the expression's top-level operator, or [`None`] for atoms. Literal
/// fractions and mixed numbers count as atoms; they render as a single unit.
fn precedence_of(expr: &MathExpr) -> Option<u8> {
    match expr {
        MathExpr::Binary(binary) => Some(binary.op.precedence()),
        MathExpr::Unary(_) => Some(NEG_PRECEDENCE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;
    use crate::expr::parse_latex;

    /// Serializing and reparsing must reproduce a structurally equal tree.
    fn assert_round_trip(source: &str) {
        let parsed = parse_latex(source).unwrap();
        let rendered = to_latex(&parsed);
        let reparsed = parse_latex(&rendered)
            .unwrap_or_else(|err| panic!("`{}` did not reparse: {}", rendered, err));
        assert_eq!(parsed, reparsed, "`{}` -> `{}` changed structure", source, rendered);
    }

    #[test]
    fn renders_literal_fraction_as_frac() {
        let expr = parse_latex(r"\frac{4}{7}").unwrap();
        assert_eq!(to_latex(&expr), r"\frac{4}{7}");
    }

    #[test]
    fn renders_quotient_with_slash() {
        let expr = parse_latex(r"\frac{1+2}{3}").unwrap();
        assert_eq!(to_latex(&expr), "(1+2)/3");
    }

    #[test]
    fn renders_mixed_number_with_single_space() {
        let expr = parse_latex("1 2/3").unwrap();
        assert_eq!(to_latex(&expr), "1 2/3");
    }

    #[test]
    fn parenthesizes_loose_children() {
        let expr = parse_latex("(1 + 2) * 3").unwrap();
        assert_eq!(to_latex(&expr), "(1+2)*3");
    }

    #[test]
    fn parenthesizes_right_operand_of_noncommutative_ops() {
        let expr = parse_latex("1 - (2 - 3)").unwrap();
        assert_eq!(to_latex(&expr), "1-(2-3)");

        let expr = parse_latex("6 / (2 * 3)").unwrap();
        assert_eq!(to_latex(&expr), "6/(2*3)");
    }

    #[test]
    fn keeps_left_associative_chains_flat() {
        let expr = parse_latex("1 - 2 + 3").unwrap();
        assert_eq!(to_latex(&expr), "1-2+3");
    }

    #[test]
    fn round_trips() {
        for source in [
            "16",
            "-3",
            "3.14",
            "x",
            r"\frac{1}{7}",
            r"\frac{-1}{7}",
            r"\frac{x}{7}",
            "1/7+3/7",
            "5/7-2/7",
            "1 2/3",
            "1 2/3+4",
            "1+2*3",
            "(1+2)*3",
            "6/(2*3)",
            "1-(2-3)",
            "-(1+2)",
            "2.0+1",
            r"\frac{1+2}{3}",
            "8/2/2",
        ] {
            assert_round_trip(source);
        }
    }
}
