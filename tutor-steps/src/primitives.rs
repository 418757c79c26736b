//! Implementation of the atomic rewrite primitives referenced by invariant rules.
//!
//! Each primitive in this module is a function that takes the expression to rewrite as an
//! argument, and returns `Some(expr)` with the rewritten expression if the primitive applies, or
//! `None` if it does not. Primitives only ever look at the node they are handed; walking the
//! tree to find an applicable node is the engine's job.
//!
//! All arithmetic is checked: a rewrite that would overflow simply does not apply.

use crate::expr::{BinOp, Binary, Frac, FracPart, MathExpr};

/// An atomic rewrite, addressable by id.
pub struct Primitive {
    /// The id of the primitive, as referenced by invariant rules.
    pub id: &'static str,

    /// The rewrite function itself.
    pub apply: fn(&MathExpr) -> Option<MathExpr>,
}

/// Every primitive known to the in-process engine.
pub const PRIMITIVES: &[Primitive] = &[
    Primitive { id: "fraction.add-same-den", apply: add_same_denominator },
    Primitive { id: "fraction.sub-same-den", apply: sub_same_denominator },
    Primitive { id: "fraction.common-den", apply: common_denominator },
    Primitive { id: "fraction.reduce", apply: reduce_fraction },
    Primitive { id: "integer.add", apply: add_integers },
    Primitive { id: "integer.sub", apply: sub_integers },
    Primitive { id: "integer.mul", apply: mul_integers },
    Primitive { id: "integer.to-fraction", apply: integer_to_fraction },
    Primitive { id: "mixed.to-improper", apply: mixed_to_improper },
];

/// Looks up a primitive by id.
pub fn lookup(id: &str) -> Option<&'static Primitive> {
    PRIMITIVES.iter().find(|primitive| primitive.id == id)
}

/// Extracts the integer numerator and denominator of a fraction-valued expression. Mixed numbers
/// extract as their improper value, so `1 2/3` contributes `5/3`.
fn int_fraction_parts(expr: &MathExpr) -> Option<(i64, i64)> {
    match expr {
        MathExpr::Frac(frac) => match (&frac.numerator, &frac.denominator) {
            (FracPart::Int(num), FracPart::Int(den)) => Some((*num, *den)),
            _ => None,
        },
        MathExpr::Binary(binary) if binary.op == BinOp::Div => {
            match (binary.lhs.as_integer(), binary.rhs.as_integer()) {
                (Some(num), Some(den)) => Some((num, den)),
                _ => None,
            }
        },
        MathExpr::Mixed(mixed) => {
            let num = mixed.whole.checked_mul(mixed.denominator)?.checked_add(mixed.numerator)?;
            Some((num, mixed.denominator))
        },
        _ => None,
    }
}

/// Creates a literal fraction with the given numerator and denominator. A denominator of one
/// collapses to the plain integer.
fn make_fraction(numerator: i64, denominator: i64) -> MathExpr {
    if denominator == 1 {
        MathExpr::Integer(numerator)
    } else {
        MathExpr::Frac(Frac {
            numerator: FracPart::Int(numerator),
            denominator: FracPart::Int(denominator),
        })
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// `a/d + b/d = (a+b)/d`
pub fn add_same_denominator(expr: &MathExpr) -> Option<MathExpr> {
    let MathExpr::Binary(binary) = expr else { return None };
    if binary.op != BinOp::Add {
        return None;
    }

    let (lhs_num, lhs_den) = int_fraction_parts(&binary.lhs)?;
    let (rhs_num, rhs_den) = int_fraction_parts(&binary.rhs)?;
    if lhs_den != rhs_den || lhs_den == 0 {
        return None;
    }

    Some(make_fraction(lhs_num.checked_add(rhs_num)?, lhs_den))
}

/// `a/d - b/d = (a-b)/d`
pub fn sub_same_denominator(expr: &MathExpr) -> Option<MathExpr> {
    let MathExpr::Binary(binary) = expr else { return None };
    if binary.op != BinOp::Sub {
        return None;
    }

    let (lhs_num, lhs_den) = int_fraction_parts(&binary.lhs)?;
    let (rhs_num, rhs_den) = int_fraction_parts(&binary.rhs)?;
    if lhs_den != rhs_den || lhs_den == 0 {
        return None;
    }

    Some(make_fraction(lhs_num.checked_sub(rhs_num)?, lhs_den))
}

/// `a/b ± c/d = ad/bd ± cb/db` for `b ≠ d`, scaling both sides to one shared denominator.
pub fn common_denominator(expr: &MathExpr) -> Option<MathExpr> {
    let MathExpr::Binary(binary) = expr else { return None };
    if !matches!(binary.op, BinOp::Add | BinOp::Sub) {
        return None;
    }

    let (lhs_num, lhs_den) = int_fraction_parts(&binary.lhs)?;
    let (rhs_num, rhs_den) = int_fraction_parts(&binary.rhs)?;
    if lhs_den == rhs_den || lhs_den == 0 || rhs_den == 0 {
        return None;
    }

    let shared = lhs_den.checked_mul(rhs_den)?;
    Some(MathExpr::Binary(Binary {
        op: binary.op,
        lhs: Box::new(make_fraction(lhs_num.checked_mul(rhs_den)?, shared)),
        rhs: Box::new(make_fraction(rhs_num.checked_mul(lhs_den)?, shared)),
    }))
}

/// `6/8 = 3/4`, dividing numerator and denominator by their greatest common divisor.
pub fn reduce_fraction(expr: &MathExpr) -> Option<MathExpr> {
    // applies to both fraction encodings, but never to mixed numbers
    let (num, den) = match expr {
        MathExpr::Frac(_) => int_fraction_parts(expr)?,
        MathExpr::Binary(binary) if binary.op == BinOp::Div => int_fraction_parts(expr)?,
        _ => return None,
    };
    if den == 0 {
        return None;
    }

    let divisor = gcd(num, den);
    if divisor <= 1 {
        return None;
    }

    Some(make_fraction(num / divisor, den / divisor))
}

/// `3 + 5 = 8`
pub fn add_integers(expr: &MathExpr) -> Option<MathExpr> {
    let MathExpr::Binary(binary) = expr else { return None };
    if binary.op != BinOp::Add {
        return None;
    }
    let sum = binary.lhs.as_integer()?.checked_add(binary.rhs.as_integer()?)?;
    Some(MathExpr::Integer(sum))
}

/// `8 - 5 = 3`
pub fn sub_integers(expr: &MathExpr) -> Option<MathExpr> {
    let MathExpr::Binary(binary) = expr else { return None };
    if binary.op != BinOp::Sub {
        return None;
    }
    let difference = binary.lhs.as_integer()?.checked_sub(binary.rhs.as_integer()?)?;
    Some(MathExpr::Integer(difference))
}

/// `3 * 5 = 15`
pub fn mul_integers(expr: &MathExpr) -> Option<MathExpr> {
    let MathExpr::Binary(binary) = expr else { return None };
    if binary.op != BinOp::Mul {
        return None;
    }
    let product = binary.lhs.as_integer()?.checked_mul(binary.rhs.as_integer()?)?;
    Some(MathExpr::Integer(product))
}

/// `4 = 4/1`
pub fn integer_to_fraction(expr: &MathExpr) -> Option<MathExpr> {
    let value = expr.as_integer()?;
    // built directly: the denominator of one is the point of the rewrite
    Some(MathExpr::Frac(Frac {
        numerator: FracPart::Int(value),
        denominator: FracPart::Int(1),
    }))
}

/// `1 2/3 = 5/3`
pub fn mixed_to_improper(expr: &MathExpr) -> Option<MathExpr> {
    let MathExpr::Mixed(mixed) = expr else { return None };
    let num = mixed.whole.checked_mul(mixed.denominator)?.checked_add(mixed.numerator)?;
    if mixed.denominator == 0 {
        return None;
    }
    Some(make_fraction(num, mixed.denominator))
}

/// Returns true when no teaching step is left: the expression is a single literal, a reduced
/// proper fraction, or a reduced mixed number.
pub fn is_fully_simplified(expr: &MathExpr) -> bool {
    match expr {
        MathExpr::Integer(_) | MathExpr::Float(_) | MathExpr::Symbol(_) => true,
        MathExpr::Frac(frac) => match (&frac.numerator, &frac.denominator) {
            (FracPart::Int(num), FracPart::Int(den)) => {
                *den > 1 && gcd(*num, *den) <= 1
            },
            // symbolic parts have nothing further to compute
            _ => true,
        },
        MathExpr::Mixed(mixed) => {
            mixed.denominator > 1
                && mixed.numerator > 0
                && mixed.numerator < mixed.denominator
                && gcd(mixed.numerator, mixed.denominator) <= 1
        },
        MathExpr::Binary(_) | MathExpr::Unary(_) => false,
    }
}
