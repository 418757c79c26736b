//! Path-addressed reads and writes over expression trees, plus the operator-index view used by
//! click selection.
//!
//! Two addressing conventions coexist and are kept consistent here:
//!
//! 1. **Paths** ([`AstPath`]) descend the tree structurally. The parts of a [`Frac`] or
//!    [`Mixed`](super::Mixed) leaf resolve to *synthesized* literal nodes, since the leaves store
//!    bare values rather than child nodes. The `num` / `den` segments do **not** resolve into a
//!    division [`Binary`](super::Binary) node: the path scheme does not address compound
//!    numerators or denominators, and `term[0]` / `term[1]` must be used instead.
//! 2. **Operator indices** number the "operator" nodes of the tree in left-to-right reading
//!    order: binary nodes in in-order position (left operand first, then the node, then the
//!    right operand), and fraction / mixed-number leaves as atomic operators of their own.
//!    Plain integers, decimals and variables are never counted, and unary nodes are transparent.
//!    [`find_nth_operator`] and [`get_node_by_operator_index`] walk the tree independently and
//!    must agree on node identity and order for every index.

use super::{
    path::{AstPath, PathSeg},
    Binary, Frac, FracPart, MathExpr, Mixed, Unary,
};
use thiserror::Error;

/// An error produced while resolving or rewriting a path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    /// The segment does not apply to the node it reached.
    #[error("path segment `{segment}` cannot be applied to a {node} node")]
    SegmentMismatch {
        /// The segment that failed to resolve.
        segment: String,

        /// The kind of node the segment was applied to.
        node: &'static str,
    },

    /// A fraction or mixed-number part was about to be replaced with a compound expression.
    #[error("fraction parts addressed as `num`/`den`/`whole` must stay bare literals")]
    LiteralPartRequired,
}

/// Resolves the node addressed by the path. The root path resolves to the tree itself.
///
/// The returned node is detached from the tree; parts of [`Frac`] and [`Mixed`](super::Mixed)
/// leaves are wrapped in synthesized literal nodes.
pub fn get_node_at(expr: &MathExpr, path: &AstPath) -> Result<MathExpr, NavError> {
    descend(expr, path.segments())
}

fn descend(expr: &MathExpr, segments: &[PathSeg]) -> Result<MathExpr, NavError> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(expr.clone());
    };

    match (segment, expr) {
        (PathSeg::Term(0), MathExpr::Binary(binary)) => descend(&binary.lhs, rest),
        (PathSeg::Term(1), MathExpr::Binary(binary)) => descend(&binary.rhs, rest),
        (PathSeg::Num, MathExpr::Frac(frac)) => descend(&frac.numerator.to_expr(), rest),
        (PathSeg::Den, MathExpr::Frac(frac)) => descend(&frac.denominator.to_expr(), rest),
        (PathSeg::Whole, MathExpr::Mixed(mixed)) => {
            descend(&MathExpr::Integer(mixed.whole), rest)
        },
        (PathSeg::Num, MathExpr::Mixed(mixed)) => {
            descend(&MathExpr::Integer(mixed.numerator), rest)
        },
        (PathSeg::Den, MathExpr::Mixed(mixed)) => {
            descend(&MathExpr::Integer(mixed.denominator), rest)
        },
        (PathSeg::Arg, MathExpr::Unary(unary)) => descend(&unary.arg, rest),
        (segment, node) => Err(NavError::SegmentMismatch {
            segment: segment.to_string(),
            node: node.kind_name(),
        }),
    }
}

/// Returns a new tree with the node at the path replaced. The original tree is never modified;
/// the spine down to the replacement is rebuilt and every untouched sibling is reused as-is.
///
/// Replacing the part of a [`Frac`] or [`Mixed`](super::Mixed) leaf accepts exactly the bare
/// literals that can live there; any compound replacement fails with
/// [`NavError::LiteralPartRequired`].
pub fn replace_node_at(
    expr: &MathExpr,
    path: &AstPath,
    replacement: MathExpr,
) -> Result<MathExpr, NavError> {
    rebuild(expr, path.segments(), replacement)
}

fn rebuild(
    expr: &MathExpr,
    segments: &[PathSeg],
    replacement: MathExpr,
) -> Result<MathExpr, NavError> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(replacement);
    };

    match (segment, expr) {
        (PathSeg::Term(0), MathExpr::Binary(binary)) => Ok(MathExpr::Binary(Binary {
            op: binary.op,
            lhs: Box::new(rebuild(&binary.lhs, rest, replacement)?),
            rhs: binary.rhs.clone(),
        })),
        (PathSeg::Term(1), MathExpr::Binary(binary)) => Ok(MathExpr::Binary(Binary {
            op: binary.op,
            lhs: binary.lhs.clone(),
            rhs: Box::new(rebuild(&binary.rhs, rest, replacement)?),
        })),
        (PathSeg::Num, MathExpr::Frac(frac)) => {
            let part = rebuild(&frac.numerator.to_expr(), rest, replacement)?;
            Ok(MathExpr::Frac(Frac {
                numerator: FracPart::from_expr(&part).ok_or(NavError::LiteralPartRequired)?,
                denominator: frac.denominator.clone(),
            }))
        },
        (PathSeg::Den, MathExpr::Frac(frac)) => {
            let part = rebuild(&frac.denominator.to_expr(), rest, replacement)?;
            Ok(MathExpr::Frac(Frac {
                numerator: frac.numerator.clone(),
                denominator: FracPart::from_expr(&part).ok_or(NavError::LiteralPartRequired)?,
            }))
        },
        (PathSeg::Whole, MathExpr::Mixed(mixed)) => {
            let part = rebuild(&MathExpr::Integer(mixed.whole), rest, replacement)?;
            Ok(MathExpr::Mixed(Mixed {
                whole: part.as_integer().ok_or(NavError::LiteralPartRequired)?,
                ..*mixed
            }))
        },
        (PathSeg::Num, MathExpr::Mixed(mixed)) => {
            let part = rebuild(&MathExpr::Integer(mixed.numerator), rest, replacement)?;
            Ok(MathExpr::Mixed(Mixed {
                numerator: part.as_integer().ok_or(NavError::LiteralPartRequired)?,
                ..*mixed
            }))
        },
        (PathSeg::Den, MathExpr::Mixed(mixed)) => {
            let part = rebuild(&MathExpr::Integer(mixed.denominator), rest, replacement)?;
            Ok(MathExpr::Mixed(Mixed {
                denominator: part.as_integer().ok_or(NavError::LiteralPartRequired)?,
                ..*mixed
            }))
        },
        (PathSeg::Arg, MathExpr::Unary(unary)) => Ok(MathExpr::Unary(Unary {
            op: unary.op,
            arg: Box::new(rebuild(&unary.arg, rest, replacement)?),
        })),
        (segment, node) => Err(NavError::SegmentMismatch {
            segment: segment.to_string(),
            node: node.kind_name(),
        }),
    }
}

/// Finds the `index`-th operator node in reading order, returning the node together with the
/// path that addresses it. Returns [`None`] when fewer operators exist.
pub fn find_nth_operator(expr: &MathExpr, index: usize) -> Option<(MathExpr, AstPath)> {
    let mut counter = 0;
    let mut prefix = Vec::new();
    locate(expr, index, &mut counter, &mut prefix)
}

fn locate(
    expr: &MathExpr,
    target: usize,
    counter: &mut usize,
    prefix: &mut Vec<PathSeg>,
) -> Option<(MathExpr, AstPath)> {
    match expr {
        MathExpr::Binary(binary) => {
            prefix.push(PathSeg::Term(0));
            if let Some(found) = locate(&binary.lhs, target, counter, prefix) {
                return Some(found);
            }
            prefix.pop();

            if *counter == target {
                return Some((expr.clone(), AstPath::from(prefix.clone())));
            }
            *counter += 1;

            prefix.push(PathSeg::Term(1));
            let found = locate(&binary.rhs, target, counter, prefix);
            prefix.pop();
            found
        },
        MathExpr::Frac(_) | MathExpr::Mixed(_) => {
            if *counter == target {
                return Some((expr.clone(), AstPath::from(prefix.clone())));
            }
            *counter += 1;
            None
        },
        MathExpr::Unary(unary) => {
            prefix.push(PathSeg::Arg);
            let found = locate(&unary.arg, target, counter, prefix);
            prefix.pop();
            found
        },
        _ => None,
    }
}

/// Returns the `index`-th operator node in reading order.
///
/// This is a second, path-free walk over the same numbering; the navigation tests hold it and
/// [`find_nth_operator`] to identical answers.
pub fn get_node_by_operator_index(expr: &MathExpr, index: usize) -> Option<MathExpr> {
    fn walk(expr: &MathExpr, target: usize, counter: &mut usize) -> Option<MathExpr> {
        match expr {
            MathExpr::Binary(binary) => {
                if let Some(found) = walk(&binary.lhs, target, counter) {
                    return Some(found);
                }
                if *counter == target {
                    return Some(expr.clone());
                }
                *counter += 1;
                walk(&binary.rhs, target, counter)
            },
            MathExpr::Frac(_) | MathExpr::Mixed(_) => {
                if *counter == target {
                    return Some(expr.clone());
                }
                *counter += 1;
                None
            },
            MathExpr::Unary(unary) => walk(&unary.arg, target, counter),
            _ => None,
        }
    }

    let mut counter = 0;
    walk(expr, index, &mut counter)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;
    use crate::expr::parse_latex;

    fn path(raw: &str) -> AstPath {
        raw.parse().unwrap()
    }

    #[test]
    fn resolves_root_and_operands() {
        let expr = parse_latex("1/7 + 3/7").unwrap();
        assert_eq!(get_node_at(&expr, &path("root")).unwrap(), expr);
        assert_eq!(
            get_node_at(&expr, &path("term[0].term[0]")).unwrap(),
            MathExpr::Integer(1),
        );
        assert_eq!(
            get_node_at(&expr, &path("term[1].term[1]")).unwrap(),
            MathExpr::Integer(7),
        );
    }

    #[test]
    fn fraction_parts_resolve_to_synthesized_leaves() {
        let expr = parse_latex(r"\frac{1}{7}").unwrap();
        assert_eq!(get_node_at(&expr, &path("num")).unwrap(), MathExpr::Integer(1));
        assert_eq!(get_node_at(&expr, &path("den")).unwrap(), MathExpr::Integer(7));

        let expr = parse_latex("1 2/3").unwrap();
        assert_eq!(get_node_at(&expr, &path("whole")).unwrap(), MathExpr::Integer(1));
        assert_eq!(get_node_at(&expr, &path("num")).unwrap(), MathExpr::Integer(2));
        assert_eq!(get_node_at(&expr, &path("den")).unwrap(), MathExpr::Integer(3));
    }

    #[test]
    fn num_does_not_resolve_into_a_quotient() {
        // `1/7` is a division node; its operands are addressed as terms, not fraction parts
        let expr = parse_latex("1/7").unwrap();
        let err = get_node_at(&expr, &path("num")).unwrap_err();
        assert_eq!(err, NavError::SegmentMismatch {
            segment: "num".to_string(),
            node: "binary operation",
        });
    }

    #[test]
    fn replace_rebuilds_only_the_spine() {
        let expr = parse_latex("1/7 + 3/7").unwrap();
        let replaced = replace_node_at(&expr, &path("term[0].term[0]"), MathExpr::Integer(2)).unwrap();
        assert_eq!(replaced, parse_latex("2/7 + 3/7").unwrap());
        // the original is untouched
        assert_eq!(expr, parse_latex("1/7 + 3/7").unwrap());
    }

    #[test]
    fn replace_fraction_part_with_literal() {
        let expr = parse_latex(r"\frac{1}{7}").unwrap();
        let replaced = replace_node_at(&expr, &path("num"), MathExpr::Integer(4)).unwrap();
        assert_eq!(replaced, parse_latex(r"\frac{4}{7}").unwrap());
    }

    #[test]
    fn replace_fraction_part_rejects_compound_expressions() {
        let expr = parse_latex(r"\frac{1}{7}").unwrap();
        let compound = parse_latex("1+2").unwrap();
        let err = replace_node_at(&expr, &path("num"), compound).unwrap_err();
        assert_eq!(err, NavError::LiteralPartRequired);
    }

    #[test]
    fn read_back_replace_is_identity() {
        let expr = parse_latex(r"1 2/3 + \frac{1}{7} * 2").unwrap();
        for raw in ["root", "term[0]", "term[1]", "term[1].term[0]", "term[0].whole", "term[1].term[0].den"] {
            let at = path(raw);
            let node = get_node_at(&expr, &at).unwrap();
            let rebuilt = replace_node_at(&expr, &at, node).unwrap();
            assert_eq!(rebuilt, expr, "replacing at `{}` changed the tree", raw);
        }
    }

    #[test]
    fn operator_indices_count_in_reading_order() {
        // operators of `1/7 + 3/7` in reading order: the left quotient, the sum, the right
        // quotient
        let expr = parse_latex("1/7 + 3/7").unwrap();

        let (node, at) = find_nth_operator(&expr, 0).unwrap();
        assert_eq!(node, parse_latex("1/7").unwrap());
        assert_eq!(at, path("term[0]"));

        let (node, at) = find_nth_operator(&expr, 1).unwrap();
        assert_eq!(node, expr);
        assert_eq!(at, path("root"));

        let (node, at) = find_nth_operator(&expr, 2).unwrap();
        assert_eq!(node, parse_latex("3/7").unwrap());
        assert_eq!(at, path("term[1]"));

        assert_eq!(find_nth_operator(&expr, 3), None);
    }

    #[test]
    fn fraction_leaves_count_as_atomic_operators() {
        let expr = parse_latex(r"1 2/3 + \frac{1}{7}").unwrap();
        assert_eq!(
            get_node_by_operator_index(&expr, 0),
            Some(parse_latex("1 2/3").unwrap()),
        );
        assert_eq!(get_node_by_operator_index(&expr, 1), Some(expr.clone()));
        assert_eq!(
            get_node_by_operator_index(&expr, 2),
            Some(parse_latex(r"\frac{1}{7}").unwrap()),
        );
        // plain literals are never counted
        let expr = parse_latex("3 + 5").unwrap();
        assert_eq!(get_node_by_operator_index(&expr, 0), Some(expr.clone()));
        assert_eq!(get_node_by_operator_index(&expr, 1), None);
    }

    #[test]
    fn both_operator_walks_agree() {
        for source in [
            "1/7 + 3/7",
            r"1 2/3 + \frac{1}{7} * 2",
            "1 + 2 * 3 - 4",
            "-(1 + 2) * 3",
            "8/2/2",
            "42",
        ] {
            let expr = parse_latex(source).unwrap();
            for index in 0..8 {
                let by_path = find_nth_operator(&expr, index);
                let by_index = get_node_by_operator_index(&expr, index);
                assert_eq!(
                    by_path.as_ref().map(|(node, _)| node),
                    by_index.as_ref(),
                    "walks disagree on `{}` at index {}",
                    source,
                    index,
                );

                // the path returned by the locating walk resolves to the same node
                if let Some((node, at)) = by_path {
                    assert_eq!(get_node_at(&expr, &at).unwrap(), node);
                }
            }
        }
    }
}
