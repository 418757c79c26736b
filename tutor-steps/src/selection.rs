//! Turns the heterogeneous selection data of an interaction into one canonical anchor.
//!
//! A click on the rendered formula can arrive with up to three descriptions of the same spot: an
//! explicit tree path, the index of the clicked operator, and a fallback path from an alternate
//! selection channel. The sources are tried in that strict priority order; the first one that
//! validates against the current tree wins, and invalid paths or out-of-range indices simply
//! fall through to the next source.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::expr::{
    navigate::{find_nth_operator, get_node_at},
    path::AstPath,
    MathExpr,
};

/// The raw selection data carried by an interaction. All sources are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionInput {
    /// An explicit tree path from the current interaction.
    pub path: Option<String>,

    /// The index of the clicked operator, in reading order.
    pub operator_index: Option<i64>,

    /// A path from an alternate selection channel, used when the primary sources fail.
    pub fallback_path: Option<String>,
}

/// How the anchored node relates to the expression: an operator that combines two operands, or
/// an operand itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorKind {
    Operator,
    Operand,
}

/// The selection source that produced an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionSource {
    ExplicitPath,
    OperatorIndex,
    FallbackPath,
}

impl fmt::Display for SelectionSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::ExplicitPath => "explicit-path",
            Self::OperatorIndex => "operator-index",
            Self::FallbackPath => "fallback-path",
        };
        write!(f, "{}", name)
    }
}

/// The canonical anchor a selection resolves to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    /// The path of the anchored node.
    pub path: AstPath,

    /// Whether the anchored node is an operator or an operand.
    pub kind: AnchorKind,

    /// The selection source that produced the anchor.
    pub trace: SelectionSource,
}

/// Resolves the selection against the current tree. Returns [`None`] only when every source is
/// absent or invalid.
pub fn normalize_selection(expr: &MathExpr, input: &SelectionInput) -> Option<Anchor> {
    if let Some(raw) = input.path.as_deref() {
        if let Some(anchor) = resolve_path(expr, raw, SelectionSource::ExplicitPath) {
            return Some(anchor);
        }
    }

    if let Some(index) = input.operator_index {
        if index >= 0 {
            if let Some((node, path)) = find_nth_operator(expr, index as usize) {
                return Some(Anchor {
                    kind: anchor_kind(&node),
                    path,
                    trace: SelectionSource::OperatorIndex,
                });
            }
        }
    }

    if let Some(raw) = input.fallback_path.as_deref() {
        if let Some(anchor) = resolve_path(expr, raw, SelectionSource::FallbackPath) {
            return Some(anchor);
        }
    }

    None
}

/// Validates one path-shaped source: it must parse, and it must resolve against the tree.
fn resolve_path(expr: &MathExpr, raw: &str, trace: SelectionSource) -> Option<Anchor> {
    let path: AstPath = raw.parse().ok()?;
    let node = get_node_at(expr, &path).ok()?;
    Some(Anchor {
        kind: anchor_kind(&node),
        path,
        trace,
    })
}

fn anchor_kind(node: &MathExpr) -> AnchorKind {
    if matches!(node, MathExpr::Binary(_)) {
        AnchorKind::Operator
    } else {
        AnchorKind::Operand
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;
    use crate::expr::parse_latex;

    fn input(
        path: Option<&str>,
        operator_index: Option<i64>,
        fallback_path: Option<&str>,
    ) -> SelectionInput {
        SelectionInput {
            path: path.map(str::to_string),
            operator_index,
            fallback_path: fallback_path.map(str::to_string),
        }
    }

    #[test]
    fn explicit_path_wins_over_operator_index() {
        let expr = parse_latex("1/7 + 3/7").unwrap();
        let anchor = normalize_selection(&expr, &input(Some("term[0]"), Some(1), None)).unwrap();
        assert_eq!(anchor.trace, SelectionSource::ExplicitPath);
        assert_eq!(anchor.trace.to_string(), "explicit-path");
        assert_eq!(anchor.path, "term[0]".parse().unwrap());
        // the left operand is a quotient node, which is an operator anchor
        assert_eq!(anchor.kind, AnchorKind::Operator);
    }

    #[test]
    fn invalid_explicit_path_falls_back_to_operator_index() {
        let expr = parse_latex("1/7 + 3/7").unwrap();

        // an unparseable path
        let anchor = normalize_selection(&expr, &input(Some("term[5]"), Some(1), None)).unwrap();
        assert_eq!(anchor.trace, SelectionSource::OperatorIndex);
        assert_eq!(anchor.path, AstPath::root());

        // a well-formed path that does not resolve
        let anchor = normalize_selection(&expr, &input(Some("term[0].arg"), Some(1), None)).unwrap();
        assert_eq!(anchor.trace, SelectionSource::OperatorIndex);
    }

    #[test]
    fn operand_anchors_are_classified() {
        let expr = parse_latex("3 + 5").unwrap();
        let anchor = normalize_selection(&expr, &input(Some("term[0]"), None, None)).unwrap();
        assert_eq!(anchor.kind, AnchorKind::Operand);
        assert_eq!(anchor.trace, SelectionSource::ExplicitPath);
    }

    #[test]
    fn out_of_range_operator_index_uses_fallback_path() {
        let expr = parse_latex("1/7 + 3/7").unwrap();
        let anchor = normalize_selection(&expr, &input(None, Some(99), Some("term[1]"))).unwrap();
        assert_eq!(anchor.trace, SelectionSource::FallbackPath);
        assert_eq!(anchor.path, "term[1]".parse().unwrap());
    }

    #[test]
    fn negative_operator_index_is_rejected() {
        let expr = parse_latex("1/7 + 3/7").unwrap();
        assert_eq!(normalize_selection(&expr, &input(None, Some(-1), None)), None);
    }

    #[test]
    fn no_valid_source_means_no_selection() {
        let expr = parse_latex("3 + 5").unwrap();
        assert_eq!(normalize_selection(&expr, &input(None, Some(99), None)), None);
        assert_eq!(normalize_selection(&expr, &SelectionInput::default()), None);
        assert_eq!(
            normalize_selection(&expr, &input(Some("bogus"), None, Some("also.bogus"))),
            None,
        );
    }
}
