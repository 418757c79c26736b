//! Resolves the semantic window around an anchor and builds step candidates from the rules that
//! match it.
//!
//! The *semantic window* is the smallest subtree worth reasoning about: for an operator anchor it
//! is the operator node itself; for an operand anchor it is the operand's parent when that parent
//! is a binary node (giving the rule the two-operand context), and the operand alone otherwise.
//!
//! Candidate construction is deterministic: building candidates twice for the same expression,
//! window and registry yields the same candidate ids in the same order. A candidate id is a pure
//! function of the rule and the window path, which lets consumers deduplicate and cache across
//! identical requests.

use serde::Serialize;

use crate::expr::{
    navigate::{get_node_at, NavError},
    path::AstPath,
    to_latex, BinOp, MathExpr,
};
use crate::registry::{InvariantRule, MathDomain, Operation, Registry, RulePattern};
use crate::runner::EngineRequest;
use crate::selection::{Anchor, AnchorKind};

/// The subtree rule matching operates on.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticWindow {
    /// The path of the window node.
    pub path: AstPath,

    /// The window node itself.
    pub node: MathExpr,
}

/// How risky applying a candidate is. Every rule-built candidate at this stage performs an
/// invariant-preserving rewrite, so the level is always [`SafetyLevel::Safe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SafetyLevel {
    Safe,
    NeedsReview,
}

/// The safety classification of a candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Safety {
    /// How risky applying the candidate is.
    pub level: SafetyLevel,

    /// True if the result must be validated before being shown.
    pub requires_validation: bool,
}

/// Where a candidate would apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSelection {
    /// The path of the window the candidate targets.
    pub target_path: AstPath,
}

/// A concrete, scoreable proposal to apply one rule at one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepCandidate {
    /// The id of the candidate: a pure function of the rule id and the window path.
    pub id: String,

    /// The id of the rule the candidate was built from.
    pub invariant_id: String,

    /// The primitives the candidate applies, in order.
    pub primitive_ids: Vec<String>,

    /// The domain the window was detected as.
    pub domain: MathDomain,

    /// The curriculum stage of the rule.
    pub stage: String,

    /// The operation the candidate is about, when known.
    pub operation: Option<Operation>,

    /// Where the candidate would apply.
    pub selection: CandidateSelection,

    /// The ready-to-run engine request.
    pub engine_request_draft: EngineRequest,

    /// The safety classification of the candidate.
    pub safety: Safety,

    /// A short label for the student.
    pub human_label: String,

    /// A one-line description of what the step does.
    pub short_description: String,

    /// The base score of the candidate, taken from its rule.
    pub priority: i32,
}

/// Resolves the semantic window for the anchor.
pub fn resolve_window(expr: &MathExpr, anchor: &Anchor) -> Result<SemanticWindow, NavError> {
    let anchored = get_node_at(expr, &anchor.path)?;

    if anchor.kind == AnchorKind::Operand {
        if let Some(parent_path) = anchor.path.parent() {
            let parent = get_node_at(expr, &parent_path)?;
            if matches!(parent, MathExpr::Binary(_)) {
                return Ok(SemanticWindow {
                    path: parent_path,
                    node: parent,
                });
            }
        }
    }

    Ok(SemanticWindow {
        path: anchor.path.clone(),
        node: anchored,
    })
}

/// Detects the mathematical domain of a window.
///
/// A window that is not a two-operand context is [`MathDomain::Other`]. Fraction-likeness covers
/// both fraction encodings and mixed numbers; denominators are compared by structural equality
/// of the denominator nodes.
pub fn detect_domain(window: &MathExpr) -> MathDomain {
    let MathExpr::Binary(binary) = window else {
        return MathDomain::Other;
    };
    let (lhs, rhs) = (&*binary.lhs, &*binary.rhs);

    if lhs.is_fraction_like() && rhs.is_fraction_like() {
        let same = match (lhs.denominator(), rhs.denominator()) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        };
        if same {
            MathDomain::FractionsSameDen
        } else {
            MathDomain::FractionsDiffDen
        }
    } else if lhs.is_integer() && rhs.is_integer() {
        MathDomain::Integers
    } else if (lhs.is_integer() && rhs.is_fraction_like())
        || (lhs.is_fraction_like() && rhs.is_integer())
    {
        MathDomain::Mixed
    } else {
        MathDomain::Other
    }
}

/// Builds one candidate per eligible rule. Unmatched windows and empty registries yield an empty
/// list, never an error.
pub fn build_candidates(
    expr: &MathExpr,
    window: &SemanticWindow,
    registry: &Registry,
    stage: &str,
) -> Vec<StepCandidate> {
    let domain = detect_domain(&window.node);

    registry
        .rules_for(stage, domain)
        .into_iter()
        .filter(|rule| {
            rule.pattern
                .as_ref()
                .map_or(true, |pattern| pattern_matches(pattern, &window.node))
        })
        .map(|rule| make_candidate(rule, expr, window, domain))
        .collect()
}

/// Checks a rule pattern against the window. Constraints that need a two-operand context fail on
/// windows that are not binary nodes; an empty pattern always passes.
fn pattern_matches(pattern: &RulePattern, window: &MathExpr) -> bool {
    let operands = match window {
        MathExpr::Binary(binary) => Some((&*binary.lhs, &*binary.rhs)),
        _ => None,
    };

    if let Some(operation) = pattern.operator {
        let matches_op = match window {
            MathExpr::Binary(binary) => binary.op == op_of(operation),
            _ => false,
        };
        if !matches_op {
            return false;
        }
    }

    if pattern.requires_fractions == Some(true) {
        // for a two-operand window both operands must be fraction-like; a single-node window
        // must be fraction-like itself
        let satisfied = match operands {
            Some((lhs, rhs)) => lhs.is_fraction_like() && rhs.is_fraction_like(),
            None => window.is_fraction_like(),
        };
        if !satisfied {
            return false;
        }
    }

    if pattern.require_same_denominator == Some(true) {
        let same = operands.and_then(|(lhs, rhs)| {
            Some(lhs.denominator()? == rhs.denominator()?)
        });
        if same != Some(true) {
            return false;
        }
    }

    if pattern.requires_integers == Some(true) {
        match operands {
            Some((lhs, rhs)) if lhs.is_integer() && rhs.is_integer() => {},
            _ => return false,
        }
    }

    if pattern.allows_mixed == Some(false) {
        let has_mixed = match operands {
            Some((lhs, rhs)) => {
                matches!(lhs, MathExpr::Mixed(_)) || matches!(rhs, MathExpr::Mixed(_))
            },
            None => matches!(window, MathExpr::Mixed(_)),
        };
        if has_mixed {
            return false;
        }
    }

    true
}

fn op_of(operation: Operation) -> BinOp {
    match operation {
        Operation::Add => BinOp::Add,
        Operation::Sub => BinOp::Sub,
        Operation::Mul => BinOp::Mul,
        Operation::Div => BinOp::Div,
    }
}

fn operation_of(op: BinOp) -> Operation {
    match op {
        BinOp::Add => Operation::Add,
        BinOp::Sub => Operation::Sub,
        BinOp::Mul => Operation::Mul,
        BinOp::Div => Operation::Div,
    }
}

fn make_candidate(
    rule: &InvariantRule,
    expr: &MathExpr,
    window: &SemanticWindow,
    domain: MathDomain,
) -> StepCandidate {
    let operation = rule.operation.or_else(|| match &window.node {
        MathExpr::Binary(binary) => Some(operation_of(binary.op)),
        _ => None,
    });
    let (human_label, short_description) = describe(domain, operation);

    StepCandidate {
        id: format!("{}@{}", rule.id, window.path),
        invariant_id: rule.id.clone(),
        primitive_ids: rule.primitive_ids.clone(),
        domain,
        stage: rule.stage.clone(),
        operation,
        selection: CandidateSelection {
            target_path: window.path.clone(),
        },
        engine_request_draft: EngineRequest {
            latex: to_latex(expr),
            primitive_ids: rule.primitive_ids.clone(),
            target_path: Some(window.path.clone()),
        },
        safety: Safety {
            level: SafetyLevel::Safe,
            requires_validation: false,
        },
        human_label,
        short_description,
        priority: rule.priority,
    }
}

/// Student-facing wording for a candidate, keyed off the domain and operation.
fn describe(domain: MathDomain, operation: Option<Operation>) -> (String, String) {
    let (label, description) = match (domain, operation) {
        (MathDomain::FractionsSameDen, Some(Operation::Add)) => (
            "Add the fractions",
            "Add the numerators and keep the common denominator",
        ),
        (MathDomain::FractionsSameDen, Some(Operation::Sub)) => (
            "Subtract the fractions",
            "Subtract the numerators and keep the common denominator",
        ),
        (MathDomain::FractionsDiffDen, _) => (
            "Rewrite over a common denominator",
            "Scale both fractions so they share one denominator",
        ),
        (MathDomain::Integers, Some(Operation::Add)) => (
            "Add the whole numbers",
            "Combine the two integers into their sum",
        ),
        (MathDomain::Integers, Some(Operation::Sub)) => (
            "Subtract the whole numbers",
            "Combine the two integers into their difference",
        ),
        (MathDomain::Integers, Some(Operation::Mul)) => (
            "Multiply the whole numbers",
            "Combine the two integers into their product",
        ),
        (MathDomain::Mixed, _) => (
            "Line up the operands",
            "Write the whole number as a fraction first",
        ),
        _ => (
            "Apply a simplification",
            "Apply one rewriting step at the selected spot",
        ),
    };
    (label.to_string(), description.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;
    use crate::expr::parse_latex;
    use crate::selection::{normalize_selection, SelectionInput};

    fn click_root(expr: &MathExpr) -> Anchor {
        normalize_selection(expr, &SelectionInput {
            path: Some("root".to_string()),
            ..SelectionInput::default()
        })
        .unwrap()
    }

    fn candidates_for(latex: &str) -> Vec<StepCandidate> {
        let expr = parse_latex(latex).unwrap();
        let anchor = click_root(&expr);
        let window = resolve_window(&expr, &anchor).unwrap();
        build_candidates(&expr, &window, &Registry::builtin(), "intro")
    }

    #[test]
    fn operand_anchor_widens_to_the_parent_operator() {
        let expr = parse_latex("3 + 5").unwrap();
        let anchor = normalize_selection(&expr, &SelectionInput {
            path: Some("term[0]".to_string()),
            ..SelectionInput::default()
        })
        .unwrap();

        let window = resolve_window(&expr, &anchor).unwrap();
        assert_eq!(window.path, AstPath::root());
        assert_eq!(window.node, expr);
    }

    #[test]
    fn operand_anchor_without_binary_parent_stays_put() {
        let expr = parse_latex(r"\frac{6}{8}").unwrap();
        let anchor = click_root(&expr);
        let window = resolve_window(&expr, &anchor).unwrap();
        assert_eq!(window.path, AstPath::root());
        assert_eq!(window.node, expr);
    }

    #[test]
    fn domain_detection() {
        let domain_of = |latex: &str| detect_domain(&parse_latex(latex).unwrap());

        assert_eq!(domain_of("1/7 + 3/7"), MathDomain::FractionsSameDen);
        assert_eq!(domain_of(r"\frac{5}{7} - \frac{2}{7}"), MathDomain::FractionsSameDen);
        assert_eq!(domain_of("1/7 + 2/5"), MathDomain::FractionsDiffDen);
        assert_eq!(domain_of("3 + 5"), MathDomain::Integers);
        assert_eq!(domain_of(r"2 + \frac{1}{7}"), MathDomain::Mixed);
        assert_eq!(domain_of("1 2/3 + 1/3"), MathDomain::FractionsSameDen);
        assert_eq!(domain_of("x + 1"), MathDomain::Other);
        assert_eq!(domain_of("42"), MathDomain::Other);
    }

    #[test]
    fn same_denominator_sum_yields_one_add_candidate() {
        let candidates = candidates_for("1/7 + 3/7");
        assert_eq!(candidates.len(), 1);

        let candidate = &candidates[0];
        assert_eq!(candidate.invariant_id, "frac-add-same-den");
        assert_eq!(candidate.domain, MathDomain::FractionsSameDen);
        assert_eq!(candidate.operation, Some(Operation::Add));
        assert_eq!(candidate.id, "frac-add-same-den@root");
        assert_eq!(candidate.safety.level, SafetyLevel::Safe);
        assert!(!candidate.safety.requires_validation);
        assert_eq!(candidate.human_label, "Add the fractions");
        assert_eq!(
            candidate.engine_request_draft.primitive_ids,
            vec!["fraction.add-same-den".to_string()],
        );
    }

    #[test]
    fn same_denominator_difference_yields_one_sub_candidate() {
        let candidates = candidates_for("5/7 - 2/7");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].invariant_id, "frac-sub-same-den");
        assert_eq!(candidates[0].operation, Some(Operation::Sub));
        assert_eq!(candidates[0].human_label, "Subtract the fractions");
    }

    #[test]
    fn different_denominators_yield_no_same_den_candidates() {
        let candidates = candidates_for("1/7 + 2/5");
        assert!(candidates
            .iter()
            .all(|candidate| candidate.domain != MathDomain::FractionsSameDen));
        // the common-denominator rewrite is offered instead
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].invariant_id, "frac-common-den");
    }

    #[test]
    fn integer_sums_yield_integer_candidates_only() {
        let candidates = candidates_for("3 + 5");
        assert!(!candidates.is_empty());
        assert!(candidates
            .iter()
            .all(|candidate| candidate.domain == MathDomain::Integers));
        assert!(candidates
            .iter()
            .any(|candidate| candidate.invariant_id == "int-add"));
    }

    #[test]
    fn unmatched_windows_yield_an_empty_list() {
        // neither operand is a fraction or an integer pair the curriculum knows about
        let candidates = candidates_for("x + 1");
        assert_eq!(candidates, vec![]);

        let candidates = candidates_for("42");
        assert_eq!(candidates, vec![]);
    }

    #[test]
    fn clicked_fraction_leaves_offer_reduction() {
        let candidates = candidates_for(r"\frac{6}{8}");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].invariant_id, "frac-reduce");
        assert_eq!(candidates[0].domain, MathDomain::Other);
    }

    #[test]
    fn candidate_ids_are_deterministic() {
        let first = candidates_for("1/7 + 3/7");
        let second = candidates_for("1/7 + 3/7");
        let first_ids: Vec<_> = first.iter().map(|candidate| candidate.id.clone()).collect();
        let second_ids: Vec<_> = second.iter().map(|candidate| candidate.id.clone()).collect();
        assert_eq!(first_ids, second_ids);
    }
}
