//! The serializable shape of an invariant model: the primitives an engine can apply, and the
//! rule sets that describe when applying them is a sound teaching step.

use serde::{Deserialize, Serialize};

/// The mathematical domain a rule applies to, detected from the two operands of a semantic
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MathDomain {
    /// Two fraction-like operands sharing one denominator.
    FractionsSameDen,

    /// Two fraction-like operands with different denominators.
    FractionsDiffDen,

    /// Two integer operands.
    Integers,

    /// One integer operand and one fraction-like operand.
    Mixed,

    /// Any two fraction-like operands; matches both of the specific fraction domains.
    Fractions,

    /// Anything else, including windows that are not a two-operand context at all.
    Other,
}

impl MathDomain {
    /// Returns true if a rule declared for this domain applies to a window detected as `other`.
    /// [`MathDomain::Fractions`] is the one wildcard: it covers both specific fraction domains.
    pub fn covers(&self, other: MathDomain) -> bool {
        *self == other
            || (*self == Self::Fractions
                && matches!(other, Self::FractionsSameDen | Self::FractionsDiffDen))
    }
}

/// The arithmetic operation a rule or candidate is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
}

/// An atomic engine-level rewrite referenced by rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimitiveSpec {
    /// The unique id of the primitive.
    pub id: String,

    /// A short human-readable label.
    pub label: String,

    /// An optional longer description.
    #[serde(default)]
    pub description: String,

    /// True if the primitive may be executed directly on a clicked node, bypassing rule matching
    /// and scoring entirely.
    #[serde(default)]
    pub direct: bool,
}

/// The structural constraints a semantic window must satisfy for a rule to apply. Every field is
/// optional; a rule with no pattern (or an empty pattern) always passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RulePattern {
    /// The operator the window must use.
    pub operator: Option<Operation>,

    /// Both operands must be fraction-like.
    pub requires_fractions: Option<bool>,

    /// Both operands must share one denominator.
    pub require_same_denominator: Option<bool>,

    /// Both operands must be integers.
    pub requires_integers: Option<bool>,

    /// When `false`, mixed numbers must not appear among the operands.
    pub allows_mixed: Option<bool>,
}

/// A named, pattern-guarded teaching transformation referencing one or more primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvariantRule {
    /// The unique id of the rule within its set.
    pub id: String,

    /// The curriculum stage the rule belongs to.
    pub stage: String,

    /// The domain the rule applies to.
    pub domain: MathDomain,

    /// The operation the rule is about, when it is specific to one.
    #[serde(default)]
    pub operation: Option<Operation>,

    /// The primitives applied when the rule fires, in order.
    pub primitive_ids: Vec<String>,

    /// Structural constraints on the semantic window.
    #[serde(default)]
    pub pattern: Option<RulePattern>,

    /// The base score of candidates built from this rule.
    #[serde(default)]
    pub priority: i32,
}

/// A named group of rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvariantSet {
    /// The unique id of the set.
    pub id: String,

    /// A short human-readable label.
    #[serde(default)]
    pub label: String,

    /// The rules of the set.
    pub rules: Vec<InvariantRule>,
}

/// A complete invariant model: all known primitives plus the rule sets that reference them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvariantModel {
    /// The primitives an engine can apply.
    pub primitives: Vec<PrimitiveSpec>,

    /// The rule sets of the model.
    pub invariant_sets: Vec<InvariantSet>,
}
