//! The validated, queryable catalog of primitives and invariant rules.
//!
//! A [`Registry`] is built from an [`InvariantModel`] — either deserialized from JSON or the
//! built-in curriculum — and refuses construction unless the model validates cleanly. Queries
//! never see an unsound model.

pub mod model;
pub mod validate;

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub use model::{
    InvariantModel, InvariantRule, InvariantSet, MathDomain, Operation, PrimitiveSpec,
    RulePattern,
};
pub use validate::{validate_model, IssueCode, ValidationIssue};

/// The built-in curriculum, used when no external model is supplied.
static BUILTIN: Lazy<Registry> = Lazy::new(|| {
    Registry::new(builtin_model()).expect("the built-in invariant model is sound")
});

/// A validated invariant model with an id index over its primitives.
#[derive(Debug, Clone)]
pub struct Registry {
    model: InvariantModel,
    primitive_index: HashMap<String, usize>,
}

impl Registry {
    /// Validates the model and builds a registry over it. Any validation issue rejects the whole
    /// model; the complete issue list is returned.
    pub fn new(model: InvariantModel) -> Result<Self, Vec<ValidationIssue>> {
        let issues = validate_model(&model);
        if !issues.is_empty() {
            return Err(issues);
        }

        let primitive_index = model
            .primitives
            .iter()
            .enumerate()
            .map(|(index, primitive)| (primitive.id.clone(), index))
            .collect();

        Ok(Self {
            model,
            primitive_index,
        })
    }

    /// Deserializes a model from JSON and builds a registry over it. A malformed document is
    /// reported through the same issue list as any other validation problem.
    pub fn from_json(raw: &str) -> Result<Self, Vec<ValidationIssue>> {
        let model: InvariantModel = serde_json::from_str(raw).map_err(|err| {
            vec![ValidationIssue {
                code: IssueCode::InvalidShape,
                path: "$".to_string(),
                message: err.to_string(),
            }]
        })?;
        Self::new(model)
    }

    /// Returns a registry over the built-in curriculum.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// The underlying model.
    pub fn model(&self) -> &InvariantModel {
        &self.model
    }

    /// Looks up a primitive by id.
    pub fn primitive(&self, id: &str) -> Option<&PrimitiveSpec> {
        self.primitive_index
            .get(id)
            .map(|&index| &self.model.primitives[index])
    }

    /// Returns true if the primitive exists and may be executed directly on a clicked node.
    pub fn is_direct(&self, id: &str) -> bool {
        self.primitive(id).map_or(false, |primitive| primitive.direct)
    }

    /// Iterates over the primitives that may be executed directly.
    pub fn direct_primitives(&self) -> impl Iterator<Item = &PrimitiveSpec> {
        self.model.primitives.iter().filter(|primitive| primitive.direct)
    }

    /// Returns the rules eligible for the given stage and detected domain, in declaration order.
    pub fn rules_for(&self, stage: &str, domain: MathDomain) -> Vec<&InvariantRule> {
        self.model
            .invariant_sets
            .iter()
            .flat_map(|set| set.rules.iter())
            .filter(|rule| rule.stage == stage && rule.domain.covers(domain))
            .collect()
    }
}

/// The built-in curriculum model: same-denominator fraction arithmetic, integer arithmetic, and
/// the conversions that bridge the two.
fn builtin_model() -> InvariantModel {
    fn primitive(id: &str, label: &str, direct: bool) -> PrimitiveSpec {
        PrimitiveSpec {
            id: id.to_string(),
            label: label.to_string(),
            description: String::new(),
            direct,
        }
    }

    fn rule(
        id: &str,
        domain: MathDomain,
        operation: Option<Operation>,
        primitive_ids: &[&str],
        pattern: Option<RulePattern>,
        priority: i32,
    ) -> InvariantRule {
        InvariantRule {
            id: id.to_string(),
            stage: "intro".to_string(),
            domain,
            operation,
            primitive_ids: primitive_ids.iter().map(|id| id.to_string()).collect(),
            pattern,
            priority,
        }
    }

    InvariantModel {
        primitives: vec![
            primitive("fraction.add-same-den", "Add same-denominator fractions", false),
            primitive("fraction.sub-same-den", "Subtract same-denominator fractions", false),
            primitive("fraction.common-den", "Rewrite over a common denominator", false),
            primitive("fraction.reduce", "Reduce a fraction", false),
            primitive("integer.add", "Add integers", false),
            primitive("integer.sub", "Subtract integers", false),
            primitive("integer.mul", "Multiply integers", false),
            primitive("integer.to-fraction", "Write an integer as a fraction", true),
            primitive("mixed.to-improper", "Write a mixed number as an improper fraction", true),
        ],
        invariant_sets: vec![
            InvariantSet {
                id: "fraction-steps".to_string(),
                label: "Fraction arithmetic".to_string(),
                rules: vec![
                    rule(
                        "frac-add-same-den",
                        MathDomain::FractionsSameDen,
                        Some(Operation::Add),
                        &["fraction.add-same-den"],
                        Some(RulePattern {
                            operator: Some(Operation::Add),
                            requires_fractions: Some(true),
                            require_same_denominator: Some(true),
                            ..RulePattern::default()
                        }),
                        10,
                    ),
                    rule(
                        "frac-sub-same-den",
                        MathDomain::FractionsSameDen,
                        Some(Operation::Sub),
                        &["fraction.sub-same-den"],
                        Some(RulePattern {
                            operator: Some(Operation::Sub),
                            requires_fractions: Some(true),
                            require_same_denominator: Some(true),
                            ..RulePattern::default()
                        }),
                        10,
                    ),
                    rule(
                        "frac-common-den",
                        MathDomain::FractionsDiffDen,
                        None,
                        &["fraction.common-den"],
                        Some(RulePattern {
                            requires_fractions: Some(true),
                            ..RulePattern::default()
                        }),
                        8,
                    ),
                    rule(
                        "frac-reduce",
                        MathDomain::Other,
                        None,
                        &["fraction.reduce"],
                        Some(RulePattern {
                            requires_fractions: Some(true),
                            ..RulePattern::default()
                        }),
                        5,
                    ),
                ],
            },
            InvariantSet {
                id: "integer-steps".to_string(),
                label: "Integer arithmetic".to_string(),
                rules: vec![
                    rule(
                        "int-add",
                        MathDomain::Integers,
                        Some(Operation::Add),
                        &["integer.add"],
                        Some(RulePattern {
                            operator: Some(Operation::Add),
                            requires_integers: Some(true),
                            ..RulePattern::default()
                        }),
                        10,
                    ),
                    rule(
                        "int-sub",
                        MathDomain::Integers,
                        Some(Operation::Sub),
                        &["integer.sub"],
                        Some(RulePattern {
                            operator: Some(Operation::Sub),
                            requires_integers: Some(true),
                            ..RulePattern::default()
                        }),
                        10,
                    ),
                    rule(
                        "int-mul",
                        MathDomain::Integers,
                        Some(Operation::Mul),
                        &["integer.mul"],
                        Some(RulePattern {
                            operator: Some(Operation::Mul),
                            requires_integers: Some(true),
                            ..RulePattern::default()
                        }),
                        6,
                    ),
                ],
            },
            InvariantSet {
                id: "conversion-steps".to_string(),
                label: "Representation changes".to_string(),
                rules: vec![
                    rule(
                        "mixed-operands-align",
                        MathDomain::Mixed,
                        None,
                        &["integer.to-fraction"],
                        None,
                        8,
                    ),
                ],
            },
        ],
    }
}
