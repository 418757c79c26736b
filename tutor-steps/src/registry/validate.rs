//! One-pass validation of invariant models.
//!
//! Validation never stops at the first problem: it walks the whole model and returns every issue
//! it finds, each with a machine-readable code and the path of the offending element. A model
//! with any issue is rejected as a whole; there is no partial acceptance.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use super::model::InvariantModel;

/// The machine-readable code of a validation issue. The codes are a stable contract consumed by
/// model tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// The model (or a part of it) does not have the expected shape.
    InvalidShape,

    /// Two primitives share one id.
    DuplicatePrimitiveId,

    /// A rule references a primitive that does not exist in the model.
    UnknownPrimitiveId,

    /// A rule references no primitives at all.
    EmptyPrimitiveRef,

    /// Two rules within one set share one id.
    DuplicateRuleIdInSet,

    /// Two sets share one id.
    DuplicateSetId,
}

/// One problem found while validating a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// The machine-readable code of the issue.
    pub code: IssueCode,

    /// The path of the offending element, such as `invariantSets[0].rules[2]`.
    pub path: String,

    /// A human-readable description of the issue.
    pub message: String,
}

impl ValidationIssue {
    fn new(code: IssueCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} at {}: {}", self.code, self.path, self.message)
    }
}

/// Validates the model, returning every issue found. An empty list means the model is sound.
pub fn validate_model(model: &InvariantModel) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let mut primitive_ids = HashSet::new();
    for (index, primitive) in model.primitives.iter().enumerate() {
        let path = format!("primitives[{}]", index);
        if primitive.id.is_empty() {
            issues.push(ValidationIssue::new(
                IssueCode::InvalidShape,
                path.clone(),
                "primitive id must not be empty",
            ));
        }
        if !primitive_ids.insert(primitive.id.clone()) {
            issues.push(ValidationIssue::new(
                IssueCode::DuplicatePrimitiveId,
                path,
                format!("primitive id `{}` is declared more than once", primitive.id),
            ));
        }
    }

    let mut set_ids = HashSet::new();
    for (set_index, set) in model.invariant_sets.iter().enumerate() {
        let set_path = format!("invariantSets[{}]", set_index);
        if !set_ids.insert(set.id.clone()) {
            issues.push(ValidationIssue::new(
                IssueCode::DuplicateSetId,
                set_path.clone(),
                format!("set id `{}` is declared more than once", set.id),
            ));
        }

        let mut rule_ids = HashSet::new();
        for (rule_index, rule) in set.rules.iter().enumerate() {
            let rule_path = format!("{}.rules[{}]", set_path, rule_index);
            if !rule_ids.insert(rule.id.clone()) {
                issues.push(ValidationIssue::new(
                    IssueCode::DuplicateRuleIdInSet,
                    rule_path.clone(),
                    format!("rule id `{}` is declared more than once in set `{}`", rule.id, set.id),
                ));
            }

            if rule.primitive_ids.is_empty() {
                issues.push(ValidationIssue::new(
                    IssueCode::EmptyPrimitiveRef,
                    rule_path.clone(),
                    format!("rule `{}` references no primitives", rule.id),
                ));
            }

            for (ref_index, primitive_id) in rule.primitive_ids.iter().enumerate() {
                if !primitive_ids.contains(primitive_id) {
                    issues.push(ValidationIssue::new(
                        IssueCode::UnknownPrimitiveId,
                        format!("{}.primitiveIds[{}]", rule_path, ref_index),
                        format!("primitive `{}` does not exist in the model", primitive_id),
                    ));
                }
            }
        }
    }

    issues
}
