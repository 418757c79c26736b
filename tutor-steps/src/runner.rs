//! Applies named primitives to an expression and reports the outcome.
//!
//! The runner supports a single mode, *preview-apply*: parse the expression, apply the requested
//! primitives to the tree, and re-serialize the result. The engine seam is asynchronous so a
//! future engine can perform I/O; the in-process engine bundled here resolves immediately.
//!
//! Outcomes are a closed set. A request with a bad shape (empty expression, empty primitive
//! list) fails synchronously with `config-error` before any parsing or engine work. A parse
//! failure of the expression is `parse-error`; every other engine failure is `engine-error`.
//! When the engine runs but nothing changes, the outcome is `noStep` with a reason.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::expr::{
    navigate::{get_node_at, replace_node_at},
    path::AstPath,
    parse_latex, to_latex, Binary, MathExpr, Unary,
};
use crate::primitives::{self, Primitive};

/// A request to apply primitives to an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineRequest {
    /// The expression to rewrite.
    pub latex: String,

    /// The primitives to apply, in order.
    pub primitive_ids: Vec<String>,

    /// The path the rewrite should anchor at. Without it, each primitive applies at the first
    /// node it fits, in depth-first order.
    #[serde(default)]
    pub target_path: Option<AstPath>,
}

/// Why an engine run changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoStepReason {
    /// None of the requested primitives fit anywhere in the expression.
    NoPrimitiveApplicable,

    /// The expression has no teaching step left at all.
    ExpressionAlreadySimplified,
}

/// The classification of a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineErrorCode {
    /// The expression did not parse.
    ParseError,

    /// The engine failed while rewriting.
    EngineError,

    /// The request shape was invalid; the engine was never invoked.
    ConfigError,
}

/// The outcome of a preview-apply run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum RunOutcome {
    /// The tree changed.
    #[serde(rename_all = "camelCase")]
    Ok {
        /// The expression before the rewrite.
        latex_before: String,

        /// The expression after the rewrite.
        latex_after: String,

        /// The primitives that actually applied, in order.
        applied_primitive_ids: Vec<String>,
    },

    /// The engine ran but the tree did not change.
    #[serde(rename_all = "camelCase")]
    NoStep {
        /// Why nothing changed.
        reason: NoStepReason,
    },

    /// The run failed.
    #[serde(rename_all = "camelCase")]
    Error {
        /// The classification of the failure.
        error_code: EngineErrorCode,

        /// A human-readable description of the failure.
        message: String,
    },
}

/// A failure raised by a rewrite engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineFault {
    /// The expression did not parse.
    #[error("{message} (at offset {position})")]
    Parse {
        /// The reason the parse failed.
        message: String,

        /// The byte offset the failure points at.
        position: usize,
    },

    /// Any other failure inside the engine.
    #[error("{0}")]
    Internal(String),
}

/// What a successful engine run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    /// The tree changed.
    Rewritten {
        /// The rewritten expression.
        latex_after: String,

        /// The primitives that actually applied, in order.
        applied_primitive_ids: Vec<String>,
    },

    /// Nothing applied.
    NoOp {
        /// True when the expression has no teaching step left.
        already_simplified: bool,
    },
}

/// The engine seam: parse, rewrite, re-serialize.
#[async_trait]
pub trait RewriteEngine: Send + Sync {
    /// Runs the rewrite described by the request.
    async fn rewrite(&self, request: &EngineRequest) -> Result<EngineOutput, EngineFault>;
}

/// The bundled engine: applies the primitives of [`crate::primitives`] in-process.
#[derive(Debug, Clone, Copy, Default)]
pub struct InProcessEngine;

#[async_trait]
impl RewriteEngine for InProcessEngine {
    async fn rewrite(&self, request: &EngineRequest) -> Result<EngineOutput, EngineFault> {
        let expr = parse_latex(&request.latex).map_err(|failure| EngineFault::Parse {
            message: failure.message,
            position: failure.position,
        })?;

        let mut current = expr.clone();
        let mut applied = Vec::new();
        for primitive_id in &request.primitive_ids {
            let primitive = primitives::lookup(primitive_id).ok_or_else(|| {
                EngineFault::Internal(format!("unknown primitive `{}`", primitive_id))
            })?;

            let next = match &request.target_path {
                Some(path) => apply_at(&current, path, primitive)?,
                None => apply_first(&current, primitive),
            };
            if let Some(next) = next {
                applied.push(primitive_id.clone());
                current = next;
            }
        }

        if applied.is_empty() {
            return Ok(EngineOutput::NoOp {
                already_simplified: primitives::is_fully_simplified(&expr),
            });
        }

        Ok(EngineOutput::Rewritten {
            latex_after: to_latex(&current),
            applied_primitive_ids: applied,
        })
    }
}

/// Applies the primitive at (or below) the addressed node, rebuilding the surrounding tree.
fn apply_at(
    expr: &MathExpr,
    path: &AstPath,
    primitive: &Primitive,
) -> Result<Option<MathExpr>, EngineFault> {
    let node = get_node_at(expr, path).map_err(|err| EngineFault::Internal(err.to_string()))?;
    let Some(rewritten) = apply_first(&node, primitive) else {
        return Ok(None);
    };
    replace_node_at(expr, path, rewritten)
        .map(Some)
        .map_err(|err| EngineFault::Internal(err.to_string()))
}

/// Applies the primitive at the first fitting node in depth-first order, rebuilding the spine
/// above it.
fn apply_first(expr: &MathExpr, primitive: &Primitive) -> Option<MathExpr> {
    if let Some(next) = (primitive.apply)(expr) {
        return Some(next);
    }

    match expr {
        MathExpr::Binary(binary) => {
            if let Some(lhs) = apply_first(&binary.lhs, primitive) {
                return Some(MathExpr::Binary(Binary {
                    op: binary.op,
                    lhs: Box::new(lhs),
                    rhs: binary.rhs.clone(),
                }));
            }
            apply_first(&binary.rhs, primitive).map(|rhs| {
                MathExpr::Binary(Binary {
                    op: binary.op,
                    lhs: binary.lhs.clone(),
                    rhs: Box::new(rhs),
                })
            })
        },
        MathExpr::Unary(unary) => apply_first(&unary.arg, primitive).map(|arg| {
            MathExpr::Unary(Unary {
                op: unary.op,
                arg: Box::new(arg),
            })
        }),
        _ => None,
    }
}

/// Drives a [`RewriteEngine`] through the preview-apply contract.
#[derive(Debug, Clone)]
pub struct PrimitiveRunner<E = InProcessEngine> {
    engine: E,
}

impl PrimitiveRunner<InProcessEngine> {
    /// A runner over the bundled in-process engine.
    pub fn in_process() -> Self {
        Self::new(InProcessEngine)
    }
}

impl<E: RewriteEngine> PrimitiveRunner<E> {
    /// Creates a runner over the given engine.
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Runs one preview-apply request.
    pub async fn preview_apply(&self, request: &EngineRequest) -> RunOutcome {
        // bad request shapes fail synchronously, before any parsing or engine work
        if request.latex.trim().is_empty() {
            return RunOutcome::Error {
                error_code: EngineErrorCode::ConfigError,
                message: "expression must not be empty".to_string(),
            };
        }
        if request.primitive_ids.is_empty() {
            return RunOutcome::Error {
                error_code: EngineErrorCode::ConfigError,
                message: "at least one primitive is required".to_string(),
            };
        }

        match self.engine.rewrite(request).await {
            Ok(EngineOutput::Rewritten { latex_after, applied_primitive_ids }) => {
                debug!(
                    before = %request.latex,
                    after = %latex_after,
                    applied = applied_primitive_ids.len(),
                    "rewrite applied",
                );
                RunOutcome::Ok {
                    latex_before: request.latex.clone(),
                    latex_after,
                    applied_primitive_ids,
                }
            },
            Ok(EngineOutput::NoOp { already_simplified }) => RunOutcome::NoStep {
                reason: if already_simplified {
                    NoStepReason::ExpressionAlreadySimplified
                } else {
                    NoStepReason::NoPrimitiveApplicable
                },
            },
            Err(EngineFault::Parse { message, position }) => RunOutcome::Error {
                error_code: EngineErrorCode::ParseError,
                message: format!("{} (at offset {})", message, position),
            },
            Err(EngineFault::Internal(message)) => RunOutcome::Error {
                error_code: EngineErrorCode::EngineError,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn request(latex: &str, primitive_ids: &[&str], target_path: Option<&str>) -> EngineRequest {
        EngineRequest {
            latex: latex.to_string(),
            primitive_ids: primitive_ids.iter().map(|id| id.to_string()).collect(),
            target_path: target_path.map(|raw| raw.parse().unwrap()),
        }
    }

    /// An engine that must never be reached.
    struct UnreachableEngine;

    #[async_trait]
    impl RewriteEngine for UnreachableEngine {
        async fn rewrite(&self, _: &EngineRequest) -> Result<EngineOutput, EngineFault> {
            panic!("the engine must not be invoked for invalid request shapes");
        }
    }

    #[tokio::test]
    async fn applies_a_primitive_and_reserializes() {
        let runner = PrimitiveRunner::in_process();
        let outcome = runner
            .preview_apply(&request("1/7+3/7", &["fraction.add-same-den"], Some("root")))
            .await;

        assert_eq!(outcome, RunOutcome::Ok {
            latex_before: "1/7+3/7".to_string(),
            latex_after: r"\frac{4}{7}".to_string(),
            applied_primitive_ids: vec!["fraction.add-same-den".to_string()],
        });
    }

    #[tokio::test]
    async fn applies_below_the_target_when_needed() {
        // the window is the whole sum; the conversion applies to the integer operand below it
        let runner = PrimitiveRunner::in_process();
        let outcome = runner
            .preview_apply(&request(r"2+\frac{1}{7}", &["integer.to-fraction"], Some("root")))
            .await;

        assert_eq!(outcome, RunOutcome::Ok {
            latex_before: r"2+\frac{1}{7}".to_string(),
            latex_after: r"\frac{2}{1}+\frac{1}{7}".to_string(),
            applied_primitive_ids: vec!["integer.to-fraction".to_string()],
        });
    }

    #[tokio::test]
    async fn inapplicable_primitives_report_no_step() {
        let runner = PrimitiveRunner::in_process();
        let outcome = runner
            .preview_apply(&request("3+5", &["fraction.add-same-den"], None))
            .await;

        assert_eq!(outcome, RunOutcome::NoStep {
            reason: NoStepReason::NoPrimitiveApplicable,
        });
    }

    #[tokio::test]
    async fn simplified_expressions_report_their_own_reason() {
        let runner = PrimitiveRunner::in_process();
        let outcome = runner
            .preview_apply(&request(r"\frac{4}{7}", &["fraction.reduce"], None))
            .await;

        assert_eq!(outcome, RunOutcome::NoStep {
            reason: NoStepReason::ExpressionAlreadySimplified,
        });
    }

    #[tokio::test]
    async fn config_errors_fail_before_the_engine_runs() {
        let runner = PrimitiveRunner::new(UnreachableEngine);

        let outcome = runner.preview_apply(&request("", &["integer.add"], None)).await;
        assert!(matches!(outcome, RunOutcome::Error {
            error_code: EngineErrorCode::ConfigError,
            ..
        }));

        let outcome = runner.preview_apply(&request("3+5", &[], None)).await;
        assert!(matches!(outcome, RunOutcome::Error {
            error_code: EngineErrorCode::ConfigError,
            ..
        }));
    }

    #[tokio::test]
    async fn parse_failures_classify_as_parse_error() {
        let runner = PrimitiveRunner::in_process();
        let outcome = runner.preview_apply(&request("1 +", &["integer.add"], None)).await;
        assert!(matches!(outcome, RunOutcome::Error {
            error_code: EngineErrorCode::ParseError,
            ..
        }));
    }

    #[tokio::test]
    async fn unknown_primitives_classify_as_engine_error() {
        let runner = PrimitiveRunner::in_process();
        let outcome = runner
            .preview_apply(&request("3+5", &["no.such.primitive"], None))
            .await;
        assert!(matches!(outcome, RunOutcome::Error {
            error_code: EngineErrorCode::EngineError,
            ..
        }));
    }

    #[tokio::test]
    async fn engine_faults_map_onto_error_codes() {
        struct FailingEngine(EngineFault);

        #[async_trait]
        impl RewriteEngine for FailingEngine {
            async fn rewrite(&self, _: &EngineRequest) -> Result<EngineOutput, EngineFault> {
                Err(self.0.clone())
            }
        }

        let runner = PrimitiveRunner::new(FailingEngine(EngineFault::Parse {
            message: "bad".to_string(),
            position: 2,
        }));
        let outcome = runner.preview_apply(&request("3+5", &["integer.add"], None)).await;
        assert!(matches!(outcome, RunOutcome::Error {
            error_code: EngineErrorCode::ParseError,
            ..
        }));

        let runner = PrimitiveRunner::new(FailingEngine(EngineFault::Internal("boom".to_string())));
        let outcome = runner.preview_apply(&request("3+5", &["integer.add"], None)).await;
        assert_eq!(outcome, RunOutcome::Error {
            error_code: EngineErrorCode::EngineError,
            message: "boom".to_string(),
        });
    }
}
