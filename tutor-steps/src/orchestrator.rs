//! The per-request state machine that ties the pipeline together.
//!
//! Each request walks `ParseExpr → {ChoicePending | DirectExecute | MatchAndScore} → Executed |
//! NoCandidates | EngineError`:
//!
//! - a click on a plain integer with no preferred primitive short-circuits into a *choice*: the
//!   applicable direct conversions are listed without consulting the matcher;
//! - a preferred primitive that is marked direct-execution applies straight to the clicked node,
//!   bypassing matching and scoring;
//! - everything else runs selection normalization, window resolution, candidate building,
//!   scoring and finally the primitive runner. A preferred primitive that is *not* direct only
//!   narrows the candidate list before scoring.
//!
//! On an applied step, exactly one history entry is appended and the session store is updated;
//! failed requests move only the attempt counter. History itself is owned by the
//! [`SessionStore`] collaborator, which must serialize concurrent read-modify-write cycles per
//! session id; the orchestrator reads it once per request and writes it back once.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::expr::{navigate::get_node_at, parse_latex, MathExpr};
use crate::history::StepHistory;
use crate::matcher::{build_candidates, detect_domain, resolve_window};
use crate::primitives;
use crate::registry::{MathDomain, Registry};
use crate::runner::{
    EngineErrorCode, EngineRequest, InProcessEngine, PrimitiveRunner, RewriteEngine, RunOutcome,
};
use crate::scorer::{decide, Decision, ScoreBreakdown, StepPolicy};
use crate::selection::{normalize_selection, SelectionInput};

/// One request against the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRequest {
    /// The session the request belongs to.
    pub session_id: String,

    /// The id of the expression being worked on.
    pub expression_id: String,

    /// The current expression.
    pub latex: String,

    /// The selection data of the interaction.
    #[serde(default)]
    pub selection: SelectionInput,

    /// The curriculum stage of the session.
    pub stage: String,

    /// A primitive the caller wants applied, when the student picked one from a choice.
    #[serde(default)]
    pub preferred_primitive: Option<String>,

    /// The decision policy of the session.
    #[serde(default)]
    pub policy: StepPolicy,
}

/// The terminal state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    StepApplied,
    NoCandidates,
    Choice,
    EngineError,
}

/// One direct conversion offered to the student.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimitiveChoice {
    /// The id of the primitive.
    pub primitive_id: String,

    /// The label shown to the student.
    pub label: String,
}

/// Diagnostic details of a request, for tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    /// The selection source that produced the anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_trace: Option<String>,

    /// The path of the resolved semantic window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_path: Option<String>,

    /// The detected domain of the window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<MathDomain>,

    /// The ids of the candidates that reached scoring.
    pub candidate_ids: Vec<String>,

    /// The score of the chosen candidate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreBreakdown>,
}

/// The response of one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    /// The terminal state of the request.
    pub status: StepStatus,

    /// The runner outcome, when a rewrite was attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_result: Option<RunOutcome>,

    /// The session history after the request.
    pub history: StepHistory,

    /// The direct conversions offered, when the request ended in a choice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<PrimitiveChoice>>,

    /// Diagnostic details of the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

/// The result of undoing the most recent step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoResult {
    /// The session history after the undo.
    pub history: StepHistory,

    /// The expression the session shows now.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_expression: Option<String>,
}

/// The session-history collaborator. Implementations must provide last-write-wins semantics per
/// session id and serialize concurrent read-modify-write cycles on the same session.
pub trait SessionStore: Send + Sync {
    /// Loads the history of a session, if the session exists.
    fn get_history(&self, session_id: &str) -> Option<StepHistory>;

    /// Stores the history of a session.
    fn update_history(&self, session_id: &str, history: StepHistory);
}

/// A process-local session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, StepHistory>>,
}

impl SessionStore for InMemorySessionStore {
    fn get_history(&self, session_id: &str) -> Option<StepHistory> {
        self.sessions
            .lock()
            .expect("session map lock")
            .get(session_id)
            .cloned()
    }

    fn update_history(&self, session_id: &str, history: StepHistory) {
        self.sessions
            .lock()
            .expect("session map lock")
            .insert(session_id.to_string(), history);
    }
}

fn system_now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Coordinates parsing, selection, matching, scoring, execution and history per request.
pub struct Orchestrator<S = InMemorySessionStore, E = InProcessEngine> {
    registry: Registry,
    runner: PrimitiveRunner<E>,
    store: S,
    clock: fn() -> u64,
}

impl Orchestrator<InMemorySessionStore, InProcessEngine> {
    /// An orchestrator over the in-process engine and a process-local session store.
    pub fn in_memory(registry: Registry) -> Self {
        Self::new(
            registry,
            PrimitiveRunner::in_process(),
            InMemorySessionStore::default(),
        )
    }
}

impl<S: SessionStore, E: RewriteEngine> Orchestrator<S, E> {
    /// Creates an orchestrator from its collaborators.
    pub fn new(registry: Registry, runner: PrimitiveRunner<E>, store: S) -> Self {
        Self {
            registry,
            runner,
            store,
            clock: system_now_millis,
        }
    }

    /// Replaces the clock used to timestamp history entries.
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    /// Runs one request through the state machine.
    pub async fn next_step(&self, request: &StepRequest) -> StepResponse {
        let history = self.fetch_history(request);

        let expr = match parse_latex(&request.latex) {
            Ok(expr) => expr,
            Err(failure) => {
                debug!(session = %request.session_id, error = %failure, "expression did not parse");
                return StepResponse {
                    status: StepStatus::EngineError,
                    engine_result: Some(RunOutcome::Error {
                        error_code: EngineErrorCode::ParseError,
                        message: failure.to_string(),
                    }),
                    history,
                    choices: None,
                    debug_info: None,
                };
            },
        };

        let Some(anchor) = normalize_selection(&expr, &request.selection) else {
            // a click that resolves nowhere proposes nothing
            debug!(session = %request.session_id, "selection resolved to nothing");
            return StepResponse {
                status: StepStatus::NoCandidates,
                engine_result: None,
                history,
                choices: None,
                debug_info: Some(DebugInfo::default()),
            };
        };

        let mut debug_info = DebugInfo {
            selection_trace: Some(anchor.trace.to_string()),
            ..DebugInfo::default()
        };

        let anchored = match get_node_at(&expr, &anchor.path) {
            Ok(node) => node,
            Err(err) => return self.internal_error(history, err.to_string()),
        };

        // a click on a plain integer with no preference becomes a choice between the direct
        // conversions that fit it
        if anchored.is_integer() && request.preferred_primitive.is_none() {
            let choices = self.direct_choices(&anchored);
            if !choices.is_empty() {
                debug!(session = %request.session_id, count = choices.len(), "offering direct conversions");
                return StepResponse {
                    status: StepStatus::Choice,
                    engine_result: None,
                    history,
                    choices: Some(choices),
                    debug_info: Some(debug_info),
                };
            }
        }

        // a direct-execution preference skips matching and scoring entirely
        if let Some(primitive_id) = request.preferred_primitive.as_deref() {
            if self.registry.is_direct(primitive_id) {
                let engine_request = EngineRequest {
                    latex: request.latex.clone(),
                    primitive_ids: vec![primitive_id.to_string()],
                    target_path: Some(anchor.path.clone()),
                };
                let outcome = self.runner.preview_apply(&engine_request).await;
                return self.record_outcome(request, history, outcome, None, None, Some(debug_info));
            }
        }

        let window = match resolve_window(&expr, &anchor) {
            Ok(window) => window,
            Err(err) => return self.internal_error(history, err.to_string()),
        };
        let domain = detect_domain(&window.node);
        debug_info.window_path = Some(window.path.to_string());
        debug_info.domain = Some(domain);

        let mut candidates = build_candidates(&expr, &window, &self.registry, &request.stage);
        // a preference that is not direct-execution only narrows the candidate list
        if let Some(primitive_id) = request.preferred_primitive.as_deref() {
            candidates.retain(|candidate| {
                candidate.primitive_ids.iter().any(|id| id == primitive_id)
            });
        }
        debug_info.candidate_ids = candidates.iter().map(|candidate| candidate.id.clone()).collect();
        debug!(
            session = %request.session_id,
            window = %window.path,
            ?domain,
            candidates = candidates.len(),
            "matched",
        );

        if candidates.is_empty() {
            return StepResponse {
                status: StepStatus::NoCandidates,
                engine_result: None,
                history,
                choices: None,
                debug_info: Some(debug_info),
            };
        }

        match decide(&candidates, &history, &request.policy, Some(&window.path)) {
            Decision::Chosen(scored) => {
                debug_info.score = Some(scored.score);
                let outcome = self.runner.preview_apply(&scored.candidate.engine_request_draft).await;
                self.record_outcome(
                    request,
                    history,
                    outcome,
                    Some(scored.candidate.id.clone()),
                    Some(scored.candidate.invariant_id.clone()),
                    Some(debug_info),
                )
            },
            Decision::NoCandidates => StepResponse {
                status: StepStatus::NoCandidates,
                engine_result: None,
                history,
                choices: None,
                debug_info: Some(debug_info),
            },
            Decision::ScoringFailed { reason } => StepResponse {
                status: StepStatus::EngineError,
                engine_result: Some(RunOutcome::Error {
                    error_code: EngineErrorCode::EngineError,
                    message: reason,
                }),
                history,
                choices: None,
                debug_info: Some(debug_info),
            },
        }
    }

    /// Undoes the most recent step of the session, making the previous result current again.
    pub fn undo(&self, session_id: &str) -> UndoResult {
        let mut history = self.store.get_history(session_id).unwrap_or_default();
        history.undo();
        self.store.update_history(session_id, history.clone());
        UndoResult {
            current_expression: history.current_expression().map(str::to_string),
            history,
        }
    }

    /// Loads the session history, binding it to the request's expression when the session is
    /// fresh.
    fn fetch_history(&self, request: &StepRequest) -> StepHistory {
        let mut history = self
            .store
            .get_history(&request.session_id)
            .unwrap_or_else(|| StepHistory::new(request.expression_id.clone()));
        if history.expression_id.is_empty() {
            history.expression_id = request.expression_id.clone();
        }
        history
    }

    /// The direct conversions that fit the clicked node.
    fn direct_choices(&self, node: &MathExpr) -> Vec<PrimitiveChoice> {
        self.registry
            .direct_primitives()
            .filter(|spec| {
                primitives::lookup(&spec.id)
                    .is_some_and(|primitive| (primitive.apply)(node).is_some())
            })
            .map(|spec| PrimitiveChoice {
                primitive_id: spec.id.clone(),
                label: spec.label.clone(),
            })
            .collect()
    }

    /// Records an executed request: every execution moves the attempt counter, an applied step
    /// also appends its history entry, and the store is updated either way.
    fn record_outcome(
        &self,
        request: &StepRequest,
        mut history: StepHistory,
        outcome: RunOutcome,
        candidate_id: Option<String>,
        invariant_id: Option<String>,
        debug_info: Option<DebugInfo>,
    ) -> StepResponse {
        history.record_attempt();
        let status = match &outcome {
            RunOutcome::Ok { latex_before, latex_after, .. } => {
                history.append_ok(
                    candidate_id,
                    invariant_id,
                    latex_before,
                    latex_after,
                    (self.clock)(),
                );
                StepStatus::StepApplied
            },
            RunOutcome::NoStep { .. } => StepStatus::NoCandidates,
            RunOutcome::Error { .. } => StepStatus::EngineError,
        };
        self.store.update_history(&request.session_id, history.clone());

        StepResponse {
            status,
            engine_result: Some(outcome),
            history,
            choices: None,
            debug_info,
        }
    }

    fn internal_error(&self, history: StepHistory, message: String) -> StepResponse {
        StepResponse {
            status: StepStatus::EngineError,
            engine_result: Some(RunOutcome::Error {
                error_code: EngineErrorCode::EngineError,
                message,
            }),
            history,
            choices: None,
            debug_info: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;
    use crate::runner::{EngineFault, EngineOutput, NoStepReason};
    use async_trait::async_trait;

    fn fixed_clock() -> u64 {
        42
    }

    fn orchestrator() -> Orchestrator {
        Orchestrator::in_memory(Registry::builtin()).with_clock(fixed_clock)
    }

    fn click_root() -> SelectionInput {
        SelectionInput {
            path: Some("root".to_string()),
            ..SelectionInput::default()
        }
    }

    fn request(latex: &str, selection: SelectionInput) -> StepRequest {
        StepRequest {
            session_id: "sess-1".to_string(),
            expression_id: "expr-1".to_string(),
            latex: latex.to_string(),
            selection,
            stage: "intro".to_string(),
            preferred_primitive: None,
            policy: StepPolicy::default(),
        }
    }

    fn applied_latex(response: &StepResponse) -> &str {
        match response.engine_result.as_ref().unwrap() {
            RunOutcome::Ok { latex_after, .. } => latex_after,
            other => panic!("expected an applied step, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn same_denominator_sum_applies_the_add_step() {
        let orchestrator = orchestrator();
        let response = orchestrator.next_step(&request("1/7+3/7", click_root())).await;

        assert_eq!(response.status, StepStatus::StepApplied);
        assert_eq!(applied_latex(&response), r"\frac{4}{7}");

        let debug_info = response.debug_info.unwrap();
        assert_eq!(debug_info.domain, Some(MathDomain::FractionsSameDen));
        assert_eq!(debug_info.candidate_ids, vec!["frac-add-same-den@root".to_string()]);

        assert_eq!(response.history.attempts, 1);
        assert_eq!(response.history.entries.len(), 1);
        assert_eq!(response.history.entries[0].step_id, "step:expr-1:0:42");
        assert_eq!(
            response.history.entries[0].invariant_id.as_deref(),
            Some("frac-add-same-den"),
        );
    }

    #[tokio::test]
    async fn same_denominator_difference_applies_the_sub_step() {
        let orchestrator = orchestrator();
        let response = orchestrator.next_step(&request("5/7-2/7", click_root())).await;

        assert_eq!(response.status, StepStatus::StepApplied);
        assert_eq!(applied_latex(&response), r"\frac{3}{7}");
        assert_eq!(
            response.debug_info.unwrap().candidate_ids,
            vec!["frac-sub-same-den@root".to_string()],
        );
    }

    #[tokio::test]
    async fn different_denominators_never_match_the_same_den_rules() {
        let orchestrator = orchestrator();
        let response = orchestrator.next_step(&request("1/7+2/5", click_root())).await;

        let debug_info = response.debug_info.clone().unwrap();
        assert_eq!(debug_info.domain, Some(MathDomain::FractionsDiffDen));
        assert!(debug_info
            .candidate_ids
            .iter()
            .all(|id| !id.starts_with("frac-add-same-den") && !id.starts_with("frac-sub-same-den")));

        // the offered step rewrites over a common denominator instead
        assert_eq!(response.status, StepStatus::StepApplied);
        assert_eq!(applied_latex(&response), r"\frac{5}{35}+\frac{14}{35}");
    }

    #[tokio::test]
    async fn integer_sums_use_the_integer_rules() {
        let orchestrator = orchestrator();
        let response = orchestrator.next_step(&request("3+5", click_root())).await;

        assert_eq!(response.status, StepStatus::StepApplied);
        assert_eq!(applied_latex(&response), "8");

        let debug_info = response.debug_info.unwrap();
        assert_eq!(debug_info.domain, Some(MathDomain::Integers));
        assert!(debug_info.candidate_ids.contains(&"int-add@root".to_string()));
        assert!(debug_info.candidate_ids.iter().all(|id| !id.contains("frac")));
    }

    #[tokio::test]
    async fn clicking_an_integer_offers_direct_conversions() {
        let orchestrator = orchestrator();
        let selection = SelectionInput {
            path: Some("term[0]".to_string()),
            ..SelectionInput::default()
        };
        let response = orchestrator.next_step(&request("3+5", selection)).await;

        assert_eq!(response.status, StepStatus::Choice);
        let choices = response.choices.unwrap();
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].primitive_id, "integer.to-fraction");
        // nothing was executed
        assert_eq!(response.history.attempts, 0);
        assert_eq!(response.history.entries.len(), 0);
    }

    #[tokio::test]
    async fn preferred_direct_primitive_bypasses_matching() {
        let orchestrator = orchestrator();
        let selection = SelectionInput {
            path: Some("term[0]".to_string()),
            ..SelectionInput::default()
        };
        let mut request = request("3+5", selection);
        request.preferred_primitive = Some("integer.to-fraction".to_string());

        let response = orchestrator.next_step(&request).await;
        assert_eq!(response.status, StepStatus::StepApplied);
        assert_eq!(applied_latex(&response), r"\frac{3}{1}+5");

        // direct executions record no candidate or invariant
        assert_eq!(response.history.entries[0].candidate_id, None);
        assert_eq!(response.history.entries[0].invariant_id, None);
    }

    #[tokio::test]
    async fn preferred_ordinary_primitive_narrows_the_candidates() {
        let orchestrator = orchestrator();

        // the preference matches the only candidate: the step applies
        let mut matching = request("1/7+3/7", click_root());
        matching.preferred_primitive = Some("fraction.add-same-den".to_string());
        let response = orchestrator.next_step(&matching).await;
        assert_eq!(response.status, StepStatus::StepApplied);

        // a preference no candidate references leaves nothing to score
        let mut mismatched = request("1/7+3/7", click_root());
        mismatched.session_id = "sess-2".to_string();
        mismatched.preferred_primitive = Some("fraction.sub-same-den".to_string());
        let response = orchestrator.next_step(&mismatched).await;
        assert_eq!(response.status, StepStatus::NoCandidates);
        assert_eq!(response.history.attempts, 0);
    }

    #[tokio::test]
    async fn parse_failures_surface_as_engine_errors() {
        let orchestrator = orchestrator();
        let response = orchestrator.next_step(&request("1 +", click_root())).await;

        assert_eq!(response.status, StepStatus::EngineError);
        assert!(matches!(
            response.engine_result,
            Some(RunOutcome::Error { error_code: EngineErrorCode::ParseError, .. }),
        ));
        // history is untouched by requests that never execute
        assert_eq!(response.history.attempts, 0);
        assert_eq!(response.history.entries.len(), 0);
    }

    #[tokio::test]
    async fn dead_selections_propose_nothing() {
        let orchestrator = orchestrator();
        let selection = SelectionInput {
            operator_index: Some(99),
            ..SelectionInput::default()
        };
        let response = orchestrator.next_step(&request("1/7+3/7", selection)).await;

        assert_eq!(response.status, StepStatus::NoCandidates);
        assert_eq!(response.engine_result, None);
    }

    #[tokio::test]
    async fn sequential_steps_index_their_history_entries() {
        let orchestrator = orchestrator();

        // add the left pair, add the remaining pair, reduce the result
        let inner_sum = SelectionInput {
            path: Some("term[0]".to_string()),
            ..SelectionInput::default()
        };
        let first = orchestrator.next_step(&request("1/8+3/8+2/8", inner_sum)).await;
        assert_eq!(first.status, StepStatus::StepApplied);
        let after_first = applied_latex(&first).to_string();
        assert_eq!(after_first, r"\frac{4}{8}+2/8");

        let second = orchestrator.next_step(&request(&after_first, click_root())).await;
        assert_eq!(second.status, StepStatus::StepApplied);
        let after_second = applied_latex(&second).to_string();
        assert_eq!(after_second, r"\frac{6}{8}");

        let third = orchestrator.next_step(&request(&after_second, click_root())).await;
        assert_eq!(third.status, StepStatus::StepApplied);
        assert_eq!(applied_latex(&third), r"\frac{3}{4}");

        let step_ids: Vec<_> = third
            .history
            .entries
            .iter()
            .map(|entry| entry.step_id.clone())
            .collect();
        assert_eq!(step_ids, vec![
            "step:expr-1:0:42".to_string(),
            "step:expr-1:1:42".to_string(),
            "step:expr-1:2:42".to_string(),
        ]);
        assert_eq!(third.history.attempts, 3);
    }

    #[tokio::test]
    async fn engine_failures_move_only_the_attempt_counter() {
        struct FailingEngine;

        #[async_trait]
        impl RewriteEngine for FailingEngine {
            async fn rewrite(&self, _: &EngineRequest) -> Result<EngineOutput, EngineFault> {
                Err(EngineFault::Internal("engine unavailable".to_string()))
            }
        }

        let orchestrator = Orchestrator::new(
            Registry::builtin(),
            PrimitiveRunner::new(FailingEngine),
            InMemorySessionStore::default(),
        )
        .with_clock(fixed_clock);

        let response = orchestrator.next_step(&request("1/7+3/7", click_root())).await;
        assert_eq!(response.status, StepStatus::EngineError);
        assert_eq!(response.history.attempts, 1);
        assert_eq!(response.history.entries.len(), 0);
    }

    #[tokio::test]
    async fn no_step_outcomes_count_as_attempts_without_entries() {
        let orchestrator = orchestrator();
        let selection = SelectionInput {
            path: Some("root".to_string()),
            ..SelectionInput::default()
        };
        let mut request = request("3+5", selection);
        // a direct conversion that fits nothing in the expression
        request.preferred_primitive = Some("mixed.to-improper".to_string());

        let response = orchestrator.next_step(&request).await;
        assert_eq!(response.status, StepStatus::NoCandidates);
        assert_eq!(response.engine_result, Some(RunOutcome::NoStep {
            reason: NoStepReason::NoPrimitiveApplicable,
        }));
        assert_eq!(response.history.attempts, 1);
        assert_eq!(response.history.entries.len(), 0);
    }

    #[tokio::test]
    async fn undo_restores_the_previous_expression() {
        let orchestrator = orchestrator();

        // add the fractions, then reduce the result
        let first = orchestrator.next_step(&request("2/8+4/8", click_root())).await;
        let after_first = applied_latex(&first).to_string();
        assert_eq!(after_first, r"\frac{6}{8}");
        let second = orchestrator.next_step(&request(&after_first, click_root())).await;
        assert_eq!(second.history.entries.len(), 2);

        let undone = orchestrator.undo("sess-1");
        assert_eq!(undone.history.entries.len(), 1);
        assert_eq!(undone.current_expression.as_deref(), Some(after_first.as_str()));

        // the store saw the write: a fresh fetch shows one entry
        let undone_again = orchestrator.undo("sess-1");
        assert_eq!(undone_again.history.entries.len(), 0);
        assert_eq!(undone_again.current_expression, None);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let orchestrator = orchestrator();

        let first = orchestrator.next_step(&request("1/7+3/7", click_root())).await;
        assert_eq!(first.history.entries.len(), 1);

        let mut other = request("5/7-2/7", click_root());
        other.session_id = "sess-2".to_string();
        let second = orchestrator.next_step(&other).await;
        assert_eq!(second.history.entries.len(), 1);
        assert_eq!(second.history.entries[0].step_id, "step:expr-1:0:42");
    }
}
