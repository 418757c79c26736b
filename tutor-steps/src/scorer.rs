//! Scores step candidates against history and policy, and picks one.
//!
//! Scoring is a pure function of its inputs: the candidate list, the session history, the policy
//! and the action target. Identical inputs always reproduce the identical choice, and
//! tie-breaking is total — when two candidates score the same, the one earlier in the candidate
//! list wins.

use serde::{Deserialize, Serialize};

use crate::expr::path::AstPath;
use crate::history::{EntryStatus, StepHistory};
use crate::matcher::StepCandidate;

/// How fine-grained the suggested steps should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Prefer the smallest possible steps.
    Fine,

    /// No preference.
    Medium,

    /// Prefer steps that combine several rewrites.
    Coarse,
}

/// The tunable decision policy of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepPolicy {
    /// How fine-grained the suggested steps should be.
    pub granularity: Granularity,

    /// Prefer candidates that apply exactly where the student clicked.
    pub prefer_clicked_region: bool,

    /// Allow candidates that apply somewhere other than the clicked region.
    pub allow_cross_region_steps: bool,

    /// Allow candidates that apply more than one primitive at once.
    pub allow_multi_primitive_steps: bool,

    /// The maximum number of applied steps per session.
    pub max_steps_in_session: usize,
}

impl Default for StepPolicy {
    fn default() -> Self {
        Self {
            granularity: Granularity::Medium,
            prefer_clicked_region: true,
            allow_cross_region_steps: true,
            allow_multi_primitive_steps: true,
            max_steps_in_session: 50,
        }
    }
}

/// The additive score of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// The candidate's base priority.
    pub base: i32,

    /// Bonus for applying exactly at the action target.
    pub directness: i32,

    /// Bonus or penalty from the granularity preference.
    pub granularity: i32,

    /// Penalty for repeating the invariant of the previous step.
    pub repetition: i32,

    /// The sum of all components.
    pub total: i32,
}

/// A candidate together with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    /// The chosen candidate.
    pub candidate: StepCandidate,

    /// How the choice scored.
    pub score: ScoreBreakdown,
}

/// The result of a decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// One candidate was chosen.
    Chosen(Box<ScoredCandidate>),

    /// No candidate survived the policy gates.
    NoCandidates,

    /// Scoring could not run at all.
    ScoringFailed {
        /// Why scoring failed.
        reason: String,
    },
}

/// Scores the candidates and picks one.
///
/// Hard policy gates run first: the session step budget fails scoring outright, and the
/// multi-primitive and cross-region gates drop candidates before any score is computed. The
/// surviving candidate with the highest total wins; ties resolve to the earliest candidate.
pub fn decide(
    candidates: &[StepCandidate],
    history: &StepHistory,
    policy: &StepPolicy,
    action_target: Option<&AstPath>,
) -> Decision {
    if history.ok_steps() >= policy.max_steps_in_session {
        return Decision::ScoringFailed {
            reason: format!(
                "the session step budget of {} is exhausted",
                policy.max_steps_in_session,
            ),
        };
    }

    let last_invariant = history
        .entries
        .iter()
        .rev()
        .find(|entry| entry.status == EntryStatus::Ok)
        .and_then(|entry| entry.invariant_id.as_deref());

    let mut best: Option<ScoredCandidate> = None;
    for candidate in candidates {
        if !policy.allow_multi_primitive_steps && candidate.primitive_ids.len() > 1 {
            continue;
        }
        if !policy.allow_cross_region_steps {
            if let Some(target) = action_target {
                if candidate.selection.target_path != *target {
                    continue;
                }
            }
        }

        let score = score_candidate(candidate, policy, action_target, last_invariant);
        let replace = best
            .as_ref()
            .map_or(true, |current| score.total > current.score.total);
        if replace {
            best = Some(ScoredCandidate {
                candidate: candidate.clone(),
                score,
            });
        }
    }

    match best {
        Some(scored) => Decision::Chosen(Box::new(scored)),
        None => Decision::NoCandidates,
    }
}

fn score_candidate(
    candidate: &StepCandidate,
    policy: &StepPolicy,
    action_target: Option<&AstPath>,
    last_invariant: Option<&str>,
) -> ScoreBreakdown {
    let base = candidate.priority;

    let directness = if policy.prefer_clicked_region
        && action_target == Some(&candidate.selection.target_path)
    {
        25
    } else {
        0
    };

    let granularity = match policy.granularity {
        Granularity::Fine if candidate.primitive_ids.len() == 1 => 10,
        Granularity::Coarse if candidate.primitive_ids.len() > 1 => 10,
        _ => 0,
    };

    let repetition = if last_invariant == Some(candidate.invariant_id.as_str()) {
        -15
    } else {
        0
    };

    ScoreBreakdown {
        base,
        directness,
        granularity,
        repetition,
        total: base + directness + granularity + repetition,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;
    use crate::expr::parse_latex;
    use crate::matcher::{build_candidates, resolve_window, SemanticWindow};
    use crate::registry::Registry;
    use crate::selection::{normalize_selection, SelectionInput};

    fn candidates_and_window(latex: &str) -> (Vec<StepCandidate>, SemanticWindow) {
        let expr = parse_latex(latex).unwrap();
        let anchor = normalize_selection(&expr, &SelectionInput {
            path: Some("root".to_string()),
            ..SelectionInput::default()
        })
        .unwrap();
        let window = resolve_window(&expr, &anchor).unwrap();
        let candidates = build_candidates(&expr, &window, &Registry::builtin(), "intro");
        (candidates, window)
    }

    #[test]
    fn chooses_deterministically() {
        let (candidates, window) = candidates_and_window("1/7 + 3/7");
        let history = StepHistory::new("expr-1");
        let policy = StepPolicy::default();

        let first = decide(&candidates, &history, &policy, Some(&window.path));
        let second = decide(&candidates, &history, &policy, Some(&window.path));
        assert_eq!(first, second);

        let Decision::Chosen(scored) = first else {
            panic!("expected a chosen candidate");
        };
        assert_eq!(scored.candidate.invariant_id, "frac-add-same-den");
        assert_eq!(scored.score.total, scored.score.base + scored.score.directness + scored.score.granularity + scored.score.repetition);
        // the candidate applies exactly at the clicked window
        assert_eq!(scored.score.directness, 25);
    }

    #[test]
    fn empty_candidate_lists_are_not_an_error() {
        let history = StepHistory::new("expr-1");
        let decision = decide(&[], &history, &StepPolicy::default(), None);
        assert_eq!(decision, Decision::NoCandidates);
    }

    #[test]
    fn ties_resolve_to_the_earliest_candidate() {
        let (mut candidates, window) = candidates_and_window("1/7 + 3/7");
        // duplicate the only candidate under a different rule id; scores are identical
        let mut clone = candidates[0].clone();
        clone.invariant_id = "frac-add-same-den-copy".to_string();
        clone.id = format!("{}@copy", clone.invariant_id);
        candidates.push(clone);

        let history = StepHistory::new("expr-1");
        let decision = decide(&candidates, &history, &StepPolicy::default(), Some(&window.path));
        let Decision::Chosen(scored) = decision else {
            panic!("expected a chosen candidate");
        };
        assert_eq!(scored.candidate.invariant_id, "frac-add-same-den");
    }

    #[test]
    fn repeating_the_last_invariant_is_penalized() {
        let (candidates, window) = candidates_and_window("1/7 + 3/7");
        let mut history = StepHistory::new("expr-1");
        history.record_attempt();
        history.append_ok(
            Some(candidates[0].id.clone()),
            Some("frac-add-same-den".to_string()),
            "1/7+3/7",
            r"\frac{4}{7}",
            1_000,
        );

        let decision = decide(&candidates, &history, &StepPolicy::default(), Some(&window.path));
        let Decision::Chosen(scored) = decision else {
            panic!("expected a chosen candidate");
        };
        assert_eq!(scored.score.repetition, -15);
    }

    #[test]
    fn multi_primitive_candidates_can_be_gated_off() {
        let (mut candidates, window) = candidates_and_window("1/7 + 3/7");
        candidates[0].primitive_ids.push("fraction.reduce".to_string());

        let policy = StepPolicy {
            allow_multi_primitive_steps: false,
            ..StepPolicy::default()
        };
        let history = StepHistory::new("expr-1");
        let decision = decide(&candidates, &history, &policy, Some(&window.path));
        assert_eq!(decision, Decision::NoCandidates);
    }

    #[test]
    fn cross_region_candidates_can_be_gated_off() {
        let (candidates, _) = candidates_and_window("1/7 + 3/7");
        let elsewhere: AstPath = "term[1]".parse().unwrap();

        let policy = StepPolicy {
            allow_cross_region_steps: false,
            ..StepPolicy::default()
        };
        let history = StepHistory::new("expr-1");
        let decision = decide(&candidates, &history, &policy, Some(&elsewhere));
        assert_eq!(decision, Decision::NoCandidates);
    }

    #[test]
    fn exhausted_step_budget_fails_scoring() {
        let (candidates, window) = candidates_and_window("1/7 + 3/7");
        let mut history = StepHistory::new("expr-1");
        history.record_attempt();
        history.append_ok(None, None, "1/7+3/7", r"\frac{4}{7}", 1_000);

        let policy = StepPolicy {
            max_steps_in_session: 1,
            ..StepPolicy::default()
        };
        let decision = decide(&candidates, &history, &policy, Some(&window.path));
        assert!(matches!(decision, Decision::ScoringFailed { .. }));
    }

    #[test]
    fn fine_granularity_rewards_single_primitive_steps() {
        let (candidates, window) = candidates_and_window("1/7 + 3/7");
        let policy = StepPolicy {
            granularity: Granularity::Fine,
            ..StepPolicy::default()
        };
        let history = StepHistory::new("expr-1");
        let Decision::Chosen(scored) = decide(&candidates, &history, &policy, Some(&window.path)) else {
            panic!("expected a chosen candidate");
        };
        assert_eq!(scored.score.granularity, 10);
    }
}
