//! The append-only step history of a session.
//!
//! Every applied step appends one entry; nothing ever edits an existing entry. The single
//! exception is [`StepHistory::undo`], which pops the most recent entry, making the previous
//! entry's result the current expression again. Requests that execute but fail to apply a step
//! only move the attempt counter.

use serde::{Deserialize, Serialize};

/// The outcome recorded in a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    /// A step was applied.
    #[serde(rename = "ok")]
    Ok,

    /// The engine ran but nothing applied.
    #[serde(rename = "noStep")]
    NoStep,

    /// The request failed.
    #[serde(rename = "error")]
    Error,
}

/// One recorded step of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepHistoryEntry {
    /// The id of the step, in the form `step:{expressionId}:{stepIndex}:{timestamp}`.
    pub step_id: String,

    /// The id of the expression the step belongs to.
    pub expression_id: String,

    /// The id of the candidate that was applied, when the step came out of matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,

    /// The id of the invariant rule behind the candidate, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invariant_id: Option<String>,

    /// When the step was recorded, in milliseconds since the epoch.
    pub timestamp: u64,

    /// The outcome recorded in the entry.
    pub status: EntryStatus,

    /// The expression before the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_before: Option<String>,

    /// The expression after the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_after: Option<String>,
}

/// The step history of one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepHistory {
    /// The id of the expression the history belongs to.
    pub expression_id: String,

    /// How many requests reached execution, including those that applied nothing.
    pub attempts: u32,

    /// The applied steps, oldest first.
    pub entries: Vec<StepHistoryEntry>,
}

/// Formats a step id. An empty expression id falls back to `unknown`, and a negative step index
/// clamps to zero.
pub fn format_step_id(expression_id: &str, step_index: i64, timestamp: u64) -> String {
    let expression_id = if expression_id.is_empty() {
        "unknown"
    } else {
        expression_id
    };
    format!("step:{}:{}:{}", expression_id, step_index.max(0), timestamp)
}

impl StepHistory {
    /// Creates an empty history for the expression.
    pub fn new(expression_id: impl Into<String>) -> Self {
        Self {
            expression_id: expression_id.into(),
            attempts: 0,
            entries: Vec::new(),
        }
    }

    /// Counts the applied steps.
    pub fn ok_steps(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.status == EntryStatus::Ok)
            .count()
    }

    /// The expression the session currently shows: the result of the most recent applied step.
    pub fn current_expression(&self) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.status == EntryStatus::Ok)
            .and_then(|entry| entry.expression_after.as_deref())
    }

    /// Records that a request reached execution.
    pub fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    /// Appends an applied step and returns the new entry.
    pub fn append_ok(
        &mut self,
        candidate_id: Option<String>,
        invariant_id: Option<String>,
        expression_before: &str,
        expression_after: &str,
        timestamp: u64,
    ) -> &StepHistoryEntry {
        let step_index = self.entries.len() as i64;
        let entry = StepHistoryEntry {
            step_id: format_step_id(&self.expression_id, step_index, timestamp),
            expression_id: self.expression_id.clone(),
            candidate_id,
            invariant_id,
            timestamp,
            status: EntryStatus::Ok,
            expression_before: Some(expression_before.to_string()),
            expression_after: Some(expression_after.to_string()),
        };
        self.entries.push(entry);
        self.entries.last().expect("an entry was just pushed")
    }

    /// Pops the most recent entry. The previous entry's result becomes the current expression
    /// again.
    pub fn undo(&mut self) -> Option<StepHistoryEntry> {
        self.entries.pop()
    }
}
