//! Suggests and applies single teaching steps over arithmetic expressions.
//!
//! A *teaching step* is one invariant-preserving transformation of an expression — adding two
//! same-denominator fractions, combining two integers, reducing a fraction — chosen from where
//! the student clicked on the rendered formula. This crate is the decision pipeline that turns
//! `(expression text, selection)` into a chosen, applicable transformation:
//!
//! 1. [`expr`] parses the text into a normalized tree, addresses nodes by path, and serializes
//!    trees back to LaTeX.
//! 2. [`selection`] collapses the heterogeneous click data into one canonical anchor.
//! 3. [`registry`] holds the validated catalog of rewrite primitives and invariant rules.
//! 4. [`matcher`] resolves the semantic window around the anchor, detects its domain, and builds
//!    one step candidate per matching rule.
//! 5. [`scorer`] scores the candidates against history and policy and picks one.
//! 6. [`runner`] applies the winning primitives through the preview-apply contract of
//!    [`primitives`].
//! 7. [`history`] records applied steps append-only, with undo.
//! 8. [`orchestrator`] is the state machine driving one request through all of the above.
//!
//! Parsing, navigation, matching and scoring are pure, synchronous computations; independent
//! requests can run concurrently without shared state. The only mutable resource is the session
//! history behind the [`orchestrator::SessionStore`] trait, which the orchestrator reads and
//! writes once per request.
//!
//! ```
//! use tutor_steps::orchestrator::{Orchestrator, StepRequest};
//! use tutor_steps::registry::Registry;
//! use tutor_steps::selection::SelectionInput;
//!
//! # async fn demo() {
//! let orchestrator = Orchestrator::in_memory(Registry::builtin());
//! let response = orchestrator
//!     .next_step(&StepRequest {
//!         session_id: "sess-1".to_string(),
//!         expression_id: "expr-1".to_string(),
//!         latex: "1/7+3/7".to_string(),
//!         selection: SelectionInput {
//!             path: Some("root".to_string()),
//!             ..SelectionInput::default()
//!         },
//!         stage: "intro".to_string(),
//!         preferred_primitive: None,
//!         policy: Default::default(),
//!     })
//!     .await;
//! # }
//! ```

pub mod expr;
pub mod history;
pub mod matcher;
pub mod orchestrator;
pub mod primitives;
pub mod registry;
pub mod runner;
pub mod scorer;
pub mod selection;
