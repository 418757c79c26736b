//! Contains the common [`ErrorKind`] trait used by all errors to display user-facing error
//! messages.
//!
//! An error kind carries a plain one-line `message` (machine-consumable, used by callers that
//! surface parse failures as structured data) and a `label` pointing at the offending region of
//! source code. [`ErrorKind::build_report`] combines the two into a rich [`ariadne`] report for
//! terminal display.

use ariadne::{Color, Label, Report, ReportKind};
use std::{any::Any, fmt::Debug, ops::Range};

/// The color to use to highlight expressions.
pub const EXPR: Color = Color::RGB(52, 235, 152);

/// Represents any kind of error that can occur during some operation.
pub trait ErrorKind: Debug + Send {
    /// Returns the error as a [`&dyn Any`](Any), enabling callers to downcast to the concrete
    /// kind.
    fn as_any(&self) -> &dyn Any;

    /// The message displayed at the top of the error report.
    fn message(&self) -> String;

    /// The text of the label that points at the span the error originated from.
    fn label(&self) -> String;

    /// Optional help text describing what the user can do to fix the error.
    fn help(&self) -> Option<String> {
        None
    }

    /// Builds the report for this error.
    fn build_report<'a>(
        &self,
        src_id: &'a str,
        spans: &[Range<usize>],
    ) -> Report<(&'a str, Range<usize>)> {
        let offset = spans.first().map_or(0, |span| span.start);
        let mut builder = Report::build(ReportKind::Error, src_id, offset)
            .with_message(self.message())
            .with_labels(
                spans
                    .iter()
                    .map(|span| {
                        Label::new((src_id, span.clone()))
                            .with_color(EXPR)
                            .with_message(self.label())
                    })
                    .collect::<Vec<_>>(),
            );

        if let Some(help) = self.help() {
            builder.set_help(help);
        }

        builder.finish()
    }
}
