//! Parser for the arithmetic expressions handled by the step tutor.
//!
//! The input language is a constrained arithmetic subset of LaTeX: integers, decimals, bare
//! variables, fractions written as `\frac{..}{..}`, mixed numbers written as
//! `whole numerator/denominator` (with a mandatory single space), parentheses (optionally sized
//! with `\left(` / `\right)`), and the operators `+`, `-`, `*`, `/`, `:`, `\cdot`, `\times` and
//! `\div`.
//!
//! Parsing happens in two stages. The [`tokenizer`] turns the source string into a flat stream of
//! tokens, and the [`parser`] assembles those tokens into an abstract syntax tree of
//! [`Expr`](parser::ast::Expr) nodes. Parse failures are reported as structured
//! [`Error`](parser::error::Error) values carrying the offending spans; they never panic.

pub mod parser;
pub mod tokenizer;
