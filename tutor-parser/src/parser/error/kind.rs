use tutor_attrs::ErrorKind;
use tutor_error::ErrorKind;
use crate::tokenizer::TokenKind;

/// An intentionally useless error. This should only be used for non-fatal errors, as it contains
/// no useful information.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "an internal non-fatal error occurred while parsing",
    label = "here",
    help = "you should never see this error; please report this as a bug"
)]
pub struct NonFatal;

/// The end of the source code was reached unexpectedly.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected end of input",
    label = "you might need to add another expression here",
)]
pub struct UnexpectedEof;

/// The end of the source code was expected, but something else was found.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "expected end of input",
    label = "I could not understand the remaining expression here",
)]
pub struct ExpectedEof;

/// An unexpected token was encountered.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected token",
    label = format!("expected one of: {}", expected.iter().map(|t| format!("{:?}", t)).collect::<Vec<_>>().join(", ")),
    help = format!("found {:?}", found),
)]
pub struct UnexpectedToken {
    /// The token(s) that were expected.
    pub expected: &'static [TokenKind],

    /// The token that was found.
    pub found: TokenKind,
}

/// A command that is not part of the expression grammar was encountered.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("unknown command: `{}`", name),
    label = "this command is not supported",
)]
pub struct UnknownCommand {
    /// The name of the command, including the leading backslash.
    pub name: String,
}

/// A parenthesis was not closed.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unclosed parenthesis",
    label = "this parenthesis is not closed",
    help = if *opening {
        "add a closing parenthesis `)` somewhere after this"
    } else {
        "add an opening parenthesis `(` somewhere before this"
    },
)]
pub struct UnclosedParenthesis {
    /// Whether the parenthesis was an opening parenthesis `(`. Otherwise, the parenthesis was a
    /// closing parenthesis `)`.
    pub opening: bool,
}

/// There was no expression inside a pair of parentheses.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "missing expression inside parenthesis",
    label = "add an expression here",
)]
pub struct EmptyParenthesis;

/// A fraction argument brace was not closed.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unclosed brace in fraction argument",
    label = "this brace is not closed",
    help = "fraction arguments are written as `\\frac{numerator}{denominator}`",
)]
pub struct UnclosedBrace;

/// A `\left(` delimiter was not matched by `\right)`.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unmatched `\\left(` delimiter",
    label = "this delimiter is not closed",
    help = "add `\\right)` somewhere after this",
)]
pub struct UnmatchedLeftDelimiter;

/// A number literal could not be converted into its numeric value.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("invalid number literal: `{}`", lexeme),
    label = "this number cannot be represented",
)]
pub struct InvalidNumber {
    /// The raw lexeme of the number literal.
    pub lexeme: String,
}
