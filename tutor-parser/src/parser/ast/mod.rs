//! The abstract syntax tree produced by the parser.

pub mod binary;
pub mod expr;
pub mod fraction;
pub mod literal;
pub mod mixed;
pub mod paren;
pub mod unary;

pub use binary::Binary;
pub use expr::{Expr, Primary};
pub use fraction::Frac;
pub use literal::{LitFloat, LitInt, LitSym, Literal};
pub use mixed::Mixed;
pub use paren::Paren;
pub use unary::Unary;
