//! Palisade expression language core -- tokenizer, parser, and AST for
//! permission expressions such as:
//!
//! ```text
//! obj.status == "published" or obj.author == user
//! ```
//!
//! This crate turns expression text into an immutable [`Expr`] tree and
//! nothing more. Evaluation against a principal/entity context, rule
//! registry lookup, and guard dispatch live in `palisade-eval`.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{CmpOp, Expr, Literal};
pub use error::SyntaxError;
pub use parser::parse_expression;
