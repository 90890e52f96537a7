//! Expression AST produced by the parser.
//!
//! Nodes are plain data: immutable after parsing, structurally comparable,
//! and independent of any runtime context. Identical input strings always
//! parse to structurally identical trees. Name resolution (registry rules,
//! the `obj`/`user` root set) is the evaluator's job, not the parser's.

use serde::Serialize;

/// Literal value as written in the expression source.
///
/// Decimal literals are kept as strings to preserve exact representation;
/// the evaluator converts them to its numeric type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(String),
    Bool(bool),
    Null,
}

/// Comparison operator. All six share one precedence level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CmpOp {
    /// Source spelling, for error messages.
    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
            CmpOp::Ge => ">=",
            CmpOp::Le => "<=",
        }
    }
}

/// A parsed permission expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(Literal),
    /// Bracketed list of elements, e.g. the right-hand side of `in`.
    List(Vec<Expr>),
    /// Bare identifier -- a registry rule name, or one of the reserved
    /// roots `obj`/`user`. Resolved at evaluation time.
    Ident(String),
    /// Dotted attribute path. The parser is root-agnostic; the evaluator
    /// enforces that `root` is `obj` or `user`.
    Path { root: String, segments: Vec<String> },
    Compare {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    In {
        needle: Box<Expr>,
        haystack: Box<Expr>,
    },
}
