//! Expression evaluation against a principal/entity context.
//!
//! Evaluation is synchronous and pure with respect to the AST. The only
//! external effects are rule predicates (externally supplied, may log or
//! read state) and entity field resolution. `and`/`or` short-circuiting
//! is a correctness requirement, not an optimization: predicates are
//! observable, and the guard's ALL/ANY semantics rely on the same
//! contract.

use palisade_core::ast::{CmpOp, Expr, Literal};
use rust_decimal::Decimal;

use crate::entity::EntityRef;
use crate::registry;
use crate::values::Value;

/// The principal/entity pair a check is evaluated against. Constructed
/// fresh per invocation and never shared across calls.
#[derive(Clone)]
pub struct EvalContext {
    pub principal: EntityRef,
    pub entity: Option<EntityRef>,
}

impl EvalContext {
    pub fn new(principal: EntityRef, entity: Option<EntityRef>) -> Self {
        EvalContext { principal, entity }
    }
}

/// Evaluation defects. These indicate a mistake in rule authoring or a
/// data-shape mismatch; they propagate to the caller as errors and are
/// never converted to a silent `false`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// A bare identifier named no registered rule.
    #[error("rule not found: '{name}' is not registered")]
    RuleNotFound { name: String },

    /// An `obj` reference was evaluated with no resolved entity.
    #[error("cannot access object attribute: no entity in context")]
    MissingEntity,

    /// A path segment could not be resolved with segments remaining.
    #[error("cannot resolve attribute '{segment}' in path '{path}'")]
    AttributeResolution { path: String, segment: String },

    /// An attribute path rooted at something other than `obj` or `user`.
    #[error("unknown path root '{root}': attribute paths must start with 'obj' or 'user'")]
    UnknownRoot { root: String },

    /// Ordering comparison between incompatible kinds.
    #[error("cannot compare {left} {op} {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    /// The right-hand side of `in` did not evaluate to a list.
    #[error("'in' requires a list on the right-hand side, got {got}")]
    NotAList { got: &'static str },

    /// A decimal literal the numeric type cannot represent.
    #[error("invalid numeric literal '{literal}'")]
    InvalidNumber { literal: String },
}

/// Evaluate an expression to a boolean verdict.
///
/// The top-level result is coerced by truthiness, the same coercion
/// `and`/`or`/`not` apply internally.
pub fn evaluate(expr: &Expr, ctx: &EvalContext) -> Result<bool, EvalError> {
    Ok(eval_value(expr, ctx)?.is_truthy())
}

fn eval_value(expr: &Expr, ctx: &EvalContext) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(lit) => eval_literal(lit),

        Expr::List(items) => {
            let values: Result<Vec<Value>, EvalError> =
                items.iter().map(|item| eval_value(item, ctx)).collect();
            Ok(Value::List(values?))
        }

        Expr::Ident(name) => eval_ident(name, ctx),

        Expr::Path { root, segments } => eval_path(root, segments, ctx),

        Expr::Compare { op, left, right } => {
            let lhs = eval_value(left, ctx)?;
            let rhs = eval_value(right, ctx)?;
            eval_compare(*op, &lhs, &rhs)
        }

        Expr::And(left, right) => {
            // Short-circuit: the right side must not be evaluated when
            // the left is falsy.
            if !eval_value(left, ctx)?.is_truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval_value(right, ctx)?.is_truthy()))
        }

        Expr::Or(left, right) => {
            if eval_value(left, ctx)?.is_truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval_value(right, ctx)?.is_truthy()))
        }

        Expr::Not(operand) => Ok(Value::Bool(!eval_value(operand, ctx)?.is_truthy())),

        Expr::In { needle, haystack } => {
            // Both sides evaluate fully; membership has no short-circuit.
            let needle = eval_value(needle, ctx)?;
            let haystack = eval_value(haystack, ctx)?;
            match haystack {
                Value::List(items) => Ok(Value::Bool(items.iter().any(|item| *item == needle))),
                other => Err(EvalError::NotAList {
                    got: other.type_name(),
                }),
            }
        }
    }
}

fn eval_literal(lit: &Literal) -> Result<Value, EvalError> {
    match lit {
        Literal::Str(s) => Ok(Value::Str(s.clone())),
        Literal::Int(n) => Ok(Value::Int(*n)),
        Literal::Float(s) => {
            let d: Decimal = s.parse().map_err(|_| EvalError::InvalidNumber {
                literal: s.clone(),
            })?;
            Ok(Value::Decimal(d))
        }
        Literal::Bool(b) => Ok(Value::Bool(*b)),
        Literal::Null => Ok(Value::Null),
    }
}

/// Bare identifier resolution. `user` and `obj` are reserved roots and
/// win over registry rules of the same name; anything else is a registry
/// lookup, and an unknown name is an error, never a silent false.
fn eval_ident(name: &str, ctx: &EvalContext) -> Result<Value, EvalError> {
    match name {
        "user" => Ok(Value::Entity(ctx.principal.clone())),
        "obj" => match &ctx.entity {
            Some(entity) => Ok(Value::Entity(entity.clone())),
            None => Err(EvalError::MissingEntity),
        },
        _ => match registry::get(name) {
            Some(rule) => Ok(Value::Bool(
                rule.check(&ctx.principal, ctx.entity.as_ref()),
            )),
            None => Err(EvalError::RuleNotFound {
                name: name.to_owned(),
            }),
        },
    }
}

fn eval_path(root: &str, segments: &[String], ctx: &EvalContext) -> Result<Value, EvalError> {
    let mut current = match root {
        "user" => Value::Entity(ctx.principal.clone()),
        "obj" => match &ctx.entity {
            Some(entity) => Value::Entity(entity.clone()),
            None => return Err(EvalError::MissingEntity),
        },
        _ => {
            return Err(EvalError::UnknownRoot {
                root: root.to_owned(),
            })
        }
    };

    let full_path = || {
        let mut p = root.to_owned();
        for seg in segments {
            p.push('.');
            p.push_str(seg);
        }
        p
    };

    for segment in segments {
        // Only entities have fields. Absent and explicit-null fields both
        // resolve to Null, so a dangling path errors at the segment that
        // cannot be accessed, and absence at the final segment surfaces
        // as the Null sentinel.
        let entity = match &current {
            Value::Entity(e) => e.clone(),
            _ => {
                return Err(EvalError::AttributeResolution {
                    path: full_path(),
                    segment: segment.clone(),
                })
            }
        };
        current = entity.field(segment).unwrap_or(Value::Null);
    }

    Ok(current)
}

fn eval_compare(op: CmpOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    match op {
        CmpOp::Eq => Ok(Value::Bool(lhs == rhs)),
        CmpOp::Ne => Ok(Value::Bool(lhs != rhs)),
        CmpOp::Gt | CmpOp::Lt | CmpOp::Ge | CmpOp::Le => {
            let ordering = lhs
                .partial_cmp_values(rhs)
                .ok_or_else(|| EvalError::TypeMismatch {
                    op: op.symbol(),
                    left: lhs.type_name(),
                    right: rhs.type_name(),
                })?;
            let result = match op {
                CmpOp::Gt => ordering.is_gt(),
                CmpOp::Lt => ordering.is_lt(),
                CmpOp::Ge => ordering.is_ge(),
                CmpOp::Le => ordering.is_le(),
                _ => unreachable!(),
            };
            Ok(Value::Bool(result))
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
