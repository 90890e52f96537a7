//! Guard dispatcher -- the state machine above the evaluator.
//!
//! A protected call-site builds one [`GuardSpec`] (checks parsed eagerly,
//! so a malformed expression fails at construction, not at first use) and
//! wraps it in a [`Guard`] together with its collaborators. Every
//! invocation then runs the same pipeline: resolve the protected entity,
//! build a fresh evaluation context, apply the combinator in declaration
//! order, and allow or deny.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use palisade_core::{parse_expression, Expr, SyntaxError};
use serde::Serialize;

use crate::entity::{EntityFetcher, EntityId, EntityRef};
use crate::evaluator::{evaluate, EvalContext, EvalError};
use crate::trace::TraceSink;
use crate::values::Value;

/// Caller-supplied arguments for one invocation of a protected call-site.
/// The entity lookup value is read from here, and the resolved entity is
/// injected back under the spec's `inject_as` name.
pub type Args = HashMap<String, Value>;

/// Policy for aggregating multiple checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// One check; its result is the verdict.
    Single,
    /// Conjunction, fail-fast at the first false check.
    All,
    /// Disjunction, succeed-fast at the first true check.
    Any,
}

/// One check: a rule name or an inline expression. Both parse through
/// the same grammar -- a bare rule name is the one-identifier expression.
#[derive(Debug, Clone)]
pub struct Check {
    label: String,
    expr: Expr,
}

impl Check {
    fn parse(text: &str) -> Result<Self, SyntaxError> {
        Ok(Check {
            label: text.to_owned(),
            expr: parse_expression(text)?,
        })
    }

    /// The check's source text, used in denials and trace records.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Lookup recipe for the protected entity: take `fetch_key` from the
/// caller's arguments and fetch the `kind` whose `lookup_field` equals
/// that value. Both keys default to the primary identifier.
#[derive(Debug, Clone)]
pub struct EntityLookup {
    pub kind: String,
    pub fetch_key: String,
    pub lookup_field: String,
}

impl EntityLookup {
    pub fn new(kind: impl Into<String>) -> Self {
        EntityLookup {
            kind: kind.into(),
            fetch_key: "pk".to_owned(),
            lookup_field: "pk".to_owned(),
        }
    }

    pub fn fetch_key(mut self, key: impl Into<String>) -> Self {
        self.fetch_key = key.into();
        self
    }

    pub fn lookup_field(mut self, field: impl Into<String>) -> Self {
        self.lookup_field = field.into();
        self
    }
}

/// Declaration of a protected call-site: checks, combinator, optional
/// entity lookup, optional injection binding. Built once, reused across
/// every invocation.
#[derive(Debug, Clone)]
pub struct GuardSpec {
    checks: Vec<Check>,
    combinator: Combinator,
    lookup: Option<EntityLookup>,
    inject_as: Option<String>,
}

impl GuardSpec {
    /// A single rule name or expression.
    pub fn single(check: &str) -> Result<Self, SyntaxError> {
        Ok(GuardSpec {
            checks: vec![Check::parse(check)?],
            combinator: Combinator::Single,
            lookup: None,
            inject_as: None,
        })
    }

    /// Conjunction of checks, evaluated in declaration order.
    pub fn all(checks: &[&str]) -> Result<Self, SyntaxError> {
        Ok(GuardSpec {
            checks: Self::parse_checks(checks)?,
            combinator: Combinator::All,
            lookup: None,
            inject_as: None,
        })
    }

    /// Disjunction of checks, evaluated in declaration order.
    pub fn any(checks: &[&str]) -> Result<Self, SyntaxError> {
        Ok(GuardSpec {
            checks: Self::parse_checks(checks)?,
            combinator: Combinator::Any,
            lookup: None,
            inject_as: None,
        })
    }

    fn parse_checks(checks: &[&str]) -> Result<Vec<Check>, SyntaxError> {
        if checks.is_empty() {
            return Err(SyntaxError::new("guard requires at least one check"));
        }
        checks.iter().map(|text| Check::parse(text)).collect()
    }

    pub fn with_lookup(mut self, lookup: EntityLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn inject_as(mut self, name: impl Into<String>) -> Self {
        self.inject_as = Some(name.into());
        self
    }
}

/// A successful evaluation that resolved to deny. Carries enough context
/// for diagnostics without revealing whether an unauthorized entity
/// exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    /// Label of the check that failed (ALL: the first false check;
    /// ANY: the last check evaluated).
    pub failed_check: String,
    pub principal: EntityId,
    pub entity: Option<EntityId>,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity {
            Some(entity) => write!(
                f,
                "user '{}' does not have permission '{}' for object '{}'",
                self.principal, self.failed_check, entity
            ),
            None => write!(
                f,
                "user '{}' does not have permission '{}'",
                self.principal, self.failed_check
            ),
        }
    }
}

impl std::error::Error for Denial {}

/// Outcome of a guard check that did not allow. A caller sees exactly
/// three outcomes: `Ok` (proceed, entity possibly injected), `Denied`
/// (one structured rejection), or `Eval` (a defect in rule authoring or
/// data shape -- never converted to a denial).
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error(transparent)]
    Denied(#[from] Denial),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// A guard spec bound to its collaborators. One fixed pipeline,
/// independent of the shape of whatever it protects.
pub struct Guard {
    spec: GuardSpec,
    fetcher: Option<Arc<dyn EntityFetcher>>,
    trace: Option<Arc<dyn TraceSink>>,
}

impl Guard {
    pub fn new(spec: GuardSpec) -> Self {
        Guard {
            spec,
            fetcher: None,
            trace: None,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn EntityFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_trace(mut self, trace: Arc<dyn TraceSink>) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Run the guard for one invocation.
    ///
    /// On allow, the resolved entity is inserted into `args` under the
    /// spec's `inject_as` name (when both are present) so the protected
    /// call does not fetch it a second time.
    pub fn check(&self, principal: &EntityRef, args: &mut Args) -> Result<(), GuardError> {
        // Entity resolution. Not-found, a missing fetch key, and backend
        // failures all collapse to "absent": the caller must not be able
        // to distinguish a missing object from a denied one.
        let entity = match &self.spec.lookup {
            Some(lookup) => match self.resolve_entity(lookup, args) {
                Some(entity) => Some(entity),
                None => {
                    let denial = Denial {
                        failed_check: self.spec.checks[0].label.clone(),
                        principal: principal.ident(),
                        entity: None,
                    };
                    tracing::debug!(
                        target: "palisade",
                        principal = %denial.principal,
                        "entity not resolved; denied"
                    );
                    return Err(denial.into());
                }
            },
            None => None,
        };

        let ctx = EvalContext::new(principal.clone(), entity.clone());

        let failed = match self.spec.combinator {
            Combinator::Single | Combinator::All => {
                let mut failed = None;
                for check in &self.spec.checks {
                    if !self.eval_check(check, &ctx)? {
                        failed = Some(check);
                        break;
                    }
                }
                failed
            }
            Combinator::Any => {
                let mut last = None;
                for check in &self.spec.checks {
                    if self.eval_check(check, &ctx)? {
                        last = None;
                        break;
                    }
                    last = Some(check);
                }
                last
            }
        };

        if let Some(check) = failed {
            let denial = Denial {
                failed_check: check.label.clone(),
                principal: principal.ident(),
                entity: entity.as_ref().map(|e| e.ident()),
            };
            tracing::debug!(
                target: "palisade",
                check = %denial.failed_check,
                principal = %denial.principal,
                "denied"
            );
            return Err(denial.into());
        }

        tracing::debug!(target: "palisade", principal = %principal.ident(), "allowed");

        if let (Some(name), Some(entity)) = (&self.spec.inject_as, entity) {
            args.insert(name.clone(), Value::Entity(entity));
        }
        Ok(())
    }

    fn resolve_entity(&self, lookup: &EntityLookup, args: &Args) -> Option<EntityRef> {
        let value = args.get(&lookup.fetch_key)?;
        let fetcher = self.fetcher.as_ref()?;
        fetcher
            .fetch(&lookup.kind, &lookup.lookup_field, value)
            .unwrap_or(None)
    }

    fn eval_check(&self, check: &Check, ctx: &EvalContext) -> Result<bool, EvalError> {
        let verdict = evaluate(&check.expr, ctx)?;
        if let Some(trace) = &self.trace {
            trace.record(
                &check.label,
                &ctx.principal.ident(),
                ctx.entity.as_ref().map(|e| e.ident()).as_ref(),
                verdict,
            );
        }
        Ok(verdict)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
