//! Runtime value types.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;

use crate::entity::EntityRef;

/// Runtime values the engine manipulates. Decimal numbers use
/// `rust_decimal::Decimal` -- never `f64`.
#[derive(Clone)]
pub enum Value {
    Str(String),
    Int(i64),
    Decimal(Decimal),
    Bool(bool),
    Null,
    List(Vec<Value>),
    /// Opaque handle to an external domain object. Equality is by
    /// identity, delegated to [`Entity::ident`](crate::entity::Entity).
    Entity(EntityRef),
}

impl Value {
    /// Returns a human-readable kind name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "Str",
            Value::Int(_) => "Int",
            Value::Decimal(_) => "Decimal",
            Value::Bool(_) => "Bool",
            Value::Null => "Null",
            Value::List(_) => "List",
            Value::Entity(_) => "Entity",
        }
    }

    /// Truthiness, matching the coercion `and`/`or`/`not` and the
    /// top-level verdict apply: false, null, zero, and empty values are
    /// falsy; an entity reference is always truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Null => false,
            Value::Int(n) => *n != 0,
            Value::Decimal(d) => !d.is_zero(),
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Entity(_) => true,
        }
    }

    /// Numeric view for cross-kind Int/Decimal comparison.
    fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Int(n) => Some(Decimal::from(*n)),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Ordering between values, defined only for number<->number and
    /// str<->str. Everything else (entities included) has no ordering
    /// and must surface as a type-mismatch evaluation error.
    pub fn partial_cmp_values(&self, other: &Value) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_decimal(), other.as_decimal()) {
            return a.partial_cmp(&b);
        }
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Equality follows the per-kind rules: numbers compare numerically
/// across Int/Decimal, entities by identity, `Null` equals only `Null`,
/// and mismatched kinds are simply not equal.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        if let (Some(a), Some(b)) = (self.as_decimal(), other.as_decimal()) {
            return a == b;
        }
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Entity(a), Value::Entity(b)) => a.ident() == b.ident(),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Int(n) => write!(f, "Int({})", n),
            Value::Decimal(d) => write!(f, "Decimal({})", d),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Null => write!(f, "Null"),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Entity(e) => write!(f, "Entity({})", e.ident()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::entity as record_entity;

    #[test]
    fn int_and_decimal_compare_numerically() {
        assert_eq!(Value::Int(5), Value::Decimal(Decimal::new(50, 1)));
        assert_eq!(
            Value::Int(3).partial_cmp_values(&Value::Decimal(Decimal::new(35, 1))),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn mismatched_kinds_are_not_equal() {
        assert_ne!(Value::Int(1), Value::Str("1".to_owned()));
        assert_ne!(Value::Bool(true), Value::Int(1));
        assert_ne!(Value::Null, Value::Bool(false));
    }

    #[test]
    fn null_equals_only_null() {
        assert_eq!(Value::Null, Value::Null);
        let e = record_entity("Post", "1", &[]);
        assert_ne!(Value::Entity(e), Value::Null);
    }

    #[test]
    fn entities_compare_by_identity() {
        let a = record_entity("Post", "1", &[("status", Value::from("draft"))]);
        let b = record_entity("Post", "1", &[("status", Value::from("review"))]);
        let c = record_entity("Post", "2", &[]);
        assert_eq!(Value::Entity(a.clone()), Value::Entity(b));
        assert_ne!(Value::Entity(a), Value::Entity(c));
    }

    #[test]
    fn no_ordering_across_kinds() {
        assert!(Value::Int(1)
            .partial_cmp_values(&Value::Str("1".to_owned()))
            .is_none());
        let e = record_entity("Post", "1", &[]);
        assert!(Value::Entity(e.clone())
            .partial_cmp_values(&Value::Entity(e))
            .is_none());
    }

    #[test]
    fn truthiness() {
        assert!(Value::from(true).is_truthy());
        assert!(!Value::from(false).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::Entity(record_entity("U", "1", &[])).is_truthy());
    }
}
