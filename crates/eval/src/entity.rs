//! Entity collaborator contracts.
//!
//! The engine never owns domain objects. It sees them through two small
//! capabilities: field resolution on an entity ([`Entity`]) and lookup of
//! an entity by field value ([`EntityFetcher`]). Both are synchronous;
//! if the backing store is asynchronous, the caller awaits before
//! handing results to the engine.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::values::Value;

/// Identity of a domain object -- the only view of an entity the engine
/// carries into verdicts, denials, and trace records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    /// Model kind, e.g. `"Post"`.
    pub kind: String,
    /// Primary identifier rendered as a string.
    pub key: String,
}

impl EntityId {
    pub fn new(kind: impl Into<String>, key: impl ToString) -> Self {
        EntityId {
            kind: kind.into(),
            key: key.to_string(),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.key)
    }
}

/// Field resolution on a domain object.
///
/// `field` returns `None` for a field the entity does not have; the
/// evaluator maps that to the absence sentinel (or to an attribute
/// resolution error when path segments remain).
pub trait Entity: Send + Sync {
    fn ident(&self) -> EntityId;
    fn field(&self, name: &str) -> Option<Value>;
}

pub type EntityRef = Arc<dyn Entity>;

/// Errors from an entity fetch backend.
///
/// The guard dispatcher folds these into "entity absent" -- a caller must
/// not be able to distinguish a missing object from a denied one -- but
/// the trait surfaces them so other consumers can observe backend faults.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// A backend-specific fetch error (connection, query, etc.).
    #[error("entity fetch error: {0}")]
    Backend(String),
}

/// Lookup of an entity by `lookup_field == value` within a model kind.
pub trait EntityFetcher: Send + Sync {
    fn fetch(
        &self,
        kind: &str,
        field: &str,
        value: &Value,
    ) -> Result<Option<EntityRef>, FetchError>;
}

/// A fetcher over a fixed set of entities.
///
/// Scans its entities for the first one of the requested kind whose
/// `field` resolves equal to `value`. Useful for tests and for wiring
/// the guard before a real store exists.
#[derive(Default)]
pub struct StaticFetcher {
    entities: Vec<EntityRef>,
}

impl StaticFetcher {
    pub fn new(entities: Vec<EntityRef>) -> Self {
        Self { entities }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl EntityFetcher for StaticFetcher {
    fn fetch(
        &self,
        kind: &str,
        field: &str,
        value: &Value,
    ) -> Result<Option<EntityRef>, FetchError> {
        let found = self
            .entities
            .iter()
            .find(|e| e.ident().kind == kind && e.field(field).as_ref() == Some(value))
            .cloned();
        Ok(found)
    }
}
