//! Process-wide rule registry.
//!
//! Lifecycle is two-phase: populate during application start-up, then
//! read concurrently for the life of the process. `register` overwrites
//! an existing entry under the same name (last definition wins).
//! `clear` exists for test isolation only and is never called during
//! request handling. Writes during the serving phase are the caller's
//! responsibility to serialize.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::entity::EntityRef;

/// Predicate over (principal, optional entity).
pub type Predicate = dyn Fn(&EntityRef, Option<&EntityRef>) -> bool + Send + Sync;

/// A named, reusable predicate. Immutable once registered.
#[derive(Clone)]
pub struct Rule {
    name: String,
    predicate: Arc<Predicate>,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        predicate: impl Fn(&EntityRef, Option<&EntityRef>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Rule {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, principal: &EntityRef, entity: Option<&EntityRef>) -> bool {
        (self.predicate)(principal, entity)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

fn rules() -> &'static RwLock<HashMap<String, Rule>> {
    static RULES: OnceLock<RwLock<HashMap<String, Rule>>> = OnceLock::new();
    RULES.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register a predicate under `name`, overwriting any existing entry.
pub fn register(
    name: &str,
    predicate: impl Fn(&EntityRef, Option<&EntityRef>) -> bool + Send + Sync + 'static,
) {
    register_rule(Rule::new(name, predicate));
}

pub fn register_rule(rule: Rule) {
    let mut map = rules().write().expect("rule registry poisoned");
    map.insert(rule.name.clone(), rule);
}

pub fn get(name: &str) -> Option<Rule> {
    let map = rules().read().expect("rule registry poisoned");
    map.get(name).cloned()
}

pub fn exists(name: &str) -> bool {
    let map = rules().read().expect("rule registry poisoned");
    map.contains_key(name)
}

/// Remove every registered rule. Test harness reset only.
pub fn clear() {
    let mut map = rules().write().expect("rule registry poisoned");
    map.clear();
}
