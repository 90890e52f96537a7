//! Optional per-check trace hook.
//!
//! The guard dispatcher emits one record per individually evaluated
//! check, in evaluation order. Checks skipped by ALL/ANY fail-fast never
//! reach the sink.

use std::sync::Mutex;

use serde::Serialize;

use crate::entity::EntityId;

/// Observer of individual check evaluations.
pub trait TraceSink: Send + Sync {
    fn record(&self, check: &str, principal: &EntityId, entity: Option<&EntityId>, verdict: bool);
}

/// Sink that emits a `tracing` debug event per check.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&self, check: &str, principal: &EntityId, entity: Option<&EntityId>, verdict: bool) {
        match entity {
            Some(entity) => tracing::debug!(
                target: "palisade",
                check,
                principal = %principal,
                entity = %entity,
                verdict,
                "check evaluated"
            ),
            None => tracing::debug!(
                target: "palisade",
                check,
                principal = %principal,
                verdict,
                "check evaluated"
            ),
        }
    }
}

/// One captured check evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRecord {
    pub check: String,
    pub principal: EntityId,
    pub entity: Option<EntityId>,
    pub verdict: bool,
}

/// Sink that captures records in memory, in evaluation order. Intended
/// for tests and interactive diagnostics.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<TraceRecord>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TraceRecord> {
        self.records.lock().expect("trace sink poisoned").clone()
    }
}

impl TraceSink for RecordingSink {
    fn record(&self, check: &str, principal: &EntityId, entity: Option<&EntityId>, verdict: bool) {
        let mut records = self.records.lock().expect("trace sink poisoned");
        records.push(TraceRecord {
            check: check.to_owned(),
            principal: principal.clone(),
            entity: entity.cloned(),
            verdict,
        });
    }
}
