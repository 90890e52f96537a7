//! Shared test fixtures: a map-backed entity.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entity::{Entity, EntityId, EntityRef};
use crate::values::Value;

pub(crate) struct MapEntity {
    id: EntityId,
    fields: HashMap<String, Value>,
}

impl Entity for MapEntity {
    fn ident(&self) -> EntityId {
        self.id.clone()
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }
}

pub(crate) fn entity(kind: &str, key: &str, fields: &[(&str, Value)]) -> EntityRef {
    Arc::new(MapEntity {
        id: EntityId::new(kind, key),
        fields: fields
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect(),
    })
}
