//! In-memory repository backend
//!
//! One table per entity kind, each an identity-ordered BTreeMap of rows
//! behind a single RwLock. Scans therefore come back in ascending identity
//! order without sorting, which is the order the search engine expects from
//! an unordered request.
//!
//! Identity allocation is decoupled from visibility: `create` consumes an
//! identity under the write lock but inserts nothing, and `persist` is the
//! only call that makes an instance readable. Callers that validate between
//! the two leave no trace on failure, only a gap in the identity sequence.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use vista_core::{
    Entity, EntityId, EntityRef, Error, FieldValue, LinkValue, PredicateSet, Repository, Result,
};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<EntityId, Entity>,
    last_id: u64,
}

impl Table {
    fn allocate(&mut self) -> EntityId {
        self.last_id += 1;
        EntityId::new(self.last_id)
    }
}

/// In-memory implementation of [`Repository`]
///
/// Tables are created lazily on first allocation or write, so the store
/// needs no registration step. Reads against a kind nothing was ever
/// written to behave like an empty table.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<FxHashMap<String, Table>>,
}

impl MemoryStore {
    /// An empty store
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Number of persisted instances of a kind
    pub fn count(&self, kind: &str) -> usize {
        let tables = self.tables.read();
        tables.get(kind).map_or(0, |t| t.rows.len())
    }
}

impl Repository for MemoryStore {
    fn get(&self, kind: &str, id: EntityId) -> Result<Entity> {
        let tables = self.tables.read();
        tables
            .get(kind)
            .and_then(|t| t.rows.get(&id))
            .cloned()
            .ok_or_else(|| Error::NotFound(EntityRef::new(kind, id)))
    }

    fn filter(
        &self,
        kind: &str,
        include: &PredicateSet,
        exclude: &PredicateSet,
    ) -> Result<Vec<Entity>> {
        let tables = self.tables.read();
        let Some(table) = tables.get(kind) else {
            return Ok(Vec::new());
        };
        Ok(table
            .rows
            .values()
            .filter(|e| include.matches(e))
            .filter(|e| exclude.is_empty() || !exclude.matches(e))
            .cloned()
            .collect())
    }

    fn create(
        &self,
        kind: &str,
        fields: BTreeMap<String, FieldValue>,
        links: BTreeMap<String, LinkValue>,
    ) -> Result<Entity> {
        let mut tables = self.tables.write();
        let table = tables.entry(kind.to_string()).or_default();
        let id = table.allocate();

        let mut entity = Entity::new(kind, id);
        for (name, value) in fields {
            entity.set_field(&name, value);
        }
        for (name, value) in links {
            match value {
                LinkValue::One(target) => entity.set_link_one(&name, target),
                LinkValue::Many(members) => entity.set_members(&name, members),
            }
        }
        trace!(kind, id = id.as_u64(), "allocated identity");
        Ok(entity)
    }

    fn persist(&self, entity: &Entity) -> Result<()> {
        let mut tables = self.tables.write();
        let table = tables.entry(entity.kind().to_string()).or_default();
        // Accept hand-built identities without ever re-issuing them
        if entity.id().as_u64() > table.last_id {
            table.last_id = entity.id().as_u64();
        }
        table.rows.insert(entity.id(), entity.clone());
        trace!(kind = entity.kind(), id = entity.id().as_u64(), "persisted");
        Ok(())
    }
}
