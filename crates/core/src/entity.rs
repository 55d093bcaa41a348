//! Entity instances and their references
//!
//! An [`Entity`] owns its stored field values and holds linked instances by
//! identity only; it never owns another instance's lifetime. Instances are
//! produced by a repository, shaped by an [`crate::EntitySchema`], and mutated
//! exclusively through the mutation engine.
//!
//! No acting context is ever stored here. Context is a call parameter of the
//! projection and mutation engines, which keeps shared instances safe under
//! concurrent use.

use crate::timestamp::Timestamp;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Dense integer identity of an entity within its type's table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw id
    pub fn new(id: u64) -> Self {
        EntityId(id)
    }

    /// The raw id
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The id as a wire integer
    pub fn as_int(&self) -> i64 {
        self.0 as i64
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        EntityId(id)
    }
}

/// Universal reference to an entity: type name plus identity
///
/// Displays as `kind://id`, e.g. `post://7`. Used in logs and not-found
/// errors so every instance in the system is addressable by one string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// The entity-type name
    pub kind: String,
    /// The identity within that type
    pub id: EntityId,
}

impl EntityRef {
    /// Build a reference
    pub fn new(kind: impl Into<String>, id: EntityId) -> Self {
        EntityRef {
            kind: kind.into(),
            id,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.kind, self.id)
    }
}

/// A stored field's runtime value
///
/// Scalars are wire-representable as-is. Instants are not: projection falls
/// back to the field's `_serial` summary rendering, or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// A directly representable scalar
    Scalar(Value),
    /// A creation-time instant, representable only through its serial form
    Instant(Timestamp),
}

impl FieldValue {
    /// The wire value, if this field is natively representable
    pub fn as_wire(&self) -> Option<Value> {
        match self {
            FieldValue::Scalar(v) => Some(v.clone()),
            FieldValue::Instant(_) => None,
        }
    }

    /// The instant, if this field holds one
    pub fn as_instant(&self) -> Option<Timestamp> {
        match self {
            FieldValue::Instant(ts) => Some(*ts),
            FieldValue::Scalar(_) => None,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Scalar(v)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(ts: Timestamp) -> Self {
        FieldValue::Instant(ts)
    }
}

/// A link field's runtime value: one optional identity or an owned membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LinkValue {
    /// To-one relation, `None` when unset
    One(Option<EntityId>),
    /// To-many owned membership, in insertion order
    Many(Vec<EntityId>),
}

/// One stored instance of an entity type
///
/// Field and link maps are keyed by field name; which names are meaningful is
/// the schema's concern, not the instance's. Reverse multi-links are not
/// materialized here; they are resolved by querying the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    kind: String,
    id: EntityId,
    fields: BTreeMap<String, FieldValue>,
    links: BTreeMap<String, LinkValue>,
}

impl Entity {
    /// Create an empty instance of a type
    pub fn new(kind: impl Into<String>, id: EntityId) -> Self {
        Entity {
            kind: kind.into(),
            id,
            fields: BTreeMap::new(),
            links: BTreeMap::new(),
        }
    }

    /// The entity-type name
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The identity
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The addressable reference
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.kind.clone(), self.id)
    }

    // =========================================================================
    // Stored fields
    // =========================================================================

    /// A stored field's value, if set
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Set a stored field
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Iterate stored fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    // =========================================================================
    // Links
    // =========================================================================

    /// A link's raw value, whichever arity it has
    pub fn link_value(&self, name: &str) -> Option<&LinkValue> {
        self.links.get(name)
    }

    /// A to-one link's target, if the link is set on this instance
    ///
    /// Outer `None` means the link was never assigned; inner `None` means it
    /// was explicitly cleared.
    pub fn link_one(&self, name: &str) -> Option<Option<EntityId>> {
        match self.links.get(name) {
            Some(LinkValue::One(id)) => Some(*id),
            _ => None,
        }
    }

    /// An owned to-many membership, in insertion order
    pub fn link_many(&self, name: &str) -> Option<&[EntityId]> {
        match self.links.get(name) {
            Some(LinkValue::Many(ids)) => Some(ids),
            _ => None,
        }
    }

    /// Assign a to-one link
    pub fn set_link_one(&mut self, name: impl Into<String>, target: Option<EntityId>) {
        self.links.insert(name.into(), LinkValue::One(target));
    }

    /// Replace an owned membership wholesale, dropping duplicate ids
    pub fn set_members(&mut self, name: impl Into<String>, ids: Vec<EntityId>) {
        let mut seen = Vec::with_capacity(ids.len());
        for id in ids {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        self.links.insert(name.into(), LinkValue::Many(seen));
    }

    /// Insert one id into an owned membership; present ids are left alone
    pub fn add_member(&mut self, name: &str, id: EntityId) {
        match self.links.get_mut(name) {
            Some(LinkValue::Many(ids)) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            _ => {
                self.links.insert(name.to_string(), LinkValue::Many(vec![id]));
            }
        }
    }

    /// Remove one id from an owned membership; absent ids are a no-op
    pub fn remove_member(&mut self, name: &str, id: EntityId) {
        if let Some(LinkValue::Many(ids)) = self.links.get_mut(name) {
            ids.retain(|m| *m != id);
        }
    }

    /// Whether an owned membership contains an id
    pub fn has_member(&self, name: &str, id: EntityId) -> bool {
        self.link_many(name).is_some_and(|ids| ids.contains(&id))
    }
}
