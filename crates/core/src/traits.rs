//! Core trait for storage abstraction
//!
//! This module defines the Repository trait that lets the projection,
//! search, and mutation engines run against any backing store.

use std::collections::BTreeMap;

use crate::entity::{Entity, EntityId, FieldValue, LinkValue};
use crate::error::Result;
use crate::predicate::PredicateSet;

/// Storage abstraction for entity instances
///
/// This trait enables replacing the in-memory BTreeMap+RwLock
/// implementation with a persistent or distributed store without breaking
/// upper layers (projection, search, mutation).
///
/// Identity allocation belongs to the store: [`Repository::create`] hands
/// out a fresh identity without making the instance visible, and
/// [`Repository::persist`] is the single call that does. An update is a
/// `get`, mutate in place, `persist` round trip.
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
pub trait Repository: Send + Sync {
    /// Fetch one instance by identity
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) naming the
    /// reference when the identity is unknown, so callers can surface it
    /// verbatim.
    fn get(&self, kind: &str, id: EntityId) -> Result<Entity>;

    /// Instances matching every `include` entry and, when `exclude` is
    /// non-empty, not matching all of its entries
    ///
    /// Results come back in ascending identity order. An empty `include`
    /// matches everything.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is unknown or the scan fails.
    fn filter(
        &self,
        kind: &str,
        include: &PredicateSet,
        exclude: &PredicateSet,
    ) -> Result<Vec<Entity>>;

    /// Allocate an identity and assemble a new instance without storing it
    ///
    /// The instance becomes visible only once persisted, so a validation
    /// failure between `create` and `persist` leaves no trace.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot allocate an identity.
    fn create(
        &self,
        kind: &str,
        fields: BTreeMap<String, FieldValue>,
        links: BTreeMap<String, LinkValue>,
    ) -> Result<Entity>;

    /// Write an instance, inserting or replacing by identity
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn persist(&self, entity: &Entity) -> Result<()>;
}
