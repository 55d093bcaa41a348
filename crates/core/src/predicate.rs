//! Compiled filter predicates
//!
//! The filter compiler turns a client filter description into two
//! [`PredicateSet`]s: *include* (every predicate must match) and *exclude*
//! (an entity matching all of them is dropped). Repositories evaluate both
//! against candidate instances.
//!
//! Matching semantics per field category:
//! - the identity column compares against the entity id
//! - stored scalars compare by value equality
//! - instants compare against their RFC 3339 serial form
//! - to-one links compare against the linked identity
//! - owned to-many links match when the membership contains the value

use crate::entity::{Entity, FieldValue, LinkValue};
use crate::value::Value;
use std::collections::BTreeMap;

/// One compiled lookup against a field
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Field must equal the value exactly
    Exact(Value),
    /// Field must equal one of the values
    In(Vec<Value>),
}

impl Lookup {
    fn accepts(&self, candidate: &Value) -> bool {
        match self {
            Lookup::Exact(v) => candidate == v,
            Lookup::In(vs) => vs.iter().any(|v| candidate == v),
        }
    }
}

/// A conjunction of per-field lookups
///
/// Empty sets match every entity, which makes an absent filter a full scan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredicateSet {
    entries: BTreeMap<String, Lookup>,
}

impl PredicateSet {
    /// An empty predicate set
    pub fn new() -> Self {
        PredicateSet::default()
    }

    /// Whether this set constrains anything
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add or replace the lookup for a field (last write wins)
    pub fn insert(&mut self, field: impl Into<String>, lookup: Lookup) {
        self.entries.insert(field.into(), lookup);
    }

    /// Iterate lookups in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Lookup)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The lookup for a field, if present
    pub fn get(&self, field: &str) -> Option<&Lookup> {
        self.entries.get(field)
    }

    /// Whether every lookup in this set matches the entity
    ///
    /// Fields the entity does not carry never match a non-empty lookup.
    pub fn matches(&self, entity: &Entity) -> bool {
        self.entries.iter().all(|(field, lookup)| {
            if field == "id" {
                return lookup.accepts(&Value::Int(entity.id().as_int()));
            }
            if let Some(fv) = entity.field(field) {
                let candidate = match fv {
                    FieldValue::Scalar(v) => v.clone(),
                    FieldValue::Instant(ts) => Value::String(ts.to_rfc3339()),
                };
                return lookup.accepts(&candidate);
            }
            match entity.link_value(field) {
                Some(LinkValue::One(Some(id))) => lookup.accepts(&Value::Int(id.as_int())),
                Some(LinkValue::One(None)) => lookup.accepts(&Value::Null),
                Some(LinkValue::Many(ids)) => ids
                    .iter()
                    .any(|id| lookup.accepts(&Value::Int(id.as_int()))),
                None => false,
            }
        })
    }
}
