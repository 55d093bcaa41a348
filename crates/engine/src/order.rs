//! Result ordering
//!
//! An order request is a stored-field name with an optional leading `-` for
//! descending. Ordering by computed fields or by fields of a related type is
//! unsupported and fails instead of being ignored.
//!
//! Rows with no value in the order field sort before everything else;
//! descending reverses the whole comparison, so they end up last. Ties keep
//! the repository's ascending-identity order either way.

use std::cmp::Ordering;

use vista_core::{Entity, EntitySchema, Error, FieldValue, Result, Value};

/// A validated order over one entity type's stored fields
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpec {
    field: String,
    descending: bool,
}

impl OrderSpec {
    /// Parse a raw order string against a schema
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOrderField`] when the name, marker stripped, is not a
    /// stored field of the type.
    pub fn parse(raw: &str, schema: &EntitySchema) -> Result<Self> {
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        if !schema.stored_fields().contains(name) {
            return Err(Error::InvalidOrderField {
                field: name.to_string(),
                entity: schema.name(),
            });
        }
        Ok(OrderSpec {
            field: name.to_string(),
            descending,
        })
    }

    /// The stored field ordered by
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Whether the order is reversed
    pub fn is_descending(&self) -> bool {
        self.descending
    }

    /// Sort rows in place by this order
    pub fn sort(&self, rows: &mut Vec<Entity>) {
        let mut keyed: Vec<(OrderKey, Entity)> = rows
            .drain(..)
            .map(|e| (order_key(&e, &self.field), e))
            .collect();
        keyed.sort_by(|a, b| {
            let ord = compare_keys(&a.0, &b.0);
            if self.descending {
                ord.reverse()
            } else {
                ord
            }
        });
        rows.extend(keyed.into_iter().map(|(_, e)| e));
    }
}

/// Comparable form of one stored value
#[derive(Debug, Clone)]
enum OrderKey {
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Instant(u64),
    Text(String),
}

fn rank(key: &OrderKey) -> u8 {
    match key {
        OrderKey::Missing => 0,
        OrderKey::Bool(_) => 1,
        OrderKey::Int(_) | OrderKey::Float(_) => 2,
        OrderKey::Instant(_) => 3,
        OrderKey::Text(_) => 4,
    }
}

fn compare_keys(a: &OrderKey, b: &OrderKey) -> Ordering {
    use OrderKey::*;
    match (a, b) {
        (Int(x), Int(y)) => x.cmp(y),
        (Float(x), Float(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Int(x), Float(y)) => (*x as f64).partial_cmp(y).unwrap_or(Ordering::Equal),
        (Float(x), Int(y)) => x.partial_cmp(&(*y as f64)).unwrap_or(Ordering::Equal),
        (Instant(x), Instant(y)) => x.cmp(y),
        (Text(x), Text(y)) => x.cmp(y),
        (Bool(x), Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn order_key(entity: &Entity, field: &str) -> OrderKey {
    if field == "id" {
        return OrderKey::Int(entity.id().as_int());
    }
    if let Some(value) = entity.field(field) {
        return match value {
            FieldValue::Instant(ts) => OrderKey::Instant(ts.as_micros()),
            FieldValue::Scalar(Value::Bool(b)) => OrderKey::Bool(*b),
            FieldValue::Scalar(Value::Int(i)) => OrderKey::Int(*i),
            FieldValue::Scalar(Value::Float(f)) => OrderKey::Float(*f),
            FieldValue::Scalar(Value::String(s)) => OrderKey::Text(s.clone()),
            FieldValue::Scalar(_) => OrderKey::Missing,
        };
    }
    // single-link columns order by linked identity
    match entity.link_one(field) {
        Some(Some(id)) => OrderKey::Int(id.as_int()),
        _ => OrderKey::Missing,
    }
}
