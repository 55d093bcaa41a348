//! Core types and traits for Vista
//!
//! This crate defines the foundational types used throughout the system:
//! - EntityId / EntityRef: Instance identity and typed references
//! - Entity: A stored instance with scalar fields and link collections
//! - Context: The acting identity a request runs under
//! - Schema: Static field catalogues and the type registry
//! - Value: Unified value enum for scalars and wire payloads
//! - Timestamp: Microsecond instants with a serial rendering
//! - PredicateSet: Compiled filter entries the repository evaluates
//! - Error: Error type hierarchy with response classification
//! - Traits: The Repository storage abstraction

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod context;
pub mod entity;
pub mod error;
pub mod limits;
pub mod predicate;
pub mod schema;
pub mod timestamp;
pub mod traits;
pub mod value;

// Re-export commonly used types and traits
pub use context::{Context, Principal};
pub use entity::{Entity, EntityId, EntityRef, FieldValue, LinkValue};
pub use error::{Error, ErrorKind, Result};
pub use limits::{Limits, MAX_RECORDS};
pub use predicate::{Lookup, PredicateSet};
pub use schema::{
    ContextualFn, EntitySchema, FieldKind, LinkOrigin, Ownership, SchemaBuilder, SchemaRegistry,
    StoredShape, SummaryFn,
};
pub use timestamp::Timestamp;
pub use traits::Repository;
pub use value::Value;
