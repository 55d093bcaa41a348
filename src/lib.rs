//! VistaDB - schema-driven projection, filtering, and mutation for entity graphs
//!
//! VistaDB lets clients ask for shaped, permission-filtered views of stored
//! entities and submit permission-checked partial updates, without
//! per-entity serialization or authorization code. Types are declared once
//! in a schema registry; the engine compiles each request against the schema
//! and executes it through a pluggable repository.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use vistadb::{Context, EntitySchema, Gateway, MemoryStore, SchemaRegistry};
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register(EntitySchema::builder("note").text("title").build()?)?;
//!
//! let gateway = Gateway::new(registry, Arc::new(MemoryStore::new()));
//! let request = serde_json::from_value(serde_json::json!({
//!     "model": "note",
//!     "fields": "*",
//! }))?;
//! let page = gateway.search(&request, &Context::anonymous())?;
//! ```
//!
//! # Architecture
//!
//! - `vista-core` holds the contract types: values, entities, schemas,
//!   contexts, errors, and the [`Repository`] trait.
//! - `vista-storage` provides the in-memory reference repository.
//! - `vista-engine` compiles and executes selection, filter, order, page,
//!   projection, and mutation requests.
//! - `vista-api` wraps the engine in wire types and the [`Gateway`] facade,
//!   re-exported here.

pub use vista_api::{
    CreateRequest, Gateway, SearchRequest, SearchResponse, UpdateItem, UpdateRequest,
};
pub use vista_core::{
    Context, Entity, EntityId, EntityRef, EntitySchema, Error, ErrorKind, Limits, Principal,
    Repository, Result, SchemaBuilder, SchemaRegistry, Timestamp, Value, MAX_RECORDS,
};
pub use vista_engine::{Mutator, Page, Projector, SearchParams, SELECT_ALL};
pub use vista_storage::MemoryStore;
