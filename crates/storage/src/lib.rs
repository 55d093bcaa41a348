//! Storage layer for Vista
//!
//! This crate implements the in-memory repository backend with:
//! - MemoryStore: per-kind BTreeMap tables behind an RwLock
//! - Identity allocation decoupled from visibility (create vs persist)
//! - Predicate evaluation over stored fields, instants, and links
//! - testing: the social-network fixture schema and seeded data generator

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod store;
pub mod testing;

pub use store::MemoryStore;
