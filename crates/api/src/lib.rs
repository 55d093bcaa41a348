//! Wire-facing surface of VistaDB
//!
//! Two pieces: serde request and response types in [`types`], and the
//! [`Gateway`] facade in [`gateway`] executing them against the engine.
//! Payloads travel as [`serde_json::Value`]; the acting
//! [`vista_core::Context`] is supplied per call by whatever authenticates
//! the caller.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod gateway;
pub mod types;

pub use gateway::Gateway;
pub use types::{CreateRequest, SearchRequest, SearchResponse, UpdateItem, UpdateRequest};
