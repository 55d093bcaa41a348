//! Wire types for the gateway
//!
//! These structs define the transport-agnostic JSON surface: a caller
//! deserializes its body into a request type, hands it to the
//! [`crate::Gateway`], and serializes the response. Field values travel as
//! [`serde_json::Value`] and cross into the engine's value tree at the
//! gateway boundary, so the engine never depends on the wire encoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One search call
///
/// Everything but `model` is optional; absent parts fall back to the
/// engine's defaults. An empty `order` string is treated as absent.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    /// Entity-type name to search
    pub model: String,
    /// Raw filter request
    #[serde(default)]
    pub filter: Option<serde_json::Value>,
    /// Order clause over stored fields, `-` prefix for descending
    #[serde(default)]
    pub order: Option<String>,
    /// Page size, capped by the gateway's limits
    #[serde(default)]
    pub limit: Option<usize>,
    /// Page number, starting at 1
    #[serde(default)]
    pub page: Option<usize>,
    /// Selection request, `"*"` for every serializable field
    #[serde(default)]
    pub fields: Option<serde_json::Value>,
}

/// One page of projected search results
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    /// Projected items on this page, in result order
    pub items: Vec<serde_json::Value>,
    /// This page's number
    pub page: usize,
    /// Total number of pages
    pub pages: usize,
    /// Whether a previous page exists
    pub has_previous: bool,
    /// Whether a next page exists
    pub has_next: bool,
}

/// One create call
///
/// Every key besides `model` is taken as a stored field value for the new
/// instance.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest {
    /// Entity-type name to create
    pub model: String,
    /// Stored field values for the new instance
    #[serde(flatten)]
    pub values: BTreeMap<String, serde_json::Value>,
}

/// One entry of an update call
///
/// Every key besides `model` and `id` is taken as a field change.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateItem {
    /// Entity-type name of the target
    pub model: String,
    /// Identity of the target
    pub id: u64,
    /// Field changes to apply
    #[serde(flatten)]
    pub changes: BTreeMap<String, serde_json::Value>,
}

/// One update call over a sequence of targets
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    /// Targets with their change sets, applied in order
    pub items: Vec<UpdateItem>,
    /// Per-field multi-link modes, e.g. `{"likes": "add"}`
    #[serde(default)]
    pub modes: BTreeMap<String, String>,
}
