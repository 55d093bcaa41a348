//! The gateway facade
//!
//! One struct gluing the wire types to the engine: it owns the schema
//! registry, a shared repository handle, and the configured limits, and
//! exposes search, create, and update over [`serde_json::Value`] payloads.
//! Transport concerns like routing and sessions stay outside; a caller
//! derives a [`vista_core::Context`] however it authenticates and passes it
//! per call.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use vista_core::{
    Context, EntityId, ErrorKind, Limits, Repository, Result, SchemaRegistry, Value,
};
use vista_engine::{search, Mutator, SearchParams};

use crate::types::{CreateRequest, SearchRequest, SearchResponse, UpdateRequest};

/// Entry point for wire-shaped calls
pub struct Gateway {
    registry: SchemaRegistry,
    repo: Arc<dyn Repository>,
    limits: Limits,
}

impl Gateway {
    /// A gateway with default limits
    pub fn new(registry: SchemaRegistry, repo: Arc<dyn Repository>) -> Self {
        Gateway::with_limits(registry, repo, Limits::default())
    }

    /// A gateway with explicit limits
    pub fn with_limits(registry: SchemaRegistry, repo: Arc<dyn Repository>, limits: Limits) -> Self {
        Gateway {
            registry,
            repo,
            limits,
        }
    }

    /// The configured limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// The underlying repository
    pub fn repository(&self) -> &dyn Repository {
        self.repo.as_ref()
    }

    /// Search one entity type and project the requested page
    ///
    /// # Errors
    ///
    /// Everything [`vista_engine::search::execute`] reports, unchanged.
    pub fn search(&self, request: &SearchRequest, ctx: &Context) -> Result<SearchResponse> {
        let filter = request.filter.clone().map(Value::from);
        let selection = request.fields.clone().map(Value::from);
        let params = SearchParams {
            kind: &request.model,
            filter: filter.as_ref(),
            // an empty order clause means scan order
            order: request.order.as_deref().filter(|o| !o.is_empty()),
            limit: request.limit,
            page: request.page,
            selection: selection.as_ref(),
        };

        let page = search::execute(&self.registry, self.repo.as_ref(), &params, &self.limits, ctx)?;
        info!(
            model = %request.model,
            items = page.items.len(),
            page = page.number,
            pages = page.pages,
            "search"
        );
        Ok(SearchResponse {
            items: page.items.into_iter().map(serde_json::Value::from).collect(),
            page: page.number,
            pages: page.pages,
            has_previous: page.has_previous,
            has_next: page.has_next,
        })
    }

    /// Create one instance owned by the caller and project it in full
    ///
    /// # Errors
    ///
    /// Everything [`Mutator::create`] reports, unchanged.
    pub fn create(&self, request: &CreateRequest, ctx: &Context) -> Result<serde_json::Value> {
        let values = wire_map(&request.values);
        let mutator = Mutator::new(&self.registry, self.repo.as_ref());
        let projected = note_denial(&request.model, mutator.create(&request.model, &values, ctx))?;
        info!(model = %request.model, "create");
        Ok(serde_json::Value::from(projected))
    }

    /// Apply change sets to a sequence of instances, echoing each result
    ///
    /// Items apply in order and each is all-or-nothing on its own; a failing
    /// item aborts the sequence without rolling back the items before it.
    /// Each echo carries the item's `model` and `id` markers plus its changed
    /// fields re-read from the stored entity.
    ///
    /// # Errors
    ///
    /// Everything [`Mutator::update`] reports, unchanged.
    pub fn update(&self, request: &UpdateRequest, ctx: &Context) -> Result<Vec<serde_json::Value>> {
        let mutator = Mutator::new(&self.registry, self.repo.as_ref());
        let mut results = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let changes = wire_map(&item.changes);
            let outcome = mutator.update(
                &item.model,
                EntityId::new(item.id),
                &changes,
                &request.modes,
                ctx,
            );
            let mut echo = note_denial(&item.model, outcome)?;
            if let Value::Object(map) = &mut echo {
                map.insert("model".to_string(), Value::from(item.model.as_str()));
            }
            results.push(serde_json::Value::from(echo));
        }
        info!(items = results.len(), "update");
        Ok(results)
    }
}

/// Carry wire values across into the engine's value tree
fn wire_map(values: &BTreeMap<String, serde_json::Value>) -> BTreeMap<String, Value> {
    values
        .iter()
        .map(|(k, v)| (k.clone(), Value::from(v.clone())))
        .collect()
}

fn note_denial<T>(model: &str, outcome: Result<T>) -> Result<T> {
    if let Err(e) = &outcome {
        if e.kind() == ErrorKind::Authorization {
            warn!(model, error = %e, "write denied");
        }
    }
    outcome
}
