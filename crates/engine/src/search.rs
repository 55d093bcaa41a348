//! Search pipeline
//!
//! One entry point gluing the stages together: resolve the type, compile
//! the selection, compile the filter, scan, order, paginate, and project.
//! The selection compiles before the repository is touched, so an unusable
//! request never pays for a scan, and the compiled node is shared by every
//! item on the page.

use tracing::debug;

use vista_core::{Context, Limits, Repository, Result, SchemaRegistry, Value};

use crate::filter;
use crate::order::OrderSpec;
use crate::page::{paginate, Page};
use crate::projection::Projector;
use crate::selection::SelectionNode;

/// Parameters of one search call
///
/// Every part is optional except the type name; absent parts fall back to
/// no constraints, scan order, the configured page size, the first page,
/// and a no-op projection respectively.
#[derive(Debug, Clone, Default)]
pub struct SearchParams<'a> {
    /// Entity-type name to search
    pub kind: &'a str,
    /// Raw filter request
    pub filter: Option<&'a Value>,
    /// Raw order clause
    pub order: Option<&'a str>,
    /// Page size
    pub limit: Option<usize>,
    /// Page number
    pub page: Option<usize>,
    /// Raw selection request
    pub selection: Option<&'a Value>,
}

/// Run one search and project every item on the requested page
///
/// # Errors
///
/// Resolution, selection, filter, order, and pagination errors in that
/// order, plus repository failures and lazy sub-request errors surfacing
/// during projection.
pub fn execute(
    registry: &SchemaRegistry,
    repo: &dyn Repository,
    params: &SearchParams<'_>,
    limits: &Limits,
    ctx: &Context,
) -> Result<Page<Value>> {
    let schema = registry.resolve(params.kind)?;

    let node = match params.selection {
        Some(raw) => SelectionNode::compile(raw, schema)?,
        None => SelectionNode::empty(),
    };
    let (include, exclude) = filter::compile(params.filter, schema)?;

    let mut rows = repo.filter(params.kind, &include, &exclude)?;
    debug!(kind = params.kind, matched = rows.len(), "search scan");

    if let Some(order) = params.order {
        OrderSpec::parse(order, schema)?.sort(&mut rows);
    }

    let page = paginate(rows, params.limit, params.page, limits)?;
    let projector = Projector::new(registry, repo);
    page.try_map(|entity| projector.project_node(&entity, schema, &node, ctx))
}
