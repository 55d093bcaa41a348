//! Entity projection
//!
//! Turns one stored entity into a wire-shaped value according to a compiled
//! [`SelectionNode`]. Direct fields degrade gracefully: a field that cannot
//! be resolved projects as null rather than failing the whole item, with a
//! `<field>_serial` companion consulted first for values that have no native
//! wire form. Link traversal is stricter, since a malformed sub-request or a
//! failing repository is a caller or infrastructure problem rather than a
//! data problem.

use std::collections::BTreeMap;

use tracing::trace;

use vista_core::{
    Context, Entity, EntitySchema, Error, FieldKind, LinkOrigin, Lookup, PredicateSet,
    Repository, Result, SchemaRegistry, Value,
};

use crate::order::OrderSpec;
use crate::permission;
use crate::selection::{LinkOptions, SelectionNode};

/// Projects entities through a schema registry and a repository
///
/// Borrowed, not owned: a projector is assembled per call from whatever
/// registry and repository the caller holds.
pub struct Projector<'a> {
    registry: &'a SchemaRegistry,
    repo: &'a dyn Repository,
}

impl<'a> Projector<'a> {
    /// A projector over the given registry and repository
    pub fn new(registry: &'a SchemaRegistry, repo: &'a dyn Repository) -> Self {
        Projector { registry, repo }
    }

    /// Compile a raw selection request and project one entity through it
    ///
    /// # Errors
    ///
    /// Compilation errors from [`SelectionNode::compile`], plus anything
    /// [`Projector::project_node`] reports.
    pub fn project(&self, entity: &Entity, request: &Value, ctx: &Context) -> Result<Value> {
        let schema = self.registry.resolve(entity.kind())?;
        let node = SelectionNode::compile(request, schema)?;
        self.project_node(entity, schema, &node, ctx)
    }

    /// Project one entity through an already compiled selection
    ///
    /// # Errors
    ///
    /// Lazy sub-request compilation errors and repository failures during
    /// link traversal. Direct fields never fail; they project as null.
    pub fn project_node(
        &self,
        entity: &Entity,
        schema: &EntitySchema,
        node: &SelectionNode,
        ctx: &Context,
    ) -> Result<Value> {
        let mut out = BTreeMap::new();
        for field in node.direct() {
            if !permission::can_read(entity, field, ctx) {
                continue;
            }
            out.insert(field.clone(), self.direct_value(entity, schema, field, ctx));
        }
        for (name, raw) in node.links() {
            out.insert(name.clone(), self.link_value(entity, schema, name, raw, ctx)?);
        }
        Ok(Value::Object(out))
    }

    /// Resolve one direct field to its wire value, or null
    ///
    /// An instant with no native wire form falls back to its `<field>_serial`
    /// companion when the schema declares one. A bare single link resolves to
    /// the linked id without fetching the target.
    pub fn direct_value(
        &self,
        entity: &Entity,
        schema: &EntitySchema,
        field: &str,
        ctx: &Context,
    ) -> Value {
        if field == "id" {
            return Value::Int(entity.id().as_int());
        }
        match schema.kind(field) {
            Some(FieldKind::Stored { .. }) => match entity.field(field) {
                Some(stored) => match stored.as_wire() {
                    Some(value) => value,
                    None => self.serial_companion(entity, schema, field, ctx),
                },
                None => Value::Null,
            },
            Some(FieldKind::Summary(compute)) => compute(entity, self.repo),
            Some(FieldKind::Contextual(compute)) => compute(entity, self.repo, ctx),
            Some(FieldKind::SingleLink { .. }) => match entity.link_one(field) {
                Some(Some(id)) => Value::Int(id.as_int()),
                _ => Value::Null,
            },
            _ => Value::Null,
        }
    }

    fn serial_companion(
        &self,
        entity: &Entity,
        schema: &EntitySchema,
        field: &str,
        ctx: &Context,
    ) -> Value {
        let serial = format!("{field}_serial");
        if schema.has_field(&serial) {
            self.direct_value(entity, schema, &serial, ctx)
        } else {
            trace!(field, entity = %entity.entity_ref(), "no serial companion");
            Value::Null
        }
    }

    fn link_value(
        &self,
        entity: &Entity,
        schema: &EntitySchema,
        name: &str,
        raw: &Value,
        ctx: &Context,
    ) -> Result<Value> {
        match schema.kind(name) {
            Some(FieldKind::SingleLink { target }) => {
                // an options mapping cannot order a single instance
                if let Value::Object(_) = raw {
                    return Err(Error::InvalidSelectionRequest {
                        actual: raw.type_name(),
                    });
                }
                let child_schema = self.registry.resolve(target)?;
                let node = SelectionNode::compile(raw, child_schema)?;
                match entity.link_one(name) {
                    Some(Some(id)) => match self.repo.get(target, id) {
                        Ok(child) => self.project_node(&child, child_schema, &node, ctx),
                        // a dangling link projects as null, like an unset one
                        Err(Error::NotFound(_)) => Ok(Value::Null),
                        Err(e) => Err(e),
                    },
                    _ => Ok(Value::Null),
                }
            }
            Some(FieldKind::MultiLink { target, origin, .. }) => {
                let options = LinkOptions::parse(raw)?;
                let child_schema = self.registry.resolve(target)?;
                let node = SelectionNode::compile(&options.fields, child_schema)?;
                let mut children = match origin {
                    LinkOrigin::Owned => {
                        let ids = entity.link_many(name).unwrap_or(&[]);
                        let mut rows = Vec::with_capacity(ids.len());
                        for &id in ids {
                            match self.repo.get(target, id) {
                                Ok(child) => rows.push(child),
                                // membership can outlive its target
                                Err(Error::NotFound(_)) => {}
                                Err(e) => return Err(e),
                            }
                        }
                        rows
                    }
                    LinkOrigin::ReverseOf(via) => {
                        let mut include = PredicateSet::new();
                        include.insert(*via, Lookup::Exact(Value::Int(entity.id().as_int())));
                        self.repo.filter(target, &include, &PredicateSet::new())?
                    }
                };
                if let Some(order) = &options.order {
                    OrderSpec::parse(order, child_schema)?.sort(&mut children);
                }
                let mut items = Vec::with_capacity(children.len());
                for child in &children {
                    items.push(self.project_node(child, child_schema, &node, ctx)?);
                }
                Ok(Value::Array(items))
            }
            _ => Err(Error::NotALinkedField {
                field: name.to_string(),
                entity: schema.name(),
            }),
        }
    }
}
