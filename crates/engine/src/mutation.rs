//! Mutation planning and application
//!
//! Updates and creates follow the same discipline: authorize every field,
//! plan every field, and only then touch the entity. A failure anywhere
//! before the final persist leaves stored state exactly as it was, so a
//! change set is applied entirely or not at all.

use std::collections::BTreeMap;

use tracing::debug;

use vista_core::{
    Context, Entity, EntityId, EntitySchema, Error, FieldKind, FieldValue, LinkOrigin, LinkValue,
    Ownership, Repository, Result, SchemaRegistry, StoredShape, Timestamp, Value,
};

use crate::filter::coerce_int;
use crate::permission;
use crate::projection::Projector;
use crate::selection::SELECT_ALL;

/// How a multi-link edit combines with the existing membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiLinkMode {
    /// Replace the membership with exactly the supplied ids
    Set,
    /// Insert the supplied ids, leaving present ones alone
    Add,
    /// Remove the supplied ids, ignoring absent ones
    Remove,
}

impl MultiLinkMode {
    /// Interpret a raw mode string, defaulting to [`MultiLinkMode::Set`]
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLinkMode`] for anything other than set, add, or
    /// remove.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw {
            None | Some("set") => Ok(MultiLinkMode::Set),
            Some("add") => Ok(MultiLinkMode::Add),
            Some("remove") => Ok(MultiLinkMode::Remove),
            Some(other) => Err(Error::InvalidLinkMode {
                actual: other.to_string(),
            }),
        }
    }
}

/// One authorized, validated field write, ready to apply
enum Plan {
    Scalar { field: String, value: Value },
    One { field: String, target: Option<EntityId> },
    Members { field: String, mode: MultiLinkMode, ids: Vec<EntityId> },
}

/// Applies authorized change sets against a repository
pub struct Mutator<'a> {
    registry: &'a SchemaRegistry,
    repo: &'a dyn Repository,
}

impl<'a> Mutator<'a> {
    /// A mutator over the given registry and repository
    pub fn new(registry: &'a SchemaRegistry, repo: &'a dyn Repository) -> Self {
        Mutator { registry, repo }
    }

    /// Apply a change set to one stored entity and echo the changed fields
    ///
    /// The echo carries the identity plus each changed field re-read from
    /// the updated entity, with multi-links rendered as sequences of
    /// `{id}` mappings.
    ///
    /// # Errors
    ///
    /// Resolution and fetch errors, [`Error::LoginRequired`] or
    /// [`Error::WriteDenied`] from the permission gate, and per-field
    /// planning errors such as [`Error::NotADirectField`],
    /// [`Error::NotWritable`], [`Error::ValueTooLong`],
    /// [`Error::InvalidFilterValue`], and [`Error::InvalidLinkMode`]. Any
    /// error aborts the whole change set before anything persists.
    pub fn update(
        &self,
        kind: &str,
        id: EntityId,
        changes: &BTreeMap<String, Value>,
        modes: &BTreeMap<String, String>,
        ctx: &Context,
    ) -> Result<Value> {
        let schema = self.registry.resolve(kind)?;
        let mut entity = self.repo.get(kind, id)?;

        for (field, value) in changes {
            permission::check_write(schema, &entity, field, value, ctx)?;
        }

        let mut plans = Vec::with_capacity(changes.len());
        for (field, value) in changes {
            plans.push(plan_change(schema, field, value, modes)?);
        }

        for plan in plans {
            apply(&mut entity, plan);
        }
        self.repo.persist(&entity)?;
        debug!(kind, id = id.as_u64(), fields = changes.len(), "update applied");

        let projector = Projector::new(self.registry, self.repo);
        let mut echo = BTreeMap::new();
        echo.insert("id".to_string(), Value::Int(entity.id().as_int()));
        for field in changes.keys() {
            let value = match schema.kind(field) {
                Some(FieldKind::MultiLink { .. }) => membership_echo(&entity, field),
                _ => projector.direct_value(&entity, schema, field, ctx),
            };
            echo.insert(field.clone(), value);
        }
        Ok(Value::Object(echo))
    }

    /// Create a new entity owned by the caller and project it in full
    ///
    /// Only stored scalar fields may be supplied. Instants are stamped with
    /// the current time, and the owning link, where the schema declares one,
    /// is filled from the caller's identity.
    ///
    /// # Errors
    ///
    /// [`Error::LoginRequired`] for an anonymous caller, per-field planning
    /// errors as for [`Mutator::update`], and [`Error::MissingField`] when a
    /// required stored field is absent.
    pub fn create(
        &self,
        kind: &str,
        payload: &BTreeMap<String, Value>,
        ctx: &Context,
    ) -> Result<Value> {
        let schema = self.registry.resolve(kind)?;
        let Some(identity) = ctx.identity() else {
            return Err(Error::LoginRequired);
        };

        let owner_link = match schema.owner() {
            Ownership::LinkField(field) => Some(field),
            Ownership::SelfIdentity => None,
        };

        let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();
        for (field, value) in payload {
            // the owning link is stamped from the caller, never supplied
            if field == "id" || Some(field.as_str()) == owner_link {
                return Err(Error::NotWritable {
                    field: field.clone(),
                    entity: schema.name(),
                });
            }
            match schema.kind(field) {
                None => {
                    return Err(Error::NotADirectField {
                        field: field.clone(),
                        entity: schema.name(),
                    })
                }
                Some(FieldKind::Stored { shape, .. }) => match shape {
                    StoredShape::Instant => {
                        return Err(Error::NotWritable {
                            field: field.clone(),
                            entity: schema.name(),
                        })
                    }
                    StoredShape::Text { max_len } => {
                        check_len(field, value, *max_len)?;
                        fields.insert(field.clone(), FieldValue::Scalar(value.clone()));
                    }
                    StoredShape::Integer => {
                        fields.insert(field.clone(), FieldValue::Scalar(value.clone()));
                    }
                },
                Some(_) => {
                    return Err(Error::NotWritable {
                        field: field.clone(),
                        entity: schema.name(),
                    })
                }
            }
        }

        for field in schema.required_fields() {
            if !fields.contains_key(field) {
                return Err(Error::MissingField {
                    field: field.to_string(),
                    entity: schema.name(),
                });
            }
        }

        for field in schema.stored_fields() {
            if schema.is_instant(field) {
                fields.insert(field.to_string(), FieldValue::Instant(Timestamp::now()));
            }
        }

        let mut links: BTreeMap<String, LinkValue> = BTreeMap::new();
        if let Some(owner_field) = owner_link {
            links.insert(owner_field.to_string(), LinkValue::One(Some(identity)));
        }

        let entity = self.repo.create(kind, fields, links)?;
        self.repo.persist(&entity)?;
        debug!(kind, id = entity.id().as_u64(), "created");

        let projector = Projector::new(self.registry, self.repo);
        projector.project(&entity, &Value::from(SELECT_ALL), ctx)
    }
}

fn plan_change(
    schema: &EntitySchema,
    field: &str,
    value: &Value,
    modes: &BTreeMap<String, String>,
) -> Result<Plan> {
    match schema.kind(field) {
        None => Err(Error::NotADirectField {
            field: field.to_string(),
            entity: schema.name(),
        }),
        Some(FieldKind::Stored { shape, .. }) => {
            if field == "id" {
                return Err(Error::NotWritable {
                    field: field.to_string(),
                    entity: schema.name(),
                });
            }
            match shape {
                StoredShape::Instant => Err(Error::NotWritable {
                    field: field.to_string(),
                    entity: schema.name(),
                }),
                StoredShape::Text { max_len } => {
                    check_len(field, value, *max_len)?;
                    Ok(Plan::Scalar {
                        field: field.to_string(),
                        value: value.clone(),
                    })
                }
                StoredShape::Integer => Ok(Plan::Scalar {
                    field: field.to_string(),
                    value: value.clone(),
                }),
            }
        }
        Some(FieldKind::Summary(_)) | Some(FieldKind::Contextual(_)) => Err(Error::NotWritable {
            field: field.to_string(),
            entity: schema.name(),
        }),
        Some(FieldKind::SingleLink { .. }) => {
            let target = match value {
                Value::Null => None,
                other => Some(coerce_id(field, other)?),
            };
            Ok(Plan::One {
                field: field.to_string(),
                target,
            })
        }
        Some(FieldKind::MultiLink {
            origin: LinkOrigin::ReverseOf(_),
            ..
        }) => Err(Error::NotWritable {
            field: field.to_string(),
            entity: schema.name(),
        }),
        Some(FieldKind::MultiLink { .. }) => {
            let mode = MultiLinkMode::parse(modes.get(field).map(String::as_str))?;
            let ids = member_ids(field, value)?;
            Ok(Plan::Members {
                field: field.to_string(),
                mode,
                ids,
            })
        }
    }
}

fn apply(entity: &mut Entity, plan: Plan) {
    match plan {
        Plan::Scalar { field, value } => entity.set_field(field, value),
        Plan::One { field, target } => entity.set_link_one(field, target),
        Plan::Members { field, mode, ids } => match mode {
            MultiLinkMode::Set => entity.set_members(field, ids),
            MultiLinkMode::Add => {
                for id in ids {
                    entity.add_member(&field, id);
                }
            }
            MultiLinkMode::Remove => {
                for id in ids {
                    entity.remove_member(&field, id);
                }
            }
        },
    }
}

fn check_len(field: &str, value: &Value, max_len: Option<usize>) -> Result<()> {
    if let (Some(max), Value::String(s)) = (max_len, value) {
        let actual = s.chars().count();
        if actual > max {
            return Err(Error::ValueTooLong {
                field: field.to_string(),
                max,
                actual,
            });
        }
    }
    Ok(())
}

fn coerce_id(field: &str, value: &Value) -> Result<EntityId> {
    match coerce_int(value) {
        Some(id) if id >= 0 => Ok(EntityId::new(id as u64)),
        _ => Err(Error::InvalidFilterValue {
            field: field.to_string(),
            actual: value.to_string(),
        }),
    }
}

fn member_ids(field: &str, value: &Value) -> Result<Vec<EntityId>> {
    match value {
        Value::Array(items) => items.iter().map(|item| coerce_id(field, item)).collect(),
        other => Ok(vec![coerce_id(field, other)?]),
    }
}

fn membership_echo(entity: &Entity, field: &str) -> Value {
    let members = entity.link_many(field).unwrap_or(&[]);
    Value::Array(
        members
            .iter()
            .map(|id| {
                let mut item = BTreeMap::new();
                item.insert("id".to_string(), Value::Int(id.as_int()));
                Value::Object(item)
            })
            .collect(),
    )
}
