//! The permission gate
//!
//! One uniform write rule across entity types. Anonymous callers are always
//! refused. Elevated callers are always allowed. An ordinary identified
//! caller may write stored scalar fields on instances it owns, and may
//! additionally add or remove itself on a designated self-membership
//! collection of any instance, owned or not. Everything else is denied with
//! a message naming the caller, the field, the attempted value, and the
//! owning identity, which callers render verbatim.
//!
//! Reads are currently unrestricted; the hook exists so a read policy can
//! be introduced without touching call sites.

use vista_core::{Context, Entity, EntitySchema, Error, FieldKind, Result, StoredShape, Value};

use crate::filter::coerce_int;

/// Whether the caller may read a field of an instance
///
/// Permissive today, kept as the single place a read policy would land.
pub fn can_read(_entity: &Entity, _field: &str, _ctx: &Context) -> bool {
    true
}

/// Authorize one field write, or say exactly why not
///
/// # Errors
///
/// [`Error::LoginRequired`] for an anonymous caller and
/// [`Error::WriteDenied`] for an identified caller outside the rule.
pub fn check_write(
    schema: &EntitySchema,
    entity: &Entity,
    field: &str,
    value: &Value,
    ctx: &Context,
) -> Result<()> {
    let Some(identity) = ctx.identity() else {
        return Err(Error::LoginRequired);
    };
    if ctx.is_elevated() {
        return Ok(());
    }

    // an identified caller may enter or leave a self-membership collection
    // on any instance, but only with its own identity
    if schema.is_self_membership(field) && coerce_int(value) == Some(identity.as_int()) {
        return Ok(());
    }

    let owner = schema.owner_identity(entity);
    if owner == Some(identity) && is_stored_scalar(schema, field) {
        return Ok(());
    }

    Err(Error::WriteDenied {
        context: ctx.to_string(),
        field: field.to_string(),
        value: value.to_string(),
        entity: entity.entity_ref(),
        owner: owner.map_or_else(|| "nobody".to_string(), |id| id.to_string()),
    })
}

/// Stored scalar columns only; links and computed fields fall outside the
/// owner rule
fn is_stored_scalar(schema: &EntitySchema, field: &str) -> bool {
    matches!(
        schema.kind(field),
        Some(FieldKind::Stored {
            shape: StoredShape::Integer | StoredShape::Text { .. } | StoredShape::Instant,
            ..
        })
    )
}
