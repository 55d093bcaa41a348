//! Static entity-type schemas
//!
//! Every entity type declares its field catalogue once, in code, and the
//! engines consult it on every request. There is no runtime field discovery:
//! what the schema does not declare does not exist.
//!
//! ## Field categories
//!
//! | category    | resolved from                  | in select-all |
//! |-------------|--------------------------------|---------------|
//! | stored      | the instance's own values      | yes           |
//! | summary     | a computation over the graph   | yes           |
//! | contextual  | a computation over the caller  | yes           |
//! | single link | the linked identity            | yes (as id)   |
//! | multi link  | the linked collection          | no            |
//!
//! A field name belongs to exactly one category; [`SchemaBuilder::build`]
//! rejects duplicates, so the invariant holds structurally. The identity
//! column `id` is declared implicitly on every type.
//!
//! Single links double as stored columns: their stored value is the linked
//! identity, so they are selectable as bare names and filterable like any
//! stored field. Multi links are reachable only through link mappings in a
//! selection request.

use crate::context::Context;
use crate::entity::{Entity, EntityId};
use crate::error::{Error, Result};
use crate::traits::Repository;
use crate::value::Value;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// Computation behind a summary field, context-independent
pub type SummaryFn = fn(&Entity, &dyn Repository) -> Value;

/// Computation behind a contextual field
///
/// Receives the acting context and must tolerate an anonymous one.
pub type ContextualFn = fn(&Entity, &dyn Repository, &Context) -> Value;

/// Concrete shape of a stored scalar column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredShape {
    /// 64-bit integer
    Integer,
    /// UTF-8 text, optionally bounded in characters
    Text {
        /// Maximum length in characters, unbounded when `None`
        max_len: Option<usize>,
    },
    /// Creation instant, stamped server-side and never client-assignable
    Instant,
}

/// How a to-many collection is materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOrigin {
    /// Membership stored on the owning instance, editable through modes
    Owned,
    /// Computed by querying the target type's named single link back to this
    /// instance; projection-only
    ReverseOf(&'static str),
}

/// Which identity owns an instance for write authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The instance's own id is the owning identity (a user owns itself)
    SelfIdentity,
    /// The named single link's target is the owning identity
    LinkField(&'static str),
}

/// Category and metadata of one declared field
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A stored scalar column
    Stored {
        /// Concrete column shape
        shape: StoredShape,
        /// Whether create requests must supply it
        required: bool,
    },
    /// A computed, context-independent field
    Summary(SummaryFn),
    /// A computed field depending on the acting context
    Contextual(ContextualFn),
    /// A to-one relation; its stored value is the linked identity
    SingleLink {
        /// Target entity-type name
        target: &'static str,
    },
    /// A to-many relation
    MultiLink {
        /// Target entity-type name
        target: &'static str,
        /// Stored membership or computed reverse
        origin: LinkOrigin,
        /// Whether an identified caller may add/remove itself on any instance
        self_membership: bool,
    },
}

impl FieldKind {
    /// Whether this field resolves from the instance's stored values
    pub fn is_stored(&self) -> bool {
        matches!(self, FieldKind::Stored { .. } | FieldKind::SingleLink { .. })
    }

    /// Whether this field is declared as any link
    pub fn is_link(&self) -> bool {
        matches!(
            self,
            FieldKind::SingleLink { .. } | FieldKind::MultiLink { .. }
        )
    }
}

/// The declared catalogue of one entity type
#[derive(Debug, Clone)]
pub struct EntitySchema {
    name: &'static str,
    fields: FxHashMap<String, FieldKind>,
    owner: Ownership,
}

impl EntitySchema {
    /// Start declaring a type
    pub fn builder(name: &'static str) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// The entity-type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared kind of a field, if any
    pub fn kind(&self, field: &str) -> Option<&FieldKind> {
        self.fields.get(field)
    }

    /// Whether the field is declared at all
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Stored field names (including single links and `id`), sorted
    pub fn stored_fields(&self) -> BTreeSet<&str> {
        self.fields
            .iter()
            .filter(|(_, k)| k.is_stored())
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Summary field names, sorted
    pub fn summary_fields(&self) -> BTreeSet<&str> {
        self.fields
            .iter()
            .filter(|(_, k)| matches!(k, FieldKind::Summary(_)))
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Contextual field names, sorted
    pub fn contextual_fields(&self) -> BTreeSet<&str> {
        self.fields
            .iter()
            .filter(|(_, k)| matches!(k, FieldKind::Contextual(_)))
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Every field a select-all projection emits: stored, summary, and
    /// contextual names, sorted
    pub fn serializable_fields(&self) -> BTreeSet<&str> {
        self.fields
            .iter()
            .filter(|(_, k)| !matches!(k, FieldKind::MultiLink { .. }))
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Link fields and their targets, in name order
    pub fn links(&self) -> impl Iterator<Item = (&str, &FieldKind)> {
        let mut out: Vec<_> = self
            .fields
            .iter()
            .filter(|(_, k)| k.is_link())
            .map(|(n, k)| (n.as_str(), k))
            .collect();
        out.sort_by_key(|(n, _)| *n);
        out.into_iter()
    }

    /// Target type of a link field
    pub fn link_target(&self, field: &str) -> Option<&'static str> {
        match self.fields.get(field) {
            Some(FieldKind::SingleLink { target }) => Some(target),
            Some(FieldKind::MultiLink { target, .. }) => Some(target),
            _ => None,
        }
    }

    /// Whether filter values against this field coerce to integers
    ///
    /// True for the identity column, integer columns, and to-one links
    /// (relations are filtered by linked identity).
    pub fn is_numeric(&self, field: &str) -> bool {
        matches!(
            self.fields.get(field),
            Some(FieldKind::Stored {
                shape: StoredShape::Integer,
                ..
            }) | Some(FieldKind::SingleLink { .. })
        )
    }

    /// Whether the field is a designated self-membership collection
    pub fn is_self_membership(&self, field: &str) -> bool {
        matches!(
            self.fields.get(field),
            Some(FieldKind::MultiLink {
                self_membership: true,
                ..
            })
        )
    }

    /// Declared maximum length of a bounded text field
    pub fn max_len(&self, field: &str) -> Option<usize> {
        match self.fields.get(field) {
            Some(FieldKind::Stored {
                shape: StoredShape::Text { max_len },
                ..
            }) => *max_len,
            _ => None,
        }
    }

    /// Stored fields a create request must supply, sorted
    pub fn required_fields(&self) -> BTreeSet<&str> {
        self.fields
            .iter()
            .filter(|(_, k)| matches!(k, FieldKind::Stored { required: true, .. }))
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Whether the field is a server-stamped instant column
    pub fn is_instant(&self, field: &str) -> bool {
        matches!(
            self.fields.get(field),
            Some(FieldKind::Stored {
                shape: StoredShape::Instant,
                ..
            })
        )
    }

    /// The ownership rule for write authorization
    pub fn owner(&self) -> Ownership {
        self.owner
    }

    /// The identity owning an instance under this schema, if resolvable
    pub fn owner_identity(&self, entity: &Entity) -> Option<EntityId> {
        match self.owner {
            Ownership::SelfIdentity => Some(entity.id()),
            Ownership::LinkField(field) => entity.link_one(field).flatten(),
        }
    }
}

/// Builder for [`EntitySchema`]
///
/// Declarations accumulate in call order; [`SchemaBuilder::build`] enforces
/// the one-category-per-name invariant. The identity column `id` is
/// pre-declared.
#[derive(Debug)]
pub struct SchemaBuilder {
    name: &'static str,
    declared: Vec<(String, FieldKind)>,
    owner: Ownership,
}

impl SchemaBuilder {
    fn new(name: &'static str) -> Self {
        SchemaBuilder {
            name,
            declared: vec![(
                "id".to_string(),
                FieldKind::Stored {
                    shape: StoredShape::Integer,
                    required: false,
                },
            )],
            owner: Ownership::SelfIdentity,
        }
    }

    fn declare(mut self, name: &str, kind: FieldKind) -> Self {
        self.declared.push((name.to_string(), kind));
        self
    }

    /// A required text column
    pub fn text(self, name: &str) -> Self {
        self.declare(
            name,
            FieldKind::Stored {
                shape: StoredShape::Text { max_len: None },
                required: true,
            },
        )
    }

    /// An optional text column, defaulting to the empty string
    pub fn optional_text(self, name: &str) -> Self {
        self.declare(
            name,
            FieldKind::Stored {
                shape: StoredShape::Text { max_len: None },
                required: false,
            },
        )
    }

    /// A required text column bounded to `max_len` characters
    pub fn bounded_text(self, name: &str, max_len: usize) -> Self {
        self.declare(
            name,
            FieldKind::Stored {
                shape: StoredShape::Text {
                    max_len: Some(max_len),
                },
                required: true,
            },
        )
    }

    /// An optional integer column
    pub fn integer(self, name: &str) -> Self {
        self.declare(
            name,
            FieldKind::Stored {
                shape: StoredShape::Integer,
                required: false,
            },
        )
    }

    /// A creation instant, stamped at create time
    pub fn instant(self, name: &str) -> Self {
        self.declare(
            name,
            FieldKind::Stored {
                shape: StoredShape::Instant,
                required: false,
            },
        )
    }

    /// A computed, context-independent field
    pub fn summary(self, name: &str, f: SummaryFn) -> Self {
        self.declare(name, FieldKind::Summary(f))
    }

    /// A computed field depending on the acting context
    pub fn contextual(self, name: &str, f: ContextualFn) -> Self {
        self.declare(name, FieldKind::Contextual(f))
    }

    /// A to-one relation
    pub fn single_link(self, name: &str, target: &'static str) -> Self {
        self.declare(name, FieldKind::SingleLink { target })
    }

    /// An owned to-many relation
    pub fn owned_multi_link(self, name: &str, target: &'static str) -> Self {
        self.declare(
            name,
            FieldKind::MultiLink {
                target,
                origin: LinkOrigin::Owned,
                self_membership: false,
            },
        )
    }

    /// An owned to-many relation callers may add or remove themselves from
    pub fn self_membership(self, name: &str, target: &'static str) -> Self {
        self.declare(
            name,
            FieldKind::MultiLink {
                target,
                origin: LinkOrigin::Owned,
                self_membership: true,
            },
        )
    }

    /// A computed to-many relation: instances of `target` whose `via` single
    /// link points back here
    pub fn reverse_multi_link(self, name: &str, target: &'static str, via: &'static str) -> Self {
        self.declare(
            name,
            FieldKind::MultiLink {
                target,
                origin: LinkOrigin::ReverseOf(via),
                self_membership: false,
            },
        )
    }

    /// Instances are owned by the identity behind the named single link
    pub fn owned_by(mut self, field: &'static str) -> Self {
        self.owner = Ownership::LinkField(field);
        self
    }

    /// Finish, rejecting any name declared under more than one category
    pub fn build(self) -> Result<EntitySchema> {
        let mut fields = FxHashMap::default();
        for (name, kind) in self.declared {
            if fields.insert(name.clone(), kind).is_some() {
                return Err(Error::DuplicateField {
                    field: name,
                    entity: self.name,
                });
            }
        }
        Ok(EntitySchema {
            name: self.name,
            fields,
            owner: self.owner,
        })
    }
}

/// All entity types known to one engine instance
///
/// Built once at startup and shared immutably afterwards, so lookups take no
/// lock.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: FxHashMap<&'static str, EntitySchema>,
}

impl SchemaRegistry {
    /// An empty registry
    pub fn new() -> Self {
        SchemaRegistry::default()
    }

    /// Register a type, rejecting duplicates
    pub fn register(&mut self, schema: EntitySchema) -> Result<()> {
        let name = schema.name();
        if self.entries.insert(name, schema).is_some() {
            return Err(Error::DuplicateEntityType { name });
        }
        Ok(())
    }

    /// Resolve a type name, the single place unknown names become errors
    pub fn resolve(&self, name: &str) -> Result<&EntitySchema> {
        self.entries
            .get(name)
            .ok_or_else(|| Error::UnknownEntityType {
                name: name.to_string(),
            })
    }

    /// The schema for a name, if registered
    pub fn get(&self, name: &str) -> Option<&EntitySchema> {
        self.entries.get(name)
    }

    /// Registered type names, sorted
    pub fn types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
