//! Selection compilation
//!
//! A selection request names the fields a caller wants projected. Compiling
//! it against a schema happens once per request; the resulting
//! [`SelectionNode`] is reused for every instance in the result set.
//!
//! Validation is deliberately shallow: names at the current level are
//! checked against the schema, but the value under a link mapping is stored
//! verbatim and validated only when the projection engine descends into that
//! link. A malformed sub-request therefore surfaces only if its branch is
//! actually reached.

use smallvec::SmallVec;

use vista_core::{EntitySchema, Error, FieldKind, Result, Value};

/// Sentinel selecting every serializable field of the target type
pub const SELECT_ALL: &str = "*";

/// A compiled selection against one entity type
///
/// `direct` holds serializable field names in caller order with duplicates
/// dropped. `links` holds link names paired with their raw, not yet
/// validated sub-request.
#[derive(Debug, Clone, Default)]
pub struct SelectionNode {
    direct: SmallVec<[String; 8]>,
    links: Vec<(String, Value)>,
}

impl SelectionNode {
    /// The no-op selection, projecting an empty map
    pub fn empty() -> Self {
        SelectionNode::default()
    }

    /// Every serializable field of the type, no links
    pub fn all(schema: &EntitySchema) -> Self {
        SelectionNode {
            direct: schema
                .serializable_fields()
                .into_iter()
                .map(str::to_string)
                .collect(),
            links: Vec::new(),
        }
    }

    /// Compile a raw request against a schema
    ///
    /// Accepted shapes: the [`SELECT_ALL`] sentinel, a sequence of field
    /// names and link mappings, or nothing at all (null or an empty
    /// sequence, both meaning a no-op projection).
    ///
    /// # Errors
    ///
    /// [`Error::NotADirectField`] for a name outside the serializable set,
    /// [`Error::NotALinkedField`] for a mapping key that is not a declared
    /// link, [`Error::InvalidSelectionElement`] for an element of the wrong
    /// shape, and [`Error::InvalidSelectionRequest`] for an unusable
    /// top-level shape.
    pub fn compile(request: &Value, schema: &EntitySchema) -> Result<Self> {
        match request {
            Value::String(s) if s == SELECT_ALL => Ok(SelectionNode::all(schema)),
            Value::Null => Ok(SelectionNode::empty()),
            Value::Array(elements) => {
                let mut node = SelectionNode::empty();
                for element in elements {
                    match element {
                        Value::String(name) => node.push_direct(name, schema)?,
                        Value::Object(map) => {
                            for (link, inner) in map {
                                node.push_link(link, inner, schema)?;
                            }
                        }
                        other => {
                            return Err(Error::InvalidSelectionElement {
                                actual: other.type_name(),
                            })
                        }
                    }
                }
                Ok(node)
            }
            other => Err(Error::InvalidSelectionRequest {
                actual: other.type_name(),
            }),
        }
    }

    fn push_direct(&mut self, name: &str, schema: &EntitySchema) -> Result<()> {
        if !schema.serializable_fields().contains(name) {
            return Err(Error::NotADirectField {
                field: name.to_string(),
                entity: schema.name(),
            });
        }
        // Duplicates are tolerated; presence matters, not count
        if !self.direct.iter().any(|d| d == name) {
            self.direct.push(name.to_string());
        }
        Ok(())
    }

    fn push_link(&mut self, name: &str, inner: &Value, schema: &EntitySchema) -> Result<()> {
        match schema.kind(name) {
            Some(FieldKind::SingleLink { .. }) | Some(FieldKind::MultiLink { .. }) => {
                self.links.push((name.to_string(), inner.clone()));
                Ok(())
            }
            _ => Err(Error::NotALinkedField {
                field: name.to_string(),
                entity: schema.name(),
            }),
        }
    }

    /// Direct field names in caller order
    pub fn direct(&self) -> &[String] {
        &self.direct
    }

    /// Link names with their raw sub-requests, in caller order
    pub fn links(&self) -> &[(String, Value)] {
        &self.links
    }

    /// Whether this selection projects nothing
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.links.is_empty()
    }
}

/// Interpreted sub-request of one multi-link
///
/// Parsed lazily when the projection engine reaches the link.
#[derive(Debug, Clone)]
pub struct LinkOptions {
    /// Inner selection request, still unvalidated
    pub fields: Value,
    /// Optional raw order over the related type's stored fields
    pub order: Option<String>,
}

impl LinkOptions {
    /// Interpret the raw value under a multi-link mapping
    ///
    /// Three shapes are accepted: a bare inner sequence, an options mapping
    /// with `fields` and `order` keys, or the [`SELECT_ALL`] sentinel.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidMultiLinkOptions`] for anything else, including an
    /// options mapping whose `order` is not a string.
    pub fn parse(raw: &Value) -> Result<Self> {
        match raw {
            Value::String(s) if s == SELECT_ALL => Ok(LinkOptions {
                fields: raw.clone(),
                order: None,
            }),
            Value::Array(_) | Value::Null => Ok(LinkOptions {
                fields: raw.clone(),
                order: None,
            }),
            Value::Object(map) => {
                let fields = map.get("fields").cloned().unwrap_or(Value::Null);
                let order = match map.get("order") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(other) => {
                        return Err(Error::InvalidMultiLinkOptions {
                            actual: other.type_name(),
                        })
                    }
                };
                Ok(LinkOptions { fields, order })
            }
            other => Err(Error::InvalidMultiLinkOptions {
                actual: other.type_name(),
            }),
        }
    }
}
