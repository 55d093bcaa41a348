//! Acting principal for one projection or mutation call
//!
//! A [`Context`] is always passed by argument and never stored on an entity,
//! so the same instance can be projected for different callers concurrently.
//! Contextual field computations and the permission gate receive it on every
//! call and must tolerate [`Context::Anonymous`].

use crate::entity::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An identified caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Identity key, the id of the caller's own entity
    pub id: EntityId,
    /// Superuser-equivalent callers bypass ownership checks
    pub elevated: bool,
}

/// The acting principal for a single call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Context {
    /// No authenticated caller
    #[default]
    Anonymous,
    /// An authenticated caller
    Principal(Principal),
}

impl Context {
    /// An anonymous context
    pub fn anonymous() -> Self {
        Context::Anonymous
    }

    /// An ordinary identified context
    pub fn principal(id: EntityId) -> Self {
        Context::Principal(Principal {
            id,
            elevated: false,
        })
    }

    /// An elevated identified context
    pub fn elevated(id: EntityId) -> Self {
        Context::Principal(Principal { id, elevated: true })
    }

    /// The caller's identity, if identified
    pub fn identity(&self) -> Option<EntityId> {
        match self {
            Context::Anonymous => None,
            Context::Principal(p) => Some(p.id),
        }
    }

    /// Whether no caller is identified
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Context::Anonymous)
    }

    /// Whether the caller is identified and elevated
    pub fn is_elevated(&self) -> bool {
        matches!(self, Context::Principal(Principal { elevated: true, .. }))
    }
}

/// Names the caller in authorization denials and audit logs
impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Anonymous => write!(f, "anonymous"),
            Context::Principal(p) if p.elevated => write!(f, "principal {} (elevated)", p.id),
            Context::Principal(p) => write!(f, "principal {}", p.id),
        }
    }
}
