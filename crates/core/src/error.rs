//! Error types for the Vista engine
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Every variant belongs to exactly one [`ErrorKind`], so boundary layers can
//! choose a response class (bad request, forbidden, not found) from
//! [`Error::kind`] without matching individual variants.

use crate::entity::EntityRef;
use thiserror::Error;

/// Result type alias for Vista operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the Vista engine
#[derive(Debug, Error)]
pub enum Error {
    // === Selection shape ===
    /// A selected name is not a serializable field of the entity type
    #[error("{field} is not a direct field of {entity}")]
    NotADirectField {
        /// The offending name
        field: String,
        /// The entity-type name
        entity: &'static str,
    },

    /// A link-mapping key does not name a declared link field
    #[error("{field} is not a linked field of {entity}")]
    NotALinkedField {
        /// The offending name
        field: String,
        /// The entity-type name
        entity: &'static str,
    },

    /// The top-level selection request has an unusable shape
    #[error("valid selection types are a sequence, or \"*\" - got {actual}")]
    InvalidSelectionRequest {
        /// Type name of what was supplied
        actual: &'static str,
    },

    /// A selection element is neither a field name nor a link mapping
    #[error("expected selection elements to be a name or a link mapping - got {actual}")]
    InvalidSelectionElement {
        /// Type name of what was supplied
        actual: &'static str,
    },

    /// A multi-link's inner value is not a sequence, options mapping, or "*"
    #[error("multi-link options must be a sequence, a {{fields, order}} mapping, or \"*\" - got {actual}")]
    InvalidMultiLinkOptions {
        /// Type name of what was supplied
        actual: &'static str,
    },

    // === Filter shape ===
    /// The filter request is not a sequence of field-to-clause mappings
    #[error("filters must be a sequence of {{field: {{operator: value}}}} mappings - got {actual}")]
    InvalidFilter {
        /// Type name of what was supplied
        actual: &'static str,
    },

    /// A filter names a field that is not stored on the entity type
    #[error("{field} is not a filterable field of {entity}")]
    UnknownFilterField {
        /// The offending name
        field: String,
        /// The entity-type name
        entity: &'static str,
    },

    /// A filter uses an operator outside equals/notEquals/in
    #[error("unknown filter operator {operator} - expected equals, notEquals, or in")]
    UnknownFilterOperator {
        /// The operator as supplied
        operator: String,
    },

    /// A filter or link value cannot coerce to the field's integer identity
    #[error("cannot coerce {actual} to an integer for {field}")]
    InvalidFilterValue {
        /// The target field
        field: String,
        /// Display form of the unusable value
        actual: String,
    },

    // === Order and page ===
    /// The order field is not a stored field of the entity type
    #[error("cannot order by {field} - not a stored field of {entity}")]
    InvalidOrderField {
        /// The offending name, descending marker stripped
        field: String,
        /// The entity-type name
        entity: &'static str,
    },

    /// The requested limit is zero or exceeds the configured maximum
    #[error("limit must be between 1 and {max} - got {actual}")]
    InvalidLimit {
        /// The requested limit
        actual: usize,
        /// The configured maximum
        max: usize,
    },

    /// The requested page number is outside the result's page count
    #[error("page must be between 1 and {pages} - got {actual}")]
    InvalidPage {
        /// The requested page number
        actual: usize,
        /// Total number of pages
        pages: usize,
    },

    // === Resolution ===
    /// No schema is registered under the requested type name
    #[error("entity type {name} does not exist")]
    UnknownEntityType {
        /// The unresolved name
        name: String,
    },

    /// No instance exists for the reference
    #[error("{0} does not exist")]
    NotFound(EntityRef),

    // === Authorization ===
    /// The call requires an identified caller
    #[error("authentication required")]
    LoginRequired,

    /// The caller may not write this field
    ///
    /// Names the acting context, field, attempted value, and owning identity.
    /// Callers render this message, so its shape is part of the contract.
    #[error("{context} may not write {field}={value} on {entity} owned by {owner}")]
    WriteDenied {
        /// Display form of the acting context
        context: String,
        /// The field being written
        field: String,
        /// Display form of the attempted value
        value: String,
        /// The entity being written
        entity: EntityRef,
        /// Display form of the owning identity, or "nobody"
        owner: String,
    },

    // === Mutation and create shape ===
    /// A required stored field is missing from a create request
    #[error("{entity} requires {field}")]
    MissingField {
        /// The missing field
        field: String,
        /// The entity-type name
        entity: &'static str,
    },

    /// A bounded text field exceeds its declared maximum length
    #[error("{field} exceeds {max} characters - got {actual}")]
    ValueTooLong {
        /// The field being written
        field: String,
        /// Declared maximum length in characters
        max: usize,
        /// Supplied length in characters
        actual: usize,
    },

    /// The field exists but cannot be assigned through a request
    ///
    /// Computed fields, auto-now instants, and reverse multi-links are
    /// projection-only.
    #[error("{field} of {entity} cannot be written")]
    NotWritable {
        /// The field being written
        field: String,
        /// The entity-type name
        entity: &'static str,
    },

    /// A multi-link edit names a mode outside set/add/remove
    #[error("unknown multi-link mode {actual} - expected set, add, or remove")]
    InvalidLinkMode {
        /// The mode as supplied
        actual: String,
    },

    // === Schema definition ===
    /// A field name was declared under more than one category
    #[error("{field} declared more than once on {entity}")]
    DuplicateField {
        /// The conflicting name
        field: String,
        /// The entity-type name
        entity: &'static str,
    },

    /// An entity type was registered twice
    #[error("entity type {name} already registered")]
    DuplicateEntityType {
        /// The conflicting type name
        name: &'static str,
    },

    // === Storage ===
    /// Repository layer failure
    #[error("storage error: {0}")]
    Storage(String),
}

/// Response class of an error, one per variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed selection/filter/order/page/value shapes; caller error,
    /// never retried
    Request,
    /// Denied by the permission gate; rendered as "forbidden"
    Authorization,
    /// Unknown entity type or instance
    NotFound,
    /// Invalid schema definition, surfaced at registry build time
    Schema,
    /// Repository failure
    Storage,
}

impl ErrorKind {
    /// Stable lowercase code for logs and wire envelopes
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Request => "request",
            ErrorKind::Authorization => "authorization",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Schema => "schema",
            ErrorKind::Storage => "storage",
        }
    }
}

impl Error {
    /// Build a storage error from any message
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }

    /// Classify this error into its response class
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotADirectField { .. }
            | Error::NotALinkedField { .. }
            | Error::InvalidSelectionRequest { .. }
            | Error::InvalidSelectionElement { .. }
            | Error::InvalidMultiLinkOptions { .. }
            | Error::InvalidFilter { .. }
            | Error::UnknownFilterField { .. }
            | Error::UnknownFilterOperator { .. }
            | Error::InvalidFilterValue { .. }
            | Error::InvalidOrderField { .. }
            | Error::InvalidLimit { .. }
            | Error::InvalidPage { .. }
            | Error::MissingField { .. }
            | Error::ValueTooLong { .. }
            | Error::NotWritable { .. }
            | Error::InvalidLinkMode { .. } => ErrorKind::Request,

            Error::LoginRequired | Error::WriteDenied { .. } => ErrorKind::Authorization,

            Error::UnknownEntityType { .. } | Error::NotFound(_) => ErrorKind::NotFound,

            Error::DuplicateField { .. } | Error::DuplicateEntityType { .. } => ErrorKind::Schema,

            Error::Storage(_) => ErrorKind::Storage,
        }
    }
}
