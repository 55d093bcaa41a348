//! Request execution over schema-described entities
//!
//! The engine compiles caller-supplied requests against an entity schema
//! and executes them through any [`vista_core::Repository`]. The stages
//! compose left to right:
//!
//! - [`selection`] compiles field selections, shallowly, reused per page
//! - [`filter`] compiles filter requests into include and exclude sets
//! - [`order`] sorts scan results by one stored field
//! - [`page`] slices an ordered result into a numbered page
//! - [`projection`] turns entities into wire-shaped values
//!
//! [`search::execute`] glues those into one pipeline. [`mutation`] applies
//! authorized change sets through the same schemas, and [`permission`]
//! holds the uniform write gate both lean on.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod filter;
pub mod mutation;
pub mod order;
pub mod page;
pub mod permission;
pub mod projection;
pub mod search;
pub mod selection;

pub use mutation::{MultiLinkMode, Mutator};
pub use order::OrderSpec;
pub use page::{paginate, Page};
pub use projection::Projector;
pub use search::SearchParams;
pub use selection::{LinkOptions, SelectionNode, SELECT_ALL};
