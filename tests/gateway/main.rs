//! Wire-level coverage of the gateway facade.

#[path = "../common/mod.rs"]
mod common;

mod mutations;
mod search;
