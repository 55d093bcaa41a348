#[path = "../common/mod.rs"]
mod common;

mod permissions;
mod projection;
