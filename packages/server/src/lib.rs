// Reelpair - Match Engine Core
//
// This crate provides the backend API for the pairwise match engine: two
// players contribute watch-list items into a shared pool, swipe on them
// independently, and the engine surfaces every item both players liked,
// exactly once, regardless of how the two players' requests interleave.
//
// Architecture follows domain-driven design: models own their SQL, actions
// own the business rules, the server layer owns transport.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
