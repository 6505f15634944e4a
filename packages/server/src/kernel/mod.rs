//! Kernel module - server infrastructure and dependencies.

pub mod catalog;
pub mod traits;

pub use catalog::{NullCatalog, TmdbCatalog};
pub use traits::*;
