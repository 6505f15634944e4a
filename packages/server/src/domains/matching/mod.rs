//! Matching domain - pairwise match sessions over a shared candidate pool.
//!
//! An invitation between two friends becomes a session; both players
//! contribute candidate items, swipe independently, and the engine records a
//! mutual match exactly once when both have liked the same item.

pub mod actions;
pub mod data;
pub mod models;
